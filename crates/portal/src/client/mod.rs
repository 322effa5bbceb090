//! HTTP client of the persistence endpoint.

use std::time::Duration;

use api_types::{
    ErrorBody,
    init::InitResponse,
    mutation::{self, Mutation},
    user::{LoginRequest, LoginResponse, UserRow},
};
use engine::{Persistence, PersistenceError};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::AppError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Client {
    endpoint: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> crate::error::Result<Self> {
        let endpoint = Url::parse(base_url)
            .map_err(|err| AppError::Setting(format!("invalid base_url: {err}")))?;
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { endpoint, http })
    }

    fn url(&self, action: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("action", action);
        url
    }

    async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, PersistenceError> {
        res.json::<T>()
            .await
            .map_err(|err| PersistenceError::Decode(err.to_string()))
    }

    async fn failure(res: reqwest::Response) -> PersistenceError {
        let status = res.status();
        let message = res
            .json::<ErrorBody>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());

        match status {
            StatusCode::UNAUTHORIZED => PersistenceError::Unauthorized,
            _ => PersistenceError::Rejected {
                status: status.as_u16(),
                message,
            },
        }
    }
}

fn transport(err: reqwest::Error) -> PersistenceError {
    PersistenceError::Transport(err.to_string())
}

impl Persistence for Client {
    async fn init(&self) -> Result<InitResponse, PersistenceError> {
        let res = self
            .http
            .get(self.url(mutation::INIT))
            .send()
            .await
            .map_err(transport)?;

        if res.status().is_success() {
            return Self::decode(res).await;
        }
        Err(Self::failure(res).await)
    }

    async fn login(&self, request: &LoginRequest) -> Result<Option<UserRow>, PersistenceError> {
        let res = self
            .http
            .post(self.url(mutation::LOGIN))
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        if res.status().is_success() {
            let body: LoginResponse = Self::decode(res).await?;
            return Ok(body.user.filter(|_| body.success));
        }
        match Self::failure(res).await {
            PersistenceError::Unauthorized => Ok(None),
            err => Err(err),
        }
    }

    async fn apply(&self, mutation: &Mutation) -> Result<(), PersistenceError> {
        let res = self
            .http
            .post(self.url(mutation.action()))
            .json(mutation)
            .send()
            .await
            .map_err(transport)?;

        if res.status().is_success() {
            return Ok(());
        }
        Err(Self::failure(res).await)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use api_types::{mutation::IdBody, transaction::StatusUpdate};
    use axum::{
        Json, Router,
        extract::{Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::get,
    };
    use serde_json::{Value, json};

    use super::*;

    type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    async fn init_handler() -> Json<Value> {
        Json(json!({
            "members": [],
            "transactions": [{
                "id": 3, "type": "ENTREE", "category": "Cotisation", "amount": "5000.00",
                "date": "2025-02-10T00:00:00.000Z", "status": "APPROVED",
                "performed_by": "Awa Traore", "receipt_number": "REC-1"
            }],
            "budgets": [],
            "messages": [],
            "settings": {}
        }))
    }

    async fn post_handler(
        State(seen): State<Seen>,
        Query(query): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> Response {
        let action = query.get("action").cloned().unwrap_or_default();
        seen.lock().unwrap().push((action.clone(), body.clone()));

        match action.as_str() {
            "login" if body["password"] == "secret" => Json(json!({
                "success": true,
                "user": { "email": body["email"], "name": "Fatou Sow", "role": "TRESORIER", "member_id": null }
            }))
            .into_response(),
            "login" => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "error": "Invalid credentials" })),
            )
                .into_response(),
            "delete_member" => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "relation \"members\" does not exist" })),
            )
                .into_response(),
            _ => Json(json!({ "success": true })).into_response(),
        }
    }

    async fn spawn_endpoint() -> (Client, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route("/api", get(init_handler).post(post_handler))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (Client::new(&format!("http://{addr}/api")).unwrap(), seen)
    }

    #[test]
    fn action_goes_in_the_query_string() {
        let client = Client::new("http://localhost:8888/.netlify/functions/api").unwrap();
        assert_eq!(
            client.url("add_member").as_str(),
            "http://localhost:8888/.netlify/functions/api?action=add_member"
        );
        assert!(matches!(Client::new("not a url"), Err(AppError::Setting(_))));
    }

    #[tokio::test]
    async fn init_decodes_relational_rows() {
        let (client, _) = spawn_endpoint().await;
        let init = client.init().await.unwrap();
        assert_eq!(init.transactions.len(), 1);
        assert_eq!(init.transactions[0].id, "3");
        assert_eq!(init.transactions[0].amount, 5000.0);
        assert!(init.settings.association_name.is_none());
    }

    #[tokio::test]
    async fn login_maps_unauthorized_to_none() {
        let (client, _) = spawn_endpoint().await;
        let refused = client
            .login(&LoginRequest {
                email: "tresorier@asso.com".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(refused, None);

        let user = client
            .login(&LoginRequest {
                email: "tresorier@asso.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, "TRESORIER");
        assert_eq!(user.member_id, None);
    }

    #[tokio::test]
    async fn mutations_post_their_body_to_their_action() {
        let (client, seen) = spawn_endpoint().await;
        client
            .apply(&Mutation::UpdateTransactionStatus(StatusUpdate {
                id: "tx1".to_string(),
                status: "APPROVED".to_string(),
            }))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, "update_transaction_status");
        assert_eq!(seen[0].1, json!({ "id": "tx1", "status": "APPROVED" }));
    }

    #[tokio::test]
    async fn error_body_is_surfaced() {
        let (client, _) = spawn_endpoint().await;
        let err = client
            .apply(&Mutation::DeleteMember(IdBody {
                id: "m1".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PersistenceError::Rejected {
                status: 500,
                message: "relation \"members\" does not exist".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::new(&format!("http://{addr}/api")).unwrap();
        assert!(matches!(
            client.init().await,
            Err(PersistenceError::Transport(_))
        ));
    }
}
