mod assistant;
mod client;
mod commands;
mod config;
mod error;
mod export;

use clap::Parser;
use engine::{Persistence, Store};

use crate::error::{AppError, Result};

/// Finance portal of the student association.
#[derive(Debug, Parser)]
#[command(name = "portal", disable_version_flag = true)]
struct Cli {
    #[command(flatten)]
    overrides: config::Overrides,
    #[command(subcommand)]
    command: commands::Command,
}

/// Loads the persisted state. A failed load keeps the builder defaults so the
/// session and the command still run.
async fn load<P: Persistence>(store: &mut Store<P>) {
    if let Err(err) = store.refresh().await {
        tracing::warn!("could not load persisted state, continuing with defaults: {err}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.overrides)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "portal={level},engine={level}",
            level = config.log_level
        ))
        .with_writer(std::io::stderr)
        .init();

    let client = client::Client::new(&config.base_url)?;
    let mut store = Store::builder(client).build();
    load(&mut store).await;

    if !store.login(&config.email, &config.password).await {
        return Err(AppError::Login(config.email));
    }

    let outcome = commands::run(cli.command, &mut store, &config).await;
    store.flush().await;
    store.logout();
    outcome
}

#[cfg(test)]
mod tests {
    use axum::{
        Json, Router,
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::get,
    };
    use engine::categories::EXPENSE_CATEGORIES;
    use serde_json::{Value, json};

    use super::*;

    async fn broken_init() -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "database unavailable" })),
        )
            .into_response()
    }

    async fn login(Json(body): Json<Value>) -> Json<Value> {
        Json(json!({
            "success": true,
            "user": { "email": body["email"], "name": "Fatou Sow", "role": "TRESORIER", "member_id": null }
        }))
    }

    #[tokio::test]
    async fn failed_load_keeps_defaults_and_login_still_works() {
        let app = Router::new().route("/api", get(broken_init).post(login));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = client::Client::new(&format!("http://{addr}/api")).unwrap();
        let mut store = Store::builder(client).year(2025).build();
        load(&mut store).await;

        assert!(store.transactions().is_empty());
        assert_eq!(store.budgets().len(), EXPENSE_CATEGORIES.len());
        assert!(store.login("tresorier@asso.com", "secret").await);
        assert_eq!(store.session().map(|u| u.name.as_str()), Some("Fatou Sow"));
    }
}
