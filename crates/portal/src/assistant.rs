//! Report assistant backed by the Gemini `generateContent` REST call.

use engine::{AssistantError, ReportAssistant};
use serde::{Deserialize, Serialize};

use crate::config::AssistantConfig;

#[derive(Debug, Clone)]
pub struct Gemini {
    config: AssistantConfig,
    http: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

impl Gemini {
    pub fn new(config: AssistantConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl ReportAssistant for Gemini {
    async fn generate(
        &self,
        instruction: &str,
        question: &str,
    ) -> Result<Option<String>, AssistantError> {
        if self.config.api_key.trim().is_empty() {
            return Err(AssistantError::NotConfigured(
                "assistant.api_key is empty".to_string(),
            ));
        }

        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: [Part { text: instruction }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part { text: question }],
            }],
        };
        tracing::debug!(model = %self.config.model, "asking the report assistant");

        let res = self
            .http
            .post(self.url())
            .header("x-goog-api-key", self.config.api_key.trim())
            .json(&body)
            .send()
            .await
            .map_err(|err| AssistantError::Unavailable(err.to_string()))?;

        let status = res.status();
        if status.is_success() {
            let answer = res
                .json::<GenerateResponse>()
                .await
                .map_err(|err| AssistantError::Decode(err.to_string()))?;
            return Ok(answer.text());
        }

        let message = res
            .json::<GoogleError>()
            .await
            .map(|err| err.error.message)
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(AssistantError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
