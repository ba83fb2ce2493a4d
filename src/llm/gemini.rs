use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, LlmClient, Role};
use crate::config::GeminiConfig;
use crate::error::GenerateError;

const PROVIDER: &str = "Gemini";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
struct GenerateRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Client for the Gemini `generateContent` API.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(cfg: &GeminiConfig) -> Result<Self, GenerateError> {
        let api_key = cfg
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GenerateError::MissingCredential { provider: PROVIDER })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| GenerateError::Provider {
                provider: PROVIDER,
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(GeminiClient {
            client,
            api_key,
            model: cfg.model.clone(),
            base_url: cfg
                .base_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn generate_url(&self) -> String {
        // Key travels as a query parameter; never log this URL.
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }
}

/// Gemini has no system role in `contents`; system messages are merged into
/// a single `systemInstruction` block and user messages become `contents`.
fn to_request(messages: &[ChatMessage]) -> GenerateRequest {
    let system_text: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let contents = messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| Content {
            role: Some("user".into()),
            parts: vec![Part {
                text: m.content.clone(),
            }],
        })
        .collect();

    GenerateRequest {
        system_instruction: (!system_text.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part {
                text: system_text.join("\n\n"),
            }],
        }),
        contents,
    }
}

impl LlmClient for GeminiClient {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, GenerateError> {
        let req = to_request(messages);

        log::info!("Calling Gemini model {:?}", self.model);
        if let Ok(body) = serde_json::to_string(&req) {
            // The request body carries no credential; the URL does, so only
            // the body is ever logged.
            log::trace!("Gemini request body: {body}");
        }

        let resp = self
            .client
            .post(self.generate_url())
            .json(&req)
            .send()
            .map_err(|e| GenerateError::Provider {
                provider: PROVIDER,
                message: format!("failed to send request: {e}"),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(GenerateError::HttpStatus {
                provider: PROVIDER,
                status: status.as_u16(),
                message: body,
            });
        }

        let generate_resp: GenerateResponse =
            resp.json().map_err(|e| GenerateError::Provider {
                provider: PROVIDER,
                message: format!("failed to parse response: {e}"),
            })?;

        extract_text(generate_resp).ok_or_else(|| GenerateError::EmptyResponse {
            hint: format!(
                "Check the Gemini model name ({}) and that the base URL points at \
                 the API root, e.g. {DEFAULT_BASE_URL}.",
                self.model
            ),
        })
    }
}

/// Pull the completion text out of the first candidate. Candidates can carry
/// several parts; their texts are one message split into chunks, so all of
/// them are joined.
fn extract_text(resp: GenerateResponse) -> Option<String> {
    let parts = resp.candidates.into_iter().next()?.content?.parts;
    let text = parts
        .into_iter()
        .map(|p| p.text)
        .collect::<String>()
        .trim()
        .to_string();
    (!text.is_empty()).then_some(text)
}
