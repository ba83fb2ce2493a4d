use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, LlmClient};
use crate::config::OpenAiConfig;
use crate::error::GenerateError;

const PROVIDER: &str = "OpenAI";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

// Compatible servers report usage partially or not at all; it only feeds a
// debug log, so every field is optional.
#[derive(Deserialize, Default)]
#[serde(default)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Client for the OpenAI Chat Completions API and compatible endpoints,
/// including Azure OpenAI deployments.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    azure_api_version: Option<String>,
}

impl OpenAiClient {
    pub fn new(cfg: &OpenAiConfig) -> Result<Self, GenerateError> {
        let api_key = cfg
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GenerateError::MissingCredential { provider: PROVIDER })?;

        let base_url = cfg
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        // A Gemini endpoint behind the OpenAI client guarantees a confusing
        // cross-provider 400, so refuse it before any request goes out.
        if looks_like_gemini_endpoint(&base_url) {
            return Err(GenerateError::MisconfiguredEndpoint(format!(
                "the OpenAI base URL looks like a Google/Gemini endpoint: {base_url}. \
                 If you are using Gemini, switch --provider to gemini and set the Gemini \
                 base URL instead. If you are using an OpenAI-compatible API, point the \
                 base URL at its /v1 root (not googleapis.com, not /chat/completions)."
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| GenerateError::Provider {
                provider: PROVIDER,
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(OpenAiClient {
            client,
            api_key,
            model: cfg.model.clone(),
            base_url,
            temperature: cfg.temperature,
            azure_api_version: cfg
                .azure_api_version
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        })
    }

    fn chat_url(&self) -> String {
        let mut url = format!("{}/chat/completions", self.base_url);
        if let Some(version) = &self.azure_api_version {
            url.push_str("?api-version=");
            url.push_str(version);
        }
        url
    }

    fn base_url_hint(&self) -> String {
        if self.azure_api_version.is_some() {
            "For Azure, set the base URL to the deployments level, e.g. \
             https://{resource}.openai.azure.com/openai/deployments/{deployment}, \
             and configure the Azure API version."
                .to_string()
        } else {
            format!(
                "Set the base URL to the /v1 root, e.g. https://api.openai.com/v1 \
                 (not /chat/completions). Currently: {}",
                self.base_url
            )
        }
    }
}

impl LlmClient for OpenAiClient {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, GenerateError> {
        let req = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        log::info!("Calling OpenAI model {:?}", self.model);
        if let Ok(body) = serde_json::to_string(&req) {
            log::trace!("OpenAI request body: {body}");
        }

        let mut request = self.client.post(self.chat_url()).json(&req);
        request = match &self.azure_api_version {
            // Azure authenticates with an api-key header instead of a bearer token.
            Some(_) => request.header("api-key", &self.api_key),
            None => request.bearer_auth(&self.api_key),
        };

        let resp = request.send().map_err(|e| GenerateError::Provider {
            provider: PROVIDER,
            message: format!("failed to send request: {e}"),
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            if status.as_u16() == 400 && looks_gemini_shaped(&body) {
                return Err(GenerateError::MisconfiguredEndpoint(format!(
                    "HTTP 400 with a Gemini-style error body; the configured OpenAI base \
                     URL most likely points at a Gemini endpoint ({}). Switch --provider \
                     to gemini or fix the base URL.",
                    self.base_url
                )));
            }
            return Err(GenerateError::HttpStatus {
                provider: PROVIDER,
                status: status.as_u16(),
                message: body,
            });
        }

        let chat_resp: ChatResponse = resp.json().map_err(|e| GenerateError::Provider {
            provider: PROVIDER,
            message: format!("failed to parse response: {e}"),
        })?;

        if let Some(usage) = &chat_resp.usage {
            log::debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        chat_resp
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .map(str::to_string)
            .ok_or_else(|| GenerateError::EmptyResponse {
                hint: self.base_url_hint(),
            })
    }
}

fn looks_like_gemini_endpoint(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("generativelanguage.googleapis.com")
        || lower.contains("aiplatform.googleapis.com")
        || (lower.contains("googleapis.com") && lower.contains("v1beta"))
        || lower.contains("/models/")
}

fn looks_gemini_shaped(body: &str) -> bool {
    body.contains("INVALID_ARGUMENT") || body.contains("generativelanguage")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(base_url: Option<&str>) -> OpenAiConfig {
        OpenAiConfig {
            api_key: Some("sk-test".into()),
            base_url: base_url.map(str::to_string),
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            azure_api_version: None,
        }
    }

    #[test]
    fn missing_key_fails_at_construction() {
        let mut c = cfg(None);
        c.api_key = None;
        assert!(matches!(
            OpenAiClient::new(&c),
            Err(GenerateError::MissingCredential { provider: "OpenAI" })
        ));

        c.api_key = Some("   ".into());
        assert!(matches!(
            OpenAiClient::new(&c),
            Err(GenerateError::MissingCredential { .. })
        ));
    }

    #[test]
    fn gemini_base_url_is_rejected_before_any_request() {
        for url in [
            "https://generativelanguage.googleapis.com/v1beta",
            "https://aiplatform.googleapis.com/v1",
            "https://example.googleapis.com/v1beta/openai",
            "https://example.com/v1beta/models/gemini-2.0-flash",
        ] {
            assert!(
                matches!(
                    OpenAiClient::new(&cfg(Some(url))),
                    Err(GenerateError::MisconfiguredEndpoint(_))
                ),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn ordinary_compatible_base_urls_are_accepted() {
        assert!(OpenAiClient::new(&cfg(Some("https://api.example.com/v1"))).is_ok());
        assert!(OpenAiClient::new(&cfg(None)).is_ok());
    }

    #[test]
    fn chat_url_joins_base_and_suffix() {
        let client = OpenAiClient::new(&cfg(Some("https://api.example.com/v1/"))).unwrap();
        assert_eq!(
            client.chat_url(),
            "https://api.example.com/v1/chat/completions"
        );

        let client = OpenAiClient::new(&cfg(None)).unwrap();
        assert_eq!(
            client.chat_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn azure_version_becomes_a_query_parameter() {
        let mut c = cfg(Some(
            "https://res.openai.azure.com/openai/deployments/dep",
        ));
        c.azure_api_version = Some("2024-02-01".into());
        let client = OpenAiClient::new(&c).unwrap();
        assert_eq!(
            client.chat_url(),
            "https://res.openai.azure.com/openai/deployments/dep/chat/completions?api-version=2024-02-01"
        );
        assert!(client.base_url_hint().contains("deployments"));
    }

    #[test]
    fn request_body_serializes_to_the_chat_completions_shape() {
        let messages = [ChatMessage::system("instructions"), ChatMessage::user("diff")];
        let req = ChatRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: 0.7,
        };
        let body = serde_json::to_string(&req).unwrap();
        assert!(body.contains(r#""model":"gpt-4o-mini""#));
        assert!(body.contains(r#""role":"system""#));
        assert!(body.contains(r#""role":"user""#));
        assert!(body.contains(r#""temperature":0.7"#));
    }

    #[test]
    fn partial_usage_objects_do_not_fail_the_parse() {
        let body = r#"{
            "choices": [{"message": {"content": "Add hello line"}}],
            "usage": {"total_tokens": 42}
        }"#;
        let resp: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            resp.choices[0].message.content.as_deref(),
            Some("Add hello line")
        );
        assert_eq!(resp.usage.as_ref().unwrap().total_tokens, 42);
        assert_eq!(resp.usage.as_ref().unwrap().prompt_tokens, 0);
    }

    #[test]
    fn gemini_shaped_bodies_are_recognized() {
        assert!(looks_gemini_shaped(
            r#"{"error":{"code":400,"status":"INVALID_ARGUMENT","message":"..."}}"#
        ));
        assert!(!looks_gemini_shaped(
            r#"{"error":{"type":"invalid_request_error","message":"..."}}"#
        ));
    }
}
