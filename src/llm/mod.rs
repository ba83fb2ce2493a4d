pub mod gemini;
pub mod openai;
pub mod prompt_builder;
mod prompts;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::GenerateError;

/// Which backend answers the completion request. A closed set: every caller
/// matches it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    #[value(name = "openai")]
    OpenAi,
    Gemini,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One entry of the ordered prompt. Order is semantically meaningful: earlier
/// messages frame, later messages carry the specific content, and the diff is
/// always last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Trait for turning a message sequence into a single text completion.
pub trait LlmClient {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, GenerateError>;
}
