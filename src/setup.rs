use log::debug;

use crate::config::Config;
use crate::error::GenerateError;
use crate::llm::gemini::GeminiClient;
use crate::llm::openai::OpenAiClient;
use crate::llm::{LlmClient, ProviderKind};

/// Build the provider client selected by configuration. The match is the
/// closed set of backends; adding one means extending it here.
pub fn build_llm_client(cfg: &Config) -> Result<Box<dyn LlmClient>, GenerateError> {
    match cfg.provider {
        ProviderKind::OpenAi => {
            debug!("Using OpenAiClient with model: {}", cfg.openai.model);
            Ok(Box::new(OpenAiClient::new(&cfg.openai)?))
        }
        ProviderKind::Gemini => {
            debug!("Using GeminiClient with model: {}", cfg.gemini.model);
            Ok(Box::new(GeminiClient::new(&cfg.gemini)?))
        }
    }
}
