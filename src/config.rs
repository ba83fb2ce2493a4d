use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::cli_args::Cli;
use crate::diff::DiffSourceMode;
use crate::history::AuthorScope;
use crate::llm::ProviderKind;

/// Final resolved configuration for one generation run.
///
/// API keys stay optional here; the selected provider reports a missing
/// credential itself, so the other provider's key never has to exist.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderKind,
    pub diff_source: DiffSourceMode,
    pub language: String,
    pub context: Option<String>,
    pub use_editmsg_context: bool,
    pub reference_log: bool,
    pub log_count: u32,
    pub log_author: AuthorScope,
    pub dry_run: bool,
    pub openai: OpenAiConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub azure_api_version: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
}

impl Config {
    /// Build the final config from CLI flags, environment, TOML file, and defaults.
    ///
    /// Precedence:
    ///   1. CLI flags
    ///   2. Env vars (`OPENAI_API_KEY`, `GEMINI_API_KEY`, `OPENAI_BASE_URL`, ...)
    ///   3. TOML `~/.config/diffscribe.toml`
    ///   4. Hardcoded defaults
    pub fn from_sources(cli: &Cli) -> Self {
        let file_cfg = load_file_config().unwrap_or_default();
        let file_openai = file_cfg.openai.unwrap_or_default();
        let file_gemini = file_cfg.gemini.unwrap_or_default();

        let provider = cli.provider.or(file_cfg.provider).unwrap_or_default();

        let mut openai = OpenAiConfig {
            api_key: env::var("OPENAI_API_KEY").ok().or(file_openai.api_key),
            base_url: env::var("OPENAI_BASE_URL").ok().or(file_openai.base_url),
            model: file_openai.model.unwrap_or_else(|| "gpt-4o-mini".to_string()),
            temperature: file_openai.temperature.unwrap_or(0.7),
            azure_api_version: env::var("AZURE_API_VERSION")
                .ok()
                .or(file_openai.azure_api_version),
        };

        let mut gemini = GeminiConfig {
            api_key: env::var("GEMINI_API_KEY").ok().or(file_gemini.api_key),
            base_url: env::var("GEMINI_BASE_URL").ok().or(file_gemini.base_url),
            model: file_gemini
                .model
                .unwrap_or_else(|| "gemini-2.0-flash".to_string()),
        };

        // --model and --api-key apply to whichever provider is selected.
        if let Some(model) = &cli.model {
            match provider {
                ProviderKind::OpenAi => openai.model = model.clone(),
                ProviderKind::Gemini => gemini.model = model.clone(),
            }
        }
        if let Some(key) = &cli.api_key {
            match provider {
                ProviderKind::OpenAi => openai.api_key = Some(key.clone()),
                ProviderKind::Gemini => gemini.api_key = Some(key.clone()),
            }
        }

        Config {
            provider,
            diff_source: cli.diff_source.or(file_cfg.diff_source).unwrap_or_default(),
            language: cli
                .language
                .clone()
                .or(file_cfg.language)
                .unwrap_or_else(|| "English".to_string()),
            context: cli.context.clone(),
            use_editmsg_context: file_cfg.use_editmsg_context.unwrap_or(true),
            reference_log: cli.reference_log || file_cfg.reference_log.unwrap_or(false),
            log_count: cli.log_count.or(file_cfg.log_count).unwrap_or(20),
            log_author: cli.log_author.or(file_cfg.log_author).unwrap_or_default(),
            dry_run: cli.dry_run,
            openai,
            gemini,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    provider: Option<ProviderKind>,
    diff_source: Option<DiffSourceMode>,
    language: Option<String>,
    use_editmsg_context: Option<bool>,
    reference_log: Option<bool>,
    log_count: Option<u32>,
    log_author: Option<AuthorScope>,
    openai: Option<FileOpenAi>,
    gemini: Option<FileGemini>,
}

#[derive(Debug, Default, Deserialize)]
struct FileOpenAi {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    azure_api_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileGemini {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
}

/// Return `~/.config/diffscribe.toml`
fn config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("diffscribe.toml"))
}

fn load_file_config() -> Option<FileConfig> {
    let path = config_path()?;
    if !path.exists() {
        return None;
    }

    let data = fs::read_to_string(&path).ok()?;
    match toml::from_str::<FileConfig>(&data) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            log::warn!("Ignoring malformed config file {path:?}: {e}");
            None
        }
    }
}
