use clap::ValueEnum;
use serde::Deserialize;

use crate::git::LogProvider;

/// Hard ceiling on the history context shipped to the provider, in characters.
pub const LOG_CONTEXT_MAX_CHARS: usize = 8000;

const TRUNCATION_MARKER: &str = "\n... [history truncated]";

/// Whose commits to read when referencing history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorScope {
    #[default]
    All,
    /// Only commits authored under the locally configured `user.name`.
    #[value(name = "self")]
    #[serde(rename = "self")]
    SelfOnly,
}

#[derive(Debug, Clone)]
pub struct HistoryQuery {
    pub max_count: u32,
    pub author_scope: AuthorScope,
}

/// Outcome of a history read. Failures are carried as data; the pipeline
/// treats them as "no history available" rather than aborting the run.
#[derive(Debug, Clone, Default)]
pub struct HistoryResult {
    pub text: String,
    pub error: Option<String>,
}

/// Fetch a bounded slice of `git log --oneline` output as style context.
///
/// An empty repository (no resolvable HEAD) is a legitimate state and yields
/// an empty result with no error. When the self scope has no configured
/// identity to match against, it silently widens to all authors.
pub fn read_history(log: &dyn LogProvider, query: &HistoryQuery) -> HistoryResult {
    if !log.has_head() {
        return HistoryResult::default();
    }

    let max_count = clamp_count(query.max_count);

    let author = match query.author_scope {
        AuthorScope::All => None,
        AuthorScope::SelfOnly => log
            .local_user_name()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()),
    };

    match log.log_oneline(max_count, author.as_deref()) {
        Ok(text) => HistoryResult {
            text: truncate_log(text.trim()),
            error: None,
        },
        Err(message) => HistoryResult {
            text: String::new(),
            error: Some(message),
        },
    }
}

/// Clamp a caller-supplied commit count into [1, 50].
pub fn clamp_count(requested: u32) -> u32 {
    requested.clamp(1, 50)
}

fn truncate_log(text: &str) -> String {
    match text.char_indices().nth(LOG_CONTEXT_MAX_CHARS) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
