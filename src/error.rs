use thiserror::Error;

use crate::diff::DiffHalfKind;

/// Everything that can stop a generation run. Diff and history readers capture
/// their failures as data; the pipeline promotes them to one of these only once
/// they are fatal to the current request.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(
        "no staged changes found; stage your changes (git add) or set --diff-source to 'unstaged'/'auto'"
    )]
    NoStagedChanges,

    #[error("no unstaged changes found; modify files or set --diff-source to 'staged'/'auto'")]
    NoUnstagedChanges,

    #[error("no git changes found to generate a commit message")]
    NoChanges,

    #[error("failed to read {half} changes: {message}")]
    DiffReadFailed { half: DiffHalfKind, message: String },

    #[error("not a git repository (or none found at {path})")]
    RepoNotFound { path: String },

    #[error(
        "{provider} API key not configured; pass --api-key, set the environment variable, or add it to the config file"
    )]
    MissingCredential { provider: &'static str },

    #[error("{0}")]
    MisconfiguredEndpoint(String),

    #[error("empty response from the provider. {hint}")]
    EmptyResponse { hint: String },

    #[error("{}", describe_http_status(.status, .provider, .message))]
    HttpStatus {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} API error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("failed to write the commit message: {0}")]
    CommitFieldWrite(String),
}

/// Map an HTTP status to a user-facing diagnosis, keeping the raw provider
/// message so unrecognized failures are still debuggable.
fn describe_http_status(status: &u16, provider: &str, message: &str) -> String {
    let diagnosis = match status {
        401 => format!("invalid {provider} API key or unauthorized access"),
        429 => "rate limit exceeded, please try again later".to_string(),
        500 => format!("{provider} server error, please try again later"),
        503 => format!("{provider} service is temporarily unavailable"),
        404 => format!(
            "{provider} endpoint not found; check that the base URL points at the API root, not the completions path"
        ),
        _ => format!("{provider} API error (status {status})"),
    };

    let raw = message.trim();
    if raw.is_empty() {
        diagnosis
    } else {
        format!("{diagnosis}: {raw}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_reports_authentication_failure() {
        let err = GenerateError::HttpStatus {
            provider: "OpenAI",
            status: 401,
            message: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "invalid OpenAI API key or unauthorized access"
        );
    }

    #[test]
    fn status_429_reports_rate_limit() {
        let err = GenerateError::HttpStatus {
            provider: "Gemini",
            status: 429,
            message: "quota exceeded".into(),
        };
        let text = err.to_string();
        assert!(text.contains("rate limit exceeded"));
        assert!(text.contains("quota exceeded"));
    }

    #[test]
    fn unrecognized_status_keeps_raw_provider_message() {
        let err = GenerateError::HttpStatus {
            provider: "OpenAI",
            status: 418,
            message: "short and stout".into(),
        };
        let text = err.to_string();
        assert!(text.contains("status 418"));
        assert!(text.contains("short and stout"));
    }

    #[test]
    fn status_404_hints_at_base_url() {
        let err = GenerateError::HttpStatus {
            provider: "OpenAI",
            status: 404,
            message: String::new(),
        };
        assert!(err.to_string().contains("base URL"));
    }
}
