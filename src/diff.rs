use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::GenerateError;

/// One half of the working tree: either the staged or the unstaged changes.
/// Retrieval failures are carried as data so both halves can be fetched
/// independently before anything is treated as fatal.
#[derive(Debug, Clone, Default)]
pub struct DiffHalf {
    pub text: String,
    pub error: Option<String>,
}

impl DiffHalf {
    pub fn ok(text: impl Into<String>) -> Self {
        DiffHalf {
            text: text.into(),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        DiffHalf {
            text: String::new(),
            error: Some(message.into()),
        }
    }
}

/// Both halves of a repository's pending changes, fetched fresh per run.
#[derive(Debug, Clone)]
pub struct DiffBundle {
    pub staged: DiffHalf,
    pub unstaged: DiffHalf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffHalfKind {
    Staged,
    Unstaged,
}

impl fmt::Display for DiffHalfKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffHalfKind::Staged => f.write_str("staged"),
            DiffHalfKind::Unstaged => f.write_str("unstaged"),
        }
    }
}

/// Which changes feed the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffSourceMode {
    /// Prefer staged changes, fall back to unstaged.
    #[default]
    Auto,
    Staged,
    Unstaged,
    /// Both halves, each under a labelled section header.
    #[value(name = "staged+unstaged")]
    #[serde(rename = "staged+unstaged")]
    Both,
}

/// Select or merge the two halves into the effective diff for this run.
///
/// A half that failed to load is a hard failure naming that half; silently
/// substituting the other half would describe changes the user did not ask
/// about. Emptiness is judged after trimming. Diff text is never truncated
/// here, unlike history context.
pub fn resolve(bundle: &DiffBundle, mode: DiffSourceMode) -> Result<String, GenerateError> {
    if let Some(message) = &bundle.staged.error {
        return Err(GenerateError::DiffReadFailed {
            half: DiffHalfKind::Staged,
            message: message.clone(),
        });
    }
    if let Some(message) = &bundle.unstaged.error {
        return Err(GenerateError::DiffReadFailed {
            half: DiffHalfKind::Unstaged,
            message: message.clone(),
        });
    }

    let staged = bundle.staged.text.trim();
    let unstaged = bundle.unstaged.text.trim();

    match mode {
        DiffSourceMode::Staged => {
            if staged.is_empty() {
                Err(GenerateError::NoStagedChanges)
            } else {
                Ok(staged.to_string())
            }
        }
        DiffSourceMode::Unstaged => {
            if unstaged.is_empty() {
                Err(GenerateError::NoUnstagedChanges)
            } else {
                Ok(unstaged.to_string())
            }
        }
        DiffSourceMode::Both => {
            let sections: Vec<String> = [
                (!staged.is_empty()).then(|| format!("--- STAGED ---\n{staged}")),
                (!unstaged.is_empty()).then(|| format!("--- UNSTAGED ---\n{unstaged}")),
            ]
            .into_iter()
            .flatten()
            .collect();

            if sections.is_empty() {
                Err(GenerateError::NoChanges)
            } else {
                Ok(sections.join("\n\n"))
            }
        }
        DiffSourceMode::Auto => {
            if !staged.is_empty() {
                Ok(staged.to_string())
            } else if !unstaged.is_empty() {
                Ok(unstaged.to_string())
            } else {
                Err(GenerateError::NoChanges)
            }
        }
    }
}
