use std::thread;

use crate::config::Config;
use crate::diff::{self, DiffBundle, DiffHalf};
use crate::error::GenerateError;
use crate::git::{CommitMessageSink, DiffProvider, LogProvider};
use crate::history::{self, HistoryQuery};
use crate::llm::{LlmClient, prompt_builder};

/// Staged status reporting, kept host-agnostic so the pipeline runs without
/// a terminal in tests.
pub trait Progress {
    fn report(&self, stage: &str);
}

impl Progress for indicatif::ProgressBar {
    fn report(&self, stage: &str) {
        self.set_message(stage.to_string());
    }
}

/// Run the whole pipeline: resolve the diff, optionally gather history,
/// assemble the prompt, call the provider, and write the result into the
/// commit-message field. The field is mutated exactly once, only on success.
pub fn generate_commit_message(
    cfg: &Config,
    diffs: &dyn DiffProvider,
    log: &dyn LogProvider,
    llm: &dyn LlmClient,
    sink: &mut dyn CommitMessageSink,
    progress: &dyn Progress,
) -> Result<String, GenerateError> {
    progress.report("Getting git changes...");
    let bundle = fetch_bundle(diffs);
    let diff_text = diff::resolve(&bundle, cfg.diff_source)?;

    let context = cfg
        .context
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .or_else(|| {
            cfg.use_editmsg_context
                .then(|| sink.current_text().trim().to_string())
                .filter(|c| !c.is_empty())
        });

    let history_text = if cfg.reference_log {
        progress.report("Reading git commit history...");
        let result = history::read_history(
            log,
            &HistoryQuery {
                max_count: cfg.log_count,
                author_scope: cfg.log_author,
            },
        );
        if let Some(err) = &result.error {
            // History is auxiliary; its failures never stop the run.
            log::warn!("Skipping history context: {err}");
        }
        (!result.text.is_empty()).then_some(result.text)
    } else {
        None
    };

    progress.report(match &context {
        Some(_) => "Analyzing changes with additional context...",
        None => "Analyzing changes...",
    });
    let messages = prompt_builder::assemble(
        &diff_text,
        context.as_deref(),
        history_text.as_deref(),
        &cfg.language,
    );

    progress.report(match &context {
        Some(_) => "Generating commit message with additional context...",
        None => "Generating commit message...",
    });
    let message = llm.complete(&messages)?;

    if !cfg.dry_run {
        sink.set_text(&message)
            .map_err(|e| GenerateError::CommitFieldWrite(e.to_string()))?;
    }

    Ok(message)
}

/// Fetch both diff halves concurrently; both must complete before resolution
/// and their ordering does not matter.
fn fetch_bundle(diffs: &dyn DiffProvider) -> DiffBundle {
    thread::scope(|scope| {
        let staged = scope.spawn(|| diffs.staged_diff());
        let unstaged = diffs.unstaged_diff();
        let staged = staged
            .join()
            .unwrap_or_else(|_| DiffHalf::err("staged diff reader panicked"));
        DiffBundle { staged, unstaged }
    })
}
