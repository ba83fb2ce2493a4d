use std::path::PathBuf;

use clap::Parser;

use crate::diff::DiffSourceMode;
use crate::history::AuthorScope;
use crate::llm::ProviderKind;

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "diffscribe",
    version,
    about = "LLM-assisted Git commit message generator"
)]
pub struct Cli {
    /// Repository to describe; defaults to the current directory
    #[arg(long)]
    pub repo: Option<PathBuf>,

    /// Which changes to describe (auto prefers staged, falls back to unstaged)
    #[arg(long, value_enum)]
    pub diff_source: Option<DiffSourceMode>,

    /// Backend that generates the message
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Model name for the selected provider (e.g. gpt-4o-mini, gemini-2.0-flash)
    #[arg(long, env = "DIFFSCRIBE_MODEL")]
    pub model: Option<String>,

    /// API key for the selected provider (otherwise OPENAI_API_KEY / GEMINI_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Extra context to weave into the message (ticket numbers, intent, ...)
    #[arg(long)]
    pub context: Option<String>,

    /// Output language for the commit message
    #[arg(long)]
    pub language: Option<String>,

    /// Include recent commit history as style reference
    #[arg(long)]
    pub reference_log: bool,

    /// How many log entries to reference (clamped to 1-50)
    #[arg(long)]
    pub log_count: Option<u32>,

    /// Whose commits to reference
    #[arg(long, value_enum)]
    pub log_author: Option<AuthorScope>,

    /// Print the message without writing .git/COMMIT_EDITMSG
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
