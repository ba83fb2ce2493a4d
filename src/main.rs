mod cli_args;
mod config;
mod diff;
mod error;
mod git;
mod history;
mod llm;
mod logging;
mod pipeline;
mod setup;

use std::env;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use indicatif::ProgressBar;

use crate::cli_args::Cli;
use crate::config::Config;
use crate::git::{EditmsgSink, GitRepo};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let cfg = Config::from_sources(&cli);

    let path = match &cli.repo {
        Some(path) => path.clone(),
        None => env::current_dir()?,
    };
    let repo = GitRepo::open(&path)?;
    let mut sink = EditmsgSink::for_repo(&repo)?;

    let llm = setup::build_llm_client(&cfg)?;

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result =
        pipeline::generate_commit_message(&cfg, &repo, &repo, llm.as_ref(), &mut sink, &spinner);
    spinner.finish_and_clear();

    let message = result?;

    println!("----- Commit Message Preview -----");
    println!("{message}");
    println!("----------------------------------");
    if !cfg.dry_run {
        log::info!("Message written to COMMIT_EDITMSG; `git commit` will pick it up");
    }

    Ok(())
}
