use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as GitCommand;

use anyhow::{Context, Result, anyhow};

use crate::diff::DiffHalf;
use crate::error::GenerateError;

/// Source of the two diff halves. Errors are captured inside each half so the
/// resolver can decide what is fatal. `Sync` because the pipeline fetches both
/// halves from a scoped thread.
pub trait DiffProvider: Sync {
    fn staged_diff(&self) -> DiffHalf;
    fn unstaged_diff(&self) -> DiffHalf;
}

/// Source of commit history used as style context.
pub trait LogProvider {
    /// Whether the repository has any commits at all.
    fn has_head(&self) -> bool;

    /// The locally configured `user.name`, if any.
    fn local_user_name(&self) -> Option<String>;

    /// `git log --oneline`, bounded to `max_count` entries, optionally
    /// restricted to one author. Failures come back as plain strings.
    fn log_oneline(&self, max_count: u32, author: Option<&str>) -> Result<String, String>;
}

/// The commit-message field this tool fills in. For a CLI that field is
/// `.git/COMMIT_EDITMSG`, which the next `git commit` opens pre-populated.
pub trait CommitMessageSink {
    /// Current field content, used as additional context when configured so.
    fn current_text(&self) -> String;

    fn set_text(&mut self, message: &str) -> Result<()>;
}

/// A repository addressed by its worktree root; all operations shell out to git.
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Resolve the repository containing `path`.
    pub fn open(path: &Path) -> Result<Self, GenerateError> {
        let root = run_git(path, &["rev-parse", "--show-toplevel"]).map_err(|_| {
            GenerateError::RepoNotFound {
                path: path.display().to_string(),
            }
        })?;
        Ok(GitRepo {
            root: PathBuf::from(root.trim()),
        })
    }

    /// Path to the repository's git directory (usually `.git`).
    pub fn git_dir(&self) -> Result<PathBuf> {
        let dir = self.git_output(&["rev-parse", "--git-dir"])?;
        let dir = PathBuf::from(dir.trim());
        if dir.is_absolute() {
            Ok(dir)
        } else {
            Ok(self.root.join(dir))
        }
    }

    fn git_output(&self, args: &[&str]) -> Result<String> {
        run_git(&self.root, args)
    }
}

/// Run a git command in `dir` and capture stdout as String.
fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = GitCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("failed to run git {args:?}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "git {:?} exited with status {:?}: {}",
            args,
            output.status.code(),
            stderr.trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

impl DiffProvider for GitRepo {
    fn staged_diff(&self) -> DiffHalf {
        match self.git_output(&["diff", "--staged"]) {
            Ok(text) => DiffHalf::ok(text),
            Err(e) => DiffHalf::err(e.to_string()),
        }
    }

    fn unstaged_diff(&self) -> DiffHalf {
        match self.git_output(&["diff"]) {
            Ok(text) => DiffHalf::ok(text),
            Err(e) => DiffHalf::err(e.to_string()),
        }
    }
}

impl LogProvider for GitRepo {
    fn has_head(&self) -> bool {
        self.git_output(&["rev-parse", "--verify", "HEAD"]).is_ok()
    }

    fn local_user_name(&self) -> Option<String> {
        self.git_output(&["config", "user.name"])
            .ok()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    fn log_oneline(&self, max_count: u32, author: Option<&str>) -> Result<String, String> {
        let count = max_count.to_string();
        let mut args = vec!["log", "--oneline", "-n", &count];
        let author_arg;
        if let Some(name) = author {
            author_arg = format!("--author={name}");
            args.push(&author_arg);
        }
        self.git_output(&args).map_err(|e| e.to_string())
    }
}

/// Writes the generated message into `COMMIT_EDITMSG` so the next
/// `git commit` opens with it as the default message.
pub struct EditmsgSink {
    path: PathBuf,
}

impl EditmsgSink {
    pub fn for_repo(repo: &GitRepo) -> Result<Self> {
        let path = repo.git_dir()?.join("COMMIT_EDITMSG");
        Ok(EditmsgSink { path })
    }
}

impl CommitMessageSink for EditmsgSink {
    fn current_text(&self) -> String {
        fs::read_to_string(&self.path).unwrap_or_default()
    }

    fn set_text(&mut self, message: &str) -> Result<()> {
        fs::write(&self.path, message)
            .with_context(|| format!("failed to write commit message to {:?}", self.path))
    }
}
