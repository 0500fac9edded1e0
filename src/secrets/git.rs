//! Commit-and-push of a git working directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::GitError;

/// Runs `git -C <workdir> <args..>` and returns its stdout.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn git(&self, workdir: &Path, args: &[&str]) -> Result<String, GitError>;
}

/// Spawns the real `git` binary.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn git(&self, workdir: &Path, args: &[&str]) -> Result<String, GitError> {
        let output = tokio::process::Command::new("git")
            .arg("-C")
            .arg(workdir)
            .args(args)
            .output()
            .await?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing to commit; no commit or push was made.
    Clean,
    Pushed,
}

impl CommitOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitOutcome::Clean => "clean",
            CommitOutcome::Pushed => "pushed",
        }
    }
}

#[async_trait]
pub trait Committer: Send + Sync {
    /// Stages everything, commits with `message` and pushes. Returns
    /// [`CommitOutcome::Clean`] without committing when there is nothing
    /// pending.
    async fn commit_and_push(&self, message: &str) -> Result<CommitOutcome, GitError>;
}

pub struct GitCommitter<R = ProcessRunner> {
    workdir: PathBuf,
    remote: Option<String>,
    runner: R,
}

impl GitCommitter<ProcessRunner> {
    pub fn new(workdir: impl Into<PathBuf>, remote: Option<String>) -> Self {
        Self::with_runner(workdir, remote, ProcessRunner)
    }
}

impl<R: CommandRunner> GitCommitter<R> {
    pub fn with_runner(workdir: impl Into<PathBuf>, remote: Option<String>, runner: R) -> Self {
        Self {
            workdir: workdir.into(),
            remote,
            runner,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

#[async_trait]
impl<R: CommandRunner> Committer for GitCommitter<R> {
    async fn commit_and_push(&self, message: &str) -> Result<CommitOutcome, GitError> {
        tracing::debug!(workdir = %self.workdir.display(), "Checking for pending changes");

        let status = self.runner.git(&self.workdir, &["status", "--porcelain"]).await?;
        if status.trim().is_empty() {
            tracing::debug!("Working tree is clean, nothing to commit");
            return Ok(CommitOutcome::Clean);
        }

        self.runner.git(&self.workdir, &["add", "."]).await?;
        self.runner.git(&self.workdir, &["commit", "-m", message]).await?;

        match &self.remote {
            Some(remote) => self.runner.git(&self.workdir, &["push", remote.as_str()]).await?,
            None => self.runner.git(&self.workdir, &["push"]).await?,
        };

        tracing::info!(workdir = %self.workdir.display(), message = %message, "Committed and pushed");
        Ok(CommitOutcome::Pushed)
    }
}
