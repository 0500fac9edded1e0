pub mod config;
pub mod error;
pub mod git;
pub mod invalidator;
pub mod log;

pub use config::SecretsConfig;
pub use error::{GitError, SecretError};
pub use git::{CommandRunner, CommitOutcome, Committer, GitCommitter, ProcessRunner};
pub use invalidator::Invalidator;
pub use log::SecretLog;
