use chrono::Utc;
use std::path::PathBuf;

use crate::background::commit::DirtyFlag;

use super::error::SecretError;
use super::log::SecretLog;

/// Accepts secrets for invalidation: writes them to the log and flags the
/// working directory for the next commit.
#[derive(Debug, Clone)]
pub struct Invalidator {
    log: SecretLog,
    dirty: DirtyFlag,
}

impl Invalidator {
    pub fn new(log: SecretLog, dirty: DirtyFlag) -> Self {
        Self { log, dirty }
    }

    pub async fn submit(&self, secret: &str) -> Result<PathBuf, SecretError> {
        let path = self.log.append(secret, Utc::now()).await?;
        self.dirty.mark();
        crate::metrics::SECRETS_QUEUED.inc();
        tracing::info!(path = %path.display(), "Secret queued for invalidation");
        Ok(path)
    }
}
