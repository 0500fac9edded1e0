use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::error::SecretError;

/// Append-only secret log inside the git working directory, laid out as
/// `secrets/<year>/<month>/<timestamp>[-N].txt`.
#[derive(Debug, Clone)]
pub struct SecretLog {
    repo_path: PathBuf,
    max_file_bytes: u64,
}

impl SecretLog {
    pub fn new(repo_path: impl Into<PathBuf>, max_file_bytes: u64) -> Self {
        Self {
            repo_path: repo_path.into(),
            max_file_bytes,
        }
    }

    /// `<repo>/secrets/<year>/<month>`, month not zero padded. Taken from
    /// the same UTC instant as the file name so the two never disagree.
    pub fn folder_for(&self, now: DateTime<Utc>) -> PathBuf {
        self.repo_path
            .join("secrets")
            .join(now.year().to_string())
            .join(now.month().to_string())
    }

    /// Appends `secret` to the file named after `now`. If that file cannot
    /// take the secret without growing past the size cap, `-1`, `-2`, ... are
    /// tried until one can.
    pub async fn append(&self, secret: &str, now: DateTime<Utc>) -> Result<PathBuf, SecretError> {
        let folder = self.folder_for(now);
        tokio::fs::create_dir_all(&folder).await?;

        let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        let incoming = secret.len() as u64;

        let mut increment = 0u32;
        let mut path = folder.join(format!("{}.txt", stamp));
        while self.is_full(&path, incoming).await? {
            increment += 1;
            path = folder.join(format!("{}-{}.txt", stamp, increment));
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(secret.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(path = %path.display(), bytes = incoming, "Secret appended");

        Ok(path)
    }

    async fn is_full(&self, path: &Path, incoming: u64) -> Result<bool, SecretError> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(meta.len() > 0 && meta.len() + incoming > self.max_file_bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
