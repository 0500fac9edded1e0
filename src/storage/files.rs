use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use super::error::StorageError;

/// Flat directory of uploaded blobs. Each blob is named `<id>-<original name>`
/// and the `Files` namespace records that name under the paste id.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Blob filename for `id` and the client supplied name. Only the final
    /// path component of `original_name` is kept.
    pub fn blob_name(id: &str, original_name: &str) -> String {
        let base = original_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();
        let base = match base {
            "" | "." | ".." => "file",
            other => other,
        };
        format!("{}-{}", id, base)
    }

    /// Client facing name of a blob, i.e. the blob name without its id prefix.
    pub fn original_name<'a>(id: &str, blob_name: &'a str) -> &'a str {
        blob_name
            .strip_prefix(id)
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap_or(blob_name)
    }

    pub fn path(&self, blob_name: &str) -> PathBuf {
        self.dir.join(blob_name)
    }

    /// Writes a blob only if no file of that name exists yet. Returns `false`
    /// and leaves the existing file alone otherwise.
    pub async fn create(&self, blob_name: &str, data: &[u8]) -> Result<bool, StorageError> {
        let path = self.path(blob_name);
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let written = async {
            file.write_all(data).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }

        tracing::debug!(path = %path.display(), bytes = data.len(), "Blob created");
        Ok(true)
    }

    /// Writes (or overwrites) a blob.
    pub async fn write(&self, blob_name: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.path(blob_name);
        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.flush().await?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "Blob written");
        Ok(path)
    }

    pub async fn open(&self, blob_name: &str) -> Result<Option<(tokio::fs::File, u64)>, StorageError> {
        match tokio::fs::File::open(self.path(blob_name)).await {
            Ok(file) => {
                let len = file.metadata().await?.len();
                Ok(Some((file, len)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a blob. A blob that is already gone is not an error.
    pub async fn remove(&self, blob_name: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path(blob_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
