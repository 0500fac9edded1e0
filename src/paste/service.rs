use bytes::Bytes;
use std::sync::Arc;

use crate::storage::{
    FileStore, GuardedInsert, Namespace, PasteBackend, StorageConfig, StorageError, Visibility,
};

use super::error::PasteError;
use super::id::PasteId;

/// Another paste already owns the blob file this upload would be stored in.
const BLOB_TAKEN: &str = "File name already in use";

/// Body of a create/update request.
#[derive(Debug, Clone)]
pub enum PasteContent {
    Text(String),
    File { name: String, data: Bytes },
}

impl PasteContent {
    fn kind(&self) -> &'static str {
        match self {
            PasteContent::Text(_) => "text",
            PasteContent::File { .. } => "file",
        }
    }
}

/// A paste resolved by [`PasteService::get`].
#[derive(Debug)]
pub enum Paste {
    Text {
        id: String,
        content: String,
        namespace: Namespace,
    },
    Attachment {
        id: String,
        filename: String,
        file: tokio::fs::File,
        len: u64,
    },
}

/// Which visibility store is consulted first on lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOrder {
    PrivateFirst,
    PublicFirst,
}

impl LookupOrder {
    fn namespaces(self) -> [Namespace; 2] {
        match self {
            LookupOrder::PrivateFirst => [Namespace::Private, Namespace::Public],
            LookupOrder::PublicFirst => [Namespace::Public, Namespace::Private],
        }
    }
}

/// Which stores a caller-chosen id is checked against before it is accepted.
/// The file index is never part of the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionScope {
    /// Public and private stores.
    AnyVisibility,
    /// Only the store the paste is written to.
    SameVisibility,
}

impl CollisionScope {
    fn guard(self, visibility: Visibility) -> Vec<Namespace> {
        match self {
            CollisionScope::AnyVisibility => Namespace::TEXT.to_vec(),
            CollisionScope::SameVisibility => vec![visibility.into()],
        }
    }

    fn conflict_message(self) -> &'static str {
        match self {
            CollisionScope::AnyVisibility => "Paste ID already exists",
            CollisionScope::SameVisibility => "Public paste ID already exists",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PasteLimits {
    pub max_text_bytes: usize,
    pub max_file_bytes: usize,
}

impl From<&StorageConfig> for PasteLimits {
    fn from(config: &StorageConfig) -> Self {
        Self {
            max_text_bytes: config.max_text_bytes,
            max_file_bytes: config.max_file_bytes,
        }
    }
}

pub struct PasteService {
    backend: Arc<dyn PasteBackend>,
    files: FileStore,
    limits: PasteLimits,
}

impl PasteService {
    pub fn new(backend: Arc<dyn PasteBackend>, files: FileStore, limits: PasteLimits) -> Self {
        Self {
            backend,
            files,
            limits,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, PasteError> {
        let backend = crate::storage::open_backend(config)?;
        let files = FileStore::new(&config.files_dir)?;
        Ok(Self::new(backend, files, PasteLimits::from(config)))
    }

    pub fn backend(&self) -> Arc<dyn PasteBackend> {
        self.backend.clone()
    }

    pub fn limits(&self) -> PasteLimits {
        self.limits
    }

    /// Runs a backend call on the blocking pool.
    async fn run<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&dyn PasteBackend) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || f(backend.as_ref())).await?
    }

    fn check_size(&self, content: &PasteContent) -> Result<(), PasteError> {
        let (actual, limit) = match content {
            PasteContent::Text(text) => (text.len(), self.limits.max_text_bytes),
            PasteContent::File { data, .. } => {
                if !self.backend.supports_attachments() {
                    return Err(PasteError::AttachmentsUnsupported);
                }
                (data.len(), self.limits.max_file_bytes)
            }
        };
        if actual > limit {
            return Err(PasteError::TooLarge { limit, actual });
        }
        Ok(())
    }

    /// Text stores in `order`, then the file index.
    pub async fn get(&self, id: &PasteId, order: LookupOrder) -> Result<Paste, PasteError> {
        let key = id.to_string();
        let found = self
            .run(move |b| {
                for ns in order.namespaces() {
                    if let Some(content) = b.get(ns, &key)? {
                        return Ok(Some((ns, content)));
                    }
                }
                Ok(b.get(Namespace::Files, &key)?.map(|blob| (Namespace::Files, blob)))
            })
            .await?;

        match found {
            Some((Namespace::Files, blob)) => match self.files.open(&blob).await? {
                Some((file, len)) => Ok(Paste::Attachment {
                    id: id.to_string(),
                    filename: FileStore::original_name(id.as_str(), &blob).to_string(),
                    file,
                    len,
                }),
                None => {
                    tracing::warn!(id = %id, blob = %blob, "File paste indexed but blob missing");
                    Err(PasteError::NotFound(id.to_string()))
                }
            },
            Some((namespace, content)) => Ok(Paste::Text {
                id: id.to_string(),
                content,
                namespace,
            }),
            None => Err(PasteError::NotFound(id.to_string())),
        }
    }

    /// Every public text paste as `(id, content)`.
    pub async fn list_public(&self) -> Result<Vec<(String, String)>, PasteError> {
        Ok(self.run(|b| b.list(Namespace::Public)).await?)
    }

    /// Stores under a freshly generated id. Never conflicts.
    pub async fn create(
        &self,
        visibility: Visibility,
        content: PasteContent,
    ) -> Result<PasteId, PasteError> {
        let id = PasteId::generate();
        self.store(&id, visibility, Vec::new(), content).await?;
        Ok(id)
    }

    /// Stores under a caller-chosen id, failing with `Conflict` if the id is
    /// already taken within `scope`.
    pub async fn create_with_id(
        &self,
        id: PasteId,
        visibility: Visibility,
        scope: CollisionScope,
        content: PasteContent,
    ) -> Result<PasteId, PasteError> {
        let inserted = self
            .store(&id, visibility, scope.guard(visibility), content)
            .await?;
        if !inserted {
            return Err(PasteError::Conflict(scope.conflict_message().to_string()));
        }
        Ok(id)
    }

    async fn store(
        &self,
        id: &PasteId,
        visibility: Visibility,
        guard: Vec<Namespace>,
        content: PasteContent,
    ) -> Result<bool, PasteError> {
        self.check_size(&content)?;
        let kind = content.kind();
        let key = id.to_string();

        let inserted = match content {
            PasteContent::Text(text) => {
                let target = Namespace::from(visibility);
                self.run(move |b| b.insert_guarded(target, &guard, &key, &text))
                    .await?
                    .is_inserted()
            }
            PasteContent::File { name, data } => self.store_file(key, guard, name, data).await?,
        };

        if inserted {
            crate::metrics::PASTES_CREATED.with_label_values(&[kind]).inc();
            tracing::info!(id = %id, kind = kind, visibility = ?visibility, "Paste created");
        }
        Ok(inserted)
    }

    /// Blob names are `<id>-<name>` and ids may contain `-`, so two pastes can
    /// map to the same file. A blob is only ever created fresh, unless it
    /// already belongs to this very id.
    async fn store_file(
        &self,
        key: String,
        guard: Vec<Namespace>,
        name: String,
        data: Bytes,
    ) -> Result<bool, PasteError> {
        let blob = FileStore::blob_name(&key, &name);

        let fresh = self.files.create(&blob, &data).await?;
        if !fresh {
            let owner_key = key.clone();
            let current = self
                .run(move |b| b.get(Namespace::Files, &owner_key))
                .await?;
            if current.as_deref() != Some(blob.as_str()) {
                return Err(PasteError::Conflict(BLOB_TAKEN.to_string()));
            }
        }

        let index_blob = blob.clone();
        let outcome = self
            .run(move |b| b.insert_guarded(Namespace::Files, &guard, &key, &index_blob))
            .await?;

        match outcome {
            GuardedInsert::Blocked => {
                if fresh {
                    self.files.remove(&blob).await?;
                }
                Ok(false)
            }
            GuardedInsert::Inserted { previous } => {
                if !fresh {
                    self.files.write(&blob, &data).await?;
                }
                // The file index is not part of the id check, so an upload can
                // replace another file paste under the same id.
                if let Some(previous) = previous.filter(|p| *p != blob) {
                    self.files.remove(&previous).await?;
                }
                Ok(true)
            }
        }
    }

    /// Rewrites an existing paste in place.
    ///
    /// Text must already live in the public or private store and keeps its
    /// visibility. File bodies require the id to already be a file paste; the
    /// new blob replaces the old one.
    pub async fn update(&self, id: &PasteId, content: PasteContent) -> Result<PasteId, PasteError> {
        self.check_size(&content)?;
        let key = id.to_string();

        match content {
            PasteContent::Text(text) => {
                let written = self
                    .run(move |b| b.update_existing(&Namespace::TEXT, &key, &text))
                    .await?;
                match written {
                    Some(ns) => {
                        tracing::info!(id = %id, namespace = %ns, "Paste updated");
                        Ok(id.clone())
                    }
                    None => Err(PasteError::NotFound(id.to_string())),
                }
            }
            PasteContent::File { name, data } => {
                let blob = FileStore::blob_name(&key, &name);

                let lookup_key = key.clone();
                let previous = self
                    .run(move |b| b.get(Namespace::Files, &lookup_key))
                    .await?;
                let Some(previous) = previous else {
                    return Err(PasteError::NotFound(id.to_string()));
                };

                let in_place = previous == blob;
                if in_place {
                    self.files.write(&blob, &data).await?;
                } else if !self.files.create(&blob, &data).await? {
                    return Err(PasteError::Conflict(BLOB_TAKEN.to_string()));
                }

                let index_blob = blob.clone();
                let written = self
                    .run(move |b| b.update_existing(&[Namespace::Files], &key, &index_blob))
                    .await?;
                if written.is_none() {
                    // Deleted between the lookup and the write.
                    self.files.remove(&blob).await?;
                    return Err(PasteError::NotFound(id.to_string()));
                }

                if !in_place {
                    self.files.remove(&previous).await?;
                }
                tracing::info!(id = %id, blob = %blob, "File paste updated");
                Ok(id.clone())
            }
        }
    }

    /// Removes `id` from every store it appears in, including its blob.
    pub async fn delete(&self, id: &PasteId) -> Result<(), PasteError> {
        let key = id.to_string();
        let removed = self
            .run(move |b| {
                let mut removed = Vec::new();
                for ns in Namespace::ALL {
                    if let Some(value) = b.remove(ns, &key)? {
                        removed.push((ns, value));
                    }
                }
                Ok(removed)
            })
            .await?;

        if removed.is_empty() {
            return Err(PasteError::NotFound(id.to_string()));
        }

        for (ns, value) in &removed {
            if *ns == Namespace::Files {
                self.files.remove(value).await?;
            }
        }

        tracing::info!(id = %id, stores = removed.len(), "Paste deleted");
        Ok(())
    }
}
