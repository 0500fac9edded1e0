pub mod backend;
pub mod error;
pub mod files;
pub mod memory;
pub mod persistent;
pub mod types;

use std::sync::Arc;

pub use backend::{GuardedInsert, PasteBackend};
pub use error::StorageError;
pub use files::FileStore;
pub use memory::MemoryBackend;
pub use persistent::RedbBackend;
pub use types::{BackendKind, Namespace, StorageConfig, Visibility};

/// Opens the backend selected by `config.backend`.
pub fn open_backend(config: &StorageConfig) -> Result<Arc<dyn PasteBackend>, StorageError> {
    let backend: Arc<dyn PasteBackend> = match config.backend {
        BackendKind::Redb => Arc::new(RedbBackend::open(config.db_path())?),
        BackendKind::Memory => Arc::new(MemoryBackend::new()),
    };
    tracing::info!(backend = ?config.backend, "Paste backend ready");
    Ok(backend)
}
