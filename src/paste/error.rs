use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum PasteError {
    #[error("Paste not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid paste id: {0}")]
    InvalidId(String),

    #[error("Paste too large: {actual} bytes exceeds the {limit} byte limit")]
    TooLarge { limit: usize, actual: usize },

    #[error("File pastes are not supported by the volatile backend")]
    AttachmentsUnsupported,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
