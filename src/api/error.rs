use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::generate::GenerateError;
use crate::paste::PasteError;
use crate::secrets::SecretError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    /// Id collision on create. Reported as 400 like other client errors.
    #[error("{0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] crate::storage::StorageError),

    #[error("Internal server error")]
    InternalServerError,
}

impl ApiError {
    /// Maps an axum body/multipart rejection, keeping 413 distinct.
    pub fn from_rejection(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(message)
        } else {
            ApiError::InvalidRequest(message)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PasteError> for ApiError {
    fn from(err: PasteError) -> Self {
        match err {
            PasteError::NotFound(_) => ApiError::NotFound(err.to_string()),
            PasteError::Conflict(message) => ApiError::Conflict(message),
            PasteError::InvalidId(_) | PasteError::AttachmentsUnsupported => {
                ApiError::InvalidRequest(err.to_string())
            }
            PasteError::TooLarge { .. } => ApiError::PayloadTooLarge(err.to_string()),
            PasteError::Storage(e) => ApiError::StorageError(e),
        }
    }
}

impl From<SecretError> for ApiError {
    fn from(err: SecretError) -> Self {
        match err {
            SecretError::TooLarge { .. } => ApiError::PayloadTooLarge(err.to_string()),
            SecretError::Io(e) => {
                tracing::error!("Failed to write secret: {}", e);
                ApiError::InternalServerError
            }
        }
    }
}

impl From<GenerateError> for ApiError {
    fn from(err: GenerateError) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}
