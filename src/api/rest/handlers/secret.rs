use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::rest::extract::{ApiQuery, SecretBody};
use crate::api::rest::types::{InvalidateParams, MessageResponse};
use crate::api::state::AppState;
use crate::secrets::SecretError;

const QUEUED: &str = "Secret queued for invalidation";

fn check_len(secret: &str, limit: usize) -> Result<(), ApiError> {
    if secret.len() > limit {
        return Err(SecretError::TooLarge {
            limit,
            actual: secret.len(),
        }
        .into());
    }
    Ok(())
}

async fn queue(state: &AppState, secret: &str) -> Result<Json<MessageResponse>, ApiError> {
    state.invalidator.submit(secret).await?;
    Ok(Json(MessageResponse {
        message: QUEUED.to_string(),
    }))
}

pub async fn invalidate_query(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<InvalidateParams>,
) -> Result<Json<MessageResponse>, ApiError> {
    check_len(&params.secret, state.secret_limits.max_query_bytes)?;
    queue(&state, &params.secret).await
}

pub async fn invalidate_body(
    State(state): State<AppState>,
    SecretBody(secret): SecretBody,
) -> Result<Json<MessageResponse>, ApiError> {
    check_len(&secret, state.secret_limits.max_body_bytes)?;
    queue(&state, &secret).await
}
