use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::collections::BTreeMap;
use tokio_util::io::ReaderStream;

use crate::api::error::ApiError;
use crate::api::rest::extract::PasteBody;
use crate::api::rest::types::{IdResponse, PasteResponse, SuccessResponse};
use crate::api::state::AppState;
use crate::paste::{CollisionScope, LookupOrder, Paste, PasteId};
use crate::storage::Visibility;

/// Quoted-string safe filename for `Content-Disposition`.
fn disposition_name(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim().is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

fn render(paste: Paste) -> Response {
    match paste {
        Paste::Text { id, content, .. } => Json(PasteResponse { id, content }).into_response(),
        Paste::Attachment {
            filename, file, len, ..
        } => {
            let body = Body::from_stream(ReaderStream::new(file));
            (
                [
                    (CONTENT_TYPE, "application/octet-stream".to_string()),
                    (CONTENT_LENGTH, len.to_string()),
                    (
                        CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", disposition_name(&filename)),
                    ),
                ],
                body,
            )
                .into_response()
        }
    }
}

pub async fn list_public(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    let pastes = state.pastes.list_public().await?;
    Ok(Json(pastes.into_iter().collect()))
}

pub async fn get_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = PasteId::parse(&id)?;
    let paste = state.pastes.get(&id, LookupOrder::PrivateFirst).await?;
    Ok(render(paste))
}

pub async fn get_public_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = PasteId::parse(&id)?;
    let paste = state.pastes.get(&id, LookupOrder::PublicFirst).await?;
    Ok(render(paste))
}

pub async fn create_private(
    State(state): State<AppState>,
    PasteBody(content): PasteBody,
) -> Result<Json<IdResponse>, ApiError> {
    let id = state.pastes.create(Visibility::Private, content).await?;
    Ok(Json(IdResponse { id: id.into_string() }))
}

pub async fn create_public(
    State(state): State<AppState>,
    PasteBody(content): PasteBody,
) -> Result<Json<IdResponse>, ApiError> {
    let id = state.pastes.create(Visibility::Public, content).await?;
    Ok(Json(IdResponse { id: id.into_string() }))
}

/// `POST /paste/:id` rejects ids taken in either visibility store.
pub async fn create_with_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PasteBody(content): PasteBody,
) -> Result<Json<IdResponse>, ApiError> {
    let id = PasteId::parse(&id)?;
    let id = state
        .pastes
        .create_with_id(id, Visibility::Public, CollisionScope::AnyVisibility, content)
        .await?;
    Ok(Json(IdResponse { id: id.into_string() }))
}

/// `POST /paste/public/:id` only checks the public store.
pub async fn create_public_with_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PasteBody(content): PasteBody,
) -> Result<Json<IdResponse>, ApiError> {
    let id = PasteId::parse(&id)?;
    let id = state
        .pastes
        .create_with_id(id, Visibility::Public, CollisionScope::SameVisibility, content)
        .await?;
    Ok(Json(IdResponse { id: id.into_string() }))
}

pub async fn update_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PasteBody(content): PasteBody,
) -> Result<Json<IdResponse>, ApiError> {
    let id = PasteId::parse_mutable(&id)?;
    let id = state.pastes.update(&id, content).await?;
    Ok(Json(IdResponse { id: id.into_string() }))
}

pub async fn delete_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = PasteId::parse_mutable(&id)?;
    state.pastes.delete(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposition_name_strips_quotes_and_non_ascii() {
        assert_eq!(disposition_name("report.pdf"), "report.pdf");
        assert_eq!(disposition_name("a\"b.txt"), "a_b.txt");
        assert_eq!(disposition_name("résumé.doc"), "r_sum_.doc");
        assert_eq!(disposition_name("   "), "file");
    }
}
