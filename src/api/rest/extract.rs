use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, FromRequest, FromRequestParts, Multipart, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::net::SocketAddr;

use crate::api::error::ApiError;
use crate::paste::PasteContent;

use super::types::{JsonPaste, JsonSecret};

fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn is_json(content_type: &str) -> bool {
    content_type.starts_with("application/json")
}

async fn read_text<S: Send + Sync>(req: Request, state: &S) -> Result<(String, bool), ApiError> {
    let json = is_json(&content_type(req.headers()));
    let bytes = Bytes::from_request(req, state)
        .await
        .map_err(|e| ApiError::from_rejection(e.status(), e.body_text()))?;
    let text = String::from_utf8(bytes.to_vec())
        .map_err(|_| ApiError::InvalidRequest("body is not valid UTF-8".to_string()))?;
    Ok((text, json))
}

/// Paste body: `text/plain` (or anything non-JSON), a JSON string,
/// `{"content": ...}`, or `multipart/form-data` with a `file` or `content` part.
pub struct PasteBody(pub PasteContent);

#[async_trait]
impl<S> FromRequest<S> for PasteBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if content_type(req.headers()).starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::from_rejection(e.status(), e.body_text()))?;

            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| ApiError::from_rejection(e.status(), e.body_text()))?
            {
                let name = field.name().map(str::to_owned);
                match name.as_deref() {
                    Some("file") => {
                        let name = field.file_name().unwrap_or("file").to_string();
                        let data = field
                            .bytes()
                            .await
                            .map_err(|e| ApiError::from_rejection(e.status(), e.body_text()))?;
                        return Ok(PasteBody(PasteContent::File { name, data }));
                    }
                    Some("content") => {
                        let text = field
                            .text()
                            .await
                            .map_err(|e| ApiError::from_rejection(e.status(), e.body_text()))?;
                        return Ok(PasteBody(PasteContent::Text(text)));
                    }
                    _ => continue,
                }
            }

            return Err(ApiError::InvalidRequest(
                "multipart body needs a `file` or `content` part".to_string(),
            ));
        }

        let (text, json) = read_text(req, state).await?;
        if json {
            let parsed: JsonPaste = serde_json::from_str(&text)
                .map_err(|e| ApiError::InvalidRequest(format!("invalid JSON paste: {}", e)))?;
            return Ok(PasteBody(PasteContent::Text(parsed.into_text())));
        }
        Ok(PasteBody(PasteContent::Text(text)))
    }
}

/// Secret body: plain text, a JSON string, or `{"secret": ...}`.
pub struct SecretBody(pub String);

#[async_trait]
impl<S> FromRequest<S> for SecretBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (text, json) = read_text(req, state).await?;
        if json {
            let parsed: JsonSecret = serde_json::from_str(&text)
                .map_err(|e| ApiError::InvalidRequest(format!("invalid JSON secret: {}", e)))?;
            return Ok(SecretBody(parsed.into_text()));
        }
        Ok(SecretBody(text))
    }
}

/// `Query` whose rejection renders as an [`ApiError`] body.
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
        Ok(ApiQuery(value))
    }
}

/// Headers consulted for the client address, in order of preference.
const IP_HEADERS: &[&str] = &[
    "x-real-ip",
    "x-client-ip",
    "cf-connecting-ip",
    "fly-client-ip",
    "true-client-ip",
    "x-forwarded-for",
];

/// Best-effort client address: proxy headers first, then the socket peer.
#[derive(Debug)]
pub struct ClientIp(pub Option<String>);

impl ClientIp {
    pub fn from_headers(headers: &HeaderMap) -> Option<String> {
        IP_HEADERS.iter().find_map(|name| {
            let value = headers.get(*name)?.to_str().ok()?;
            // x-forwarded-for is a list; the first hop is the client.
            let first = value.split(',').next()?.trim();
            (!first.is_empty()).then(|| first.to_string())
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = Self::from_headers(&parts.headers).or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip().to_string())
        });
        Ok(ClientIp(ip))
    }
}
