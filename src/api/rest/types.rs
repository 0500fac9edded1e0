use serde::{Deserialize, Serialize};

use crate::generate::{Charset, ColorFormat, UuidEncoding};

#[derive(Serialize)]
pub struct IdResponse {
    pub id: String,
}

#[derive(Serialize)]
pub struct PasteResponse {
    pub id: String,
    pub content: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct IpResponse {
    pub ip: Option<String>,
}

/// JSON paste body: a bare string or `{"content": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum JsonPaste {
    Plain(String),
    Wrapped { content: String },
}

impl JsonPaste {
    pub fn into_text(self) -> String {
        match self {
            JsonPaste::Plain(text) | JsonPaste::Wrapped { content: text } => text,
        }
    }
}

/// JSON secret body: a bare string or `{"secret": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum JsonSecret {
    Plain(String),
    Wrapped { secret: String },
}

impl JsonSecret {
    pub fn into_text(self) -> String {
        match self {
            JsonSecret::Plain(text) | JsonSecret::Wrapped { secret: text } => text,
        }
    }
}

#[derive(Deserialize)]
pub struct InvalidateParams {
    pub secret: String,
}

/// `timestamp` arrives as epoch millis in JSON, and always as text in a query.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum TimestampParam {
    Millis(i64),
    Text(String),
}

#[derive(Deserialize, Default)]
pub struct UuidV7Params {
    pub amount: Option<usize>,
    pub encoding: Option<UuidEncoding>,
    pub timestamp: Option<TimestampParam>,
}

#[derive(Deserialize)]
pub struct UuidV5Params {
    pub namespace: String,
    pub name: String,
}

#[derive(Deserialize)]
pub struct AmountParams {
    pub amount: Option<usize>,
}

#[derive(Deserialize)]
pub struct NumberParams {
    pub amount: Option<usize>,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

#[derive(Deserialize)]
pub struct StringParams {
    pub amount: Option<usize>,
    pub length: Option<usize>,
    pub charset: Option<Charset>,
}

#[derive(Deserialize)]
pub struct DateParams {
    pub amount: Option<usize>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Deserialize)]
pub struct ColorParams {
    pub amount: Option<usize>,
    pub format: Option<ColorFormat>,
}

#[derive(Deserialize)]
pub struct BytesParams {
    pub amount: Option<usize>,
    pub length: Option<usize>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
