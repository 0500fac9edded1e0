use std::fmt;

use super::error::PasteError;

pub const MAX_ID_LEN: usize = 128;
/// Ids addressed by update and delete must be at least this long.
pub const MIN_MUTABLE_ID_LEN: usize = 32;

/// A validated paste id: `^[a-zA-Z0-9-]+$`, at most 128 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PasteId(String);

impl PasteId {
    pub fn parse(raw: &str) -> Result<Self, PasteError> {
        if raw.is_empty() {
            return Err(PasteError::InvalidId("id must not be empty".to_string()));
        }
        if raw.len() > MAX_ID_LEN {
            return Err(PasteError::InvalidId(format!(
                "id must be at most {} characters",
                MAX_ID_LEN
            )));
        }
        if !raw.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(PasteError::InvalidId(
                "id may only contain letters, digits and '-'".to_string(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    /// Like [`PasteId::parse`], plus the minimum length required for PUT/DELETE.
    pub fn parse_mutable(raw: &str) -> Result<Self, PasteError> {
        let id = Self::parse(raw)?;
        if id.0.len() < MIN_MUTABLE_ID_LEN {
            return Err(PasteError::InvalidId(format!(
                "id must be at least {} characters",
                MIN_MUTABLE_ID_LEN
            )));
        }
        Ok(id)
    }

    /// Fresh random (v4) id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PasteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PasteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
