//! Random value generation. Every function here is pure apart from the RNG.

use base64::Engine;
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use rand::{Rng, RngCore};
use serde::Deserialize;
use std::fmt::Write;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_BULK_AMOUNT: usize = 50;
pub const DEFAULT_STRING_LENGTH: usize = 10;
pub const DEFAULT_BYTES_LENGTH: usize = 16;
pub const DEFAULT_MIN: i64 = 0;
pub const DEFAULT_MAX: i64 = 1_000_000;
pub const DEFAULT_START_DATE: &str = "1970-01-01";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("amount {requested} exceeds the maximum of {max}")]
    AmountTooLarge { requested: usize, max: usize },

    #[error("requested {requested} bytes, the limit is {max}")]
    TooManyBytes { requested: usize, max: usize },

    #[error("min ({min}) must not be greater than max ({max})")]
    InvalidRange { min: i64, max: i64 },

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateConfig {
    #[serde(default = "default_max_amount")]
    pub max_amount: usize,
    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: usize,
    #[serde(default = "default_max_bulk_item_bytes")]
    pub max_bulk_item_bytes: usize,
}

fn default_max_amount() -> usize {
    1_000_000
}

fn default_max_total_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_max_bulk_item_bytes() -> usize {
    1024 * 1024
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            max_amount: default_max_amount(),
            max_total_bytes: default_max_total_bytes(),
            max_bulk_item_bytes: default_max_bulk_item_bytes(),
        }
    }
}

impl GenerateConfig {
    pub fn check_amount(&self, amount: usize) -> Result<usize, GenerateError> {
        if amount > self.max_amount {
            return Err(GenerateError::AmountTooLarge {
                requested: amount,
                max: self.max_amount,
            });
        }
        Ok(amount)
    }
}

/// Text encoding of a generated UUID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UuidEncoding {
    /// Canonical hyphenated form.
    #[default]
    Hex,
    Base64,
    /// URL-safe base64 without padding.
    Url,
}

impl UuidEncoding {
    pub fn encode(self, uuid: &Uuid) -> String {
        match self {
            UuidEncoding::Hex => uuid.hyphenated().to_string(),
            UuidEncoding::Base64 => base64::engine::general_purpose::STANDARD.encode(uuid.as_bytes()),
            UuidEncoding::Url => base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(uuid.as_bytes()),
        }
    }
}

pub fn uuid_v4() -> String {
    Uuid::new_v4().to_string()
}

/// UUIDv7, optionally pinned to `timestamp` instead of the current time.
pub fn uuid_v7(encoding: UuidEncoding, timestamp: Option<DateTime<Utc>>) -> String {
    let uuid = match timestamp {
        Some(ts) => {
            let secs = ts.timestamp().max(0) as u64;
            let ts = uuid::Timestamp::from_unix(uuid::NoContext, secs, ts.timestamp_subsec_nanos());
            Uuid::new_v7(ts)
        }
        None => Uuid::now_v7(),
    };
    encoding.encode(&uuid)
}

/// UUIDv5 of `name` in `namespace`, which is `dns`, `url`, `oid`, `x500` or
/// a UUID literal.
pub fn uuid_v5(namespace: &str, name: &str) -> Result<String, GenerateError> {
    let ns = match namespace.to_ascii_lowercase().as_str() {
        "dns" => Uuid::NAMESPACE_DNS,
        "url" => Uuid::NAMESPACE_URL,
        "oid" => Uuid::NAMESPACE_OID,
        "x500" => Uuid::NAMESPACE_X500,
        other => Uuid::parse_str(other)
            .map_err(|_| GenerateError::InvalidNamespace(namespace.to_string()))?,
    };
    Ok(Uuid::new_v5(&ns, name.as_bytes()).to_string())
}

/// Epoch milliseconds or an ISO-8601 date/datetime.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, GenerateError> {
    if let Ok(millis) = raw.trim().parse::<i64>() {
        return Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| GenerateError::InvalidTimestamp(raw.to_string()));
    }
    parse_date(raw).map_err(|_| GenerateError::InvalidTimestamp(raw.to_string()))
}

pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, GenerateError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(GenerateError::InvalidDate(raw.to_string()))
}

/// Uniform integer in `min..=max`.
pub fn number(rng: &mut impl Rng, min: i64, max: i64) -> Result<i64, GenerateError> {
    if min > max {
        return Err(GenerateError::InvalidRange { min, max });
    }
    Ok(rng.gen_range(min..=max))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Charset {
    #[default]
    Alphanumeric,
    Alphabetic,
    Numeric,
    Hex,
    Base64,
}

impl Charset {
    pub fn chars(self) -> &'static [u8] {
        match self {
            Charset::Alphanumeric => b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789",
            Charset::Alphabetic => b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz",
            Charset::Numeric => b"0123456789",
            Charset::Hex => b"0123456789abcdef",
            Charset::Base64 => b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/",
        }
    }
}

pub fn string(rng: &mut impl Rng, length: usize, charset: Charset) -> String {
    let chars = charset.chars();
    (0..length)
        .map(|_| chars[rng.gen_range(0..chars.len())] as char)
        .collect()
}

pub fn boolean(rng: &mut impl Rng) -> bool {
    rng.gen_bool(0.5)
}

/// Uniform instant in `[start, end]`, formatted as RFC 3339 with milliseconds.
pub fn date(rng: &mut impl Rng, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<String, GenerateError> {
    let (lo, hi) = (start.timestamp_millis(), end.timestamp_millis());
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let millis = rng.gen_range(lo..=hi);
    let picked = Utc
        .timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| GenerateError::InvalidDate(millis.to_string()))?;
    Ok(picked.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFormat {
    #[default]
    Hex,
    Rgb,
    Rgba,
}

pub fn color(rng: &mut impl Rng, format: ColorFormat) -> String {
    let (r, g, b): (u8, u8, u8) = (rng.gen(), rng.gen(), rng.gen());
    match format {
        ColorFormat::Hex => format!("#{:02x}{:02x}{:02x}", r, g, b),
        ColorFormat::Rgb => format!("rgb({}, {}, {})", r, g, b),
        ColorFormat::Rgba => format!("rgba({}, {}, {}, {:.2})", r, g, b, rng.gen::<f64>()),
    }
}

/// `length` random bytes, hex encoded.
pub fn bytes_hex(rng: &mut impl RngCore, length: usize) -> String {
    let mut buf = vec![0u8; length];
    rng.fill_bytes(&mut buf);
    let mut out = String::with_capacity(length * 2);
    for byte in buf {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_uuid_v7_encodings() {
        assert_eq!(uuid_v7(UuidEncoding::Hex, None).len(), 36);
        assert_eq!(uuid_v7(UuidEncoding::Base64, None).len(), 24);
        let url = uuid_v7(UuidEncoding::Url, None);
        assert_eq!(url.len(), 22);
        assert!(!url.contains('+') && !url.contains('/'));
    }

    #[test]
    fn test_uuid_v7_with_timestamp_embeds_millis() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let id = Uuid::parse_str(&uuid_v7(UuidEncoding::Hex, Some(ts))).unwrap();
        assert_eq!(id.get_version_num(), 7);
        let (secs, nanos) = id.get_timestamp().unwrap().to_unix();
        assert_eq!(secs, 1_700_000_000);
        assert_eq!(nanos / 1_000_000, 123);
    }

    #[test]
    fn test_uuid_v5_is_deterministic() {
        let a = uuid_v5("dns", "example.com").unwrap();
        assert_eq!(a, "cfbff0d1-9375-5685-968c-48ce8b15ae17");
        assert_eq!(uuid_v5("DNS", "example.com").unwrap(), a);
        let custom = uuid_v5("6ba7b810-9dad-11d1-80b4-00c04fd430c8", "example.com").unwrap();
        assert_eq!(custom, a);
        assert!(uuid_v5("not-a-namespace", "x").is_err());
    }

    #[test]
    fn test_number_range() {
        let mut rng = rng();
        for _ in 0..1000 {
            let n = number(&mut rng, -5, 5).unwrap();
            assert!((-5..=5).contains(&n));
        }
        assert_eq!(number(&mut rng, 3, 3).unwrap(), 3);
        assert!(number(&mut rng, 2, 1).is_err());
    }

    #[test]
    fn test_string_charset() {
        let mut rng = rng();
        let s = string(&mut rng, 64, Charset::Hex);
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(string(&mut rng, 0, Charset::Numeric).is_empty());
    }

    #[test]
    fn test_date_within_bounds() {
        let mut rng = rng();
        let start = parse_date("2020-01-01").unwrap();
        let end = parse_date("2020-01-02T00:00:00Z").unwrap();
        for _ in 0..100 {
            let picked = parse_date(&date(&mut rng, start, end).unwrap()).unwrap();
            assert!(picked >= start && picked <= end);
        }
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_parse_timestamp_accepts_millis_and_iso() {
        assert_eq!(parse_timestamp("0").unwrap().timestamp(), 0);
        assert_eq!(parse_timestamp("1970-01-02").unwrap().timestamp(), 86_400);
        assert!(parse_timestamp("soon").is_err());
    }

    #[test]
    fn test_color_formats() {
        let mut rng = rng();
        let hex = color(&mut rng, ColorFormat::Hex);
        assert_eq!(hex.len(), 7);
        assert!(hex.starts_with('#'));
        assert!(color(&mut rng, ColorFormat::Rgb).starts_with("rgb("));
        assert!(color(&mut rng, ColorFormat::Rgba).starts_with("rgba("));
    }

    #[test]
    fn test_bytes_hex_length() {
        let mut rng = rng();
        let out = bytes_hex(&mut rng, 16);
        assert_eq!(out.len(), 32);
        assert!(out.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_amount_cap() {
        let config = GenerateConfig::default();
        assert!(config.check_amount(1_000_000).is_ok());
        assert!(matches!(
            config.check_amount(1_000_001),
            Err(GenerateError::AmountTooLarge { .. })
        ));
    }
}
