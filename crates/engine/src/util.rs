//! Internal helpers for validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! text normalization and date parsing so mapping rules stay consistent.

use chrono::{DateTime, NaiveDate, Utc};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Case and accent insensitive key: `"Événements "` and `"evenements"` compare equal.
///
/// Runs of punctuation and whitespace collapse into a single space.
pub(crate) fn normalize_key(input: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    out.trim_end().to_string()
}

pub(crate) fn require_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidValue(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Parses a calendar day stored either as `YYYY-MM-DD` or as a full RFC3339
/// timestamp (date columns serialized by the database driver).
pub(crate) fn parse_day(raw: &str, label: &str) -> ResultEngine<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(day);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|ts| ts.date_naive())
        .map_err(|_| EngineError::InvalidValue(format!("invalid {label}: {raw}")))
}

pub(crate) fn parse_timestamp(raw: &str) -> ResultEngine<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| EngineError::InvalidValue(format!("invalid timestamp: {raw}")))
}
