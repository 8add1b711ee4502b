//! Ordered-candidate field resolution over untyped feed entries.
//!
//! Feeds publish the same datum under different names and casings. Each
//! resolver takes a list of candidate paths, tries them in order, and returns
//! the first one that yields a usable value. Paths may be dotted
//! (`"prices.E5"`) to reach into nested objects.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Day-first forms used by the UK open-data feeds, then ISO-like forms
/// without an offset. All are read as UTC.
const NAIVE_TIMESTAMP_FORMATS: [&str; 5] = [
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Epoch values above this are taken as milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Walk a dotted path through nested objects.
#[must_use]
pub fn value_at_path<'a>(entry: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(entry, |value, key| value.get(key))
}

/// Numeric coercion: JSON numbers as-is, numeric strings parsed after
/// trimming. Non-finite results are rejected.
#[must_use]
pub fn value_as_f64(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|raw| raw.trim().parse::<f64>().ok()))
        .filter(|n| n.is_finite())
}

/// First candidate that parses to a finite number.
#[must_use]
pub fn try_fields(entry: &Value, candidates: &[&str]) -> Option<f64> {
    candidates
        .iter()
        .find_map(|path| value_at_path(entry, path).and_then(value_as_f64))
}

/// First candidate holding a non-blank string (trimmed) or a number
/// (rendered as text).
#[must_use]
pub fn try_string(entry: &Value, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|path| {
        let value = value_at_path(entry, path)?;
        match value {
            Value::String(s) => Some(s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    })
}

/// First candidate that parses as a timestamp.
#[must_use]
pub fn try_timestamp(entry: &Value, candidates: &[&str]) -> Option<DateTime<Utc>> {
    candidates
        .iter()
        .find_map(|path| value_at_path(entry, path).and_then(parse_timestamp))
}

/// Accepts RFC 3339, the naive forms in [`NAIVE_TIMESTAMP_FORMATS`], and
/// Unix epoch seconds or milliseconds.
#[must_use]
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(raw) => parse_timestamp_str(raw.trim()),
        Value::Number(n) => {
            let epoch = n.as_i64()?;
            if epoch.unsigned_abs() >= EPOCH_MILLIS_THRESHOLD.unsigned_abs() {
                Utc.timestamp_millis_opt(epoch).single()
            } else {
                Utc.timestamp_opt(epoch, 0).single()
            }
        }
        _ => None,
    }
}

fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NAIVE_TIMESTAMP_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(raw, format)
            .ok()
            .map(|naive| naive.and_utc())
    })
}
