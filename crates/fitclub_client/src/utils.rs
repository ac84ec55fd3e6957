//! Tolerant parsing helpers for upstream payload fields.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Parse a reservation instant. The upstream sends RFC 3339 datetimes for
/// most clubs but naive `YYYY-MM-DDTHH:MM:SS` for some; naive values are
/// taken as UTC.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(ndt.and_utc());
    }
    None
}

/// Identifier fields arrive as either JSON strings or numbers depending on
/// the endpoint; accept both.
pub fn value_as_id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
