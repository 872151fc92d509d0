//! Scalar canonicalization applied before field comparison.
//!
//! Two independent steps:
//! - [`normalize_scalar`]: field-name-driven canonicalization (monetary
//!   fields to numbers, date fields to ISO-8601 strings). Fail-soft: any
//!   value that cannot be canonicalized is returned unchanged, never an error.
//! - [`coerce_number_string`]: opt-in coercion of numeric strings so that
//!   `"5"` and `5` compare equal without collapsing `"5.0"` into `5`.

use crate::diff::model::DiffOptions;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

/// Canonicalize a single field value for comparison purposes.
///
/// - null values pass through unchanged (null/absent equivalence is decided
///   by the comparator, not here)
/// - monetary fields: string or number input is converted to a number
/// - date fields: parseable input is converted to an ISO-8601 string
/// - all other fields pass through unchanged
pub fn normalize_scalar(field: &str, value: &Value, opts: &DiffOptions) -> Value {
    if value.is_null() {
        return value.clone();
    }
    if opts.money_fields.contains(field) {
        if let Some(n) = to_number(value) {
            return n;
        }
        return value.clone();
    }
    if opts.date_fields.contains(field) {
        if let Some(iso) = to_iso8601(value) {
            return Value::String(iso);
        }
        return value.clone();
    }
    value.clone()
}

/// Coerce a numeric string to its number form when the round-trip string
/// representation matches the input exactly.
///
/// `"5"` becomes `5`, but `"5.0"` stays a string because its round-trip
/// representation is `"5"`. Numbers are re-expressed through the same
/// round-trip so that `5` and `5.0` land on one canonical form.
pub fn coerce_number_string(value: &Value, enabled: bool) -> Value {
    if !enabled {
        return value.clone();
    }
    match value {
        Value::String(s) => match round_trip(s) {
            Some(n) => n,
            None => value.clone(),
        },
        Value::Number(n) => match round_trip(&n.to_string()) {
            Some(v) => v,
            None => value.clone(),
        },
        _ => value.clone(),
    }
}

/// Parse `text` as f64 and return its numeric form iff formatting the parse
/// result reproduces `text` exactly.
fn round_trip(text: &str) -> Option<Value> {
    let parsed: f64 = text.parse().ok()?;
    if !parsed.is_finite() || parsed.to_string() != text {
        return None;
    }
    serde_json::Number::from_f64(parsed).map(Value::Number)
}

/// Convert a string or number to a JSON number, if possible.
fn to_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => {
            let f = n.as_f64()?;
            serde_json::Number::from_f64(f).map(Value::Number)
        }
        Value::String(s) => {
            let f: f64 = s.trim().parse().ok()?;
            if !f.is_finite() {
                return None;
            }
            serde_json::Number::from_f64(f).map(Value::Number)
        }
        _ => None,
    }
}

/// Convert a date-like value to a canonical ISO-8601 (RFC 3339) string.
///
/// Accepts RFC 3339 strings, bare dates (`YYYY-MM-DD`), the common
/// `YYYY-MM-DD HH:MM:SS` form, and integer epoch milliseconds.
fn to_iso8601(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(render(dt.with_timezone(&Utc)));
            }
            if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(render(Utc.from_utc_datetime(&ndt)));
            }
            if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                let ndt = d.and_hms_opt(0, 0, 0)?;
                return Some(render(Utc.from_utc_datetime(&ndt)));
            }
            None
        }
        Value::Number(n) => {
            let millis = n.as_i64()?;
            Utc.timestamp_millis_opt(millis).single().map(render)
        }
        _ => None,
    }
}

fn render(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
