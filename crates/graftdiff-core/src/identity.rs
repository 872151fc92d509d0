//! Identity extraction for record matching across snapshots.

use serde_json::Value;

/// Resolve the stable identity of a value, if it has one.
///
/// A value carries an identity iff it is an object whose `id` field is
/// present and non-null. The identity is the string form of that field.
/// Two values are the same logical record iff both resolve to identities
/// that are string-equal.
pub fn identity_of(value: &Value) -> Option<String> {
    let obj = value.as_object()?;
    match obj.get("id")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
