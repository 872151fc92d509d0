//! Binary file payload comparison by content digest.
//!
//! File payloads appear inside records and collections as objects of the
//! shape `{"bytes": "<base64>", "name"?: ..., "mime"?: ...}`, the decoded
//! form the upload layer hands over. A previously persisted file field may
//! instead be an encoded string of the form `data:<mime>;base64,<payload>`.
//!
//! Equality is exact byte equality, decided by comparing SHA-256 digests.
//! Digests are memoized in a [`DigestCache`] owned by one reconciliation
//! session and passed through the call stack, so repeated payloads (e.g.
//! duplicate detection across a collection) hash once. The cache is never
//! process-wide state.

use crate::errors::{DiffError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Marker that separates the encoding prefix from the payload in an encoded
/// file string.
const BASE64_MARKER: &str = "base64,";

/// True if the value is a file payload object.
pub fn is_file_payload(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|o| o.get("bytes"))
        .map(Value::is_string)
        .unwrap_or(false)
}

/// True if the value is an encoded file string (`data:<mime>;base64,...`).
pub fn is_encoded_file_string(value: &Value) -> bool {
    value
        .as_str()
        .map(|s| s.starts_with("data:") && s.contains(BASE64_MARKER))
        .unwrap_or(false)
}

/// Per-session memoization of content digests, keyed by base64 payload text.
#[derive(Debug, Default)]
pub struct DigestCache {
    by_content: HashMap<String, String>,
}

impl DigestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hex-encoded SHA-256 digest of the decoded payload bytes.
    ///
    /// # Errors
    ///
    /// - `InvalidPayload` — the base64 text cannot be decoded
    pub fn digest_b64(&mut self, b64: &str) -> Result<String> {
        if let Some(d) = self.by_content.get(b64) {
            return Ok(d.clone());
        }
        let bytes = STANDARD.decode(b64).map_err(|e| DiffError::InvalidPayload {
            detail: format!("base64 decode failed: {}", e),
        })?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());
        self.by_content.insert(b64.to_string(), digest.clone());
        Ok(digest)
    }

    /// Content digest of a file payload object.
    ///
    /// # Errors
    ///
    /// - `NotAFilePayload` — the value is not a file payload object
    /// - `InvalidPayload` — the payload content cannot be decoded
    pub fn digest_of(&mut self, payload: &Value) -> Result<String> {
        let b64 = payload_content(payload)?;
        self.digest_b64(b64)
    }
}

/// Extract the base64 content of a file payload object.
fn payload_content(payload: &Value) -> Result<&str> {
    payload
        .as_object()
        .and_then(|o| o.get("bytes"))
        .and_then(Value::as_str)
        .ok_or_else(|| DiffError::NotAFilePayload {
            detail: format!("expected a file payload object, got: {}", shape_of(payload)),
        })
}

/// Compare two file payloads by content digest.
pub fn files_equal(a: &Value, b: &Value, cache: &mut DigestCache) -> Result<bool> {
    Ok(cache.digest_of(a)? == cache.digest_of(b)?)
}

/// Compare an encoded file string against a live file payload.
///
/// The encoding prefix (`data:<mime>;base64,`) is stripped and the remaining
/// payload text is compared to the live payload by content digest, so padding
/// or re-encoding variations do not produce false differences.
pub fn encoded_matches_payload(
    encoded: &str,
    payload: &Value,
    cache: &mut DigestCache,
) -> Result<bool> {
    let stripped = match encoded.find(BASE64_MARKER) {
        Some(idx) => &encoded[idx + BASE64_MARKER.len()..],
        None => encoded,
    };
    Ok(cache.digest_b64(stripped)? == cache.digest_of(payload)?)
}

/// Short human description of a value's shape, for error messages.
fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
