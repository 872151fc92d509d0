//! Record deep-diff computation.
//!
//! The core entry point is [`diff_records`], which compares two record
//! snapshots and produces a sparse [`Patch`] of changed fields. Update
//! use-cases call it as `diff_records(existing, merged, ..)` and skip the
//! persistence write when the patch is empty.

use crate::binary::{
    encoded_matches_payload, files_equal, is_encoded_file_string, is_file_payload, DigestCache,
};
use crate::diff::model::{DiffOptions, Patch};
use crate::errors::Result;
use crate::identity::identity_of;
use crate::normalize::{coerce_number_string, normalize_scalar};
use serde_json::Value;
use std::collections::BTreeSet;

/// Compute a sparse patch of the fields that differ between two records.
///
/// Field selection takes the union of both records' keys, restricted to
/// `opts.keys` when given, minus `opts.ignore`, always skipping `id`.
/// Patch values are the raw new value for leaf changes, or a nested patch
/// object for nested-object changes.
///
/// Non-object inputs degrade to a direct value comparison: the result is
/// `{"value": <new>}` when the two values differ, else an empty patch.
/// Arrays at this level are not element-tracked; a differing array-valued
/// field is reported as a whole-array replacement.
///
/// # Errors
///
/// - `InvalidPayload` — a file payload's content could not be decoded
pub fn diff_records(
    a: &Value,
    b: &Value,
    opts: &DiffOptions,
    cache: &mut DigestCache,
) -> Result<Patch> {
    let (Some(a_obj), Some(b_obj)) = (a.as_object(), b.as_object()) else {
        let mut patch = Patch::new();
        if a != b {
            patch.insert("value".to_string(), b.clone());
        }
        return Ok(patch);
    };

    let mut keys: BTreeSet<&str> = a_obj.keys().chain(b_obj.keys()).map(String::as_str).collect();
    if let Some(only) = &opts.keys {
        keys.retain(|k| only.contains(*k));
    }

    let mut patch = Patch::new();
    for key in keys {
        if key == "id" || opts.ignore.contains(key) {
            continue;
        }
        if let Some(changed) = diff_field(key, a_obj.get(key), b_obj.get(key), opts, cache)? {
            patch.insert(key.to_string(), changed);
        }
    }
    Ok(patch)
}

/// Compare one field across two records. Returns the value to record in the
/// patch when the field differs, `None` when it is unchanged.
///
/// Absent fields are folded to null; presence only matters for the strict
/// (non-`null_undef_equal`) null comparison.
pub(crate) fn diff_field(
    field: &str,
    a: Option<&Value>,
    b: Option<&Value>,
    opts: &DiffOptions,
    cache: &mut DigestCache,
) -> Result<Option<Value>> {
    let null = Value::Null;
    let av = a.unwrap_or(&null);
    let bv = b.unwrap_or(&null);

    // Nested reference fields compared by identity rather than deeply
    if opts.object_key_by_id.contains(field) {
        return match (identity_of(av), identity_of(bv)) {
            (Some(x), Some(y)) if x == y => nested_patch(av, bv, opts, cache),
            (None, None) if av.is_object() && bv.is_object() => nested_patch(av, bv, opts, cache),
            (None, None) => {
                if opts.null_undef_equal && av.is_null() && bv.is_null() {
                    Ok(None)
                } else if av != bv {
                    Ok(Some(bv.clone()))
                } else {
                    Ok(None)
                }
            }
            _ => Ok(Some(bv.clone())),
        };
    }

    // File-valued fields: content digest equality
    if is_file_payload(av) && is_file_payload(bv) {
        return Ok(if files_equal(av, bv, cache)? {
            None
        } else {
            Some(bv.clone())
        });
    }
    if is_encoded_file_string(av) && is_file_payload(bv) {
        let encoded = av.as_str().unwrap_or_default();
        return Ok(if encoded_matches_payload(encoded, bv, cache)? {
            None
        } else {
            Some(bv.clone())
        });
    }

    // Arrays: coarse replacement. Any element-level difference, length
    // change, or type mismatch reports the entire new array.
    if av.is_array() || bv.is_array() {
        return match (av.as_array(), bv.as_array()) {
            (Some(xs), Some(ys)) if xs.len() == ys.len() => {
                for (x, y) in xs.iter().zip(ys) {
                    if values_differ(x, y, opts, cache)? {
                        return Ok(Some(bv.clone()));
                    }
                }
                Ok(None)
            }
            _ => Ok(Some(bv.clone())),
        };
    }

    // Nested plain objects: recurse, attach only if non-empty
    if av.is_object() && bv.is_object() {
        return nested_patch(av, bv, opts, cache);
    }

    // Scalars: canonicalize, then strict comparison
    if av.is_null() && bv.is_null() {
        if opts.null_undef_equal || a.is_some() == b.is_some() {
            return Ok(None);
        }
        return Ok(Some(bv.clone()));
    }
    let na = coerce_number_string(&normalize_scalar(field, av, opts), opts.coerce_number_strings);
    let nb = coerce_number_string(&normalize_scalar(field, bv, opts), opts.coerce_number_strings);
    Ok(if na != nb { Some(bv.clone()) } else { None })
}

fn nested_patch(
    a: &Value,
    b: &Value,
    opts: &DiffOptions,
    cache: &mut DigestCache,
) -> Result<Option<Value>> {
    let nested = diff_records(a, b, opts, cache)?;
    Ok(if nested.is_empty() {
        None
    } else {
        Some(nested.into_value())
    })
}

/// Element-level difference test used inside array comparison.
pub(crate) fn values_differ(
    a: &Value,
    b: &Value,
    opts: &DiffOptions,
    cache: &mut DigestCache,
) -> Result<bool> {
    if is_file_payload(a) && is_file_payload(b) {
        return Ok(!files_equal(a, b, cache)?);
    }
    if is_encoded_file_string(a) && is_file_payload(b) {
        let encoded = a.as_str().unwrap_or_default();
        return Ok(!encoded_matches_payload(encoded, b, cache)?);
    }
    match (a, b) {
        (Value::Array(xs), Value::Array(ys)) => {
            if xs.len() != ys.len() {
                return Ok(true);
            }
            for (x, y) in xs.iter().zip(ys) {
                if values_differ(x, y, opts, cache)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        (Value::Object(_), Value::Object(_)) => Ok(!diff_records(a, b, opts, cache)?.is_empty()),
        _ => {
            let na = coerce_number_string(a, opts.coerce_number_strings);
            let nb = coerce_number_string(b, opts.coerce_number_strings);
            Ok(na != nb)
        }
    }
}

/// True if any tracked field of `new` differs from `old`.
///
/// This is the reconciler's record comparison: unlike [`diff_records`] it
/// tracks the keys of the new record only (no union with old-only keys),
/// and callers carry the whole new record rather than a patch when any
/// field differs.
pub fn record_changed(
    old: &Value,
    new: &Value,
    opts: &DiffOptions,
    cache: &mut DigestCache,
) -> Result<bool> {
    let (Some(old_obj), Some(new_obj)) = (old.as_object(), new.as_object()) else {
        return Ok(old != new);
    };
    for (key, new_val) in new_obj {
        if key.as_str() == "id" || opts.ignore.contains(key) {
            continue;
        }
        if let Some(only) = &opts.keys {
            if !only.contains(key) {
                continue;
            }
        }
        if diff_field(key, old_obj.get(key), Some(new_val), opts, cache)?.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}
