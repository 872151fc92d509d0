//! Collection reconciliation: partition two snapshots of a collection into
//! added / modified / deleted.
//!
//! Two paths:
//! - identity path: records are matched by their `id` field; matched pairs
//!   are compared field-by-field and carried in `modified` as the full new
//!   record when anything tracked differs
//! - file path: collections of binary file payloads have no identity, so
//!   they are matched purely by content digest with per-digest frequency
//!   accounting (duplicate-count aware)

use crate::binary::{is_file_payload, DigestCache};
use crate::diff::engine::record_changed;
use crate::diff::model::{CollectionDiff, DiffOptions};
use crate::errors::{DiffError, Result};
use crate::identity::identity_of;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Reconcile two collections of records.
///
/// If any element in either collection is a file payload, the whole
/// invocation is routed to the file path. Otherwise records are matched by
/// identity; records without identity are treated as added outright and are
/// never matched or diffed against anything.
///
/// Output ordering is deterministic: `added` and `modified` follow the new
/// collection's order, `deleted` follows the old collection's order.
///
/// # Errors
///
/// - `NotAFilePayload` — a file-path collection contained a non-file element
/// - `InvalidPayload` — a file payload's content could not be decoded
pub fn reconcile(
    old: &[Value],
    new: &[Value],
    opts: &DiffOptions,
    cache: &mut DigestCache,
) -> Result<CollectionDiff> {
    if old.iter().chain(new).any(is_file_payload) {
        return reconcile_files(old, new, cache);
    }

    let old_by_id: BTreeMap<String, &Value> = old
        .iter()
        .filter_map(|r| identity_of(r).map(|id| (id, r)))
        .collect();
    let new_by_id: BTreeMap<String, &Value> = new
        .iter()
        .filter_map(|r| identity_of(r).map(|id| (id, r)))
        .collect();

    let mut diff = CollectionDiff::default();

    for record in new {
        match identity_of(record) {
            // Identity-less records are always added, never matched
            None => diff.added.push(record.clone()),
            Some(id) => match old_by_id.get(&id) {
                None => diff.added.push(record.clone()),
                Some(old_record) => {
                    if record_changed(old_record, record, opts, cache)? {
                        diff.modified.push(record.clone());
                    }
                }
            },
        }
    }

    for record in old {
        match identity_of(record) {
            None => diff.deleted.push(record.clone()),
            Some(id) => {
                if !new_by_id.contains_key(&id) {
                    diff.deleted.push(record.clone());
                }
            }
        }
    }

    debug!(
        added = diff.added.len(),
        modified = diff.modified.len(),
        deleted = diff.deleted.len(),
        "reconciled collection"
    );
    Ok(diff)
}

/// Reconcile two collections of file payloads by content digest.
///
/// For each digest, the count difference between the two snapshots decides
/// how many instances are added or deleted. `modified` is always empty:
/// content-identical files are unchanged and content-different files are an
/// add+delete pair.
fn reconcile_files(old: &[Value], new: &[Value], cache: &mut DigestCache) -> Result<CollectionDiff> {
    let old_digests = digest_all(old, cache)?;
    let new_digests = digest_all(new, cache)?;

    let old_counts = frequency(&old_digests);
    let new_counts = frequency(&new_digests);

    let mut diff = CollectionDiff::default();

    // Excess new instances beyond the old count are added, in input order
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for (record, digest) in new.iter().zip(&new_digests) {
        let n = seen.entry(digest.as_str()).or_insert(0);
        *n += 1;
        if *n > old_counts.get(digest.as_str()).copied().unwrap_or(0) {
            diff.added.push(record.clone());
        }
    }

    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for (record, digest) in old.iter().zip(&old_digests) {
        let n = seen.entry(digest.as_str()).or_insert(0);
        *n += 1;
        if *n > new_counts.get(digest.as_str()).copied().unwrap_or(0) {
            diff.deleted.push(record.clone());
        }
    }

    debug!(
        added = diff.added.len(),
        deleted = diff.deleted.len(),
        "reconciled file collection"
    );
    Ok(diff)
}

/// Digest every element, rejecting non-file elements.
fn digest_all(records: &[Value], cache: &mut DigestCache) -> Result<Vec<String>> {
    records
        .iter()
        .map(|r| {
            if !is_file_payload(r) {
                return Err(DiffError::NotAFilePayload {
                    detail: "file collection contained a non-file element".to_string(),
                });
            }
            cache.digest_of(r)
        })
        .collect()
}

fn frequency(digests: &[String]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for d in digests {
        *counts.entry(d.as_str()).or_insert(0) += 1;
    }
    counts
}
