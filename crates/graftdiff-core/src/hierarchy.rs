//! Hierarchical reconciliation over parent → child collection trees.
//!
//! A [`ChildSpec`] tree declares which parent fields hold child collections
//! and how each level is compared. Reconciliation recurses depth-first:
//! each level's child diff is computed before it is folded into the parent
//! comparison, so a change three levels deep surfaces the top-level parent
//! record in `modified`. Child diff summaries are attached under each
//! spec's output key on every record in `added` and `modified`.

use crate::binary::DigestCache;
use crate::diff::engine::record_changed;
use crate::diff::model::{ChildSpec, CollectionDiff, DiffOptions};
use crate::errors::Result;
use crate::identity::identity_of;
use crate::reconcile::reconcile;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Reconcile two parent collections, cascading into the child collections
/// declared by `children`.
///
/// A matched parent lands in `modified` when any of its own tracked fields
/// differ or any declared child level has a non-empty diff. Child fields
/// named by the specs are excluded from the parent's own-field comparison.
/// Absent child collections are read as empty collections, never as errors.
///
/// With an empty `children` slice this is plain [`reconcile`].
///
/// # Errors
///
/// - `NotAFilePayload` — a child-level file collection contained a non-file
///   element
/// - `InvalidPayload` — a file payload's content could not be decoded
/// - `Serialization` — a child diff summary could not be serialized
pub fn reconcile_tree(
    old: &[Value],
    new: &[Value],
    opts: &DiffOptions,
    children: &[ChildSpec],
    cache: &mut DigestCache,
) -> Result<CollectionDiff> {
    if children.is_empty() {
        return reconcile(old, new, opts, cache);
    }

    // Child collections are reconciled separately; keep them out of the
    // parent's own-field comparison.
    let mut parent_opts = opts.clone();
    parent_opts
        .ignore
        .extend(children.iter().map(|c| c.field.clone()));

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
        let matched_old = identity_of(record).and_then(|id| old_by_id.get(&id).copied());
        match matched_old {
            None => {
                // New parent: every child is an addition against an empty
                // old collection.
                let summaries = child_diffs(None, record, children, cache)?;
                diff.added.push(attach(record, &summaries)?);
            }
            Some(old_record) => {
                let summaries = child_diffs(Some(old_record), record, children, cache)?;
                let own_changed = record_changed(old_record, record, &parent_opts, cache)?;
                let child_changed = summaries.iter().any(|(_, d)| !d.is_empty());
                if own_changed || child_changed {
                    diff.modified.push(attach(record, &summaries)?);
                }
            }
        }
    }

    for record in old {
        let gone = match identity_of(record) {
            None => true,
            Some(id) => !new_by_id.contains_key(&id),
        };
        if gone {
            diff.deleted.push(record.clone());
        }
    }

    debug!(
        added = diff.added.len(),
        modified = diff.modified.len(),
        deleted = diff.deleted.len(),
        levels = children.len(),
        "reconciled hierarchy"
    );
    Ok(diff)
}

/// Compute each declared child level's diff for one parent pair.
///
/// `old_parent` is `None` for parents that only exist in the new snapshot.
fn child_diffs(
    old_parent: Option<&Value>,
    new_parent: &Value,
    children: &[ChildSpec],
    cache: &mut DigestCache,
) -> Result<Vec<(String, CollectionDiff)>> {
    let mut summaries = Vec::with_capacity(children.len());
    for spec in children {
        let old_children = old_parent
            .map(|p| child_collection(p, &spec.field))
            .unwrap_or_default();
        let new_children = child_collection(new_parent, &spec.field);
        let child_diff = reconcile_tree(
            &old_children,
            &new_children,
            &spec.options,
            &spec.children,
            cache,
        )?;
        summaries.push((spec.resolved_output_key(), child_diff));
    }
    Ok(summaries)
}

/// Read a child collection off a parent record; absent or non-array fields
/// are empty collections.
fn child_collection(parent: &Value, field: &str) -> Vec<Value> {
    parent
        .get(field)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Clone a parent record with child diff summaries attached under their
/// output keys.
fn attach(record: &Value, summaries: &[(String, CollectionDiff)]) -> Result<Value> {
    let mut out = record.clone();
    if let Some(obj) = out.as_object_mut() {
        for (key, child_diff) in summaries {
            obj.insert(key.clone(), serde_json::to_value(child_diff)?);
        }
    }
    Ok(out)
}
