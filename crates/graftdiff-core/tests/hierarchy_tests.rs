//! Hierarchical reconciliation tests: single-child, multi-child, and
//! arbitrary-depth trees.

use graftdiff_core::{reconcile_tree, ChildSpec, CollectionDiff, DiffOptions, DigestCache};
use serde_json::{json, Value};

fn run(old: &[Value], new: &[Value], children: &[ChildSpec]) -> CollectionDiff {
    let mut cache = DigestCache::new();
    reconcile_tree(old, new, &DiffOptions::default(), children, &mut cache).unwrap()
}

/// Deserialize the child diff summary attached to one output record.
fn child_summary(record: &Value, key: &str) -> CollectionDiff {
    serde_json::from_value(record[key].clone()).unwrap()
}

#[test]
fn test_empty_spec_degrades_to_plain_reconciliation() {
    let old = vec![json!({"id": "p-1", "name": "A"})];
    let new = vec![json!({"id": "p-1", "name": "B"})];
    let diff = run(&old, &new, &[]);
    assert_eq!(diff.modified, vec![json!({"id": "p-1", "name": "B"})]);
}

#[test]
fn test_child_change_surfaces_parent_as_modified() {
    let old = vec![json!({
        "id": "p-1",
        "name": "Widget",
        "processes": [{"id": "pr-1", "label": "cut"}]
    })];
    let new = vec![json!({
        "id": "p-1",
        "name": "Widget",
        "processes": [{"id": "pr-1", "label": "cut & trim"}]
    })];
    let diff = run(&old, &new, &[ChildSpec::new("processes")]);

    assert_eq!(diff.modified.len(), 1);
    let summary = child_summary(&diff.modified[0], "processes_diff");
    assert_eq!(summary.modified, vec![json!({"id": "pr-1", "label": "cut & trim"})]);
    assert!(summary.added.is_empty());
    assert!(summary.deleted.is_empty());
}

#[test]
fn test_child_field_is_excluded_from_parent_own_comparison() {
    // Parent is unchanged apart from the child collection; tracking happens
    // in the child summary, not as a coarse parent field change.
    let old = vec![json!({"id": "p-1", "name": "W", "processes": []})];
    let new = vec![json!({"id": "p-1", "name": "W", "processes": [{"id": "pr-1"}]})];
    let diff = run(&old, &new, &[ChildSpec::new("processes")]);

    assert_eq!(diff.modified.len(), 1);
    let summary = child_summary(&diff.modified[0], "processes_diff");
    assert_eq!(summary.added, vec![json!({"id": "pr-1"})]);
}

#[test]
fn test_unchanged_parent_and_children_is_empty() {
    let parent = json!({
        "id": "p-1",
        "name": "W",
        "processes": [{"id": "pr-1", "label": "cut"}]
    });
    let diff = run(&[parent.clone()], &[parent.clone()], &[ChildSpec::new("processes")]);
    assert!(diff.is_empty());
}

#[test]
fn test_multi_child_mode_tracks_each_collection_independently() {
    let old = vec![json!({
        "id": "p-1",
        "inputs": [{"id": "i-1", "qty": 1}],
        "outputs": [{"id": "o-1", "qty": 1}]
    })];
    let new = vec![json!({
        "id": "p-1",
        "inputs": [{"id": "i-1", "qty": 2}],
        "outputs": [{"id": "o-1", "qty": 1}]
    })];
    let specs = [
        ChildSpec::new("inputs").with_output_key("input_changes"),
        ChildSpec::new("outputs").with_output_key("output_changes"),
    ];
    let diff = run(&old, &new, &specs);

    assert_eq!(diff.modified.len(), 1);
    let inputs = child_summary(&diff.modified[0], "input_changes");
    let outputs = child_summary(&diff.modified[0], "output_changes");
    assert_eq!(inputs.modified.len(), 1);
    assert!(outputs.is_empty());
}

#[test]
fn test_grandchild_change_propagates_to_top_level_modified() {
    // product → processes → steps; only a step field changes
    let old = vec![json!({
        "id": "prod-1",
        "name": "Widget",
        "processes": [{
            "id": "pr-1",
            "label": "assembly",
            "steps": [{"id": "st-1", "duration": 5}]
        }]
    })];
    let new = vec![json!({
        "id": "prod-1",
        "name": "Widget",
        "processes": [{
            "id": "pr-1",
            "label": "assembly",
            "steps": [{"id": "st-1", "duration": 7}]
        }]
    })];
    let spec = ChildSpec::new("processes").with_child(ChildSpec::new("steps"));
    let diff = run(&old, &new, std::slice::from_ref(&spec));

    // Grandparent surfaces in modified
    assert_eq!(diff.modified.len(), 1);
    assert_eq!(diff.modified[0]["id"], json!("prod-1"));

    // Intermediate child diff carries the grandchild's own summary
    let processes = child_summary(&diff.modified[0], "processes_diff");
    assert_eq!(processes.modified.len(), 1);
    let steps = child_summary(&processes.modified[0], "steps_diff");
    assert_eq!(steps.modified, vec![json!({"id": "st-1", "duration": 7})]);
    assert!(steps.added.is_empty());
    assert!(steps.deleted.is_empty());
}

#[test]
fn test_absent_child_collection_reads_as_empty() {
    let old = vec![json!({"id": "p-1", "name": "W"})];
    let new = vec![json!({"id": "p-1", "name": "W", "processes": [{"id": "pr-1"}]})];
    let diff = run(&old, &new, &[ChildSpec::new("processes")]);

    assert_eq!(diff.modified.len(), 1);
    let summary = child_summary(&diff.modified[0], "processes_diff");
    assert_eq!(summary.added, vec![json!({"id": "pr-1"})]);
    assert!(summary.deleted.is_empty());
}

#[test]
fn test_added_parent_carries_children_as_added() {
    let old: Vec<Value> = vec![];
    let new = vec![json!({
        "id": "p-1",
        "processes": [{"id": "pr-1"}, {"id": "pr-2"}]
    })];
    let diff = run(&old, &new, &[ChildSpec::new("processes")]);

    assert_eq!(diff.added.len(), 1);
    let summary = child_summary(&diff.added[0], "processes_diff");
    assert_eq!(summary.added.len(), 2);
}

#[test]
fn test_parent_losing_identity_is_deleted_never_partially_modified() {
    let old = vec![json!({"id": "p-1", "processes": [{"id": "pr-1"}]})];
    let new = vec![json!({"processes": [{"id": "pr-1"}]})];
    let diff = run(&old, &new, &[ChildSpec::new("processes")]);

    assert_eq!(diff.deleted.len(), 1);
    assert_eq!(diff.deleted[0]["id"], json!("p-1"));
    assert!(diff.modified.is_empty());
}

#[test]
fn test_child_level_options_apply_per_level() {
    let old = vec![json!({
        "id": "p-1",
        "processes": [{"id": "pr-1", "label": "cut", "internal_rev": 1}]
    })];
    let new = vec![json!({
        "id": "p-1",
        "processes": [{"id": "pr-1", "label": "cut", "internal_rev": 2}]
    })];
    let spec = ChildSpec::new("processes")
        .with_options(DiffOptions::default().with_ignore(&["internal_rev"]));
    let diff = run(&old, &new, std::slice::from_ref(&spec));
    assert!(diff.is_empty());
}
