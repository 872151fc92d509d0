//! Diff input options and output types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq`.
//! Collections use `BTreeSet`/sorted iteration for deterministic output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Comparison semantics for one diff or reconciliation invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffOptions {
    /// Restrict comparison to this subset of fields, if given
    #[serde(default)]
    pub keys: Option<BTreeSet<String>>,
    /// Fields excluded from comparison
    #[serde(default)]
    pub ignore: BTreeSet<String>,
    /// Treat null and absent as equal
    #[serde(default = "default_true")]
    pub null_undef_equal: bool,
    /// Treat `"5"` and `5` as equal when the round-trip representation matches
    #[serde(default = "default_true")]
    pub coerce_number_strings: bool,
    /// Fields whose nested object value is compared by identity, not deeply
    #[serde(default)]
    pub object_key_by_id: BTreeSet<String>,
    /// Monetary fields canonicalized to numbers before comparison
    #[serde(default = "default_money_fields")]
    pub money_fields: BTreeSet<String>,
    /// Date/timestamp fields canonicalized to ISO-8601 before comparison
    #[serde(default = "default_date_fields")]
    pub date_fields: BTreeSet<String>,
}

fn default_true() -> bool {
    true
}

fn default_money_fields() -> BTreeSet<String> {
    ["delivery_cost", "unit_cost", "price"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_date_fields() -> BTreeSet<String> {
    [
        "date",
        "created_at",
        "updated_at",
        "manufacture_date",
        "expiration_date",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            keys: None,
            ignore: BTreeSet::new(),
            null_undef_equal: true,
            coerce_number_strings: true,
            object_key_by_id: BTreeSet::new(),
            money_fields: default_money_fields(),
            date_fields: default_date_fields(),
        }
    }
}

impl DiffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict comparison to the given fields
    pub fn with_keys(mut self, keys: &[&str]) -> Self {
        self.keys = Some(keys.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Exclude the given fields from comparison
    pub fn with_ignore(mut self, fields: &[&str]) -> Self {
        self.ignore.extend(fields.iter().map(|s| s.to_string()));
        self
    }

    /// Compare the given nested-object fields by identity instead of deeply
    pub fn with_object_key_by_id(mut self, fields: &[&str]) -> Self {
        self.object_key_by_id
            .extend(fields.iter().map(|s| s.to_string()));
        self
    }

    /// Set null/absent equivalence
    pub fn with_null_undef_equal(mut self, enabled: bool) -> Self {
        self.null_undef_equal = enabled;
        self
    }

    /// Set numeric-string coercion
    pub fn with_coerce_number_strings(mut self, enabled: bool) -> Self {
        self.coerce_number_strings = enabled;
        self
    }
}

/// A sparse patch: only the fields that differ between two records.
///
/// Values are either the raw new value (leaf change) or a nested patch
/// object (nested-object change); callers distinguish the two by shape.
/// An empty patch signals that no persistence write is necessary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct Patch(Map<String, Value>);

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub(crate) fn insert(&mut self, key: String, value: Value) {
        self.0.insert(key, value);
    }

    /// Consume the patch into a plain JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// The result of reconciling two collections of records.
///
/// The three lists are disjoint by identity: a record's identity appears in
/// exactly one list, or in none when the record is unchanged. `added` and
/// `modified` follow new-collection order; `deleted` follows old-collection
/// order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CollectionDiff {
    /// Records present only in the new snapshot
    pub added: Vec<Value>,
    /// Records present in both snapshots with at least one tracked
    /// difference, carried as the full new-record value
    pub modified: Vec<Value>,
    /// Records present only in the old snapshot
    pub deleted: Vec<Value>,
}

impl CollectionDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }
}

/// Declarative description of one nested child collection level.
///
/// A spec names the parent field holding the child collection, the key the
/// child diff summary is attached under in the output, the diff options for
/// that level, and recursively the specs for grandchildren. Specs compose
/// into arbitrary-depth trees (e.g. product → processes → steps).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChildSpec {
    /// Parent field holding the child collection
    pub field: String,
    /// Output key the child diff summary is attached under
    /// (defaults to `<field>_diff`)
    #[serde(default)]
    pub output_key: Option<String>,
    /// Diff options applied at this child level
    #[serde(default)]
    pub options: DiffOptions,
    /// Specs for nested grandchild collections
    #[serde(default)]
    pub children: Vec<ChildSpec>,
}

impl ChildSpec {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            output_key: None,
            options: DiffOptions::default(),
            children: Vec::new(),
        }
    }

    /// Attach the child diff summary under this key instead of the default
    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    /// Use these diff options at this child level
    pub fn with_options(mut self, options: DiffOptions) -> Self {
        self.options = options;
        self
    }

    /// Declare a nested grandchild collection
    pub fn with_child(mut self, child: ChildSpec) -> Self {
        self.children.push(child);
        self
    }

    /// The key the child diff summary is attached under.
    pub fn resolved_output_key(&self) -> String {
        self.output_key
            .clone()
            .unwrap_or_else(|| format!("{}_diff", self.field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_options_enable_equivalence_flags() {
        let opts = DiffOptions::default();
        assert!(opts.null_undef_equal);
        assert!(opts.coerce_number_strings);
        assert!(opts.keys.is_none());
    }

    #[test]
    fn test_options_deserialize_with_partial_fields() {
        let opts: DiffOptions = serde_json::from_value(json!({"ignore": ["updated_at"]})).unwrap();
        assert!(opts.ignore.contains("updated_at"));
        assert!(opts.null_undef_equal);
        assert!(opts.money_fields.contains("delivery_cost"));
    }

    #[test]
    fn test_child_spec_builder_and_default_output_key() {
        let spec = ChildSpec::new("processes")
            .with_child(ChildSpec::new("steps").with_output_key("step_changes"));
        assert_eq!(spec.resolved_output_key(), "processes_diff");
        assert_eq!(spec.children[0].resolved_output_key(), "step_changes");
    }

    #[test]
    fn test_patch_into_value_round_trip() {
        let mut patch = Patch::new();
        patch.insert("name".to_string(), json!("new"));
        assert_eq!(patch.into_value(), json!({"name": "new"}));
    }
}
