//! graftdiff-core - Object graph diff and reconciliation engine
//!
//! This crate computes set differences between two snapshots of
//! parent-and-nested-child object graphs, including:
//! - Record deep-diff producing sparse patches of changed fields
//! - Collection reconciliation into added/modified/deleted partitions
//! - Hierarchical reconciliation over declarative parent→child config trees
//! - Binary file payload equality via cached content digests
//! - Scalar canonicalization (monetary, date, numeric-string coercion)
//!
//! Records are schema-agnostic `serde_json::Value` objects; an optional
//! `id` field carries identity. All results are computed per invocation
//! from caller-supplied snapshots; nothing is persisted and inputs are
//! never mutated.

pub mod binary;
pub mod diff;
pub mod errors;
pub mod hierarchy;
pub mod identity;
pub mod logging;
pub mod normalize;
pub mod reconcile;
pub mod summary;

// Re-export commonly used types
pub use binary::DigestCache;
pub use diff::{diff_records, record_changed, ChildSpec, CollectionDiff, DiffOptions, Patch};
pub use errors::{DiffError, Result};
pub use hierarchy::reconcile_tree;
pub use reconcile::reconcile;
pub use summary::render_summary;
