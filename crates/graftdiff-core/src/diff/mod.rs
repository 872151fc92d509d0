//! Record diff computation: options, patch model, and the deep comparator.

pub mod engine;
pub mod model;

pub use engine::{diff_records, record_changed};
pub use model::{ChildSpec, CollectionDiff, DiffOptions, Patch};
