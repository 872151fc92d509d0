pub mod diff;
pub mod reconcile;
pub mod tree;

use graftdiff_core::{DiffError, DiffOptions};
use serde_json::Value;
use std::path::Path;

/// Read and parse one JSON snapshot file.
pub fn read_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| format!("{} is not valid JSON: {}", path.display(), e))?;
    Ok(value)
}

/// Read a snapshot file that must hold a JSON array of records.
pub fn read_collection(path: &Path) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
    match read_json(path)? {
        Value::Array(records) => Ok(records),
        _ => Err(Box::new(DiffError::InvalidSnapshot {
            detail: format!("{} must hold a JSON array of records", path.display()),
        })),
    }
}

/// Load diff options from an optional JSON file, defaulting when absent.
pub fn load_options(path: Option<&Path>) -> Result<DiffOptions, Box<dyn std::error::Error>> {
    match path {
        None => Ok(DiffOptions::default()),
        Some(p) => {
            let value = read_json(p)?;
            let opts: DiffOptions = serde_json::from_value(value)
                .map_err(|e| format!("{} is not a valid options file: {}", p.display(), e))?;
            Ok(opts)
        }
    }
}
