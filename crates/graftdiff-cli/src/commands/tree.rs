//! Hierarchical reconciliation command

use clap::Args;
use graftdiff_core::{reconcile_tree, render_summary, ChildSpec, DiffOptions, DigestCache};
use serde::Deserialize;
use std::path::PathBuf;

use super::{read_collection, read_json};

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Old collection snapshot (JSON array file)
    pub old: PathBuf,

    /// New collection snapshot (JSON array file)
    pub new: PathBuf,

    /// Hierarchy spec (JSON file: top-level options + child specs)
    #[arg(long)]
    pub spec: PathBuf,

    /// Emit the structured diff as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

/// On-disk form of the hierarchy spec.
#[derive(Debug, Deserialize)]
struct TreeSpecFile {
    #[serde(default)]
    options: DiffOptions,
    #[serde(default)]
    children: Vec<ChildSpec>,
}

pub fn execute(args: TreeArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", run(&args)?);
    Ok(())
}

pub fn run(args: &TreeArgs) -> Result<String, Box<dyn std::error::Error>> {
    let old = read_collection(&args.old)?;
    let new = read_collection(&args.new)?;

    let spec_value = read_json(&args.spec)?;
    let spec: TreeSpecFile = serde_json::from_value(spec_value)
        .map_err(|e| format!("{} is not a valid hierarchy spec: {}", args.spec.display(), e))?;

    let mut cache = DigestCache::new();
    let diff = reconcile_tree(&old, &new, &spec.options, &spec.children, &mut cache)?;

    if args.json {
        Ok(serde_json::to_string_pretty(&diff)?)
    } else {
        Ok(render_summary(&diff))
    }
}
