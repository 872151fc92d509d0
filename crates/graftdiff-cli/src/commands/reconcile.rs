//! Collection reconciliation command

use clap::Args;
use graftdiff_core::{reconcile, render_summary, DigestCache};
use std::path::PathBuf;

use super::{load_options, read_collection};

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Old collection snapshot (JSON array file)
    pub old: PathBuf,

    /// New collection snapshot (JSON array file)
    pub new: PathBuf,

    /// Diff options (JSON file)
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Emit the structured diff as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ReconcileArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", run(&args)?);
    Ok(())
}

pub fn run(args: &ReconcileArgs) -> Result<String, Box<dyn std::error::Error>> {
    let old = read_collection(&args.old)?;
    let new = read_collection(&args.new)?;
    let opts = load_options(args.options.as_deref())?;

    let mut cache = DigestCache::new();
    let diff = reconcile(&old, &new, &opts, &mut cache)?;

    if args.json {
        Ok(serde_json::to_string_pretty(&diff)?)
    } else {
        Ok(render_summary(&diff))
    }
}
