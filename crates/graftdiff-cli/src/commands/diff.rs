//! Record diff command

use clap::Args;
use graftdiff_core::{diff_records, DigestCache};
use std::path::PathBuf;

use super::{load_options, read_json};

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Old record snapshot (JSON file)
    pub old: PathBuf,

    /// New record snapshot (JSON file)
    pub new: PathBuf,

    /// Diff options (JSON file)
    #[arg(long)]
    pub options: Option<PathBuf>,
}

pub fn execute(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", run(&args)?);
    Ok(())
}

pub fn run(args: &DiffArgs) -> Result<String, Box<dyn std::error::Error>> {
    let old = read_json(&args.old)?;
    let new = read_json(&args.new)?;
    let opts = load_options(args.options.as_deref())?;

    let mut cache = DigestCache::new();
    let patch = diff_records(&old, &new, &opts, &mut cache)?;

    if patch.is_empty() {
        Ok("No changes.".to_string())
    } else {
        Ok(serde_json::to_string_pretty(&patch)?)
    }
}
