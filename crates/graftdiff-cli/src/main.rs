//! graftdiff CLI
//!
//! Command-line interface for diffing and reconciling JSON snapshots

use clap::{Parser, Subcommand};
use graftdiff_core::logging::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "graftdiff")]
#[command(about = "graftdiff - Object graph diff and reconciliation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Diff two record snapshots into a sparse patch
    Diff(commands::diff::DiffArgs),
    /// Reconcile two collection snapshots into added/modified/deleted
    Reconcile(commands::reconcile::ReconcileArgs),
    /// Reconcile two collection snapshots over a hierarchical spec
    Tree(commands::tree::TreeArgs),
}

fn main() {
    init(Profile::Development);

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::execute(args),
        Commands::Reconcile(args) => commands::reconcile::execute(args),
        Commands::Tree(args) => commands::tree::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
