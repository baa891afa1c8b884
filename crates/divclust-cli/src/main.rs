//! divclust - divisive clustering trees from the command line
//!
//! Usage:
//!   divclust fit data.csv                       # Leaf cluster of every row as CSV
//!   divclust fit data.csv --level 1 --json      # Clusters one split below the root
//!   divclust fit data.csv --method pam --seed 7 # Plain PAM, fixed seed
//!   divclust levels data.csv                    # Level index, leaves and medoids
//!
//! The input CSV has a header; its first column is the row id and the
//! remaining columns are numeric features.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod error;
mod loader;
mod output;

use commands::{fit, levels, TreeOptions};

/// divclust - Divisive clustering trees
///
/// Splits a table top-down with spectral clustering or PAM and reports
/// cluster ids per level.
#[derive(Parser)]
#[command(name = "divclust")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the tree and print the cluster of every row
    Fit {
        /// Input CSV file
        #[arg(value_name = "CSV")]
        file: PathBuf,

        /// Depth to report (default: deepest)
        #[arg(long)]
        level: Option<usize>,

        #[command(flatten)]
        tree: TreeOptions,
    },

    /// Build the tree and print its levels, leaves and medoids
    Levels {
        /// Input CSV file
        #[arg(value_name = "CSV")]
        file: PathBuf,

        #[command(flatten)]
        tree: TreeOptions,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Fit { file, level, tree } => fit::run(&file, &tree, level, cli.json),
        Commands::Levels { file, tree } => levels::run(&file, &tree, cli.json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}
