pub mod commands;

use std::path::PathBuf;

use clap::Parser;

pub use commands::{Commands, InputArgs, MergeArgs, ReportArgs, ReportFilterArgs, RunArgs, SummaryArgs};

/// diagmerge — merge clangd diagnostics exports into CSV reports
///
/// Merges chunked "Problems" JSON exports under size limits and renders
/// spreadsheet-safe `;`-separated reports.
#[derive(Parser, Debug)]
#[command(
    name = "diagmerge",
    version,
    about = "Merge clangd diagnostics exports and render CSV reports",
    long_about = "diagmerge merges chunked diagnostics exports (JSON) under per-file and\nglobal limits, then renders a per-file count report and a detailed report\nas ';'-separated CSV with formula-injection protection.\n\nExit status: 0 = success, 1 = completed with warnings, 2 = fatal error."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use this config file instead of searching for .diagmerge.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Ignore .diagmerge.toml files
    #[arg(long, global = true)]
    pub no_config: bool,
}
