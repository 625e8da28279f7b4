use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge chunk exports into one JSON array
    Merge(MergeArgs),

    /// Render CSV reports from a merged JSON document
    Report(ReportArgs),

    /// Merge, persist the merged document, then report from it
    Run(RunArgs),

    /// Build summary.md and SVG bar charts from detailed CSV reports
    Summary(SummaryArgs),

    /// Initialize a .diagmerge.toml config file in the current directory
    Init,
}

/// Where chunk exports come from.
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// Comma-separated list of JSON exports, merged in the given order
    #[arg(long, conflicts_with = "inputs_dir", required_unless_present = "inputs_dir")]
    pub inputs: Option<String>,

    /// Directory containing JSON exports (merged in path order)
    #[arg(long)]
    pub inputs_dir: Option<PathBuf>,

    /// File name pattern used with --inputs-dir. Default: *.json
    #[arg(long, requires = "inputs_dir")]
    pub glob: Option<String>,

    /// Skip chunk files larger than this many bytes (0 = no limit)
    #[arg(long)]
    pub max_input_bytes: Option<u64>,
}

/// Filters and decorations for the CSV reports.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ReportFilterArgs {
    /// Keep only diagnostics from this source. Use '*' for no filter.
    /// Default: clangd
    #[arg(long)]
    pub source: Option<String>,

    /// Keep only diagnostics with this exact code (e.g. unused-includes)
    #[arg(long)]
    pub code: Option<String>,

    /// Keep only diagnostics whose message contains this text
    #[arg(long)]
    pub message_contains: Option<String>,

    /// Collection day (YYYY-MM-DD), added as a leading CSV column
    #[arg(long)]
    pub day: Option<String>,

    /// Build or collection label, added as a leading CSV column
    #[arg(long)]
    pub build_version: Option<String>,

    /// Refuse merged documents larger than this many bytes (must be > 0).
    /// Default: 100 MiB
    #[arg(long)]
    pub max_document_bytes: Option<u64>,

    /// Number of files shown in the terminal summary
    #[arg(long, default_value = "10")]
    pub top: usize,
}

#[derive(clap::Args, Debug, Clone)]
pub struct MergeArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Output JSON path (written as a JSON array)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Stop merging after this many diagnostics (0 = no limit)
    #[arg(long)]
    pub max_items: Option<usize>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ReportArgs {
    /// Merged diagnostics JSON
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output CSV: file;count
    #[arg(long)]
    pub out_simple: PathBuf,

    /// Output CSV: file;line;column;code;source;message
    #[arg(long)]
    pub out_detailed: PathBuf,

    /// Render at most this many diagnostics after filtering (0 = no limit)
    #[arg(long)]
    pub max_items: Option<usize>,

    #[command(flatten)]
    pub filters: ReportFilterArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Path of the merged JSON written between the two stages
    #[arg(long)]
    pub merged: PathBuf,

    /// Output CSV: file;count
    #[arg(long)]
    pub out_simple: PathBuf,

    /// Output CSV: file;line;column;code;source;message
    #[arg(long)]
    pub out_detailed: PathBuf,

    /// Stop merging after this many diagnostics (0 = no limit)
    #[arg(long)]
    pub max_merge_items: Option<usize>,

    /// Render at most this many diagnostics after filtering (0 = no limit)
    #[arg(long)]
    pub max_report_items: Option<usize>,

    #[command(flatten)]
    pub filters: ReportFilterArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SummaryArgs {
    /// Detailed CSV report (repeat to combine several collections)
    #[arg(short, long = "input", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory receiving summary.md and the charts
    #[arg(long, default_value = "charts")]
    pub out_dir: PathBuf,

    /// Rows per table and bars per chart (must be > 0)
    #[arg(long, default_value_t = crate::report::summary::DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Refuse CSV files larger than this many bytes (must be > 0).
    /// Default: 100 MiB
    #[arg(long)]
    pub max_document_bytes: Option<u64>,
}
