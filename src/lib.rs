//! diagmerge - merge clangd diagnostics exports and render CSV reports
//!
//! The pipeline has two stages:
//!
//! - **merge**: read chunk exports (a JSON list, or an object wrapping the list
//!   under `problems`, `diagnostics`, `items` or `data`), skip oversized or
//!   broken files with a warning, cap the total item count, and persist the
//!   result as a bare JSON array.
//! - **report**: load the merged array under a hard size ceiling, drop records
//!   without string `source`/`message`, and write a `file;count` report and a
//!   `file;line;column;code;source;message` report, both `;`-separated and
//!   protected against spreadsheet formula injection.
//!
//! Detailed reports can then be condensed into `summary.md` and SVG bar charts
//! with [`report::summary`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use diagmerge::report::csv::{generate, write_reports, ReportOptions};
//! use diagmerge::report::document::{load_document, DEFAULT_MAX_DOCUMENT_BYTES};
//! use diagmerge::report::merger::{merge, MergeLimits};
//!
//! let inputs = vec![PathBuf::from("a.json"), PathBuf::from("b.json")];
//! let outcome = merge(&inputs, &MergeLimits::default(), Path::new("merged.json"))?;
//! println!("merged {} diagnostics", outcome.records.len());
//!
//! let records = load_document(Path::new("merged.json"), DEFAULT_MAX_DOCUMENT_BYTES)?;
//! let reports = generate(&records, &ReportOptions::default());
//! write_reports(&reports, Path::new("simple.csv"), Path::new("detailed.csv"))?;
//! # Ok::<(), diagmerge::error::DiagError>(())
//! ```

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod report;

pub use diagnostics::{extract, RawDiagnostic};
pub use error::DiagError;
pub use report::csv::generate;
pub use report::merger::{merge, merge_files, MergeLimits, MergeWarning};
