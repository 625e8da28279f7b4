//! CSV report generation.
//!
//! Two reports come out of one pass over the merged records:
//! - simple: `file;count`, count-descending, ties in first-seen order
//! - detailed: `file;line;column;code;source;message`, one row per record
//!
//! Every text cell goes through [`sanitize_cell`] and positions through
//! [`position_cell`]. Delimiter is `;`, rows end with `\r\n`.

use std::fmt;
use std::path::Path;

use crate::diagnostics::record::ValidDiagnostic;
use crate::diagnostics::sanitize::{position_cell, sanitize_cell};
use crate::diagnostics::RawDiagnostic;
use crate::error::Result;
use crate::report::atomic::AtomicFile;
use crate::report::tally::Tally;

pub const DELIMITER: char = ';';
pub const LINE_TERMINATOR: &str = "\r\n";

pub const SIMPLE_HEADER: [&str; 2] = ["file", "count"];
pub const DETAILED_HEADER: [&str; 6] = ["file", "line", "column", "code", "source", "message"];
const PROVENANCE_HEADER: [&str; 2] = ["day", "version"];

/// Collection day and build label prepended to every row when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
    pub day: String,
    pub version: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Keep only this `source` (`None` keeps all)
    pub source: Option<String>,
    /// Keep only this exact code
    pub code: Option<String>,
    /// Keep only messages containing this text
    pub message_contains: Option<String>,
    /// Cap on rendered records, 0 = unlimited
    pub max_items: usize,
    pub provenance: Option<Provenance>,
}

impl ReportOptions {
    fn keep(&self, diag: &ValidDiagnostic<'_>) -> bool {
        if let Some(ref source) = self.source {
            if diag.source != source.as_str() {
                return false;
            }
        }
        if let Some(ref code) = self.code {
            if diag.code.as_deref() != Some(code.as_str()) {
                return false;
            }
        }
        if let Some(ref needle) = self.message_contains {
            if !diag.message.contains(needle.as_str()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportWarning {
    /// Records without a string `source` or `message`
    InvalidRecords(usize),
    /// Records dropped by the report cap
    Capped { dropped: usize, limit: usize },
}

impl fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportWarning::InvalidRecords(n) => write!(
                f,
                "{} diagnostic(s) skipped: `source` and `message` must be strings",
                n
            ),
            ReportWarning::Capped { dropped, limit } => write!(
                f,
                "{} diagnostic(s) dropped by report limit of {}",
                dropped, limit
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub total: usize,
    pub invalid: usize,
    pub filtered_out: usize,
    pub capped: usize,
    pub rows: usize,
    /// Simple report rows in output order
    pub per_file: Vec<(String, usize)>,
}

/// Both reports rendered in memory, ready to be committed to disk.
#[derive(Debug, Clone)]
pub struct GeneratedReports {
    pub simple: String,
    pub detailed: String,
    pub stats: ReportStats,
    pub warnings: Vec<ReportWarning>,
}

/// Quote a field when it contains the delimiter, a quote or a line break.
pub fn quote_field(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains([DELIMITER, '"', '\n', '\r']) {
        std::borrow::Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        std::borrow::Cow::Borrowed(field)
    }
}

fn push_row<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        out.push_str(&quote_field(field.as_ref()));
    }
    out.push_str(LINE_TERMINATOR);
}

fn header_with_provenance(base: &[&str], provenance: Option<&Provenance>) -> Vec<String> {
    let mut header = Vec::with_capacity(base.len() + 2);
    if provenance.is_some() {
        header.extend(PROVENANCE_HEADER.iter().map(|s| s.to_string()));
    }
    header.extend(base.iter().map(|s| s.to_string()));
    header
}

fn provenance_cells(provenance: Option<&Provenance>) -> Vec<String> {
    match provenance {
        Some(p) => vec![
            sanitize_cell(&p.day).into_owned(),
            sanitize_cell(&p.version).into_owned(),
        ],
        None => Vec::new(),
    }
}

/// Validate, filter, cap and render merged records into both reports.
pub fn generate(records: &[RawDiagnostic], opts: &ReportOptions) -> GeneratedReports {
    let mut stats = ReportStats {
        total: records.len(),
        ..ReportStats::default()
    };

    let valid: Vec<ValidDiagnostic<'_>> = records.iter().filter_map(ValidDiagnostic::from_raw).collect();
    stats.invalid = records.len() - valid.len();

    let mut kept: Vec<ValidDiagnostic<'_>> = valid.into_iter().filter(|d| opts.keep(d)).collect();
    stats.filtered_out = records.len() - stats.invalid - kept.len();

    if opts.max_items > 0 && kept.len() > opts.max_items {
        stats.capped = kept.len() - opts.max_items;
        kept.truncate(opts.max_items);
    }
    stats.rows = kept.len();

    let provenance = opts.provenance.as_ref();
    let prefix = provenance_cells(provenance);

    let mut detailed = String::new();
    push_row(&mut detailed, &header_with_provenance(&DETAILED_HEADER, provenance));

    let mut per_file = Tally::default();

    for diag in &kept {
        if let Some(ref file) = diag.file {
            per_file.add(file);
        }

        let mut row = prefix.clone();
        row.push(sanitize_cell(diag.file.as_deref().unwrap_or("")).into_owned());
        row.push(position_cell(diag.line));
        row.push(position_cell(diag.column));
        row.push(sanitize_cell(diag.code.as_deref().unwrap_or("")).into_owned());
        row.push(sanitize_cell(diag.source).into_owned());
        row.push(sanitize_cell(diag.message).into_owned());
        push_row(&mut detailed, &row);
    }

    let counts = per_file.into_sorted();

    let mut simple = String::new();
    push_row(&mut simple, &header_with_provenance(&SIMPLE_HEADER, provenance));
    for (file, count) in &counts {
        let mut row = prefix.clone();
        row.push(sanitize_cell(file).into_owned());
        row.push(count.to_string());
        push_row(&mut simple, &row);
    }
    stats.per_file = counts;

    let mut warnings = Vec::new();
    if stats.invalid > 0 {
        warnings.push(ReportWarning::InvalidRecords(stats.invalid));
    }
    if stats.capped > 0 {
        warnings.push(ReportWarning::Capped {
            dropped: stats.capped,
            limit: opts.max_items,
        });
    }

    GeneratedReports {
        simple,
        detailed,
        stats,
        warnings,
    }
}

/// Commit both reports. Each file either appears complete or not at all.
pub fn write_reports(reports: &GeneratedReports, simple_path: &Path, detailed_path: &Path) -> Result<()> {
    AtomicFile::write_all_and_commit(simple_path, reports.simple.as_bytes())?;
    AtomicFile::write_all_and_commit(detailed_path, reports.detailed.as_bytes())?;
    Ok(())
}
