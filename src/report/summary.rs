//! Markdown summary and SVG bar charts built from detailed CSV reports.
//!
//! Each input is a detailed report as written by [`crate::report::csv`].
//! The `day` and `version` columns are optional; rows without either are
//! grouped under `(unknown)`. Output files:
//! - `summary.md`: totals plus top-N tables per collection, file, code and source
//! - `01_collect_overview.svg` .. `04_sources.svg`: one horizontal bar chart each

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DiagError, Result};
use crate::report::atomic::AtomicFile;
use crate::report::csv::DELIMITER;
use crate::report::document::read_capped;
use crate::report::tally::Tally;

pub const DEFAULT_TOP_N: usize = 20;
pub const SUMMARY_FILE: &str = "summary.md";

const UNKNOWN_COLLECT: &str = "(unknown)";
const EMPTY_CELL: &str = "(empty)";

// Bar chart geometry
const WIDTH: usize = 1200;
const BAR_HEIGHT: usize = 24;
const BAR_GAP: usize = 10;
const LEFT_MARGIN: usize = 340;
const RIGHT_MARGIN: usize = 40;
const TOP_MARGIN: usize = 60;
const BOTTOM_MARGIN: usize = 40;
const BAR_FILL: &str = "#4C78A8";

/// Counts gathered from one or more detailed reports.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub rows: usize,
    pub collects: Tally,
    pub files: Tally,
    pub codes: Tally,
    pub sources: Tally,
}

struct Columns {
    day: Option<usize>,
    version: Option<usize>,
    file: usize,
    code: usize,
    source: usize,
}

impl Columns {
    fn locate(path: &Path, header: &[String]) -> Result<Self> {
        let find = |name: &str| header.iter().position(|h| h.trim() == name);

        let missing: Vec<&str> = ["file", "code", "source", "message"]
            .into_iter()
            .filter(|name| find(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(DiagError::MalformedCsv {
                path: path.to_path_buf(),
                reason: format!("missing column(s): {}", missing.join(", ")),
            });
        }

        // checked above
        let required = |name: &str| find(name).unwrap_or_default();
        Ok(Columns {
            day: find("day"),
            version: find("version"),
            file: required("file"),
            code: required("code"),
            source: required("source"),
        })
    }
}

fn cell(row: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).map(|s| s.trim()).unwrap_or("")
}

fn or_empty(value: &str) -> &str {
    if value.is_empty() {
        EMPTY_CELL
    } else {
        value
    }
}

impl Summary {
    /// Read a detailed report from disk and add its rows.
    pub fn add_file(&mut self, path: &Path, max_bytes: u64) -> Result<()> {
        let bytes = read_capped(path, max_bytes)?;
        let text = String::from_utf8(bytes).map_err(|_| DiagError::MalformedCsv {
            path: path.to_path_buf(),
            reason: "not valid UTF-8".to_string(),
        })?;
        let before = self.rows;
        self.add_csv(path, &text)?;
        debug!("Summarized {} row(s) from {}", self.rows - before, path.display());
        Ok(())
    }

    /// Add the rows of a detailed report. `path` is only used in errors.
    pub fn add_csv(&mut self, path: &Path, text: &str) -> Result<()> {
        let mut rows = parse_rows(text).into_iter();
        let header = rows.next().ok_or_else(|| DiagError::MalformedCsv {
            path: path.to_path_buf(),
            reason: "missing header row".to_string(),
        })?;
        let cols = Columns::locate(path, &header)?;

        for row in rows {
            let collect: Vec<&str> = [cell(&row, cols.day), cell(&row, cols.version)]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect();
            if collect.is_empty() {
                self.collects.add(UNKNOWN_COLLECT);
            } else {
                self.collects.add(&collect.join(" | "));
            }
            self.files.add(or_empty(cell(&row, Some(cols.file))));
            self.codes.add(or_empty(cell(&row, Some(cols.code))));
            self.sources.add(or_empty(cell(&row, Some(cols.source))));
            self.rows += 1;
        }
        Ok(())
    }
}

/// Split `;`-delimited text into rows. Handles quoted fields with doubled
/// quotes and line breaks inside quotes. Blank lines are skipped.
fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            c if c == DELIMITER => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                if !row.is_empty() || !field.is_empty() {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
            }
            _ => field.push(c),
        }
    }
    if !row.is_empty() || !field.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Horizontal bar chart, bars scaled against the largest value.
pub fn render_svg_bars(title: &str, items: &[(String, usize)]) -> String {
    let plot_height = items.len().max(1) * (BAR_HEIGHT + BAR_GAP);
    let height = TOP_MARGIN + plot_height + BOTTOM_MARGIN;
    let max_value = items.iter().map(|(_, n)| *n).max().unwrap_or(1).max(1);
    let plot_width = WIDTH.saturating_sub(LEFT_MARGIN + RIGHT_MARGIN).max(200);

    let mut lines = vec![
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
            WIDTH, height
        ),
        "<style>text{font-family:Arial,Helvetica,sans-serif;font-size:12px;} .title{font-size:18px;font-weight:bold;}</style>".to_string(),
        format!(r#"<text class="title" x="20" y="30">{}</text>"#, escape_xml(title)),
        format!(
            "<line x1=\"{x}\" y1=\"{}\" x2=\"{x}\" y2=\"{}\" stroke=\"#333\"/>",
            TOP_MARGIN - 10,
            height - BOTTOM_MARGIN + 5,
            x = LEFT_MARGIN
        ),
    ];

    for (i, (label, value)) in items.iter().enumerate() {
        let y = TOP_MARGIN + i * (BAR_HEIGHT + BAR_GAP);
        let text_y = y + BAR_HEIGHT - 6;
        let bar_width = value * plot_width / max_value;
        lines.push(format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" />"#,
            LEFT_MARGIN, y, bar_width, BAR_HEIGHT, BAR_FILL
        ));
        lines.push(format!(r#"<text x="10" y="{}">{}</text>"#, text_y, escape_xml(label)));
        lines.push(format!(
            "<text x=\"{}\" y=\"{}\" fill=\"#111\">{}</text>",
            LEFT_MARGIN + bar_width + 8,
            text_y,
            value
        ));
    }

    lines.push("</svg>".to_string());
    lines.join("\n")
}

fn markdown_table(out: &mut String, items: &[(String, usize)], total: usize) {
    out.push_str("| Item | Count | % |\n|---|---:|---:|\n");
    for (name, count) in items {
        let pct = if total > 0 {
            *count as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        out.push_str(&format!("| {} | {} | {:.2}% |\n", name.replace('|', "/"), count, pct));
    }
}

pub fn render_markdown(summary: &Summary, top_n: usize) -> String {
    let mut out = String::from("# Diagnostic summary\n\n");
    out.push_str(&format!("- Total diagnostics: **{}**\n", summary.rows));
    out.push_str(&format!("- Top N: **{}**\n", top_n));

    let sections = [
        ("Top collections", &summary.collects),
        ("Top files", &summary.files),
        ("Top codes", &summary.codes),
        ("Sources", &summary.sources),
    ];
    for (heading, tally) in sections {
        out.push_str(&format!("\n## {}\n\n", heading));
        markdown_table(&mut out, &tally.top(top_n), summary.rows);
    }
    out
}

/// Write `summary.md` and the four charts into `out_dir`. Returns the paths
/// written, summary first.
pub fn write_summary(summary: &Summary, out_dir: &Path, top_n: usize) -> Result<Vec<PathBuf>> {
    if top_n == 0 {
        return Err(DiagError::InvalidOption("--top-n must be greater than 0".to_string()));
    }

    let charts = [
        (
            "01_collect_overview.svg",
            "Diagnostics per collection (day | version)".to_string(),
            &summary.collects,
        ),
        ("02_top_files.svg", format!("Top {} files", top_n), &summary.files),
        ("03_top_codes.svg", format!("Top {} codes", top_n), &summary.codes),
        ("04_sources.svg", "Diagnostics by source".to_string(), &summary.sources),
    ];

    let mut written = Vec::with_capacity(charts.len() + 1);
    let summary_path = out_dir.join(SUMMARY_FILE);
    AtomicFile::write_all_and_commit(&summary_path, render_markdown(summary, top_n).as_bytes())?;
    written.push(summary_path);

    for (name, title, tally) in charts {
        let path = out_dir.join(name);
        AtomicFile::write_all_and_commit(&path, render_svg_bars(&title, &tally.top(top_n)).as_bytes())?;
        written.push(path);
    }
    Ok(written)
}
