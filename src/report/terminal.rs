use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;

use crate::report::csv::ReportStats;
use crate::report::merger::MergeOutcome;
use crate::report::summary::Summary;

fn use_colors(enabled: bool) -> bool {
    enabled && std::env::var_os("NO_COLOR").is_none()
}

/// One-line merge summary.
pub fn render_merge(outcome: &MergeOutcome, inputs: usize, output: &std::path::Path, color: bool) {
    let line = format!(
        "Merged {} diagnostics from {} of {} input(s) into {}",
        outcome.records.len(),
        outcome.files_read,
        inputs,
        output.display()
    );
    if use_colors(color) {
        println!("{}", line.bold());
    } else {
        println!("{}", line);
    }

    if outcome.files_failed > 0 {
        let skipped = format!(" ({} input(s) skipped)", outcome.files_failed);
        if use_colors(color) {
            println!("{}", skipped.yellow());
        } else {
            println!("{}", skipped);
        }
    }
}

/// Report totals and the files with the most diagnostics.
pub fn render_report(stats: &ReportStats, top: usize, color: bool) {
    let color = use_colors(color);

    println!();
    let heading = format!(
        "Diagnostics: {} rendered ({} read, {} invalid, {} filtered, {} over limit)",
        stats.rows, stats.total, stats.invalid, stats.filtered_out, stats.capped
    );
    if color {
        println!("{}", heading.bold());
    } else {
        println!("{}", heading);
    }

    if stats.per_file.is_empty() || top == 0 {
        println!();
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![Cell::new("File"), Cell::new("Count")]);

    for (file, count) in stats.per_file.iter().take(top) {
        table.add_row(vec![Cell::new(file), Cell::new(count)]);
    }
    println!("{table}");

    let rest = stats.per_file.len().saturating_sub(top);
    if rest > 0 {
        let more = format!(" … and {} more file(s)", rest);
        if color {
            println!("{}", more.dimmed());
        } else {
            println!("{}", more);
        }
    }
    println!();
}

/// Totals and the most frequent codes after writing the summary.
pub fn render_summary(summary: &Summary, top: usize, written: &std::path::Path, color: bool) {
    let color = use_colors(color);

    let heading = format!(
        "Summarized {} diagnostics ({} files, {} codes) into {}",
        summary.rows,
        summary.files.len(),
        summary.codes.len(),
        written.display()
    );
    if color {
        println!("{}", heading.bold());
    } else {
        println!("{}", heading);
    }

    if summary.codes.is_empty() || top == 0 {
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![Cell::new("Code"), Cell::new("Count")]);
    for (code, count) in summary.codes.top(top) {
        table.add_row(vec![Cell::new(code), Cell::new(count)]);
    }
    println!("{table}");
}
