pub mod inputs;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::cli::{Cli, InputArgs, MergeArgs, ReportArgs, ReportFilterArgs, RunArgs, SummaryArgs};
use crate::config::DiagConfig;
use crate::engine::inputs::ResolvedInputs;
use crate::error::DiagError;
use crate::report::csv::{self, Provenance, ReportOptions};
use crate::report::merger::{self, MergeLimits, MergeOutcome, MergeWarning};
use crate::report::summary::{self, Summary};
use crate::report::{document, terminal};

/// How a command finished, when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Clean,
    Warnings,
}

impl Status {
    fn from_warning_count(n: usize) -> Self {
        if n == 0 {
            Status::Clean
        } else {
            Status::Warnings
        }
    }

    fn and(self, other: Status) -> Status {
        if self == Status::Warnings || other == Status::Warnings {
            Status::Warnings
        } else {
            Status::Clean
        }
    }
}

/// Wires CLI arguments and configuration into the merge and report stages.
pub struct Engine {
    config: DiagConfig,
    /// Print terminal summaries to stdout
    summary: bool,
}

impl Engine {
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = if cli.no_config {
            DiagConfig::default()
        } else {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            DiagConfig::load(cli.config.as_deref(), &cwd)
        };

        Ok(Engine {
            config,
            summary: !cli.quiet,
        })
    }

    pub fn with_config(config: DiagConfig) -> Self {
        Engine {
            config,
            summary: false,
        }
    }

    pub fn merge(&self, args: &MergeArgs) -> Result<Status> {
        let (_, status) = self.merge_stage(&args.inputs, args.max_items, &args.output)?;
        Ok(status)
    }

    pub fn report(&self, args: &ReportArgs) -> Result<Status> {
        self.report_stage(
            &args.input,
            &args.out_simple,
            &args.out_detailed,
            args.max_items,
            &args.filters,
        )
    }

    /// Merge, then report from the persisted merged document.
    pub fn run(&self, args: &RunArgs) -> Result<Status> {
        let (_, merged) = self.merge_stage(&args.inputs, args.max_merge_items, &args.merged)?;
        let reported = self.report_stage(
            &args.merged,
            &args.out_simple,
            &args.out_detailed,
            args.max_report_items,
            &args.filters,
        )?;
        Ok(merged.and(reported))
    }

    /// Summarize detailed reports into `summary.md` plus bar charts.
    pub fn summary(&self, args: &SummaryArgs) -> Result<Status> {
        if args.top_n == 0 {
            return Err(DiagError::InvalidOption("--top-n must be greater than 0".to_string()).into());
        }
        let max_bytes = args
            .max_document_bytes
            .unwrap_or(self.config.report.max_document_bytes);

        let mut totals = Summary::default();
        for input in &args.inputs {
            totals
                .add_file(input, max_bytes)
                .with_context(|| format!("Cannot summarize {}", input.display()))?;
        }

        let written = summary::write_summary(&totals, &args.out_dir, args.top_n)
            .with_context(|| format!("Failed to write summary into {}", args.out_dir.display()))?;
        info!(
            "Summarized {} diagnostic(s) from {} report(s) into {} file(s) under {}",
            totals.rows,
            args.inputs.len(),
            written.len(),
            args.out_dir.display()
        );

        if self.summary {
            terminal::render_summary(&totals, args.top_n.min(5), &args.out_dir.join(summary::SUMMARY_FILE), true);
        }

        if totals.rows == 0 {
            warn!("No diagnostics found in the given report(s)");
            return Ok(Status::Warnings);
        }
        Ok(Status::Clean)
    }

    fn resolve_inputs(&self, args: &InputArgs) -> Result<ResolvedInputs> {
        let candidates = match (&args.inputs, &args.inputs_dir) {
            (Some(list), _) => inputs::parse_inputs_list(list),
            (None, Some(dir)) => {
                let pattern = args.glob.as_deref().unwrap_or(&self.config.merge.glob);
                inputs::list_inputs_dir(dir, pattern)?
            }
            (None, None) => Vec::new(),
        };
        Ok(inputs::existing_files(candidates)?)
    }

    fn merge_stage(
        &self,
        input_args: &InputArgs,
        max_items: Option<usize>,
        output: &Path,
    ) -> Result<(MergeOutcome, Status)> {
        let start = Instant::now();
        let ResolvedInputs { files, missing } = self.resolve_inputs(input_args)?;
        let total_inputs = files.len() + missing.len();
        let limits = MergeLimits {
            max_input_bytes: input_args
                .max_input_bytes
                .unwrap_or(self.config.merge.max_input_bytes),
            max_items: max_items.unwrap_or(self.config.merge.max_items),
        };
        info!(
            "Merging {} input(s) (max_input_bytes={}, max_items={})",
            files.len(),
            limits.max_input_bytes,
            limits.max_items
        );

        let mut outcome = merger::merge(&files, &limits, output)
            .with_context(|| format!("Failed to write merged output {}", output.display()))?;

        // dropped before merging, but still skipped inputs
        let dropped: Vec<MergeWarning> = missing
            .into_iter()
            .map(|path| MergeWarning::Unreadable {
                path,
                error: "not found or not a regular file".to_string(),
            })
            .collect();
        outcome.files_failed += dropped.len();
        let merge_warnings = std::mem::take(&mut outcome.warnings);
        outcome.warnings = dropped.into_iter().chain(merge_warnings).collect();

        for warning in &outcome.warnings {
            warn!("{}", warning);
        }
        info!(
            "inputs={} read_ok={} read_fail={} diagnostics_out={} output={} ({} ms)",
            total_inputs,
            outcome.files_read,
            outcome.files_failed,
            outcome.records.len(),
            output.display(),
            start.elapsed().as_millis()
        );

        if self.summary {
            terminal::render_merge(&outcome, total_inputs, output, true);
        }

        let status = Status::from_warning_count(outcome.warnings.len());
        Ok((outcome, status))
    }

    fn report_stage(
        &self,
        input: &Path,
        out_simple: &Path,
        out_detailed: &Path,
        max_items: Option<usize>,
        filters: &ReportFilterArgs,
    ) -> Result<Status> {
        let max_document_bytes = filters
            .max_document_bytes
            .unwrap_or(self.config.report.max_document_bytes);
        let opts = self.report_options(max_items, filters)?;

        let records = document::load_document(input, max_document_bytes)
            .with_context(|| format!("Cannot generate reports from {}", input.display()))?;
        let reports = csv::generate(&records, &opts);

        for warning in &reports.warnings {
            warn!("{}", warning);
        }

        csv::write_reports(&reports, out_simple, out_detailed).context("Failed to write CSV reports")?;
        info!(
            "Wrote {} row(s) for {} file(s) to {} and {}",
            reports.stats.rows,
            reports.stats.per_file.len(),
            out_simple.display(),
            out_detailed.display()
        );

        if self.summary {
            terminal::render_report(&reports.stats, filters.top, true);
        }

        Ok(Status::from_warning_count(reports.warnings.len()))
    }

    fn report_options(&self, max_items: Option<usize>, filters: &ReportFilterArgs) -> Result<ReportOptions> {
        let source = filters
            .source
            .clone()
            .unwrap_or_else(|| self.config.report.source.clone());

        if let Some(ref day) = filters.day {
            NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
                DiagError::InvalidOption(format!("--day must be YYYY-MM-DD, got '{}': {}", day, e))
            })?;
        }

        let provenance = if filters.day.is_some() || filters.build_version.is_some() {
            Some(Provenance {
                day: filters.day.clone().unwrap_or_default(),
                version: filters.build_version.clone().unwrap_or_default(),
            })
        } else {
            None
        };

        Ok(ReportOptions {
            source: non_empty(source).filter(|s| s != "*"),
            code: filters.code.clone().and_then(non_empty),
            message_contains: filters.message_contains.clone().and_then(non_empty),
            max_items: max_items.unwrap_or(self.config.report.max_items),
            provenance,
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_options_from_config_and_flags() {
        let engine = Engine::with_config(DiagConfig::default());

        let opts = engine.report_options(None, &ReportFilterArgs::default()).unwrap();
        assert_eq!(opts.source.as_deref(), Some("clangd"));
        assert_eq!(opts.code, None);
        assert_eq!(opts.max_items, 0);
        assert!(opts.provenance.is_none());

        let filters = ReportFilterArgs {
            source: Some("*".into()),
            code: Some(String::new()),
            build_version: Some("r42".into()),
            ..ReportFilterArgs::default()
        };
        let opts = engine.report_options(Some(5), &filters).unwrap();
        assert_eq!(opts.source, None);
        assert_eq!(opts.code, None);
        assert_eq!(opts.max_items, 5);
        assert_eq!(
            opts.provenance,
            Some(Provenance {
                day: String::new(),
                version: "r42".into()
            })
        );
    }

    #[test]
    fn test_report_options_rejects_bad_day() {
        let engine = Engine::with_config(DiagConfig::default());
        let filters = ReportFilterArgs {
            day: Some("2026-13-40".into()),
            ..ReportFilterArgs::default()
        };
        let err = engine.report_options(None, &filters).unwrap_err();
        assert!(err.to_string().contains("--day"));
    }

    #[test]
    fn test_status_combination() {
        assert_eq!(Status::Clean.and(Status::Clean), Status::Clean);
        assert_eq!(Status::Clean.and(Status::Warnings), Status::Warnings);
        assert_eq!(Status::from_warning_count(2), Status::Warnings);
    }
}
