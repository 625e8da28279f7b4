use std::fmt;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::diagnostics::{self, RawDiagnostic};
use crate::error::{DiagError, Result};
use crate::report::atomic::AtomicFile;

/// Resource limits for a merge. `0` disables a limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeLimits {
    /// Chunk files larger than this are skipped whole
    pub max_input_bytes: u64,
    /// Global cap on merged records; merging stops once reached
    pub max_items: usize,
}

/// Non-fatal conditions met while merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeWarning {
    Oversized { path: PathBuf, size: u64, limit: u64 },
    Unreadable { path: PathBuf, error: String },
    Truncated { path: PathBuf, kept: usize, limit: usize, unprocessed: usize },
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeWarning::Oversized { path, size, limit } => write!(
                f,
                "skipped {}: {} bytes exceeds limit of {} bytes",
                path.display(),
                size,
                limit
            ),
            MergeWarning::Unreadable { path, error } => {
                write!(f, "failed to read {}: {}", path.display(), error)
            }
            MergeWarning::Truncated { path, kept, limit, unprocessed } => write!(
                f,
                "item limit {} reached in {} (kept {} of its records); {} remaining input file(s) not processed",
                limit,
                path.display(),
                kept,
                unprocessed
            ),
        }
    }
}

/// Result of merging chunk exports.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// Records in input-file order, each file's records in original order
    pub records: Vec<RawDiagnostic>,
    pub warnings: Vec<MergeWarning>,
    pub files_read: usize,
    pub files_failed: usize,
}

impl MergeOutcome {
    pub fn truncated(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, MergeWarning::Truncated { .. }))
    }
}

/// Merge chunk export files into one bounded record list.
///
/// Per-file failures (too large, unreadable, invalid JSON) skip that file and
/// add a warning. Hitting `max_items` keeps a prefix of the current file's
/// records and stops before any later file is opened, including when a file
/// fills the cap exactly.
pub fn merge_files(inputs: &[PathBuf], limits: &MergeLimits) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for (idx, path) in inputs.iter().enumerate() {
        let mut batch = match read_chunk(path, limits.max_input_bytes) {
            Ok(batch) => batch,
            Err(warning) => {
                debug!("{}", warning);
                outcome.files_failed += 1;
                outcome.warnings.push(warning);
                continue;
            }
        };
        outcome.files_read += 1;
        debug!("{}: {} record(s)", path.display(), batch.len());

        let unprocessed = inputs.len() - idx - 1;
        if limits.max_items > 0 && outcome.records.len() + batch.len() > limits.max_items {
            let kept = limits.max_items - outcome.records.len();
            batch.truncate(kept);
            outcome.records.extend(batch);
            outcome.warnings.push(MergeWarning::Truncated {
                path: path.clone(),
                kept,
                limit: limits.max_items,
                unprocessed,
            });
            break;
        }

        let kept = batch.len();
        outcome.records.extend(batch);

        // cap filled exactly: later files are not opened at all
        if limits.max_items > 0 && outcome.records.len() == limits.max_items && unprocessed > 0 {
            outcome.warnings.push(MergeWarning::Truncated {
                path: path.clone(),
                kept,
                limit: limits.max_items,
                unprocessed,
            });
            break;
        }
    }

    outcome
}

/// Read and extract one chunk. The size limit is checked against metadata
/// before the file is read, and the read itself is capped so a file growing
/// underneath us cannot exceed it either.
fn read_chunk(path: &Path, max_bytes: u64) -> std::result::Result<Vec<RawDiagnostic>, MergeWarning> {
    let unreadable = |error: String| MergeWarning::Unreadable {
        path: path.to_path_buf(),
        error,
    };

    let size = fs::metadata(path).map_err(|e| unreadable(e.to_string()))?.len();
    if max_bytes > 0 && size > max_bytes {
        return Err(MergeWarning::Oversized {
            path: path.to_path_buf(),
            size,
            limit: max_bytes,
        });
    }

    let file = File::open(path).map_err(|e| unreadable(e.to_string()))?;
    let mut bytes = Vec::with_capacity(size as usize);
    if max_bytes > 0 {
        file.take(max_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| unreadable(e.to_string()))?;
        if bytes.len() as u64 > max_bytes {
            return Err(MergeWarning::Oversized {
                path: path.to_path_buf(),
                size: bytes.len() as u64,
                limit: max_bytes,
            });
        }
    } else {
        let mut file = file;
        file.read_to_end(&mut bytes)
            .map_err(|e| unreadable(e.to_string()))?;
    }

    let doc = serde_json::from_slice(&bytes).map_err(|e| unreadable(format!("invalid JSON: {}", e)))?;
    Ok(diagnostics::extract(doc))
}

/// Persist merged records as a bare JSON array.
pub fn write_merged(path: &Path, records: &[RawDiagnostic]) -> Result<()> {
    let mut out = AtomicFile::create(path)?;
    serde_json::to_writer(&mut out, records).map_err(|source| DiagError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    out.flush().map_err(|e| DiagError::io(path, e))?;
    out.commit()
}

/// Merge `inputs` and write the result to `output`.
pub fn merge(inputs: &[PathBuf], limits: &MergeLimits, output: &Path) -> Result<MergeOutcome> {
    let outcome = merge_files(inputs, limits);
    write_merged(output, &outcome.records)?;
    Ok(outcome)
}
