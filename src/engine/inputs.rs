use std::path::{Path, PathBuf};

use globset::Glob;
use ignore::WalkBuilder;
use tracing::debug;

use crate::error::{DiagError, Result};

/// Split a comma-separated `--inputs` value, keeping the given order.
pub fn parse_inputs_list(inputs: &str) -> Vec<PathBuf> {
    inputs
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Chunk exports directly inside `dir` whose file name matches `pattern`,
/// sorted by path so merge order is reproducible.
pub fn list_inputs_dir(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = Glob::new(pattern)
        .map_err(|e| DiagError::InvalidOption(format!("invalid glob '{}': {}", pattern, e)))?
        .compile_matcher();

    let mut builder = WalkBuilder::new(dir);
    builder
        .standard_filters(false) // exports are often gitignored
        .follow_links(false)
        .max_depth(Some(1));

    let mut files = Vec::new();
    for entry in builder.build() {
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                    continue;
                }
                let matches = entry
                    .path()
                    .file_name()
                    .is_some_and(|name| matcher.is_match(name));
                if matches {
                    files.push(entry.into_path());
                }
            }
            Err(e) => {
                debug!("Walk error: {}", e);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Inputs split into files that can be merged and paths that were dropped.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResolvedInputs {
    pub files: Vec<PathBuf>,
    /// Missing paths or paths that are not regular files
    pub missing: Vec<PathBuf>,
}

/// Separate existing regular files from everything else. No usable file is fatal.
pub fn existing_files(candidates: Vec<PathBuf>) -> Result<ResolvedInputs> {
    let (files, missing): (Vec<PathBuf>, Vec<PathBuf>) =
        candidates.into_iter().partition(|p| p.is_file());

    for path in &missing {
        debug!("Input not found or not a file: {}", path.display());
    }

    if files.is_empty() {
        return Err(DiagError::NoInputs);
    }
    Ok(ResolvedInputs { files, missing })
}
