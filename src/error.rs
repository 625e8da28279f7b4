use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions. Anything that only affects one chunk file during a merge
/// is reported as a [`crate::report::merger::MergeWarning`] instead.
#[derive(Debug, Error)]
pub enum DiagError {
    #[error("input document too large: {path} ({size} bytes, limit {limit} bytes)")]
    DocumentTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed CSV {path}: {reason}")]
    MalformedCsv { path: PathBuf, reason: String },

    #[error("no input files found")]
    NoInputs,

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

impl DiagError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DiagError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, DiagError>;
