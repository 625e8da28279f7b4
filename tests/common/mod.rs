//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

/// Builder for a scratch directory holding chunk exports
pub struct ChunkDirBuilder {
    temp_dir: TempDir,
}

impl ChunkDirBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a chunk export serialized from `doc`
    pub fn with_chunk(self, name: &str, doc: &Value) -> Self {
        let bytes = serde_json::to_vec(doc).expect("Failed to serialize chunk");
        fs::write(self.temp_dir.path().join(name), bytes).expect("Failed to write chunk");
        self
    }

    /// Write a chunk export with raw (possibly invalid) content
    pub fn with_raw_chunk(self, name: &str, content: &str) -> Self {
        fs::write(self.temp_dir.path().join(name), content).expect("Failed to write chunk");
        self
    }

    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

pub fn chunk_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

/// Parse a `;`-separated CSV written with `\r\n` row endings (no embedded newlines)
pub fn read_rows(path: &Path) -> Vec<Vec<String>> {
    fs::read_to_string(path)
        .expect("Failed to read CSV")
        .split("\r\n")
        .filter(|line| !line.is_empty())
        .map(|line| line.split(';').map(str::to_string).collect())
        .collect()
}
