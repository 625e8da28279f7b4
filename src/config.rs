use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::report::document::DEFAULT_MAX_DOCUMENT_BYTES;

pub const CONFIG_FILE_NAME: &str = ".diagmerge.toml";

/// diagmerge configuration (loaded from .diagmerge.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagConfig {
    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Skip chunk files larger than this (bytes, 0 = unlimited)
    #[serde(default)]
    pub max_input_bytes: u64,

    /// Stop merging after this many diagnostics (0 = unlimited)
    #[serde(default)]
    pub max_items: usize,

    /// File name pattern used with --inputs-dir
    #[serde(default = "default_glob")]
    pub glob: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Render at most this many diagnostics (0 = unlimited)
    #[serde(default)]
    pub max_items: usize,

    /// Refuse merged documents larger than this (bytes, must be > 0)
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: u64,

    /// Keep only diagnostics from this source ("*" = all)
    #[serde(default = "default_source")]
    pub source: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        MergeConfig {
            max_input_bytes: 0,
            max_items: 0,
            glob: default_glob(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            max_items: 0,
            max_document_bytes: default_max_document_bytes(),
            source: default_source(),
        }
    }
}

fn default_glob() -> String {
    "*.json".to_string()
}

fn default_max_document_bytes() -> u64 {
    DEFAULT_MAX_DOCUMENT_BYTES
}

fn default_source() -> String {
    "clangd".to_string()
}

impl DiagConfig {
    /// Load an explicit config file, or search upward from `start`.
    /// Missing or unparsable files fall back to defaults.
    pub fn load(explicit: Option<&Path>, start: &Path) -> Self {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match find_config_file(start) {
                Some(path) => path,
                None => {
                    debug!("No {} found; using defaults", CONFIG_FILE_NAME);
                    return DiagConfig::default();
                }
            },
        };
        debug!("Found config: {}", config_path.display());

        match std::fs::read_to_string(&config_path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", config_path.display(), e);
                    DiagConfig::default()
                }
            },
            Err(e) => {
                tracing::warn!("Could not read {}: {}", config_path.display(), e);
                DiagConfig::default()
            }
        }
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str::<DiagConfig>(content)
    }
}

/// Walk up from `start` to find .diagmerge.toml
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let config = current.join(CONFIG_FILE_NAME);
        if config.is_file() {
            return Some(config);
        }
        if !current.pop() {
            return None;
        }
    }
}

const DEFAULT_CONFIG: &str = r#"# diagmerge configuration
# Command-line flags take precedence over these values.

[merge]
# Skip chunk exports larger than this many bytes (0 = no limit)
max_input_bytes = 0

# Stop merging after this many diagnostics (0 = no limit)
max_items = 0

# File name pattern used with --inputs-dir
glob = "*.json"

[report]
# Render at most this many diagnostics into the CSVs (0 = no limit)
max_items = 0

# Refuse merged documents larger than this many bytes (100 MiB, 0 is rejected)
max_document_bytes = 104857600

# Keep only diagnostics from this source; "*" keeps everything
source = "clangd"
"#;

/// Create a default .diagmerge.toml in `dir`. Returns false if one exists.
pub fn init_config(dir: &Path) -> Result<bool> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        println!("{} already exists in this directory", CONFIG_FILE_NAME);
        return Ok(false);
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    println!("Created {}", CONFIG_FILE_NAME);
    println!("   Edit it to customize merge and report limits.");

    Ok(true)
}
