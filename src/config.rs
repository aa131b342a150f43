//! Experiment configuration
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! file (or no file) is a valid configuration.
//!
//! ```toml
//! datasets = ["data/synthetic_data.json", "data/filesystem_data.json"]
//! results_path = "results.json"
//! tick_interval_ms = 1000
//! histogram_bins = 10
//! ```

use crate::aggregate::DEFAULT_BIN_COUNT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings shared by the `run` and `analyze` commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Candidate datasets; one is drawn per session unless given explicitly
    #[serde(default = "default_datasets")]
    pub datasets: Vec<PathBuf>,

    /// Line-delimited results log
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,

    /// Live timer interval in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Number of histogram bins in analysis reports
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
}

fn default_datasets() -> Vec<PathBuf> {
    vec![
        PathBuf::from("data/synthetic_data.json"),
        PathBuf::from("data/filesystem_data.json"),
        PathBuf::from("data/biological_taxonomy.json"),
    ]
}

fn default_results_path() -> PathBuf {
    PathBuf::from("results.json")
}

fn default_tick_interval() -> u64 {
    1000
}

fn default_histogram_bins() -> usize {
    DEFAULT_BIN_COUNT
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            datasets: default_datasets(),
            results_path: default_results_path(),
            tick_interval_ms: default_tick_interval(),
            histogram_bins: default_histogram_bins(),
        }
    }
}

impl ExperimentConfig {
    /// Parse TOML text
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text, path)?;
        tracing::debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Validate configuration
    ///
    /// An empty `datasets` list is accepted here; it only matters for a
    /// `run` without an explicit dataset, which reports it then.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be > 0".to_string(),
            ));
        }

        if self.histogram_bins == 0 {
            return Err(ConfigError::Invalid(
                "histogram_bins must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
