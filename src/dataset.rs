//! Dataset loading and selection
//!
//! A dataset file holds a single JSON value. When the experimenter does not
//! name a dataset, one of the configured candidates is drawn at random.

use crate::nested::NestedValue;
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that prevent a dataset from being used
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read dataset {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dataset {} is not valid JSON: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No candidate datasets configured")]
    NoCandidates,
}

/// Result type for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;

/// A dataset ready to start a session with
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    /// Identifier written to the results log (the path as given)
    pub id: String,
    pub value: NestedValue,
}

/// Parse dataset text
pub fn parse_dataset(text: &str, path: &Path) -> Result<NestedValue> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|source| DatasetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(NestedValue::from(value))
}

/// Read and decode the dataset at `path`
pub fn load_dataset(path: &Path) -> Result<LoadedDataset> {
    let text = std::fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value = parse_dataset(&text, path)?;
    tracing::debug!(path = %path.display(), "dataset loaded");
    Ok(LoadedDataset {
        id: path.display().to_string(),
        value,
    })
}

/// Draw one candidate uniformly at random
pub fn choose_dataset<'a, R: Rng + ?Sized>(
    candidates: &'a [PathBuf],
    rng: &mut R,
) -> Result<&'a Path> {
    candidates
        .choose(rng)
        .map(PathBuf::as_path)
        .ok_or(DatasetError::NoCandidates)
}
