//! Error taxonomy for resource loading and pipeline setup
//!
//! Per-sample conditions (no match found, empty description) are not errors;
//! they are reported through status tags on the emitted record. Everything
//! here is a load-time or I/O failure.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("input error: {0}")]
    Input(String),

    #[error("resource error: {path}: {message}")]
    Resource { path: PathBuf, message: String },

    #[error("ontology load error: {0}")]
    OntologyLoad(String),

    #[error("cycle detected in parent index involving {0}")]
    CycleDetected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MapError {
    /// Convenience constructor for resource-file failures.
    pub fn resource(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        MapError::Resource {
            path: path.into(),
            message: message.into(),
        }
    }
}
