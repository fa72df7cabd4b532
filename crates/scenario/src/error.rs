//! Error types for scenario loading.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// Required field missing or structurally malformed document
    #[error("Scenario parse error: {0}")]
    InputParse(String),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Lorebook key regex failure, surfaced from the context crate
    #[error(transparent)]
    Context(#[from] taleweave_context::ContextError),
}

/// Result type alias for scenario operations.
pub type Result<T> = std::result::Result<T, ScenarioError>;
