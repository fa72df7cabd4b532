//! Error types for context assembly.

use thiserror::Error;

/// Main error type for context operations.
#[derive(Error, Debug)]
pub enum ContextError {
    /// A lorebook key does not form a valid regex
    #[error("Invalid lorebook key '{key}': {err}")]
    RegexCompile {
        key: String,
        #[source]
        err: regex::Error,
    },
}

/// Result type alias for context operations.
pub type Result<T> = std::result::Result<T, ContextError>;
