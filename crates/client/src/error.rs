//! Error types for the generator client.

use thiserror::Error;

/// Main error type for client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure or non-201 status after retry exhaustion
    #[error("Generator transport error: {0}")]
    Transport(String),

    /// The server reported an application error
    #[error("Generator error [{status}]: {message}")]
    Server { status: i64, message: String },

    /// Response payload could not be decoded
    #[error("Response decode error: {0}")]
    Decode(String),

    /// Missing credentials
    #[error("Missing credentials: {0}")]
    Auth(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
