//! Error types for credential storage.

use thiserror::Error;

/// Result type alias for credential operations.
pub type Result<T> = std::result::Result<T, CredentialError>;

/// Errors that can occur while reading or writing credentials.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// The name does not match any known credential.
    #[error("unknown credential: {0}")]
    UnknownName(String),

    /// The backing file could not be written.
    #[error("storage error: {0}")]
    Storage(String),

    /// The backing file is not valid JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
