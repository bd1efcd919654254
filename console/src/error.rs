//! Error types for the console.

use thiserror::Error;

/// Result type alias for console operations.
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Errors that can occur in the console.
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Credential store error.
    #[error("credential error: {0}")]
    Credential(#[from] opsflow_credentials::CredentialError),

    /// Tool layer error.
    #[error("tool error: {0}")]
    Tool(#[from] opsflow_tools::ToolError),

    /// Component registry error.
    #[error("component error: {0}")]
    Component(#[from] opsflow_components::ComponentError),

    /// The assistant runtime could not answer.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
