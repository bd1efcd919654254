//! Error types for the tool layer.
//!
//! These cover misuse of the registry and executor. Failures of the remote
//! services never appear here; they are reported inside a
//! [`ToolOutcome`](crate::ToolOutcome).

use thiserror::Error;

/// Result type alias for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors that can occur in the tool layer.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Tool not found.
    #[error("tool not found: {0}")]
    NotFound(String),

    /// Two operations were registered under the same name.
    #[error("duplicate tool name: {0}")]
    DuplicateName(String),

    /// Invalid tool definition.
    #[error("invalid tool definition: {0}")]
    InvalidDefinition(String),

    /// Invalid tool input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The task running the call did not complete.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}
