//! Error types for the component registry.

use thiserror::Error;

/// Result type alias for component operations.
pub type Result<T> = std::result::Result<T, ComponentError>;

/// Errors that can occur when building or using the component registry.
#[derive(Error, Debug)]
pub enum ComponentError {
    /// No component with this name.
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// Two descriptors share a name.
    #[error("duplicate component name: {0}")]
    DuplicateName(String),

    /// A component has no renderer, or a renderer has no component.
    #[error("renderer table mismatch: {0}")]
    RendererMismatch(String),

    /// Props do not satisfy the component's contract.
    #[error("invalid props for {component}: {message}")]
    InvalidProps { component: String, message: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
