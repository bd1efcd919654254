//! Error types for service adapters.
//!
//! Adapter errors never leave the crate as errors: [`AdapterTool`] turns
//! each one into a failed outcome using [`AdapterError::kind`].
//!
//! [`AdapterTool`]: crate::AdapterTool

use opsflow_credentials::CredentialName;
use opsflow_tools::FailureKind;
use thiserror::Error;

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors that can occur while talking to a provider.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// No credential configured for the service.
    #[error("{} not configured. Add it with `opsflow credentials set {}`", .0.label(), .0)]
    MissingCredential(CredentialName),

    /// Provider answered with a non-success status.
    #[error("{context} (HTTP {status}): {message}")]
    Api {
        context: &'static str,
        status: u16,
        message: String,
    },

    /// Provider answered 2xx with an error envelope.
    #[error("{0}")]
    Provider(String),

    /// Provider matched nothing.
    #[error("{0}")]
    NotFound(String),

    /// Input could not be interpreted by the adapter.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Provider response did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// HTTP error.
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdapterError {
    /// Failure kind reported in the tool outcome.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingCredential(_) => FailureKind::MissingCredential,
            Self::Api { .. } | Self::Provider(_) => FailureKind::RemoteRejected,
            Self::NotFound(_) => FailureKind::NotFound,
            Self::InvalidInput(_) => FailureKind::InvalidInput,
            Self::InvalidResponse(_) | Self::Http(_) | Self::Serialization(_) => {
                FailureKind::Transport
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kinds() {
        assert_eq!(
            AdapterError::MissingCredential(CredentialName::Github).kind(),
            FailureKind::MissingCredential
        );
        assert_eq!(
            AdapterError::Provider("Entity not found".into()).kind(),
            FailureKind::RemoteRejected
        );
        assert_eq!(
            AdapterError::InvalidResponse("no data".into()).kind(),
            FailureKind::Transport
        );
    }

    #[test]
    fn test_api_message() {
        let err = AdapterError::Api {
            context: "Failed to fetch issues",
            status: 404,
            message: "Not Found".into(),
        };
        assert_eq!(err.to_string(), "Failed to fetch issues (HTTP 404): Not Found");
    }
}
