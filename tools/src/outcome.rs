//! Result values returned by tool operations.
//!
//! An operation never fails with an error; it reports how it went through a
//! [`ToolOutcome`].

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Where the output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Mapped from a live provider response.
    Live,

    /// Canned demo data, substituted because no credential is configured.
    Demo,

    /// The operation did not produce a result.
    Failed,
}

/// Why an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No credential is configured for the service.
    MissingCredential,

    /// The provider answered with a non-success status or an error envelope.
    RemoteRejected,

    /// The provider answered but matched nothing.
    NotFound,

    /// Network, TLS or decode failure.
    Transport,

    /// The input could not be interpreted.
    InvalidInput,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::MissingCredential => "missing credential",
            Self::RemoteRejected => "remote rejected",
            Self::NotFound => "not found",
            Self::Transport => "transport",
            Self::InvalidInput => "invalid input",
        };
        f.write_str(label)
    }
}

/// Failure description carried by a failed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Result of running a tool operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// How the output was produced.
    pub status: OutcomeStatus,

    /// Output conforming to the operation's output contract (`null` on failure).
    pub output: Value,

    /// Failure description, present only when `status` is `failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolFailure>,

    /// Execution time in milliseconds.
    pub duration_ms: u64,
}

impl ToolOutcome {
    /// Create a result mapped from a live response.
    pub fn live(output: Value) -> Self {
        Self {
            status: OutcomeStatus::Live,
            output,
            error: None,
            duration_ms: 0,
        }
    }

    /// Create a result carrying demo data.
    pub fn demo(output: Value) -> Self {
        Self {
            status: OutcomeStatus::Demo,
            output,
            error: None,
            duration_ms: 0,
        }
    }

    /// Create a failed result.
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            output: Value::Null,
            error: Some(ToolFailure {
                kind,
                message: message.into(),
            }),
            duration_ms: 0,
        }
    }

    /// Record the execution time.
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Whether the outcome carries output (live or demo).
    pub fn is_success(&self) -> bool {
        self.status != OutcomeStatus::Failed
    }

    /// Failure message, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    /// Value handed back to the assistant runtime.
    ///
    /// Successful outcomes pass their output through unchanged. Failures
    /// become `{"error": <message>, "kind": <kind>}`.
    pub fn to_runtime_value(&self) -> Value {
        match &self.error {
            None => self.output.clone(),
            Some(failure) => json!({
                "error": failure.message,
                "kind": failure.kind,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_failure_runtime_value() {
        let outcome = ToolOutcome::failure(FailureKind::NotFound, "No customer found with that email");
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.to_runtime_value(),
            json!({"error": "No customer found with that email", "kind": "not_found"})
        );
    }

    #[test]
    fn test_success_passes_output_through() {
        let outcome = ToolOutcome::demo(json!([{"id": 1}])).with_duration(4);
        assert!(outcome.is_success());
        assert_eq!(outcome.duration_ms, 4);
        assert_eq!(outcome.to_runtime_value(), json!([{"id": 1}]));
        assert_eq!(outcome.error_message(), None);
    }
}
