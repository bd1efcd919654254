//! The service adapter trait and its tool wrapper.
//!
//! A [`ServiceAdapter`] knows how to talk to one provider. [`AdapterTool`]
//! wraps one of its operations as a [`ToolOperation`] and applies the
//! shared algorithm: missing credential policy, one outbound call, failures
//! as values.

use std::sync::Arc;

use async_trait::async_trait;
use opsflow_credentials::Service;
use opsflow_tools::{DataType, OutputSpec, ToolOperation, ToolOutcome, ToolOutput, ToolSpec};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::IntoEnumIterator;
use tracing::debug;

use crate::config::MissingCredentialPolicy;
use crate::error::{AdapterError, Result};

/// Static description of one adapter operation.
#[derive(Debug, Clone)]
pub struct OperationInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub spec: ToolSpec,
    pub mutating: bool,
}

/// A client for one external service.
#[async_trait]
pub trait ServiceAdapter: Send + Sync + 'static {
    /// The operations this adapter exposes.
    type Operation: Copy + std::fmt::Debug + Send + Sync + IntoEnumIterator + 'static;

    /// Service this adapter talks to.
    fn service(&self) -> Service;

    /// Whether the credential for this service is configured.
    fn is_configured(&self) -> bool;

    /// Name, description and contract of an operation.
    fn describe(&self, operation: Self::Operation) -> OperationInfo;

    /// Perform the operation against the provider.
    ///
    /// Issues exactly one outbound request and returns the normalized output.
    async fn invoke(&self, operation: Self::Operation, input: Value) -> Result<Value>;

    /// Demo output for the operation, shaped like a live result.
    fn demo(&self, operation: Self::Operation, input: &Value) -> Result<Value>;
}

/// One adapter operation exposed as a tool.
pub struct AdapterTool<A: ServiceAdapter> {
    adapter: Arc<A>,
    operation: A::Operation,
    info: OperationInfo,
    policy: MissingCredentialPolicy,
}

impl<A: ServiceAdapter> AdapterTool<A> {
    /// Wrap every operation of `adapter`.
    pub fn all(adapter: A, policy: MissingCredentialPolicy) -> Vec<Arc<dyn ToolOperation>> {
        let adapter = Arc::new(adapter);
        A::Operation::iter()
            .map(|operation| {
                let tool = Self {
                    info: adapter.describe(operation),
                    adapter: Arc::clone(&adapter),
                    operation,
                    policy,
                };
                Arc::new(tool) as Arc<dyn ToolOperation>
            })
            .collect()
    }

    fn missing_credential(&self, input: &Value) -> ToolOutcome {
        match self.policy {
            MissingCredentialPolicy::Demo => {
                debug!(
                    "{} not configured, returning demo data for {}",
                    self.adapter.service(),
                    self.info.name
                );
                match self.adapter.demo(self.operation, input) {
                    Ok(output) => ToolOutcome::demo(output),
                    Err(e) => ToolOutcome::failure(e.kind(), e.to_string()),
                }
            }
            MissingCredentialPolicy::Fail => {
                let err = AdapterError::MissingCredential(self.adapter.service().credential());
                ToolOutcome::failure(err.kind(), err.to_string())
            }
        }
    }
}

#[async_trait]
impl<A: ServiceAdapter> ToolOperation for AdapterTool<A> {
    fn name(&self) -> &str {
        self.info.name
    }

    fn description(&self) -> &str {
        self.info.description
    }

    fn service(&self) -> Service {
        self.adapter.service()
    }

    fn spec(&self) -> &ToolSpec {
        &self.info.spec
    }

    fn is_mutating(&self) -> bool {
        self.info.mutating
    }

    async fn call(&self, input: Value) -> ToolOutcome {
        if !self.adapter.is_configured() {
            return self.missing_credential(&input);
        }

        match self.adapter.invoke(self.operation, input).await {
            Ok(output) => ToolOutcome::live(output),
            Err(e) => ToolOutcome::failure(e.kind(), e.to_string()),
        }
    }
}

/// Result of an operation that changes remote state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReport {
    pub success: bool,
    pub message: String,
}

impl ActionReport {
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Demo mode reports success without touching anything.
    pub fn demo(action: impl std::fmt::Display) -> Self {
        Self::done(format!("Demo mode, nothing was changed: {action}"))
    }

    /// Output contract of a mutating operation.
    pub fn output_spec() -> OutputSpec {
        OutputSpec::object(vec![
            ToolOutput::new("success", DataType::Boolean, "Whether the change was applied"),
            ToolOutput::new("message", DataType::String, "Human-readable summary"),
        ])
    }
}

/// Deserialize a validated input object into the operation's input type.
pub(crate) fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T> {
    serde_json::from_value(input).map_err(|e| AdapterError::InvalidInput(e.to_string()))
}

/// Serialize an output record.
pub(crate) fn to_output<T: Serialize>(output: &T) -> Result<Value> {
    Ok(serde_json::to_value(output)?)
}

/// Send a request and reject non-success statuses.
///
/// The provider's own error message is kept when the body carries one
/// (`{"message": ...}` or `{"error": {"message": ...}}`).
pub(crate) async fn send(
    request: reqwest::RequestBuilder,
    context: &'static str,
) -> Result<reqwest::Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = provider_message(&body)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "request failed".to_string());

    Err(AdapterError::Api {
        context,
        status: status.as_u16(),
        message,
    })
}

/// Send a request and decode the JSON response body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    context: &'static str,
) -> Result<T> {
    let response = send(request, context).await?;
    Ok(response.json().await?)
}

fn provider_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error").and_then(|e| e.get("message")))
        .or_else(|| value.get("error_description"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
