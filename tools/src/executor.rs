//! Tool execution.
//!
//! The `ToolExecutor` resolves a call against the registry, validates and
//! defaults its input, runs it and records how long it took. Batches of
//! calls run as independent tasks; nothing orders or serializes them.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, ToolError};
use crate::outcome::ToolOutcome;
use crate::registry::ToolRegistry;

/// A request to run one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier echoed back with the result.
    pub id: String,

    /// Tool name.
    pub name: String,

    /// Input object.
    pub input: Value,
}

impl ToolCall {
    /// Create a call with a fresh identifier.
    pub fn new(name: impl Into<String>, input: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            input,
        }
    }
}

/// Result of one call in a batch.
#[derive(Debug)]
pub struct ToolCallResult {
    pub call_id: String,
    pub tool_name: String,
    pub result: Result<ToolOutcome>,
}

/// Executor for registered tools.
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    /// Create an executor over `registry`.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// The registry calls are resolved against.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Execute a tool by name.
    ///
    /// Unknown tools and inputs that violate the contract are errors.
    /// Everything that happens inside the operation is reported in the
    /// returned outcome.
    pub async fn execute(&self, name: &str, input: Value) -> Result<ToolOutcome> {
        let operation = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let input = match input {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let spec = operation.spec();
        spec.validate_inputs(&input)
            .map_err(ToolError::InvalidInput)?;
        let input = spec.apply_defaults(input);

        debug!("Executing tool: {name} with inputs: {input}");

        let start = Instant::now();
        let outcome = operation.call(input).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        let outcome = outcome.with_duration(duration_ms);

        match &outcome.error {
            None => info!(
                "Tool {name} returned {:?} output in {duration_ms}ms",
                outcome.status
            ),
            Some(failure) => warn!(
                "Tool {name} failed ({}): {}",
                failure.kind, failure.message
            ),
        }

        Ok(outcome)
    }

    /// Execute a single call.
    pub async fn run(&self, call: &ToolCall) -> ToolCallResult {
        ToolCallResult {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            result: self.execute(&call.name, call.input.clone()).await,
        }
    }

    /// Start every call as its own task and report results as they finish.
    ///
    /// Results arrive in completion order, tagged with their call id. The
    /// channel closes once every task has reported. A call whose task
    /// panics still reports, as [`ToolError::ExecutionFailed`].
    pub fn dispatch(&self, calls: Vec<ToolCall>) -> mpsc::Receiver<ToolCallResult> {
        let (tx, rx) = mpsc::channel(calls.len().max(1));

        for call in calls {
            let handle = self.spawn(call.clone());
            let tx = tx.clone();
            tokio::spawn(async move {
                let call_id = call.id.clone();
                if tx.send(joined(call, handle).await).await.is_err() {
                    debug!("Result receiver dropped before call {call_id} finished");
                }
            });
        }

        rx
    }

    /// Run every call concurrently and return results in call order.
    pub async fn execute_all(&self, calls: Vec<ToolCall>) -> Vec<ToolCallResult> {
        let handles: Vec<(ToolCall, JoinHandle<ToolCallResult>)> = calls
            .into_iter()
            .map(|call| {
                let handle = self.spawn(call.clone());
                (call, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (call, handle) in handles {
            results.push(joined(call, handle).await);
        }
        results
    }

    fn spawn(&self, call: ToolCall) -> JoinHandle<ToolCallResult> {
        let executor = self.clone();
        tokio::spawn(async move { executor.run(&call).await })
    }
}

/// Wait for a spawned call, turning a panicked or cancelled task into a
/// failed result for that call.
async fn joined(call: ToolCall, handle: JoinHandle<ToolCallResult>) -> ToolCallResult {
    match handle.await {
        Ok(result) => result,
        Err(e) => {
            warn!("Task for call {} ({}) did not complete: {e}", call.id, call.name);
            ToolCallResult {
                call_id: call.id,
                tool_name: call.name,
                result: Err(ToolError::ExecutionFailed(e.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StaticTool;
    use opsflow_credentials::Service;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn executor() -> ToolExecutor {
        let registry = ToolRegistry::from_operations([
            StaticTool::arc("fast", Service::Github),
            StaticTool::new("slow", Service::Stripe)
                .with_delay(Duration::from_millis(50))
                .into_arc(),
            StaticTool::new("broken", Service::Linear)
                .panicking()
                .into_arc(),
        ])
        .unwrap();
        ToolExecutor::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_execute_applies_defaults() {
        let outcome = executor().execute("fast", Value::Null).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.output, json!({"echo": {"limit": 10}}));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let result = executor().execute("nope", json!({})).await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_call() {
        let result = executor().execute("fast", json!({"limit": "ten"})).await;
        assert!(matches!(result, Err(ToolError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_execute_all_preserves_call_order() {
        let calls = vec![
            ToolCall::new("slow", json!({"limit": 1})),
            ToolCall::new("fast", json!({"limit": 2})),
            ToolCall::new("nope", json!({})),
        ];
        let ids: Vec<_> = calls.iter().map(|c| c.id.clone()).collect();

        let results = executor().execute_all(calls).await;
        assert_eq!(
            results.iter().map(|r| r.call_id.clone()).collect::<Vec<_>>(),
            ids
        );
        assert!(results[0].result.is_ok());
        assert!(results[1].result.is_ok());
        assert!(matches!(results[2].result, Err(ToolError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_dispatch_reports_in_completion_order() {
        let calls = vec![
            ToolCall::new("slow", json!({})),
            ToolCall::new("fast", json!({})),
        ];

        let mut rx = executor().dispatch(calls);
        let mut finished = Vec::new();
        while let Some(result) = rx.recv().await {
            finished.push(result.tool_name);
        }
        assert_eq!(finished, vec!["fast".to_string(), "slow".to_string()]);
    }

    #[tokio::test]
    async fn test_panicking_call_still_reports() {
        let broken = ToolCall::new("broken", json!({}));
        let fast = ToolCall::new("fast", json!({}));
        let broken_id = broken.id.clone();

        let mut rx = executor().dispatch(vec![broken.clone(), fast]);
        let mut results = Vec::new();
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        assert_eq!(results.len(), 2);
        let failed = results
            .iter()
            .find(|result| result.call_id == broken_id)
            .unwrap();
        assert!(matches!(failed.result, Err(ToolError::ExecutionFailed(_))));

        let results = executor().execute_all(vec![broken]).await;
        assert_eq!(results[0].call_id, broken_id);
        assert!(matches!(results[0].result, Err(ToolError::ExecutionFailed(_))));
    }
}
