//! Operations used by the unit tests of this crate.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use opsflow_credentials::Service;
use serde_json::{Value, json};

use crate::operation::ToolOperation;
use crate::outcome::ToolOutcome;
use crate::spec::{DataType, OutputSpec, ToolInput, ToolOutput, ToolSpec};

/// Echoes its input after an optional delay, or panics when told to.
pub(crate) struct StaticTool {
    name: String,
    service: Service,
    spec: ToolSpec,
    mutating: bool,
    delay: Duration,
    panics: bool,
}

impl StaticTool {
    pub(crate) fn new(name: &str, service: Service) -> Self {
        Self {
            name: name.to_string(),
            service,
            spec: ToolSpec::new()
                .with_input(
                    ToolInput::optional("limit", DataType::Integer, "Limit")
                        .with_default(json!(10)),
                )
                .with_output(OutputSpec::object(vec![ToolOutput::new(
                    "echo",
                    DataType::Object,
                    "Input received",
                )])),
            mutating: false,
            delay: Duration::ZERO,
            panics: false,
        }
    }

    pub(crate) fn arc(name: &str, service: Service) -> Arc<dyn ToolOperation> {
        Self::new(name, service).into_arc()
    }

    pub(crate) fn mutating(mut self) -> Self {
        self.mutating = true;
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    pub(crate) fn into_arc(self) -> Arc<dyn ToolOperation> {
        Arc::new(self)
    }
}

#[async_trait]
impl ToolOperation for StaticTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Echo tool for tests"
    }

    fn service(&self) -> Service {
        self.service
    }

    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    fn is_mutating(&self) -> bool {
        self.mutating
    }

    async fn call(&self, input: Value) -> ToolOutcome {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.panics {
            panic!("{} blew up", self.name);
        }
        ToolOutcome::live(json!({ "echo": input }))
    }
}
