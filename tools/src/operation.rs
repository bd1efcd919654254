//! The tool operation trait and its catalog entry.
//!
//! An operation is a named, schema-described function the assistant runtime
//! can invoke. Service adapters provide the implementations.

use async_trait::async_trait;
use opsflow_credentials::Service;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::outcome::ToolOutcome;
use crate::spec::ToolSpec;

/// A tool operation the assistant runtime can call.
///
/// `call` receives input that has already been validated against
/// [`spec`](Self::spec) with defaults applied. It must not panic; every
/// failure is reported as a failed [`ToolOutcome`].
#[async_trait]
pub trait ToolOperation: Send + Sync {
    /// Globally unique name.
    fn name(&self) -> &str;

    /// What the operation does, for the assistant runtime.
    fn description(&self) -> &str;

    /// Service the operation talks to.
    fn service(&self) -> Service;

    /// Input and output contract.
    fn spec(&self) -> &ToolSpec;

    /// Whether the operation changes remote state (closing an issue,
    /// sending an email). Listing operations are safe to repeat.
    fn is_mutating(&self) -> bool {
        false
    }

    /// Run the operation.
    async fn call(&self, input: Value) -> ToolOutcome;

    /// Catalog entry for this operation.
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            service: self.service(),
            mutating: self.is_mutating(),
            input_schema: self.spec().input_schema(),
            output_schema: self.spec().output_schema(),
        }
    }
}

/// Serializable catalog entry handed to the assistant runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub service: Service,
    pub mutating: bool,
    pub input_schema: Value,
    pub output_schema: Value,
}
