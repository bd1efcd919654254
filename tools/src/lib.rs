//! # Tools
//!
//! This crate implements the tool contract shared by every service adapter
//! and the catalog handed to the assistant runtime.
//!
//! - **Describe**: each operation declares typed inputs and a structured output
//! - **Register**: operations are flattened into one uniquely-named catalog
//! - **Execute**: calls are validated, defaulted, timed and logged
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Tool Layer                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ToolOperation ──► ToolRegistry ──► ToolExecutor               │
//! │       │                 │                 │                     │
//! │       ▼                 ▼                 ▼                     │
//! │   ToolSpec        ToolDescriptor      ToolOutcome               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod executor;
pub mod operation;
pub mod outcome;
pub mod registry;
pub mod spec;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Result, ToolError};
pub use executor::{ToolCall, ToolCallResult, ToolExecutor};
pub use operation::{ToolDescriptor, ToolOperation};
pub use outcome::{FailureKind, OutcomeStatus, ToolFailure, ToolOutcome};
pub use registry::{RegistryStats, ToolRegistry};
pub use spec::{DataType, InputConstraints, OutputShape, OutputSpec, ToolInput, ToolOutput, ToolSpec};
