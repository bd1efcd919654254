//! Tool registry.
//!
//! The `ToolRegistry` flattens every adapter's operations into one catalog
//! keyed by name. It is assembled once at startup and rejects collisions.

use std::collections::BTreeMap;
use std::sync::Arc;

use opsflow_credentials::Service;
use tracing::{debug, info};

use crate::error::{Result, ToolError};
use crate::operation::{ToolDescriptor, ToolOperation};

/// Catalog of available tool operations.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    operations: BTreeMap<String, Arc<dyn ToolOperation>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, failing on the first duplicate or malformed name.
    pub fn from_operations(
        operations: impl IntoIterator<Item = Arc<dyn ToolOperation>>,
    ) -> Result<Self> {
        let mut registry = Self::new();
        for operation in operations {
            registry.register(operation)?;
        }
        info!("Registered {} tools", registry.len());
        Ok(registry)
    }

    /// Register an operation.
    pub fn register(&mut self, operation: Arc<dyn ToolOperation>) -> Result<()> {
        let name = operation.name().to_string();
        validate_name(&name)?;

        if self.operations.contains_key(&name) {
            return Err(ToolError::DuplicateName(name));
        }

        debug!("Registered tool: {name}");
        self.operations.insert(name, operation);
        Ok(())
    }

    /// Get an operation by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolOperation>> {
        self.operations.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Operation names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Full catalog handed to the assistant runtime.
    pub fn catalog(&self) -> Vec<ToolDescriptor> {
        self.operations.values().map(|op| op.descriptor()).collect()
    }

    /// Catalog entries for one service.
    pub fn list_by_service(&self, service: Service) -> Vec<ToolDescriptor> {
        self.operations
            .values()
            .filter(|op| op.service() == service)
            .map(|op| op.descriptor())
            .collect()
    }

    /// Search operations by name or description.
    pub fn search(&self, query: &str) -> Vec<ToolDescriptor> {
        let query_lower = query.to_lowercase();
        self.operations
            .values()
            .filter(|op| {
                op.name().to_lowercase().contains(&query_lower)
                    || op.description().to_lowercase().contains(&query_lower)
            })
            .map(|op| op.descriptor())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Get statistics about the registry.
    pub fn stats(&self) -> RegistryStats {
        let mut by_service = BTreeMap::new();
        for op in self.operations.values() {
            *by_service.entry(op.service()).or_insert(0) += 1;
        }

        RegistryStats {
            total_tools: self.operations.len(),
            by_service,
            mutating: self.operations.values().filter(|op| op.is_mutating()).count(),
        }
    }
}

/// Names must be usable as function-calling identifiers.
fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(ToolError::InvalidDefinition(format!(
            "tool name {name:?} must be 1-64 characters of [A-Za-z0-9_-]"
        )))
    }
}

/// Statistics about the tool registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    /// Total number of tools.
    pub total_tools: usize,

    /// Tools per service.
    pub by_service: BTreeMap<Service, usize>,

    /// Tools that change remote state.
    pub mutating: usize,
}
