//! Component registry.
//!
//! Holds the catalog handed to the assistant runtime and the renderer table
//! used by the canvas. Both are checked against each other when the registry
//! is built: every component has exactly one renderer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::error::{ComponentError, Result};
use crate::props::{ComponentInstance, ComponentKind};
use crate::render::{RenderFn, renderer_table};

/// Catalog entry for one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub name: String,
    pub description: String,
    pub props_schema: Value,
}

pub struct ComponentRegistry {
    descriptors: BTreeMap<String, (ComponentKind, ComponentDescriptor)>,
    renderers: BTreeMap<ComponentKind, RenderFn>,
}

impl ComponentRegistry {
    /// Build the registry of every known component.
    pub fn new() -> Result<Self> {
        let kinds: Vec<ComponentKind> = ComponentKind::iter().collect();
        Self::build(&kinds, renderer_table())
    }

    fn build(kinds: &[ComponentKind], renderers: BTreeMap<ComponentKind, RenderFn>) -> Result<Self> {
        let mut descriptors = BTreeMap::new();
        for kind in kinds {
            let descriptor = ComponentDescriptor {
                name: kind.name().to_string(),
                description: kind.description().to_string(),
                props_schema: kind.props_schema()?,
            };
            if descriptors.contains_key(&descriptor.name) {
                return Err(ComponentError::DuplicateName(descriptor.name));
            }
            if !renderers.contains_key(kind) {
                return Err(ComponentError::RendererMismatch(format!(
                    "{kind} has no renderer"
                )));
            }
            debug!("Registered component: {kind}");
            descriptors.insert(descriptor.name.clone(), (*kind, descriptor));
        }

        if let Some(orphan) = renderers.keys().find(|kind| !kinds.contains(kind)) {
            return Err(ComponentError::RendererMismatch(format!(
                "renderer for unregistered component {orphan}"
            )));
        }

        info!("Registered {} components", descriptors.len());
        Ok(Self {
            descriptors,
            renderers,
        })
    }

    /// Catalog handed to the assistant runtime.
    pub fn catalog(&self) -> Vec<ComponentDescriptor> {
        self.descriptors
            .values()
            .map(|(_, descriptor)| descriptor.clone())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.descriptors.get(name).map(|(_, descriptor)| descriptor)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Bind `props` to the component called `name`.
    pub fn instantiate(&self, name: &str, props: Value) -> Result<ComponentInstance> {
        if !self.descriptors.contains_key(name) {
            return Err(ComponentError::UnknownComponent(name.to_string()));
        }

        serde_json::from_value(json!({ "component": name, "props": props })).map_err(|e| {
            ComponentError::InvalidProps {
                component: name.to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Render an instance into lines exactly `width` columns wide.
    pub fn render(&self, instance: &ComponentInstance, width: usize) -> Result<Vec<String>> {
        let kind = instance.kind();
        let render = self
            .renderers
            .get(&kind)
            .ok_or_else(|| ComponentError::RendererMismatch(format!("{kind} has no renderer")))?;
        Ok(render(instance, width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::UniversalCardProps;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_catalog_names() {
        let registry = ComponentRegistry::new().unwrap();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["ActionGrid", "LiveMetricChart", "UnifiedTimeline", "UniversalCard"]
        );
        let card = registry.get("UniversalCard").unwrap();
        assert!(card.props_schema["properties"]["dataPoints"].is_object());
    }

    #[test]
    fn test_duplicate_component_fails_fast() {
        let result = ComponentRegistry::build(
            &[ComponentKind::ActionGrid, ComponentKind::ActionGrid],
            renderer_table(),
        );
        assert!(matches!(result, Err(ComponentError::DuplicateName(name)) if name == "ActionGrid"));
    }

    #[test]
    fn test_missing_renderer_fails_fast() {
        let mut renderers = renderer_table();
        renderers.remove(&ComponentKind::LiveMetricChart);
        let kinds: Vec<ComponentKind> = ComponentKind::iter().collect();

        let result = ComponentRegistry::build(&kinds, renderers);
        assert!(matches!(result, Err(ComponentError::RendererMismatch(_))));
    }

    #[test]
    fn test_orphan_renderer_fails_fast() {
        let result = ComponentRegistry::build(&[ComponentKind::UniversalCard], renderer_table());
        assert!(matches!(result, Err(ComponentError::RendererMismatch(_))));
    }

    #[test]
    fn test_instantiate_and_render() {
        let registry = ComponentRegistry::new().unwrap();
        let instance = registry
            .instantiate(
                "UniversalCard",
                json!({
                    "source": "supabase",
                    "title": "alex@startup.io",
                    "status": "pending",
                    "dataPoints": [{"label": "Plan", "value": "Pro"}]
                }),
            )
            .unwrap();

        let ComponentInstance::UniversalCard(UniversalCardProps { title, .. }) = &instance else {
            panic!("expected a card, got {instance:?}");
        };
        assert_eq!(title, "alex@startup.io");

        let lines = registry.render(&instance, 32).unwrap();
        assert!(lines[0].contains("Supabase"));
    }

    #[test]
    fn test_instantiate_rejects_bad_props() {
        let registry = ComponentRegistry::new().unwrap();

        let result = registry.instantiate("LiveMetricChart", json!({"data": []}));
        assert!(matches!(result, Err(ComponentError::InvalidProps { .. })));

        let result = registry.instantiate("PieChart", json!({}));
        assert!(matches!(result, Err(ComponentError::UnknownComponent(_))));
    }
}
