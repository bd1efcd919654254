//! Component kinds and their prop contracts.
//!
//! Prop names are camelCase on the wire. Doc comments on the prop types
//! become descriptions in the generated JSON schemas.

use opsflow_credentials::Service;
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::EnumIter;

use crate::error::Result;

/// The components the canvas can render.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
pub enum ComponentKind {
    UniversalCard,
    ActionGrid,
    UnifiedTimeline,
    LiveMetricChart,
}

impl ComponentKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::UniversalCard => "UniversalCard",
            Self::ActionGrid => "ActionGrid",
            Self::UnifiedTimeline => "UnifiedTimeline",
            Self::LiveMetricChart => "LiveMetricChart",
        }
    }

    /// What the component shows, for the assistant runtime.
    pub fn description(&self) -> &'static str {
        match self {
            Self::UniversalCard => {
                "Display data from any source (GitHub, Stripe, Supabase, Linear, Resend) in a styled card with status indicators"
            }
            Self::ActionGrid => {
                "Display a grid of action buttons with different intents (primary, danger, success) for user to take actions"
            }
            Self::UnifiedTimeline => {
                "Display a timeline of events from multiple sources interleaved chronologically"
            }
            Self::LiveMetricChart => "Display a chart visualization of numeric data",
        }
    }

    /// JSON schema of the component's props.
    pub fn props_schema(&self) -> Result<Value> {
        match self {
            Self::UniversalCard => schema_for::<UniversalCardProps>(),
            Self::ActionGrid => schema_for::<ActionGridProps>(),
            Self::UnifiedTimeline => schema_for::<UnifiedTimelineProps>(),
            Self::LiveMetricChart => schema_for::<LiveMetricChartProps>(),
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn schema_for<T: JsonSchema>() -> Result<Value> {
    let schema = SchemaSettings::draft07()
        .with(|settings| settings.inline_subschemas = true)
        .into_generator()
        .into_root_schema_for::<T>();
    Ok(serde_json::to_value(schema)?)
}

/// A component bound to concrete props.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "component", content = "props")]
pub enum ComponentInstance {
    UniversalCard(UniversalCardProps),
    ActionGrid(ActionGridProps),
    UnifiedTimeline(UnifiedTimelineProps),
    LiveMetricChart(LiveMetricChartProps),
}

impl ComponentInstance {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::UniversalCard(_) => ComponentKind::UniversalCard,
            Self::ActionGrid(_) => ComponentKind::ActionGrid,
            Self::UnifiedTimeline(_) => ComponentKind::UnifiedTimeline,
            Self::LiveMetricChart(_) => ComponentKind::LiveMetricChart,
        }
    }
}

/// Status badge on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Success,
    Error,
    Warning,
    Pending,
}

/// A labelled value on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DataPoint {
    pub label: String,
    pub value: String,
}

impl DataPoint {
    pub fn new(label: impl Into<String>, value: impl ToString) -> Self {
        Self {
            label: label.into(),
            value: value.to_string(),
        }
    }
}

/// Data from one service in a card with a status indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UniversalCardProps {
    /// Data source.
    pub source: Service,
    /// Card title.
    pub title: String,
    /// Card subtitle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Status indicator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CardStatus>,
    /// Key-value data points to display.
    pub data_points: Vec<DataPoint>,
}

/// Visual weight of an action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Primary,
    Success,
    Warning,
    Danger,
    Default,
}

/// One action button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: String,
    pub label: String,
    pub intent: Intent,
    /// Icon name: zap, refresh, rollback, send, delete, add, check, warning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_loading: Option<bool>,
}

/// A grid of actions the user can take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ActionGridProps {
    pub actions: Vec<Action>,
}

/// Severity of a timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Info,
    Success,
    Error,
    Warning,
}

/// One entry on a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TimelineEvent {
    pub id: String,
    pub source: Service,
    pub timestamp: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EventType,
}

/// Events from several services, interleaved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UnifiedTimelineProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub events: Vec<TimelineEvent>,
}

/// Chart style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
    Area,
}

/// One point of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetricPoint {
    pub name: String,
    pub value: f64,
}

/// A numeric series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LiveMetricChartProps {
    pub title: String,
    pub data: Vec<MetricPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartType>,
    /// Hex color for the chart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Unit suffix for values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_instance_wire_format() {
        let instance = ComponentInstance::UniversalCard(UniversalCardProps {
            source: Service::Stripe,
            title: "Alex Thompson".to_string(),
            subtitle: None,
            status: Some(CardStatus::Success),
            data_points: vec![DataPoint::new("Balance", "$-50.00")],
        });

        assert_eq!(
            serde_json::to_value(&instance).unwrap(),
            json!({
                "component": "UniversalCard",
                "props": {
                    "source": "stripe",
                    "title": "Alex Thompson",
                    "status": "success",
                    "dataPoints": [{"label": "Balance", "value": "$-50.00"}]
                }
            })
        );
    }

    #[test]
    fn test_timeline_event_type_field() {
        let event: TimelineEvent = serde_json::from_value(json!({
            "id": "7",
            "source": "stripe",
            "timestamp": "10:15 AM",
            "description": "Refund processed for $99.00",
            "type": "warning"
        }))
        .unwrap();
        assert_eq!(event.kind, EventType::Warning);
    }

    #[test]
    fn test_props_schema_uses_camel_case() {
        let schema = ComponentKind::LiveMetricChart.props_schema().unwrap();
        let properties = schema["properties"].as_object().unwrap();
        assert!(properties.contains_key("chartType"));
        assert_eq!(schema["required"], json!(["data", "title"]));
    }
}
