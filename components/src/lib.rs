//! # Components
//!
//! The widgets the assistant runtime can place on the canvas.
//!
//! - **[`ComponentKind`]**: `UniversalCard`, `ActionGrid`, `UnifiedTimeline`, `LiveMetricChart`
//! - **[`ComponentInstance`]**: a component bound to typed props
//! - **[`ComponentRegistry`]**: the catalog plus a renderer for each component
//!
//! Rendering targets a terminal: each component becomes a box of text lines
//! of a requested width.

pub mod error;
pub mod props;
pub mod registry;
pub mod render;

pub use error::{ComponentError, Result};
pub use props::{
    Action, ActionGridProps, CardStatus, ChartType, ComponentInstance, ComponentKind, DataPoint,
    EventType, Intent, LiveMetricChartProps, MetricPoint, TimelineEvent, UnifiedTimelineProps,
    UniversalCardProps,
};
pub use registry::{ComponentDescriptor, ComponentRegistry};
pub use render::{MIN_WIDTH, RenderFn};
