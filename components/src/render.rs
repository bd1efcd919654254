//! Plain-text renderers.
//!
//! Each renderer draws one component into a box exactly `width` columns
//! wide. Widths are counted in chars.

use std::collections::BTreeMap;

use crate::props::{
    Action, ActionGridProps, CardStatus, ChartType, ComponentInstance, ComponentKind, EventType,
    Intent, LiveMetricChartProps, UnifiedTimelineProps, UniversalCardProps,
};

/// Narrowest box a renderer will draw.
pub const MIN_WIDTH: usize = 24;

const BAR_CHAR: char = '█';

/// Draws a component into lines of text.
pub type RenderFn = fn(&ComponentInstance, usize) -> Vec<String>;

/// The renderer for each component kind.
pub fn renderer_table() -> BTreeMap<ComponentKind, RenderFn> {
    let mut table: BTreeMap<ComponentKind, RenderFn> = BTreeMap::new();
    table.insert(ComponentKind::UniversalCard, |instance, width| match instance {
        ComponentInstance::UniversalCard(props) => universal_card(props, width),
        other => mismatch(other, width),
    });
    table.insert(ComponentKind::ActionGrid, |instance, width| match instance {
        ComponentInstance::ActionGrid(props) => action_grid(props, width),
        other => mismatch(other, width),
    });
    table.insert(ComponentKind::UnifiedTimeline, |instance, width| match instance {
        ComponentInstance::UnifiedTimeline(props) => unified_timeline(props, width),
        other => mismatch(other, width),
    });
    table.insert(ComponentKind::LiveMetricChart, |instance, width| match instance {
        ComponentInstance::LiveMetricChart(props) => live_metric_chart(props, width),
        other => mismatch(other, width),
    });
    table
}

fn mismatch(instance: &ComponentInstance, width: usize) -> Vec<String> {
    boxed(instance.kind().name(), None, vec!["(no renderer)".to_string()], width)
}

pub fn universal_card(props: &UniversalCardProps, width: usize) -> Vec<String> {
    let inner = inner_width(width);
    let mut body = vec![truncate(&props.title, inner)];
    if let Some(subtitle) = &props.subtitle {
        body.push(truncate(subtitle, inner));
    }
    if !props.data_points.is_empty() {
        body.push(String::new());
    }
    for point in &props.data_points {
        body.push(label_value(&point.label, &point.value, inner));
    }

    let badge = props.status.map(|status| match status {
        CardStatus::Success => "✓ success",
        CardStatus::Error => "✗ error",
        CardStatus::Warning => "! warning",
        CardStatus::Pending => "… pending",
    });
    boxed(props.source.label(), badge, body, width)
}

pub fn action_grid(props: &ActionGridProps, width: usize) -> Vec<String> {
    let inner = inner_width(width);
    let cell = inner.saturating_sub(1) / 2;

    let body = if props.actions.is_empty() {
        vec!["No actions available".to_string()]
    } else {
        props
            .actions
            .chunks(2)
            .map(|row| {
                let cells: Vec<String> = row.iter().map(|action| button(action, cell)).collect();
                cells.join(" ")
            })
            .collect()
    };

    boxed("Available Actions", None, body, width)
}

fn button(action: &Action, width: usize) -> String {
    let marker = if action.is_loading.unwrap_or(false) {
        '↻'
    } else {
        match action.intent {
            Intent::Primary => '▶',
            Intent::Success => '✓',
            Intent::Warning => '!',
            Intent::Danger => '✗',
            Intent::Default => '·',
        }
    };
    let label = truncate(&action.label, width.saturating_sub(4));
    pad(&format!("[{marker} {label}]"), width)
}

pub fn unified_timeline(props: &UnifiedTimelineProps, width: usize) -> Vec<String> {
    let inner = inner_width(width);
    let title = props.title.as_deref().unwrap_or("Activity Timeline");

    let mut body = Vec::with_capacity(props.events.len() * 2);
    for (index, event) in props.events.iter().enumerate() {
        let dot = match event.kind {
            EventType::Info => '●',
            EventType::Success => '✓',
            EventType::Error => '✗',
            EventType::Warning => '!',
        };
        let rail = if index + 1 == props.events.len() { ' ' } else { '│' };
        body.push(truncate(
            &format!("{dot} {} • {}", event.source.label(), event.timestamp),
            inner,
        ));
        body.push(truncate(&format!("{rail} {}", event.description), inner));
    }
    if body.is_empty() {
        body.push("No events".to_string());
    }

    boxed(title, None, body, width)
}

pub fn live_metric_chart(props: &LiveMetricChartProps, width: usize) -> Vec<String> {
    let inner = inner_width(width);
    let unit = props.unit.as_deref().unwrap_or("");
    let chart_type = match props.chart_type.unwrap_or_default() {
        ChartType::Line => "line",
        ChartType::Bar => "bar",
        ChartType::Area => "area",
    };

    let name_width = props
        .data
        .iter()
        .map(|point| point.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(inner / 3);
    let labels: Vec<String> = props
        .data
        .iter()
        .map(|point| format!("{}{unit}", format_number(point.value)))
        .collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let bar_space = inner.saturating_sub(name_width + label_width + 4);
    let max = props
        .data
        .iter()
        .map(|point| point.value)
        .fold(0.0_f64, f64::max);

    let mut body: Vec<String> = props
        .data
        .iter()
        .zip(&labels)
        .map(|(point, label)| {
            let filled = if max > 0.0 && point.value > 0.0 {
                ((point.value / max) * bar_space as f64).round() as usize
            } else {
                0
            };
            let bar: String = std::iter::repeat_n(BAR_CHAR, filled).collect();
            format!(
                "{} │{} {label}",
                pad(&truncate(&point.name, name_width), name_width),
                pad(&bar, bar_space)
            )
        })
        .collect();
    if body.is_empty() {
        body.push("No data".to_string());
    }

    boxed(&props.title.to_uppercase(), Some(chart_type), body, width)
}

/// Integers without a fractional part, otherwise two decimals.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn inner_width(width: usize) -> usize {
    width.max(MIN_WIDTH) - 4
}

/// Draw `body` inside a titled box.
fn boxed(title: &str, badge: Option<&str>, body: Vec<String>, width: usize) -> Vec<String> {
    let width = width.max(MIN_WIDTH);
    let inner = width - 4;

    let title = truncate(title, inner.saturating_sub(2));
    let badge = badge
        .map(|badge| format!(" {} ", truncate(badge, inner.saturating_sub(title.chars().count() + 4))))
        .unwrap_or_default();
    let fill = (width - 2)
        .saturating_sub(title.chars().count() + 3 + badge.chars().count());

    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(format!("┌─ {title} {}{badge}┐", "─".repeat(fill)));
    for line in body {
        lines.push(format!("│ {} │", pad(&truncate(&line, inner), inner)));
    }
    lines.push(format!("└{}┘", "─".repeat(width - 2)));
    lines
}

/// `label` on the left, `value` on the right, dots between.
fn label_value(label: &str, value: &str, width: usize) -> String {
    let value = truncate(value, width / 2);
    let label = truncate(label, width.saturating_sub(value.chars().count() + 1));
    let gap = width.saturating_sub(label.chars().count() + value.chars().count());
    let leader = if gap > 2 {
        format!(" {} ", "·".repeat(gap - 2))
    } else {
        " ".repeat(gap)
    };
    format!("{label}{leader}{value}")
}

/// Shorten `text` to at most `max` chars, marking the cut with `…`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push('…');
    out
}

/// Right-pad `text` with spaces to `width` chars.
pub fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{text}{}", " ".repeat(width - len))
    }
}
