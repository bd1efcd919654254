//! Turning tool outcomes into components.
//!
//! Lists become a summary card, followed by a chart when every item carries
//! an amount, or a timeline when every item carries a date. Single objects
//! become a card. Failures become an error card.

use opsflow_components::{
    CardStatus, ChartType, ComponentInstance, DataPoint, EventType, LiveMetricChartProps,
    MetricPoint, TimelineEvent, UnifiedTimelineProps, UniversalCardProps,
};
use opsflow_credentials::Service;
use opsflow_tools::{OutcomeStatus, ToolDescriptor, ToolFailure, ToolOutcome};
use serde_json::{Map, Value};

use crate::message::{ContentPart, MessageContent};
use crate::runtime::ReplyPart;

/// Rows shown on a list summary card.
const SUMMARY_ROWS: usize = 5;

const LABEL_FIELDS: [&str; 5] = ["title", "subject", "name", "email", "id"];
const VALUE_FIELDS: [&str; 3] = ["state", "status", "to"];
const DATE_FIELDS: [&str; 2] = ["created_at", "created"];

const DEMO_NOTE: &str = "Demo data, no credential configured";

/// Build the reply parts for one tool outcome.
pub(crate) fn present(tool: &ToolDescriptor, outcome: &ToolOutcome) -> Vec<ReplyPart> {
    let source = tool.service;

    if let Some(failure) = &outcome.error {
        return vec![ReplyPart {
            content: tool_content(
                format!("{} failed: {}", tool.name, failure.message),
                tool,
                outcome,
            ),
            component: Some(failure_card(source, &tool.name, failure)),
        }];
    }

    let demo = outcome.status == OutcomeStatus::Demo;
    let (summary, components) = match &outcome.output {
        Value::Array(items) => present_list(source, &tool.name, items, demo),
        Value::Object(fields) => present_object(source, &tool.name, fields, demo),
        other => (format!("{} returned {other}", tool.name), Vec::new()),
    };
    let summary = if demo {
        format!("{summary} (demo data)")
    } else {
        summary
    };

    let mut components = components.into_iter();
    let mut parts = vec![ReplyPart {
        content: tool_content(summary, tool, outcome),
        component: components.next().map(|(_, component)| component),
    }];
    parts.extend(components.map(|(caption, component)| ReplyPart {
        content: MessageContent::Text(caption),
        component: Some(component),
    }));
    parts
}

fn tool_content(summary: String, tool: &ToolDescriptor, outcome: &ToolOutcome) -> MessageContent {
    MessageContent::Parts(vec![
        ContentPart::Text { text: summary },
        ContentPart::ToolResult {
            tool: tool.name.clone(),
            result: outcome.to_runtime_value(),
        },
    ])
}

fn failure_card(source: Service, tool: &str, failure: &ToolFailure) -> ComponentInstance {
    ComponentInstance::UniversalCard(UniversalCardProps {
        source,
        title: format!("{tool} failed"),
        subtitle: Some(failure.message.clone()),
        status: Some(CardStatus::Error),
        data_points: vec![DataPoint::new("Reason", failure.kind)],
    })
}

fn present_list(
    source: Service,
    tool: &str,
    items: &[Value],
    demo: bool,
) -> (String, Vec<(String, ComponentInstance)>) {
    let noun = if items.len() == 1 { "result" } else { "results" };
    let summary = format!("{tool} returned {} {noun}", items.len());

    let card = ComponentInstance::UniversalCard(UniversalCardProps {
        source,
        title: format!("{} {noun}", items.len()),
        subtitle: Some((if demo { DEMO_NOTE } else { tool }).to_string()),
        status: Some(if items.is_empty() {
            CardStatus::Warning
        } else {
            CardStatus::Success
        }),
        data_points: items
            .iter()
            .take(SUMMARY_ROWS)
            .map(|item| DataPoint::new(item_label(item), item_value(item)))
            .collect(),
    });

    let mut components = vec![(summary.clone(), card)];
    if let Some(chart) = amount_chart(source, items) {
        components.push((format!("Chart of {} amounts", items.len()), chart));
    } else if let Some(timeline) = timeline(source, items) {
        components.push((format!("Timeline of {} events", items.len()), timeline));
    }
    (summary, components)
}

fn present_object(
    source: Service,
    tool: &str,
    fields: &Map<String, Value>,
    demo: bool,
) -> (String, Vec<(String, ComponentInstance)>) {
    // Mutation reports carry `success` and `message`.
    if let (Some(Value::Bool(success)), Some(Value::String(message))) =
        (fields.get("success"), fields.get("message"))
    {
        let card = ComponentInstance::UniversalCard(UniversalCardProps {
            source,
            title: message.clone(),
            subtitle: None,
            status: Some(if *success {
                CardStatus::Success
            } else {
                CardStatus::Error
            }),
            data_points: data_points(fields, &["success", "message"]),
        });
        return (message.clone(), vec![(message.clone(), card)]);
    }

    let title_key = LABEL_FIELDS
        .iter()
        .find(|key| fields.get(**key).is_some_and(Value::is_string))
        .copied();
    let title = title_key
        .and_then(|key| fields.get(key))
        .map(display_value)
        .unwrap_or_else(|| tool.to_string());

    let card = ComponentInstance::UniversalCard(UniversalCardProps {
        source,
        title: title.clone(),
        subtitle: demo.then(|| DEMO_NOTE.to_string()),
        status: Some(CardStatus::Success),
        data_points: data_points(fields, title_key.as_slice()),
    });
    let summary = format!("{tool}: {title}");
    (summary.clone(), vec![(summary, card)])
}

fn data_points(fields: &Map<String, Value>, skip: &[&str]) -> Vec<DataPoint> {
    fields
        .iter()
        .filter(|(key, value)| !skip.contains(&key.as_str()) && is_scalar(value))
        .map(|(key, value)| DataPoint::new(humanize(key), display_value(value)))
        .collect()
}

fn amount_chart(source: Service, items: &[Value]) -> Option<ComponentInstance> {
    if items.is_empty() {
        return None;
    }

    let data = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let value = item.get("amount").and_then(Value::as_f64)?;
            let name = first_string(item, &DATE_FIELDS)
                .or_else(|| first_string(item, &["id"]))
                .unwrap_or_else(|| (index + 1).to_string());
            Some(MetricPoint { name, value })
        })
        .collect::<Option<Vec<_>>>()?;

    let currency = items[0].get("currency").and_then(Value::as_str);
    let same_currency = items
        .iter()
        .all(|item| item.get("currency").and_then(Value::as_str) == currency);
    let unit = match currency {
        Some("USD") if same_currency => Some("$".to_string()),
        Some(code) if same_currency => Some(format!(" {code}")),
        _ => None,
    };

    Some(ComponentInstance::LiveMetricChart(LiveMetricChartProps {
        title: format!("{} amounts", source.label()),
        data,
        chart_type: Some(ChartType::Bar),
        color: None,
        unit,
    }))
}

fn timeline(source: Service, items: &[Value]) -> Option<ComponentInstance> {
    if items.is_empty() {
        return None;
    }

    let events = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let timestamp = first_string(item, &DATE_FIELDS)?;
            let id = item
                .get("id")
                .filter(|id| is_scalar(id))
                .map(display_value)
                .unwrap_or_else(|| (index + 1).to_string());
            Some(TimelineEvent {
                id,
                source,
                timestamp,
                description: item_label(item),
                kind: event_type(&item_value(item)),
            })
        })
        .collect::<Option<Vec<_>>>()?;

    Some(ComponentInstance::UnifiedTimeline(UnifiedTimelineProps {
        title: Some(format!("{} activity", source.label())),
        events,
    }))
}

/// Headline of a list item, prefixed with its issue key when it has one.
fn item_label(item: &Value) -> String {
    let label = first_string(item, &LABEL_FIELDS).unwrap_or_default();
    if let Some(identifier) = item.get("identifier").and_then(Value::as_str) {
        format!("{identifier} {label}")
    } else if let Some(number) = item.get("number").and_then(Value::as_u64) {
        format!("#{number} {label}")
    } else {
        label
    }
}

fn item_value(item: &Value) -> String {
    first_string(item, &VALUE_FIELDS).unwrap_or_default()
}

fn event_type(status: &str) -> EventType {
    match status.to_lowercase().as_str() {
        "closed" | "done" | "succeeded" | "sent" | "delivered" => EventType::Success,
        "failed" | "canceled" | "bounced" => EventType::Error,
        "pending" | "refunded" | "requires_payment_method" => EventType::Warning,
        _ => EventType::Info,
    }
}

fn first_string(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| item.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        Value::Number(number) => match (number.as_i64(), number.as_f64()) {
            (Some(integer), _) => integer.to_string(),
            (None, Some(float)) => format!("{float:.2}"),
            (None, None) => number.to_string(),
        },
        other => other.to_string(),
    }
}

/// `open_issues` becomes `Open issues`.
fn humanize(key: &str) -> String {
    let text = key.replace('_', " ");
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
