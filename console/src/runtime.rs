//! The assistant runtime seam.
//!
//! An [`AssistantRuntime`] reads the user's text, may call tools through the
//! [`ToolExecutor`], and answers with messages that can carry a component.
//! A conversational AI runtime plugs in here; [`CommandRuntime`] is the
//! deterministic runtime used by the `opsflow` binary and by tests.

use async_trait::async_trait;
use opsflow_components::{
    Action, ActionGridProps, ChartType, ComponentInstance, ComponentRegistry, EventType,
    Intent, LiveMetricChartProps, MetricPoint, TimelineEvent, UnifiedTimelineProps,
};
use opsflow_integrations::demo::{self, ActivityLevel, MetricSeries};
use opsflow_tools::{ToolError, ToolExecutor, ToolRegistry};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{ConsoleError, Result};
use crate::message::{MessageContent, Thread};
use crate::present::present;

/// Everything a runtime sees for one submission.
pub struct RuntimeRequest<'a> {
    /// The submitted text, trimmed.
    pub input: &'a str,

    /// Transcript so far, including the submitted message.
    pub history: &'a Thread,

    pub tools: &'a ToolExecutor,
    pub components: &'a ComponentRegistry,
}

/// One assistant message of a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyPart {
    pub content: MessageContent,
    pub component: Option<ComponentInstance>,
}

/// The runtime's answer, appended to the transcript in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeReply {
    pub parts: Vec<ReplyPart>,
}

impl RuntimeReply {
    /// A reply made of a single text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self::default().with_part(MessageContent::Text(text.into()), None)
    }

    pub fn with_part(
        mut self,
        content: MessageContent,
        component: Option<ComponentInstance>,
    ) -> Self {
        self.parts.push(ReplyPart { content, component });
        self
    }
}

/// Decides how to answer a submission.
#[async_trait]
pub trait AssistantRuntime: Send + Sync {
    async fn respond(&self, request: RuntimeRequest<'_>) -> Result<RuntimeReply>;
}

/// Runtime that treats each submission as a command.
///
/// - `help` lists the tools and components
/// - `dashboard` shows the cross-service activity feed, weekly revenue and
///   daily active users
/// - `<tool_name> [json]` calls the tool and shows its result
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRuntime;

#[async_trait]
impl AssistantRuntime for CommandRuntime {
    async fn respond(&self, request: RuntimeRequest<'_>) -> Result<RuntimeReply> {
        let input = request.input.trim();
        let (command, rest) = match input.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };
        debug!("Command runtime received `{command}`");

        match command {
            "help" => Ok(help(request.tools.registry(), request.components)),
            "dashboard" => Ok(dashboard()),
            name => call_tool(request.tools, name, rest).await,
        }
    }
}

async fn call_tool(tools: &ToolExecutor, name: &str, raw_input: &str) -> Result<RuntimeReply> {
    let Some(operation) = tools.registry().get(name) else {
        return Ok(RuntimeReply::text(format!(
            "Unknown command `{name}`. Type `help` to list the available tools."
        )));
    };

    let input: Value = if raw_input.is_empty() {
        json!({})
    } else {
        match serde_json::from_str(raw_input) {
            Ok(input) => input,
            Err(e) => {
                return Ok(RuntimeReply::text(format!(
                    "Could not parse input for {name}: {e}"
                )));
            }
        }
    };

    let outcome = match tools.execute(name, input).await {
        Ok(outcome) => outcome,
        Err(ToolError::InvalidInput(message)) => {
            return Ok(RuntimeReply::text(format!(
                "Invalid input for {name}: {message}"
            )));
        }
        Err(e) => return Err(ConsoleError::Tool(e)),
    };

    Ok(RuntimeReply {
        parts: present(&operation.descriptor(), &outcome),
    })
}

fn help(tools: &ToolRegistry, components: &ComponentRegistry) -> RuntimeReply {
    let mut lines = vec!["Available tools:".to_string()];
    lines.extend(
        tools
            .catalog()
            .iter()
            .map(|tool| format!("  {:<24} {}", tool.name, tool.description)),
    );
    lines.push(String::new());
    lines.push(format!(
        "Components: {}",
        components.names().collect::<Vec<_>>().join(", ")
    ));
    lines.push("Call a tool with `<tool_name> {\"field\": \"value\"}`.".to_string());

    let actions = tools
        .catalog()
        .into_iter()
        .filter(|tool| tool.mutating)
        .map(|tool| {
            let (intent, icon) = action_style(&tool.name);
            Action {
                id: tool.name,
                label: tool.description,
                intent,
                icon: Some(icon.to_string()),
                is_loading: None,
            }
        })
        .collect();

    RuntimeReply::text(lines.join("\n")).with_part(
        MessageContent::Text("Actions that change remote state:".to_string()),
        Some(ComponentInstance::ActionGrid(ActionGridProps { actions })),
    )
}

fn action_style(tool: &str) -> (Intent, &'static str) {
    match tool.split('_').next() {
        Some("refund") => (Intent::Danger, "rollback"),
        Some("close") => (Intent::Warning, "check"),
        Some("send") => (Intent::Primary, "send"),
        Some("create") => (Intent::Success, "add"),
        Some("update") => (Intent::Default, "refresh"),
        _ => (Intent::Default, "zap"),
    }
}

fn dashboard() -> RuntimeReply {
    let events = demo::activity()
        .into_iter()
        .map(|event| TimelineEvent {
            id: event.id,
            source: event.source,
            timestamp: event.timestamp,
            description: event.description,
            kind: match event.level {
                ActivityLevel::Info => EventType::Info,
                ActivityLevel::Success => EventType::Success,
                ActivityLevel::Warning => EventType::Warning,
                ActivityLevel::Error => EventType::Error,
            },
        })
        .collect();

    RuntimeReply::default()
        .with_part(
            MessageContent::Text("Recent activity across your services (demo data)".to_string()),
            Some(ComponentInstance::UnifiedTimeline(UnifiedTimelineProps {
                title: Some("Recent Activity".to_string()),
                events,
            })),
        )
        .with_part(
            MessageContent::Text("Revenue this week (demo data)".to_string()),
            Some(metric_chart(demo::revenue(), ChartType::Area, "#6366f1")),
        )
        .with_part(
            MessageContent::Text("Daily active users this week (demo data)".to_string()),
            Some(metric_chart(demo::active_users(), ChartType::Line, "#10b981")),
        )
}

fn metric_chart(series: MetricSeries, chart_type: ChartType, color: &str) -> ComponentInstance {
    ComponentInstance::LiveMetricChart(LiveMetricChartProps {
        title: series.title,
        data: series
            .points
            .into_iter()
            .map(|(name, value)| MetricPoint { name, value })
            .collect(),
        chart_type: Some(chart_type),
        color: Some(color.to_string()),
        unit: series.unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsflow_credentials::Credentials;
    use opsflow_integrations::{IntegrationsConfig, build_registry};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn executor() -> ToolExecutor {
        let registry =
            build_registry(&Credentials::new(), &IntegrationsConfig::default()).unwrap();
        ToolExecutor::new(Arc::new(registry))
    }

    async fn ask(input: &str) -> RuntimeReply {
        let tools = executor();
        let components = ComponentRegistry::new().unwrap();
        let thread = Thread::new();
        CommandRuntime
            .respond(RuntimeRequest {
                input,
                history: &thread,
                tools: &tools,
                components: &components,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_help_lists_tools_and_actions() {
        let reply = ask("help").await;
        assert_eq!(reply.parts.len(), 2);

        let text = reply.parts[0].content.text();
        assert!(text.contains("list_github_issues"));
        assert!(text.contains("UniversalCard"));

        let Some(ComponentInstance::ActionGrid(grid)) = &reply.parts[1].component else {
            panic!("expected an action grid");
        };
        assert_eq!(grid.actions.len(), 5);
        let refund = grid
            .actions
            .iter()
            .find(|action| action.id == "refund_stripe_payment")
            .unwrap();
        assert_eq!(refund.intent, Intent::Danger);
    }

    #[tokio::test]
    async fn test_tool_command_uses_demo_data() {
        let reply = ask(r#"list_github_issues {"owner": "acme", "repo": "web"}"#).await;

        assert_eq!(
            reply.parts[0].content.text(),
            "list_github_issues returned 5 results (demo data)"
        );
        assert!(matches!(
            reply.parts[1].component,
            Some(ComponentInstance::UnifiedTimeline(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let reply = ask("refund everything").await;
        assert_eq!(reply.parts.len(), 1);
        assert!(reply.parts[0].content.text().starts_with("Unknown command `refund`"));
        assert_eq!(reply.parts[0].component, None);
    }

    #[tokio::test]
    async fn test_bad_json_and_invalid_input() {
        let reply = ask("get_github_repo {owner").await;
        assert!(reply.parts[0].content.text().starts_with("Could not parse input"));

        let reply = ask("get_github_repo {}").await;
        assert!(reply.parts[0].content.text().starts_with("Invalid input for get_github_repo"));
    }

    #[tokio::test]
    async fn test_dashboard() {
        let reply = ask("dashboard").await;
        let Some(ComponentInstance::UnifiedTimeline(timeline)) = &reply.parts[0].component else {
            panic!("expected a timeline");
        };
        assert_eq!(timeline.events.len(), 7);
        let Some(ComponentInstance::LiveMetricChart(chart)) = &reply.parts[1].component else {
            panic!("expected a chart");
        };
        assert_eq!(chart.data.len(), 7);
        assert_eq!(chart.unit.as_deref(), Some("$"));

        let Some(ComponentInstance::LiveMetricChart(users)) = &reply.parts[2].component else {
            panic!("expected a second chart");
        };
        assert_eq!(users.title, "Active Users");
        assert_eq!(users.chart_type, Some(ChartType::Line));
        assert_eq!(users.unit, None);
    }
}
