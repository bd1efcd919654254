//! Conversation messages and the transcript.

use chrono::{DateTime, Utc};
use opsflow_components::ComponentInstance;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One structured part of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ToolResult { tool: String, result: Value },
}

/// Message body: plain text or structured parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// The text of the message, with structured parts other than text dropped.
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ToolResult { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// A transcript entry. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentInstance>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::User, content.into(), None)
    }

    pub fn assistant(
        content: impl Into<MessageContent>,
        component: Option<ComponentInstance>,
    ) -> Self {
        Self::new(Role::Assistant, content.into(), component)
    }

    fn new(role: Role, content: MessageContent, component: Option<ComponentInstance>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            component,
            created_at: Utc::now(),
        }
    }
}

/// Ordered, append-only list of messages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Thread {
    messages: Vec<Message>,
}

impl Thread {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Attached components, in message order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentInstance> {
        self.messages
            .iter()
            .filter_map(|message| message.component.as_ref())
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
