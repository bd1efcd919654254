//! The conversation surface.
//!
//! A conversation is either idle or waiting on the runtime. `submit` takes
//! `&mut self`, so a second submission cannot start while one is pending.

use std::sync::Arc;

use opsflow_components::ComponentRegistry;
use opsflow_tools::ToolExecutor;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::message::{Message, Thread};
use crate::runtime::{AssistantRuntime, RuntimeRequest};

/// Observable state of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Idle,
    Pending,
}

/// What happened to a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The input was empty; nothing was appended.
    Ignored,

    /// The runtime answered (or failed) and these assistant messages were appended.
    Answered(Vec<Message>),
}

pub struct Conversation {
    thread: Thread,
    runtime: Arc<dyn AssistantRuntime>,
    tools: ToolExecutor,
    components: Arc<ComponentRegistry>,
    state: watch::Sender<ConversationState>,
}

impl Conversation {
    pub fn new(
        runtime: Arc<dyn AssistantRuntime>,
        tools: ToolExecutor,
        components: Arc<ComponentRegistry>,
    ) -> Self {
        let (state, _) = watch::channel(ConversationState::Idle);
        Self {
            thread: Thread::new(),
            runtime,
            tools,
            components,
            state,
        }
    }

    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    pub fn state(&self) -> ConversationState {
        *self.state.borrow()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.subscribe()
    }

    pub fn components(&self) -> &Arc<ComponentRegistry> {
        &self.components
    }

    /// Swap the tools used by later submissions.
    pub fn set_tools(&mut self, tools: ToolExecutor) {
        self.tools = tools;
    }

    /// Submit user text and wait for the runtime's answer.
    ///
    /// Empty or whitespace-only input is ignored: the state stays idle and
    /// the runtime is not called. A runtime error is appended as an
    /// assistant message.
    pub async fn submit(&mut self, text: &str) -> Submission {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring empty submission");
            return Submission::Ignored;
        }

        self.thread.push(Message::user(text));
        self.state.send_replace(ConversationState::Pending);

        let reply = self
            .runtime
            .respond(RuntimeRequest {
                input: text,
                history: &self.thread,
                tools: &self.tools,
                components: &self.components,
            })
            .await;

        let messages: Vec<Message> = match reply {
            Ok(reply) => reply
                .parts
                .into_iter()
                .map(|part| Message::assistant(part.content, part.component))
                .collect(),
            Err(e) => {
                warn!("Runtime failed to answer: {e}");
                vec![Message::assistant(format!("Something went wrong: {e}"), None)]
            }
        };
        for message in &messages {
            self.thread.push(message.clone());
        }

        self.state.send_replace(ConversationState::Idle);
        info!(
            "Answered submission with {} messages ({} in thread)",
            messages.len(),
            self.thread.len()
        );
        Submission::Answered(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConsoleError, Result};
    use crate::runtime::RuntimeReply;
    use async_trait::async_trait;
    use opsflow_tools::ToolRegistry;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, OnceLock};

    /// Echoes the input and counts calls.
    #[derive(Default)]
    struct CountingRuntime {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl AssistantRuntime for CountingRuntime {
        async fn respond(&self, request: RuntimeRequest<'_>) -> Result<RuntimeReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ConsoleError::Runtime("model unavailable".to_string()));
            }
            Ok(RuntimeReply::text(format!(
                "echo {} after {} messages",
                request.input,
                request.history.len()
            )))
        }
    }

    /// Records the conversation state it sees while answering.
    #[derive(Default)]
    struct ObservingRuntime {
        states: OnceLock<watch::Receiver<ConversationState>>,
        seen: Mutex<Vec<ConversationState>>,
    }

    #[async_trait]
    impl AssistantRuntime for ObservingRuntime {
        async fn respond(&self, _request: RuntimeRequest<'_>) -> Result<RuntimeReply> {
            if let Some(states) = self.states.get() {
                self.seen.lock().unwrap().push(*states.borrow());
            }
            Ok(RuntimeReply::text("done"))
        }
    }

    fn conversation(runtime: Arc<CountingRuntime>) -> Conversation {
        Conversation::new(
            runtime,
            ToolExecutor::new(Arc::new(ToolRegistry::new())),
            Arc::new(ComponentRegistry::new().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_empty_input_stays_idle() {
        let runtime = Arc::new(CountingRuntime::default());
        let mut conversation = conversation(runtime.clone());
        let states = conversation.subscribe();

        assert_eq!(conversation.submit("").await, Submission::Ignored);
        assert_eq!(conversation.submit("   \n\t").await, Submission::Ignored);

        assert_eq!(runtime.calls.load(Ordering::SeqCst), 0);
        assert_eq!(conversation.state(), ConversationState::Idle);
        assert!(!states.has_changed().unwrap());
        assert!(conversation.thread().is_empty());
    }

    #[tokio::test]
    async fn test_submit_appends_user_then_reply() {
        let runtime = Arc::new(CountingRuntime::default());
        let mut conversation = conversation(runtime.clone());
        let mut states = conversation.subscribe();

        let Submission::Answered(messages) = conversation.submit("  status  ").await else {
            panic!("expected an answer");
        };
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content.text(), "echo status after 1 messages");

        let thread = conversation.thread().messages();
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].content.text(), "status");
        assert_eq!(runtime.calls.load(Ordering::SeqCst), 1);

        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), ConversationState::Idle);
    }

    #[tokio::test]
    async fn test_pending_while_runtime_answers() {
        let runtime = Arc::new(ObservingRuntime::default());
        let mut conversation = Conversation::new(
            runtime.clone(),
            ToolExecutor::new(Arc::new(ToolRegistry::new())),
            Arc::new(ComponentRegistry::new().unwrap()),
        );
        assert!(runtime.states.set(conversation.subscribe()).is_ok());
        assert_eq!(conversation.state(), ConversationState::Idle);

        conversation.submit("first").await;
        conversation.submit("second").await;

        assert_eq!(
            *runtime.seen.lock().unwrap(),
            vec![ConversationState::Pending, ConversationState::Pending]
        );
        assert_eq!(conversation.state(), ConversationState::Idle);
    }

    #[tokio::test]
    async fn test_runtime_error_becomes_message() {
        let runtime = Arc::new(CountingRuntime {
            fail: true,
            ..Default::default()
        });
        let mut conversation = conversation(runtime);

        let Submission::Answered(messages) = conversation.submit("hello").await else {
            panic!("expected an answer");
        };
        assert!(messages[0].content.text().contains("model unavailable"));
        assert_eq!(conversation.state(), ConversationState::Idle);
    }
}
