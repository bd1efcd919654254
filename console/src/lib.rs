//! # OpsFlow console
//!
//! The conversational surface of the admin console.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Console                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  user text ──► Conversation ──► AssistantRuntime             │
//! │                     │                 │                      │
//! │                     │                 ├──► ToolExecutor      │
//! │                     ▼                 └──► ComponentRegistry │
//! │                   Thread ──► Canvas                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`Console`] owns the credential store. Changing a credential rebuilds
//! the tool registry from a fresh snapshot.

pub mod canvas;
pub mod config;
pub mod console;
pub mod conversation;
pub mod error;
pub mod message;
mod present;
pub mod runtime;

pub use config::ConsoleConfig;
pub use console::Console;
pub use conversation::{Conversation, ConversationState, Submission};
pub use error::{ConsoleError, Result};
pub use message::{ContentPart, Message, MessageContent, Role, Thread};
pub use runtime::{AssistantRuntime, CommandRuntime, ReplyPart, RuntimeReply, RuntimeRequest};
