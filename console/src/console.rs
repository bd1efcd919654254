//! The console: credential store, tools, components and the conversation,
//! wired together.

use std::sync::Arc;

use opsflow_components::{ComponentDescriptor, ComponentRegistry};
use opsflow_credentials::{CredentialName, CredentialStore};
use opsflow_integrations::build_registry;
use opsflow_tools::{ToolDescriptor, ToolExecutor, ToolOutcome};
use serde_json::Value;
use tracing::info;

use crate::canvas;
use crate::config::ConsoleConfig;
use crate::conversation::{Conversation, Submission};
use crate::error::Result;
use crate::runtime::{AssistantRuntime, CommandRuntime};

pub struct Console {
    config: ConsoleConfig,
    credentials: CredentialStore,
    tools: ToolExecutor,
    components: Arc<ComponentRegistry>,
    conversation: Conversation,
}

impl Console {
    /// Open the credential store named by `config` and answer with the
    /// built-in [`CommandRuntime`].
    pub async fn open(config: ConsoleConfig) -> Result<Self> {
        let credentials = CredentialStore::open(&config.credentials_path).await?;
        Self::new(config, credentials, Arc::new(CommandRuntime))
    }

    pub fn new(
        config: ConsoleConfig,
        credentials: CredentialStore,
        runtime: Arc<dyn AssistantRuntime>,
    ) -> Result<Self> {
        let registry = build_registry(&credentials.snapshot(), &config.integrations)?;
        let tools = ToolExecutor::new(Arc::new(registry));
        let components = Arc::new(ComponentRegistry::new()?);
        let conversation = Conversation::new(runtime, tools.clone(), components.clone());

        info!(
            "Console ready with {} tools and {} components",
            tools.registry().len(),
            components.len()
        );
        Ok(Self {
            config,
            credentials,
            tools,
            components,
            conversation,
        })
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn tool_catalog(&self) -> Vec<ToolDescriptor> {
        self.tools.registry().catalog()
    }

    pub fn component_catalog(&self) -> Vec<ComponentDescriptor> {
        self.components.catalog()
    }

    /// Store a credential and rebuild the tools from the new values.
    ///
    /// An empty value removes the credential.
    pub async fn set_credential(&mut self, name: CredentialName, value: &str) -> Result<()> {
        self.credentials.set(name, value).await?;
        self.rebuild_tools()
    }

    pub async fn clear_credential(&mut self, name: CredentialName) -> Result<()> {
        self.credentials.clear(name).await?;
        self.rebuild_tools()
    }

    fn rebuild_tools(&mut self) -> Result<()> {
        let registry = build_registry(&self.credentials.snapshot(), &self.config.integrations)?;
        self.tools = ToolExecutor::new(Arc::new(registry));
        self.conversation.set_tools(self.tools.clone());
        info!(
            "Rebuilt tools with {} credentials configured",
            self.credentials.configured().len()
        );
        Ok(())
    }

    /// Call one tool directly, bypassing the conversation.
    pub async fn call(&self, name: &str, input: Value) -> Result<ToolOutcome> {
        Ok(self.tools.execute(name, input).await?)
    }

    pub async fn submit(&mut self, text: &str) -> Submission {
        self.conversation.submit(text).await
    }

    /// Draw the canvas at the configured width.
    pub fn canvas(&self) -> Result<Vec<String>> {
        canvas::render(
            self.conversation.thread(),
            &self.components,
            self.config.canvas_width,
        )
    }
}
