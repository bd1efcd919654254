//! Configuration for the console.

use std::path::{Path, PathBuf};

use opsflow_credentials::CredentialStore;
use opsflow_integrations::IntegrationsConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConsoleError, Result};

/// Text columns the canvas is drawn at when the terminal width is unknown.
pub const DEFAULT_CANVAS_WIDTH: usize = 100;

/// Configuration for the console, read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Path of the credential file.
    pub credentials_path: PathBuf,

    /// Width of the canvas in text columns.
    pub canvas_width: usize,

    /// Adapter configuration.
    pub integrations: IntegrationsConfig,
}

impl ConsoleConfig {
    /// Create a configuration with default values and the given credential file.
    pub fn new(credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            canvas_width: DEFAULT_CANVAS_WIDTH,
            integrations: IntegrationsConfig::default(),
        }
    }

    /// Set the canvas width.
    pub fn with_canvas_width(mut self, width: usize) -> Self {
        self.canvas_width = width;
        self
    }

    /// Set the adapter configuration.
    pub fn with_integrations(mut self, integrations: IntegrationsConfig) -> Self {
        self.integrations = integrations;
        self
    }

    /// Default location of `config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_default()
            .join("opsflow")
            .join("config.toml")
    }

    /// Load the configuration from `path`. A missing file yields the defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await? {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::from_toml(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConsoleError::Config(e.to_string()))
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::new(CredentialStore::default_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsflow_integrations::MissingCredentialPolicy;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ConsoleConfig::from_toml(
            r#"
canvas_width = 140

[integrations]
missing_credential = "fail"

[integrations.endpoints]
github = "http://localhost:8080"
"#,
        )
        .unwrap();

        assert_eq!(config.canvas_width, 140);
        assert_eq!(
            config.integrations.missing_credential,
            MissingCredentialPolicy::Fail
        );
        assert_eq!(config.integrations.endpoints.github, "http://localhost:8080");
        assert_eq!(config.integrations.endpoints.stripe, "https://api.stripe.com");
        assert_eq!(config.credentials_path, CredentialStore::default_path());
    }

    #[test]
    fn test_invalid_toml() {
        let result = ConsoleConfig::from_toml("canvas_width = \"wide\"");
        assert!(matches!(result, Err(ConsoleError::Config(_))));
    }

    #[tokio::test]
    async fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConsoleConfig::load(dir.path().join("config.toml")).await.unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }
}
