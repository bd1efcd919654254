//! Credential persistence.
//!
//! The `CredentialStore` keeps one string per [`CredentialName`] in a JSON
//! object keyed by storage key. Adapters never read the store directly; they
//! receive a [`Credentials`] snapshot when they are constructed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{CredentialError, Result};
use crate::name::CredentialName;

/// Immutable set of credential values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    values: BTreeMap<CredentialName, String>,
}

impl Credentials {
    /// Create an empty credential set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value. Empty or whitespace-only values remove the entry.
    pub fn with(mut self, name: CredentialName, value: impl AsRef<str>) -> Self {
        let value = value.as_ref().trim();
        if value.is_empty() {
            self.values.remove(&name);
        } else {
            self.values.insert(name, value.to_string());
        }
        self
    }

    /// Get a credential value.
    pub fn get(&self, name: CredentialName) -> Option<&str> {
        self.values.get(&name).map(String::as_str)
    }

    /// Whether a value is present for `name`.
    pub fn contains(&self, name: CredentialName) -> bool {
        self.values.contains_key(&name)
    }

    /// Names that currently have a value.
    pub fn names(&self) -> impl Iterator<Item = CredentialName> + '_ {
        self.values.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// Values never appear in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// Persistent store for credentials.
pub struct CredentialStore {
    /// Backing file, if any.
    path: Option<PathBuf>,

    /// Current values.
    credentials: Credentials,
}

impl CredentialStore {
    /// Create a store that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            credentials: Credentials::new(),
        }
    }

    /// Open the store backed by `path`. A missing file is an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut credentials = Credentials::new();

        if fs::try_exists(&path).await? {
            let content = fs::read_to_string(&path).await?;
            let raw: BTreeMap<String, String> = serde_json::from_str(&content)?;
            for (key, value) in raw {
                match CredentialName::from_storage_key(&key) {
                    Some(name) => credentials = credentials.with(name, value),
                    None => warn!("Ignoring unknown credential key {key} in {}", path.display()),
                }
            }
            info!(
                "Loaded {} credentials from {}",
                credentials.values.len(),
                path.display()
            );
        }

        Ok(Self {
            path: Some(path),
            credentials,
        })
    }

    /// Default location of the credential file.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_default()
            .join("opsflow")
            .join("credentials.json")
    }

    /// Backing file, if the store is persistent.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get a credential value.
    pub fn get(&self, name: CredentialName) -> Option<&str> {
        self.credentials.get(name)
    }

    /// Store a value. An empty or whitespace-only value clears the entry.
    ///
    /// The store only changes once the new values are on disk.
    pub async fn set(&mut self, name: CredentialName, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return self.clear(name).await;
        }

        let next = self.credentials.clone().with(name, value);
        self.persist(&next).await?;
        self.credentials = next;
        debug!("Stored credential {name}");
        Ok(())
    }

    /// Remove a value.
    pub async fn clear(&mut self, name: CredentialName) -> Result<()> {
        if !self.credentials.contains(name) {
            return Ok(());
        }

        let mut next = self.credentials.clone();
        next.values.remove(&name);
        self.persist(&next).await?;
        self.credentials = next;
        debug!("Cleared credential {name}");
        Ok(())
    }

    /// Names that currently have a value.
    pub fn configured(&self) -> Vec<CredentialName> {
        self.credentials.names().collect()
    }

    /// Snapshot of the current values for injection into adapters.
    pub fn snapshot(&self) -> Credentials {
        self.credentials.clone()
    }

    /// Write `credentials` to the backing file.
    async fn persist(&self, credentials: &Credentials) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let raw: BTreeMap<&str, &str> = credentials
            .values
            .iter()
            .map(|(name, value)| (name.storage_key(), value.as_str()))
            .collect();
        let content = serde_json::to_string_pretty(&raw)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CredentialError::Storage(format!("{}: {e}", parent.display())))?;
        }

        // Write atomically
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content)
            .await
            .map_err(|e| CredentialError::Storage(format!("{}: {e}", temp_path.display())))?;
        restrict_permissions(&temp_path).await?;
        fs::rename(&temp_path, path)
            .await
            .map_err(|e| CredentialError::Storage(format!("{}: {e}", path.display())))?;

        debug!("Saved {} credentials", raw.len());
        Ok(())
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_trims_value() {
        let mut store = CredentialStore::in_memory();
        store
            .set(CredentialName::Stripe, "  sk_test_123  ")
            .await
            .unwrap();
        assert_eq!(store.get(CredentialName::Stripe), Some("sk_test_123"));
    }

    #[tokio::test]
    async fn test_empty_value_clears_credential() {
        let mut store = CredentialStore::in_memory();
        store.set(CredentialName::Github, "ghp_abc").await.unwrap();
        store.set(CredentialName::Github, "").await.unwrap();
        assert_eq!(store.get(CredentialName::Github), None);

        store.set(CredentialName::Github, "ghp_abc").await.unwrap();
        store.set(CredentialName::Github, "   ").await.unwrap();
        assert_eq!(store.get(CredentialName::Github), None);
    }

    #[tokio::test]
    async fn test_persistence_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/credentials.json");

        {
            let mut store = CredentialStore::open(&path).await.unwrap();
            store.set(CredentialName::Linear, "lin_key").await.unwrap();
            store.set(CredentialName::Resend, "re_key").await.unwrap();
            store.clear(CredentialName::Resend).await.unwrap();
        }

        let store = CredentialStore::open(&path).await.unwrap();
        assert_eq!(store.get(CredentialName::Linear), Some("lin_key"));
        assert_eq!(store.get(CredentialName::Resend), None);
        assert_eq!(store.configured(), vec![CredentialName::Linear]);

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains("LINEAR_KEY"));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_values_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blocked/credentials.json");
        let mut store = CredentialStore::open(&path).await.unwrap();

        // A file where the parent directory should be.
        std::fs::write(temp_dir.path().join("blocked"), "").unwrap();

        let err = store.set(CredentialName::Stripe, "sk_live").await.unwrap_err();
        assert!(matches!(err, CredentialError::Storage(_)));
        assert_eq!(store.get(CredentialName::Stripe), None);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_failed_clear_keeps_value() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("store");
        let path = dir.join("credentials.json");
        let mut store = CredentialStore::open(&path).await.unwrap();
        store.set(CredentialName::Linear, "lin_key").await.unwrap();

        std::fs::remove_dir_all(&dir).unwrap();
        std::fs::write(&dir, "").unwrap();

        assert!(store.clear(CredentialName::Linear).await.is_err());
        assert_eq!(store.get(CredentialName::Linear), Some("lin_key"));
    }

    #[tokio::test]
    async fn test_unknown_keys_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"GITHUB_TOKEN":"ghp_x","OTHER":"y"}"#).unwrap();

        let store = CredentialStore::open(&path).await.unwrap();
        assert_eq!(store.configured(), vec![CredentialName::Github]);
    }

    #[tokio::test]
    async fn test_snapshot_is_detached_from_store() {
        let mut store = CredentialStore::in_memory();
        store.set(CredentialName::Supabase, "eyJ").await.unwrap();
        let snapshot = store.snapshot();
        store.clear(CredentialName::Supabase).await.unwrap();

        assert_eq!(snapshot.get(CredentialName::Supabase), Some("eyJ"));
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_debug_hides_values() {
        let credentials = Credentials::new().with(CredentialName::Stripe, "sk_live_secret");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("Stripe"));
        assert!(!rendered.contains("sk_live_secret"));
    }
}
