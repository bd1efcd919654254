//! Credential names and the services they unlock.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::error::{CredentialError, Result};

/// A named credential slot.
///
/// Each slot persists under a fixed storage key so existing stores keep
/// working across releases.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum CredentialName {
    /// Key for the assistant runtime.
    Tambo,
    Github,
    Stripe,
    Supabase,
    /// Base URL override for the Supabase project. Not a secret.
    SupabaseUrl,
    Linear,
    Resend,
}

impl CredentialName {
    /// Short name used on the command line and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tambo => "tambo",
            Self::Github => "github",
            Self::Stripe => "stripe",
            Self::Supabase => "supabase",
            Self::SupabaseUrl => "supabase_url",
            Self::Linear => "linear",
            Self::Resend => "resend",
        }
    }

    /// Key under which the value is persisted.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::Tambo => "TAMBO_KEY",
            Self::Github => "GITHUB_TOKEN",
            Self::Stripe => "STRIPE_KEY",
            Self::Supabase => "SUPABASE_KEY",
            Self::SupabaseUrl => "SUPABASE_URL",
            Self::Linear => "LINEAR_KEY",
            Self::Resend => "RESEND_KEY",
        }
    }

    /// Human-readable label for settings screens.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tambo => "Tambo API Key",
            Self::Github => "GitHub Token",
            Self::Stripe => "Stripe Secret Key",
            Self::Supabase => "Supabase Key",
            Self::SupabaseUrl => "Supabase Project URL",
            Self::Linear => "Linear API Key",
            Self::Resend => "Resend API Key",
        }
    }

    /// Example of what a value looks like.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Tambo => "tam_...",
            Self::Github => "ghp_...",
            Self::Stripe => "sk_...",
            Self::Supabase => "eyJ...",
            Self::SupabaseUrl => "https://your-project.supabase.co",
            Self::Linear => "lin_...",
            Self::Resend => "re_...",
        }
    }

    /// Whether the value must be masked when displayed.
    pub fn is_secret(&self) -> bool {
        !matches!(self, Self::SupabaseUrl)
    }

    /// Look up a credential by short name or storage key (case-insensitive).
    pub fn parse(input: &str) -> Result<Self> {
        let needle = input.trim();
        Self::iter()
            .find(|name| {
                name.as_str().eq_ignore_ascii_case(needle)
                    || name.storage_key().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| CredentialError::UnknownName(input.to_string()))
    }

    /// Find the credential persisted under `key`.
    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::iter().find(|name| name.storage_key() == key)
    }
}

impl std::fmt::Display for CredentialName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CredentialName {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// An external service reachable through a tool adapter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Github,
    Stripe,
    Supabase,
    Linear,
    Resend,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Stripe => "stripe",
            Self::Supabase => "supabase",
            Self::Linear => "linear",
            Self::Resend => "resend",
        }
    }

    /// Display name of the service.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Github => "GitHub",
            Self::Stripe => "Stripe",
            Self::Supabase => "Supabase",
            Self::Linear => "Linear",
            Self::Resend => "Resend",
        }
    }

    /// The credential that authenticates calls to this service.
    pub fn credential(&self) -> CredentialName {
        match self {
            Self::Github => CredentialName::Github,
            Self::Stripe => CredentialName::Stripe,
            Self::Supabase => CredentialName::Supabase,
            Self::Linear => CredentialName::Linear,
            Self::Resend => CredentialName::Resend,
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_parse_accepts_name_and_storage_key() {
        assert_eq!(CredentialName::parse("github").unwrap(), CredentialName::Github);
        assert_eq!(
            CredentialName::parse("GITHUB_TOKEN").unwrap(),
            CredentialName::Github
        );
        assert_eq!(
            CredentialName::parse(" Supabase_Url ").unwrap(),
            CredentialName::SupabaseUrl
        );
        assert!(CredentialName::parse("gitlab").is_err());
    }

    #[test]
    fn test_storage_keys_are_unique() {
        let keys: HashSet<_> = CredentialName::iter().map(|n| n.storage_key()).collect();
        assert_eq!(keys.len(), CredentialName::iter().count());
    }

    #[test]
    fn test_every_service_has_a_secret_credential() {
        for service in Service::iter() {
            assert!(service.credential().is_secret(), "{service}");
        }
    }
}
