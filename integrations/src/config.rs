//! Configuration for the service adapters.

use serde::{Deserialize, Serialize};

/// What an operation does when its credential is not configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCredentialPolicy {
    /// Return canned demo data with status `demo`.
    #[default]
    Demo,

    /// Return a `missing_credential` failure.
    Fail,
}

/// Configuration shared by every adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    /// Provider base URLs.
    pub endpoints: Endpoints,

    /// Behavior when a credential is missing.
    pub missing_credential: MissingCredentialPolicy,
}

impl IntegrationsConfig {
    /// Set the provider base URLs.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the missing-credential policy.
    pub fn with_missing_credential(mut self, policy: MissingCredentialPolicy) -> Self {
        self.missing_credential = policy;
        self
    }
}

/// Base URLs for each provider.
///
/// Overridable for tests and self-hosted proxies. Trailing slashes are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub github: String,
    pub stripe: String,
    /// Used when no `supabase_url` credential is configured.
    pub supabase: String,
    /// Full GraphQL endpoint.
    pub linear: String,
    pub resend: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            github: "https://api.github.com".to_string(),
            stripe: "https://api.stripe.com".to_string(),
            supabase: "https://your-project.supabase.co".to_string(),
            linear: "https://api.linear.app/graphql".to_string(),
            resend: "https://api.resend.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every provider at one server, as a mock server in tests.
    ///
    /// Linear is reached at `<base>/graphql`.
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            github: base.to_string(),
            stripe: base.to_string(),
            supabase: base.to_string(),
            linear: format!("{base}/graphql"),
            resend: base.to_string(),
        }
    }
}
