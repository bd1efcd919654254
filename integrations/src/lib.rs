//! # Integrations
//!
//! Service adapters that expose external SaaS APIs as tool operations.
//!
//! ## Services
//!
//! - **GitHub**: list issues, repository summary, close an issue
//! - **Stripe**: find a customer, list payments, refund a payment
//! - **Supabase**: look up and update a user row
//! - **Linear**: list and create issues over GraphQL
//! - **Resend**: list and send emails
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Integrations                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Credentials ──► ServiceAdapter ──► AdapterTool ──► ToolRegistry│
//! │                      │                   │                      │
//! │                      ▼                   ▼                      │
//! │               provider HTTP API    demo data / failure          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Operations never return errors. A missing credential yields demo data
//! (or a failure, per [`MissingCredentialPolicy`]); everything else that
//! goes wrong becomes a failed [`ToolOutcome`](opsflow_tools::ToolOutcome).

pub mod adapter;
pub mod config;
pub mod demo;
pub mod error;
pub mod github;
pub mod linear;
pub mod normalize;
pub mod resend;
pub mod stripe;
pub mod supabase;

use std::sync::Arc;

use opsflow_credentials::Credentials;
use opsflow_tools::{ToolOperation, ToolRegistry};
use tracing::debug;

pub use adapter::{ActionReport, AdapterTool, OperationInfo, ServiceAdapter};
pub use config::{Endpoints, IntegrationsConfig, MissingCredentialPolicy};
pub use error::{AdapterError, Result};
pub use github::GithubAdapter;
pub use linear::LinearAdapter;
pub use resend::ResendAdapter;
pub use stripe::StripeAdapter;
pub use supabase::SupabaseAdapter;

/// Build every tool operation from a credential snapshot.
pub fn build_tools(
    credentials: &Credentials,
    config: &IntegrationsConfig,
) -> Vec<Arc<dyn ToolOperation>> {
    let client = reqwest::Client::new();
    let endpoints = &config.endpoints;
    let policy = config.missing_credential;

    debug!(
        "Building tools with {:?} credentials configured",
        credentials.names().collect::<Vec<_>>()
    );

    let mut tools = Vec::new();
    tools.extend(AdapterTool::all(
        GithubAdapter::new(credentials)
            .with_base_url(&endpoints.github)
            .with_client(client.clone()),
        policy,
    ));
    tools.extend(AdapterTool::all(
        StripeAdapter::new(credentials)
            .with_base_url(&endpoints.stripe)
            .with_client(client.clone()),
        policy,
    ));
    tools.extend(AdapterTool::all(
        SupabaseAdapter::new(credentials)
            .with_default_url(&endpoints.supabase)
            .with_client(client.clone()),
        policy,
    ));
    tools.extend(AdapterTool::all(
        LinearAdapter::new(credentials)
            .with_endpoint(&endpoints.linear)
            .with_client(client.clone()),
        policy,
    ));
    tools.extend(AdapterTool::all(
        ResendAdapter::new(credentials)
            .with_base_url(&endpoints.resend)
            .with_client(client),
        policy,
    ));
    tools
}

/// Build the tool registry, failing on a name collision.
pub fn build_registry(
    credentials: &Credentials,
    config: &IntegrationsConfig,
) -> opsflow_tools::Result<ToolRegistry> {
    ToolRegistry::from_operations(build_tools(credentials, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsflow_credentials::Service;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_registry_has_every_operation() {
        let registry = build_registry(&Credentials::new(), &IntegrationsConfig::default()).unwrap();

        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec![
                "close_github_issue",
                "create_linear_issue",
                "get_github_repo",
                "get_stripe_customer",
                "get_supabase_user",
                "list_github_issues",
                "list_linear_issues",
                "list_resend_emails",
                "list_stripe_payments",
                "refund_stripe_payment",
                "send_resend_email",
                "update_supabase_user",
            ]
        );

        let stats = registry.stats();
        assert_eq!(stats.by_service.get(&Service::Github), Some(&3));
        assert_eq!(stats.by_service.get(&Service::Supabase), Some(&2));
        assert_eq!(stats.mutating, 5);
    }
}
