use std::sync::Arc;

use async_trait::async_trait;
use opsflow_components::{CardStatus, ComponentInstance, DataPoint, UniversalCardProps};
use opsflow_console::{
    AssistantRuntime, Console, ConsoleConfig, ConsoleError, ConversationState, MessageContent,
    Role, RuntimeReply, RuntimeRequest, Submission,
};
use opsflow_credentials::{CredentialName, CredentialStore, Service};
use opsflow_integrations::{Endpoints, IntegrationsConfig};
use opsflow_tools::OutcomeStatus;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn console_at(dir: &TempDir, base: &str) -> Console {
    let config = ConsoleConfig::new(dir.path().join("credentials.json"))
        .with_canvas_width(80)
        .with_integrations(IntegrationsConfig::default().with_endpoints(Endpoints::all_at(base)));
    Console::open(config).await.unwrap()
}

#[tokio::test]
async fn setting_a_credential_switches_from_demo_to_live() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/web-platform"))
        .and(header("authorization", "Bearer ghp_live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "full_name": "acme/web-platform",
            "description": "Main web application",
            "stargazers_count": 12,
            "forks_count": 3,
            "open_issues_count": 4,
            "language": "Rust"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut console = console_at(&dir, &server.uri()).await;
    let input = json!({"owner": "acme", "repo": "web-platform"});

    let outcome = console.call("get_github_repo", input.clone()).await.unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Demo);

    console
        .set_credential(CredentialName::Github, "ghp_live")
        .await
        .unwrap();
    let outcome = console.call("get_github_repo", input).await.unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Live);
    assert_eq!(outcome.output["name"], "acme/web-platform");
    assert_eq!(outcome.output["stars"], 12);
}

#[tokio::test]
async fn empty_credential_removes_the_stored_value() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("credentials.json");
    let mut console = console_at(&dir, "http://127.0.0.1:9").await;

    console
        .set_credential(CredentialName::Stripe, "sk_test")
        .await
        .unwrap();
    assert_eq!(console.credentials().get(CredentialName::Stripe), Some("sk_test"));

    console.set_credential(CredentialName::Stripe, "").await.unwrap();
    assert_eq!(console.credentials().get(CredentialName::Stripe), None);

    let reopened = CredentialStore::open(&path).await.unwrap();
    assert_eq!(reopened.get(CredentialName::Stripe), None);

    // Back to demo data.
    let outcome = console
        .call("get_stripe_customer", json!({"email": "alex@startup.io"}))
        .await
        .unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Demo);
}

#[tokio::test]
async fn failed_credential_write_keeps_demo_mode() {
    let dir = TempDir::new().unwrap();
    let config = ConsoleConfig::new(dir.path().join("state/credentials.json"));
    let mut console = Console::open(config).await.unwrap();
    std::fs::write(dir.path().join("state"), "").unwrap();

    let result = console.set_credential(CredentialName::Stripe, "sk_live").await;
    assert!(matches!(result, Err(ConsoleError::Credential(_))));
    assert_eq!(console.credentials().get(CredentialName::Stripe), None);

    let outcome = console
        .call("get_stripe_customer", json!({"email": "alex@startup.io"}))
        .await
        .unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Demo);
}

#[tokio::test]
async fn conversation_attaches_components_to_the_canvas() {
    let dir = TempDir::new().unwrap();
    let mut console = console_at(&dir, "http://127.0.0.1:9").await;

    let empty = console.canvas().unwrap();
    assert!(empty.iter().any(|line| line.contains("Dynamic Canvas")));

    assert_eq!(console.submit("  ").await, Submission::Ignored);
    assert!(console.conversation().thread().is_empty());

    let Submission::Answered(messages) = console
        .submit(r#"list_github_issues {"owner": "acme", "repo": "web-platform"}"#)
        .await
    else {
        panic!("expected an answer");
    };
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|message| message.role == Role::Assistant));
    assert_eq!(console.conversation().state(), ConversationState::Idle);

    let thread = console.conversation().thread();
    assert_eq!(thread.len(), 3);
    assert_eq!(thread.messages()[0].role, Role::User);

    let kinds: Vec<&str> = thread
        .components()
        .map(|component| component.kind().name())
        .collect();
    assert_eq!(kinds, vec!["UniversalCard", "UnifiedTimeline"]);

    let canvas = console.canvas().unwrap();
    assert!(canvas.iter().any(|line| line.contains("Login button not responding")));
    assert!(canvas.iter().all(|line| line.chars().count() <= 80));
}

#[tokio::test]
async fn failed_call_renders_an_error_card() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/customers/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut console = console_at(&dir, &server.uri()).await;
    console
        .set_credential(CredentialName::Stripe, "sk_test")
        .await
        .unwrap();

    let Submission::Answered(messages) = console
        .submit(r#"get_stripe_customer {"email": "notfound@x.io"}"#)
        .await
    else {
        panic!("expected an answer");
    };
    assert_eq!(
        messages[0].content.text(),
        "get_stripe_customer failed: No customer found with that email"
    );
    let Some(ComponentInstance::UniversalCard(card)) = &messages[0].component else {
        panic!("expected an error card");
    };
    assert_eq!(card.title, "get_stripe_customer failed");
}

/// Looks up the customer named in the input and answers with its own card.
struct CustomerRuntime;

#[async_trait]
impl AssistantRuntime for CustomerRuntime {
    async fn respond(&self, request: RuntimeRequest<'_>) -> opsflow_console::Result<RuntimeReply> {
        let outcome = request
            .tools
            .execute("get_stripe_customer", json!({"email": request.input}))
            .await?;
        let name = outcome.output["name"]
            .as_str()
            .ok_or_else(|| ConsoleError::Runtime("customer has no name".to_string()))?;

        let card = UniversalCardProps {
            source: Service::Stripe,
            title: name.to_string(),
            subtitle: Some(request.input.to_string()),
            status: Some(CardStatus::Success),
            data_points: vec![DataPoint::new("Messages", request.history.len())],
        };
        Ok(RuntimeReply::default().with_part(
            MessageContent::Text(format!("Found {name}")),
            Some(ComponentInstance::UniversalCard(card)),
        ))
    }
}

#[tokio::test]
async fn injected_runtime_answers_submissions() {
    let dir = TempDir::new().unwrap();
    let store = CredentialStore::open(dir.path().join("credentials.json"))
        .await
        .unwrap();
    let config = ConsoleConfig::default().with_canvas_width(80);
    let mut console = Console::new(config, store, Arc::new(CustomerRuntime)).unwrap();

    let Submission::Answered(messages) = console.submit("alex@startup.io").await else {
        panic!("expected an answer");
    };
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content.text(), "Found Alex Thompson");
    let Some(ComponentInstance::UniversalCard(card)) = &messages[0].component else {
        panic!("expected a card");
    };
    assert_eq!(card.data_points, vec![DataPoint::new("Messages", 1)]);

    let canvas = console.canvas().unwrap();
    assert!(canvas.iter().any(|line| line.contains("Alex Thompson")));
}

#[tokio::test]
async fn dashboard_shows_activity_and_weekly_charts() {
    let dir = TempDir::new().unwrap();
    let mut console = console_at(&dir, "http://127.0.0.1:9").await;

    let Submission::Answered(messages) = console.submit("dashboard").await else {
        panic!("expected an answer");
    };
    assert_eq!(messages.len(), 3);

    let kinds: Vec<&str> = console
        .conversation()
        .thread()
        .components()
        .map(|component| component.kind().name())
        .collect();
    assert_eq!(kinds, vec!["UnifiedTimeline", "LiveMetricChart", "LiveMetricChart"]);
}
