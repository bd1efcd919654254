//! Resend email adapter.

use async_trait::async_trait;
use opsflow_credentials::{CredentialName, Credentials, Service};
use opsflow_tools::{DataType, InputConstraints, OutputSpec, ToolInput, ToolOutput, ToolSpec};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum_macros::EnumIter;
use tracing::info;

use crate::adapter::{OperationInfo, ServiceAdapter, join_url, parse_input, send_json, to_output};
use crate::demo;
use crate::error::{AdapterError, Result};
use crate::normalize::iso_to_datetime;

/// Sender used when the caller does not pick one.
pub const DEFAULT_FROM: &str = "OpsFlow <noreply@resend.dev>";

const MAX_LISTED: usize = 10;

/// Operations exposed by [`ResendAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum ResendOperation {
    ListEmails,
    SendEmail,
}

/// A normalized sent email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    /// Recipients, comma separated.
    pub to: String,
    pub subject: String,
    pub created_at: String,
}

/// Result of sending an email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentEmail {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendEmailInput {
    to: String,
    subject: String,
    html: String,
    #[serde(default = "default_from")]
    from: String,
}

fn default_from() -> String {
    DEFAULT_FROM.to_string()
}

#[derive(Debug, Deserialize)]
struct ResendList {
    #[serde(default)]
    data: Vec<ResendEmail>,
}

#[derive(Debug, Deserialize)]
struct ResendEmail {
    id: String,
    to: Recipients,
    #[serde(default)]
    subject: String,
    created_at: String,
}

/// `to` is either a single address or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    fn joined(self) -> String {
        match self {
            Self::One(address) => address,
            Self::Many(addresses) => addresses.join(", "),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

/// Resend email adapter.
pub struct ResendAdapter {
    /// API key.
    key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,
}

impl ResendAdapter {
    /// Create an adapter using the Resend credential from `credentials`.
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            key: credentials.get(CredentialName::Resend).map(str::to_string),
            base_url: "https://api.resend.com".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Share an HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn request(&self, method: Method) -> Result<reqwest::RequestBuilder> {
        let key = self
            .key
            .as_deref()
            .ok_or(AdapterError::MissingCredential(CredentialName::Resend))?;

        Ok(self
            .client
            .request(method, join_url(&self.base_url, "emails"))
            .bearer_auth(key))
    }

    async fn list_emails(&self) -> Result<Vec<Email>> {
        let list: ResendList = send_json(self.request(Method::GET)?, "Failed to fetch emails").await?;

        let emails: Vec<Email> = list
            .data
            .into_iter()
            .take(MAX_LISTED)
            .map(|email| Email {
                id: email.id,
                to: email.to.joined(),
                subject: email.subject,
                created_at: iso_to_datetime(&email.created_at),
            })
            .collect();

        info!("Fetched {} emails", emails.len());
        Ok(emails)
    }

    async fn send_email(&self, input: SendEmailInput) -> Result<SentEmail> {
        let SendEmailInput {
            to,
            subject,
            html,
            from,
        } = input;

        let request = self.request(Method::POST)?.json(&json!({
            "from": from,
            "to": to,
            "subject": subject,
            "html": html,
        }));
        let response: SendResponse = send_json(request, "Failed to send email").await?;

        info!("Sent email to {to}");
        Ok(SentEmail {
            success: true,
            message: "Email sent successfully".to_string(),
            email_id: response.id,
        })
    }
}

#[async_trait]
impl ServiceAdapter for ResendAdapter {
    type Operation = ResendOperation;

    fn service(&self) -> Service {
        Service::Resend
    }

    fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    fn describe(&self, operation: ResendOperation) -> OperationInfo {
        match operation {
            ResendOperation::ListEmails => OperationInfo {
                name: "list_resend_emails",
                description: "List recent emails sent via Resend",
                spec: ToolSpec::new().with_output(OutputSpec::list(vec![
                    ToolOutput::new("id", DataType::String, "Email ID"),
                    ToolOutput::new("to", DataType::String, "Recipients"),
                    ToolOutput::new("subject", DataType::String, "Subject line"),
                    ToolOutput::new("created_at", DataType::String, "Send time"),
                ])),
                mutating: false,
            },
            ResendOperation::SendEmail => OperationInfo {
                name: "send_resend_email",
                description: "Send an email via Resend",
                spec: ToolSpec::new()
                    .with_input(
                        ToolInput::required("to", DataType::String, "Recipient email")
                            .with_constraints(InputConstraints::email()),
                    )
                    .with_input(ToolInput::required("subject", DataType::String, "Email subject"))
                    .with_input(ToolInput::required("html", DataType::String, "HTML body content"))
                    .with_input(
                        ToolInput::optional("from", DataType::String, "Sender")
                            .with_default(json!(DEFAULT_FROM)),
                    )
                    .with_output(OutputSpec::object(vec![
                        ToolOutput::new("success", DataType::Boolean, "Whether the email was accepted"),
                        ToolOutput::new("message", DataType::String, "Human-readable summary"),
                        ToolOutput::new("email_id", DataType::String, "Provider email ID").optional(),
                    ])),
                mutating: true,
            },
        }
    }

    async fn invoke(&self, operation: ResendOperation, input: Value) -> Result<Value> {
        match operation {
            ResendOperation::ListEmails => to_output(&self.list_emails().await?),
            ResendOperation::SendEmail => to_output(&self.send_email(parse_input(input)?).await?),
        }
    }

    fn demo(&self, operation: ResendOperation, input: &Value) -> Result<Value> {
        match operation {
            ResendOperation::ListEmails => to_output(&demo::resend_emails()),
            ResendOperation::SendEmail => {
                let input: SendEmailInput = parse_input(input.clone())?;
                to_output(&SentEmail {
                    success: true,
                    message: format!(
                        "Demo mode, nothing was changed: email {:?} would be sent to {}",
                        input.subject, input.to
                    ),
                    email_id: None,
                })
            }
        }
    }
}
