//! Linear GraphQL adapter.
//!
//! Every operation is a single POST to the GraphQL endpoint. A response
//! carrying an `errors` array is a rejection even when the status is 200.

use async_trait::async_trait;
use opsflow_credentials::{CredentialName, Credentials, Service};
use opsflow_tools::{DataType, InputConstraints, OutputSpec, ToolInput, ToolOutput, ToolSpec};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum_macros::EnumIter;
use tracing::{debug, info};

use crate::adapter::{OperationInfo, ServiceAdapter, parse_input, send_json, to_output};
use crate::demo;
use crate::error::{AdapterError, Result};

const ISSUES_QUERY: &str = r#"
query Issues($limit: Int!) {
  issues(first: $limit) {
    nodes {
      id
      identifier
      title
      state { name }
      priority
    }
  }
}
"#;

const CREATE_ISSUE_MUTATION: &str = r#"
mutation CreateIssue($title: String!, $description: String, $teamId: String!) {
  issueCreate(input: { title: $title, description: $description, teamId: $teamId }) {
    success
    issue { identifier }
  }
}
"#;

/// Operations exposed by [`LinearAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum LinearOperation {
    ListIssues,
    CreateIssue,
}

/// A normalized Linear issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub identifier: String,
    pub title: String,
    pub state: String,
    pub priority: i64,
}

/// Result of creating an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ListIssuesInput {
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
struct CreateIssueInput {
    title: String,
    description: Option<String>,
    team_id: String,
}

/// GraphQL response envelope.
#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct IssuesData {
    issues: Connection<LinearIssue>,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct LinearIssue {
    id: String,
    identifier: String,
    title: String,
    state: Option<LinearState>,
    #[serde(default)]
    priority: i64,
}

#[derive(Debug, Deserialize)]
struct LinearState {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueCreateData {
    issue_create: IssueCreatePayload,
}

#[derive(Debug, Deserialize)]
struct IssueCreatePayload {
    success: bool,
    issue: Option<IssueRef>,
}

#[derive(Debug, Deserialize)]
struct IssueRef {
    identifier: String,
}

/// Linear issue tracker adapter.
pub struct LinearAdapter {
    /// API key, sent without a scheme.
    key: Option<String>,

    /// GraphQL endpoint.
    endpoint: String,

    /// HTTP client.
    client: reqwest::Client,
}

impl LinearAdapter {
    /// Create an adapter using the Linear credential from `credentials`.
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            key: credentials.get(CredentialName::Linear).map(str::to_string),
            endpoint: "https://api.linear.app/graphql".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Set the GraphQL endpoint.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    /// Share an HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Run one query and unwrap the envelope.
    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        context: &'static str,
    ) -> Result<T> {
        let key = self
            .key
            .as_deref()
            .ok_or(AdapterError::MissingCredential(CredentialName::Linear))?;

        let request = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, key)
            .json(&json!({ "query": query, "variables": variables }));
        let response: GraphQlResponse<T> = send_json(request, context).await?;

        if let Some(error) = response.errors.into_iter().next() {
            return Err(AdapterError::Provider(error.message));
        }
        response
            .data
            .ok_or_else(|| AdapterError::InvalidResponse("GraphQL response has no data".to_string()))
    }

    async fn list_issues(&self, input: ListIssuesInput) -> Result<Vec<Issue>> {
        debug!("Listing {} Linear issues", input.limit);
        let data: IssuesData = self
            .graphql(
                ISSUES_QUERY,
                json!({ "limit": input.limit }),
                "Failed to fetch Linear issues",
            )
            .await?;

        let issues: Vec<Issue> = data
            .issues
            .nodes
            .into_iter()
            .map(|issue| Issue {
                id: issue.id,
                identifier: issue.identifier,
                title: issue.title,
                state: issue
                    .state
                    .map_or_else(|| "Unknown".to_string(), |state| state.name),
                priority: issue.priority,
            })
            .collect();

        info!("Fetched {} Linear issues", issues.len());
        Ok(issues)
    }

    async fn create_issue(&self, input: CreateIssueInput) -> Result<CreatedIssue> {
        let data: IssueCreateData = self
            .graphql(
                CREATE_ISSUE_MUTATION,
                json!({
                    "title": input.title,
                    "description": input.description,
                    "teamId": input.team_id,
                }),
                "Failed to create issue",
            )
            .await?;

        let payload = data.issue_create;
        let identifier = payload.issue.map(|issue| issue.identifier);
        let message = match (&identifier, payload.success) {
            (Some(identifier), true) => format!("Created issue {identifier}"),
            _ => "Failed to create".to_string(),
        };

        info!("Linear issueCreate returned success={}", payload.success);
        Ok(CreatedIssue {
            success: payload.success,
            identifier,
            message,
        })
    }
}

#[async_trait]
impl ServiceAdapter for LinearAdapter {
    type Operation = LinearOperation;

    fn service(&self) -> Service {
        Service::Linear
    }

    fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    fn describe(&self, operation: LinearOperation) -> OperationInfo {
        match operation {
            LinearOperation::ListIssues => OperationInfo {
                name: "list_linear_issues",
                description: "List recent issues from Linear",
                spec: ToolSpec::new()
                    .with_input(
                        ToolInput::optional("limit", DataType::Integer, "Number of issues")
                            .with_default(json!(10))
                            .with_constraints(InputConstraints::range(1.0, 250.0)),
                    )
                    .with_output(OutputSpec::list(vec![
                        ToolOutput::new("id", DataType::String, "Issue ID"),
                        ToolOutput::new("identifier", DataType::String, "Team-scoped key"),
                        ToolOutput::new("title", DataType::String, "Issue title"),
                        ToolOutput::new("state", DataType::String, "Workflow state"),
                        ToolOutput::new("priority", DataType::Integer, "0 (none) to 4 (low)"),
                    ])),
                mutating: false,
            },
            LinearOperation::CreateIssue => OperationInfo {
                name: "create_linear_issue",
                description: "Create a new issue in Linear",
                spec: ToolSpec::new()
                    .with_input(
                        ToolInput::required("title", DataType::String, "Issue title")
                            .with_constraints(InputConstraints::length(1, 255)),
                    )
                    .with_input(ToolInput::optional(
                        "description",
                        DataType::String,
                        "Issue description",
                    ))
                    .with_input(ToolInput::required("team_id", DataType::String, "Linear team ID"))
                    .with_output(OutputSpec::object(vec![
                        ToolOutput::new("success", DataType::Boolean, "Whether the issue was created"),
                        ToolOutput::new("identifier", DataType::String, "New issue key").optional(),
                        ToolOutput::new("message", DataType::String, "Human-readable summary"),
                    ])),
                mutating: true,
            },
        }
    }

    async fn invoke(&self, operation: LinearOperation, input: Value) -> Result<Value> {
        match operation {
            LinearOperation::ListIssues => to_output(&self.list_issues(parse_input(input)?).await?),
            LinearOperation::CreateIssue => {
                to_output(&self.create_issue(parse_input(input)?).await?)
            }
        }
    }

    fn demo(&self, operation: LinearOperation, input: &Value) -> Result<Value> {
        match operation {
            LinearOperation::ListIssues => {
                let input: ListIssuesInput = parse_input(input.clone())?;
                let issues: Vec<Issue> = demo::linear_issues()
                    .into_iter()
                    .take(input.limit as usize)
                    .collect();
                to_output(&issues)
            }
            LinearOperation::CreateIssue => {
                let input: CreateIssueInput = parse_input(input.clone())?;
                to_output(&CreatedIssue {
                    success: true,
                    identifier: None,
                    message: format!(
                        "Demo mode, nothing was changed: issue {:?} would be created",
                        input.title
                    ),
                })
            }
        }
    }
}
