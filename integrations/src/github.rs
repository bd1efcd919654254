//! GitHub REST adapter.

use async_trait::async_trait;
use opsflow_credentials::{CredentialName, Credentials, Service};
use opsflow_tools::{DataType, InputConstraints, OutputSpec, ToolInput, ToolOutput, ToolSpec};
use reqwest::Method;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum_macros::EnumIter;
use tracing::{debug, info};

use crate::adapter::{
    ActionReport, OperationInfo, ServiceAdapter, join_url, parse_input, send, send_json, to_output,
};
use crate::demo;
use crate::error::{AdapterError, Result};
use crate::normalize::iso_to_date;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const PAGE_SIZE: &str = "10";

/// Operations exposed by [`GithubAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum GithubOperation {
    ListIssues,
    GetRepo,
    CloseIssue,
}

/// A normalized repository issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub user: String,
    pub state: String,
    pub created_at: String,
}

/// Normalized repository summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepoInput {
    owner: String,
    repo: String,
}

#[derive(Debug, Deserialize)]
struct ListIssuesInput {
    owner: String,
    repo: String,
    #[serde(default = "default_state")]
    state: String,
}

fn default_state() -> String {
    "open".to_string()
}

#[derive(Debug, Deserialize)]
struct CloseIssueInput {
    owner: String,
    repo: String,
    issue_number: u64,
}

#[derive(Debug, Deserialize)]
struct GithubIssue {
    id: u64,
    number: u64,
    title: String,
    user: GithubUser,
    state: String,
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GithubRepo {
    full_name: String,
    description: Option<String>,
    stargazers_count: u64,
    forks_count: u64,
    open_issues_count: u64,
    language: Option<String>,
}

/// GitHub issue tracker adapter.
pub struct GithubAdapter {
    /// Bearer token.
    token: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,
}

impl GithubAdapter {
    /// Create an adapter using the GitHub credential from `credentials`.
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            token: credentials.get(CredentialName::Github).map(str::to_string),
            base_url: "https://api.github.com".to_string(),
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

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .ok_or(AdapterError::MissingCredential(CredentialName::Github))?;

        Ok(self
            .client
            .request(method, join_url(&self.base_url, path))
            .bearer_auth(token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, "opsflow"))
    }

    /// List up to ten issues of a repository.
    async fn list_issues(&self, input: ListIssuesInput) -> Result<Vec<Issue>> {
        let ListIssuesInput { owner, repo, state } = input;
        debug!("Listing {state} issues of {owner}/{repo}");

        let request = self
            .request(Method::GET, &format!("repos/{owner}/{repo}/issues"))?
            .query(&[("state", state.as_str()), ("per_page", PAGE_SIZE)]);
        let raw: Vec<GithubIssue> = send_json(request, "Failed to fetch issues").await?;

        let issues: Vec<Issue> = raw
            .into_iter()
            .map(|issue| Issue {
                id: issue.id,
                number: issue.number,
                title: issue.title,
                user: issue.user.login,
                state: issue.state,
                created_at: iso_to_date(&issue.created_at),
            })
            .collect();

        info!("Fetched {} issues from {owner}/{repo}", issues.len());
        Ok(issues)
    }

    async fn get_repo(&self, input: RepoInput) -> Result<RepoInfo> {
        let RepoInput { owner, repo } = input;
        let request = self.request(Method::GET, &format!("repos/{owner}/{repo}"))?;
        let raw: GithubRepo = send_json(request, "Repository not found").await?;

        Ok(RepoInfo {
            name: raw.full_name,
            description: raw.description,
            stars: raw.stargazers_count,
            forks: raw.forks_count,
            open_issues: raw.open_issues_count,
            language: raw.language,
        })
    }

    async fn close_issue(&self, input: CloseIssueInput) -> Result<ActionReport> {
        let CloseIssueInput {
            owner,
            repo,
            issue_number,
        } = input;

        let request = self
            .request(
                Method::PATCH,
                &format!("repos/{owner}/{repo}/issues/{issue_number}"),
            )?
            .json(&json!({ "state": "closed" }));
        send(request, "Failed to close issue").await?;

        info!("Closed issue #{issue_number} in {owner}/{repo}");
        Ok(ActionReport::done(format!(
            "Issue #{issue_number} closed successfully"
        )))
    }
}

fn owner_repo_inputs() -> ToolSpec {
    ToolSpec::new()
        .with_input(ToolInput::required(
            "owner",
            DataType::String,
            "Repository owner (username or org)",
        ))
        .with_input(ToolInput::required("repo", DataType::String, "Repository name"))
}

fn issue_fields() -> Vec<ToolOutput> {
    vec![
        ToolOutput::new("id", DataType::Integer, "Issue ID"),
        ToolOutput::new("number", DataType::Integer, "Issue number"),
        ToolOutput::new("title", DataType::String, "Issue title"),
        ToolOutput::new("user", DataType::String, "Author login"),
        ToolOutput::new("state", DataType::String, "open or closed"),
        ToolOutput::new("created_at", DataType::String, "Creation date"),
    ]
}

#[async_trait]
impl ServiceAdapter for GithubAdapter {
    type Operation = GithubOperation;

    fn service(&self) -> Service {
        Service::Github
    }

    fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    fn describe(&self, operation: GithubOperation) -> OperationInfo {
        match operation {
            GithubOperation::ListIssues => OperationInfo {
                name: "list_github_issues",
                description: "List issues from a GitHub repository",
                spec: owner_repo_inputs()
                    .with_input(
                        ToolInput::optional("state", DataType::String, "Issue state filter")
                            .with_default(json!("open"))
                            .with_constraints(InputConstraints::enum_of(vec![
                                json!("open"),
                                json!("closed"),
                                json!("all"),
                            ])),
                    )
                    .with_output(OutputSpec::list(issue_fields())),
                mutating: false,
            },
            GithubOperation::GetRepo => OperationInfo {
                name: "get_github_repo",
                description: "Get information about a GitHub repository",
                spec: owner_repo_inputs().with_output(OutputSpec::object(vec![
                    ToolOutput::new("name", DataType::String, "Full repository name"),
                    ToolOutput::new("description", DataType::String, "Description").nullable(),
                    ToolOutput::new("stars", DataType::Integer, "Stargazer count"),
                    ToolOutput::new("forks", DataType::Integer, "Fork count"),
                    ToolOutput::new("open_issues", DataType::Integer, "Open issue count"),
                    ToolOutput::new("language", DataType::String, "Primary language").nullable(),
                ])),
                mutating: false,
            },
            GithubOperation::CloseIssue => OperationInfo {
                name: "close_github_issue",
                description: "Close a GitHub issue",
                spec: owner_repo_inputs()
                    .with_input(
                        ToolInput::required("issue_number", DataType::Integer, "Issue number")
                            .with_constraints(InputConstraints {
                                min: Some(1.0),
                                ..Default::default()
                            }),
                    )
                    .with_output(ActionReport::output_spec()),
                mutating: true,
            },
        }
    }

    async fn invoke(&self, operation: GithubOperation, input: Value) -> Result<Value> {
        match operation {
            GithubOperation::ListIssues => to_output(&self.list_issues(parse_input(input)?).await?),
            GithubOperation::GetRepo => to_output(&self.get_repo(parse_input(input)?).await?),
            GithubOperation::CloseIssue => to_output(&self.close_issue(parse_input(input)?).await?),
        }
    }

    fn demo(&self, operation: GithubOperation, input: &Value) -> Result<Value> {
        match operation {
            GithubOperation::ListIssues => to_output(&demo::github_issues()),
            GithubOperation::GetRepo => to_output(&demo::github_repo()),
            GithubOperation::CloseIssue => {
                let input: CloseIssueInput = parse_input(input.clone())?;
                to_output(&ActionReport::demo(format!(
                    "issue #{} in {}/{} would be closed",
                    input.issue_number, input.owner, input.repo
                )))
            }
        }
    }
}
