//! Supabase (PostgREST) user table adapter.

use async_trait::async_trait;
use opsflow_credentials::{CredentialName, Credentials, Service};
use opsflow_tools::{DataType, InputConstraints, OutputSpec, ToolInput, ToolOutput, ToolSpec};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum_macros::EnumIter;
use tracing::{debug, info};

use crate::adapter::{
    ActionReport, OperationInfo, ServiceAdapter, join_url, parse_input, send, send_json, to_output,
};
use crate::demo;
use crate::error::{AdapterError, Result};
use crate::normalize::iso_to_date;

/// Table and column names must be plain identifiers.
const IDENTIFIER_PATTERN: &str = "^[A-Za-z_][A-Za-z0-9_]*$";

/// Operations exposed by [`SupabaseAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum SupabaseOperation {
    GetUser,
    UpdateUser,
}

/// A normalized user row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub plan: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
struct GetUserInput {
    email: String,
    #[serde(default = "default_table")]
    table: String,
}

#[derive(Debug, Deserialize)]
struct UpdateUserInput {
    user_id: String,
    field: String,
    value: String,
    #[serde(default = "default_table")]
    table: String,
}

fn default_table() -> String {
    "users".to_string()
}

/// Supabase REST adapter.
pub struct SupabaseAdapter {
    /// Service or anon key.
    key: Option<String>,

    /// Project URL from the `supabase_url` credential.
    project_url: Option<String>,

    /// Project URL used when no credential overrides it.
    default_url: String,

    /// HTTP client.
    client: reqwest::Client,
}

impl SupabaseAdapter {
    /// Create an adapter using the Supabase key and project URL from `credentials`.
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            key: credentials.get(CredentialName::Supabase).map(str::to_string),
            project_url: credentials
                .get(CredentialName::SupabaseUrl)
                .map(str::to_string),
            default_url: "https://your-project.supabase.co".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Set the project URL used when no `supabase_url` credential is set.
    pub fn with_default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = url.into();
        self
    }

    /// Share an HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Project URL requests are sent to.
    pub fn base_url(&self) -> &str {
        self.project_url.as_deref().unwrap_or(&self.default_url)
    }

    fn request(&self, method: Method, table: &str) -> Result<reqwest::RequestBuilder> {
        let key = self
            .key
            .as_deref()
            .ok_or(AdapterError::MissingCredential(CredentialName::Supabase))?;

        Ok(self
            .client
            .request(method, join_url(self.base_url(), &format!("rest/v1/{table}")))
            .header("apikey", key)
            .bearer_auth(key))
    }

    async fn get_user(&self, input: GetUserInput) -> Result<User> {
        let GetUserInput { email, table } = input;
        debug!("Looking up {email} in {table}");

        let filter = format!("eq.{email}");
        let request = self
            .request(Method::GET, &table)?
            .query(&[("email", filter.as_str()), ("select", "*")]);
        let rows: Vec<Map<String, Value>> = send_json(request, "Failed to fetch user").await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AdapterError::NotFound("User not found".to_string()))?;

        let id = match row.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => return Err(AdapterError::InvalidResponse("user row has no id".to_string())),
        };
        let plan = ["plan", "plan_tier"]
            .iter()
            .find_map(|column| row.get(*column).and_then(Value::as_str))
            .map(str::to_string);
        let created_at = row
            .get("created_at")
            .and_then(Value::as_str)
            .map_or_else(|| "Unknown".to_string(), iso_to_date);

        Ok(User {
            id,
            email: row
                .get("email")
                .and_then(Value::as_str)
                .map_or(email, str::to_string),
            plan,
            created_at,
        })
    }

    async fn update_user(&self, input: UpdateUserInput) -> Result<ActionReport> {
        let UpdateUserInput {
            user_id,
            field,
            value,
            table,
        } = input;

        let filter = format!("eq.{user_id}");
        let mut body = Map::new();
        body.insert(field.clone(), Value::String(value.clone()));

        let request = self
            .request(Method::PATCH, &table)?
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(&body);
        send(request, "Failed to update user").await?;

        info!("Updated {field} of {user_id} in {table}");
        Ok(ActionReport::done(format!("Updated {field} to {value}")))
    }
}

fn identifier_constraint() -> InputConstraints {
    InputConstraints {
        pattern: Some(IDENTIFIER_PATTERN.to_string()),
        ..Default::default()
    }
}

#[async_trait]
impl ServiceAdapter for SupabaseAdapter {
    type Operation = SupabaseOperation;

    fn service(&self) -> Service {
        Service::Supabase
    }

    fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    fn describe(&self, operation: SupabaseOperation) -> OperationInfo {
        let table = ToolInput::optional("table", DataType::String, "Table name")
            .with_default(json!("users"))
            .with_constraints(identifier_constraint());

        match operation {
            SupabaseOperation::GetUser => OperationInfo {
                name: "get_supabase_user",
                description: "Get user info from Supabase by email",
                spec: ToolSpec::new()
                    .with_input(
                        ToolInput::required("email", DataType::String, "User email to look up")
                            .with_constraints(InputConstraints::email()),
                    )
                    .with_input(table)
                    .with_output(OutputSpec::object(vec![
                        ToolOutput::new("id", DataType::String, "User ID"),
                        ToolOutput::new("email", DataType::String, "Email address"),
                        ToolOutput::new("plan", DataType::String, "Subscription plan").nullable(),
                        ToolOutput::new("created_at", DataType::String, "Signup date"),
                    ])),
                mutating: false,
            },
            SupabaseOperation::UpdateUser => OperationInfo {
                name: "update_supabase_user",
                description: "Update a user field in Supabase",
                spec: ToolSpec::new()
                    .with_input(ToolInput::required("user_id", DataType::String, "User ID"))
                    .with_input(
                        ToolInput::required("field", DataType::String, "Field to update")
                            .with_constraints(identifier_constraint()),
                    )
                    .with_input(ToolInput::required("value", DataType::String, "New value"))
                    .with_input(table)
                    .with_output(ActionReport::output_spec()),
                mutating: true,
            },
        }
    }

    async fn invoke(&self, operation: SupabaseOperation, input: Value) -> Result<Value> {
        match operation {
            SupabaseOperation::GetUser => to_output(&self.get_user(parse_input(input)?).await?),
            SupabaseOperation::UpdateUser => {
                to_output(&self.update_user(parse_input(input)?).await?)
            }
        }
    }

    fn demo(&self, operation: SupabaseOperation, input: &Value) -> Result<Value> {
        match operation {
            SupabaseOperation::GetUser => to_output(&demo::supabase_user()),
            SupabaseOperation::UpdateUser => {
                let input: UpdateUserInput = parse_input(input.clone())?;
                to_output(&ActionReport::demo(format!(
                    "{} of {} would be set to {}",
                    input.field, input.user_id, input.value
                )))
            }
        }
    }
}
