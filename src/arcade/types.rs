//! Wire types for the Arcade tool platform API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of `GET /v1/tools`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolPage {
    #[serde(default)]
    pub items: Vec<ToolDefinition>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// A tool as Arcade describes it.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolDefinition {
    /// Bare tool name, e.g. `SubmitTextPost`.
    pub name: String,
    /// Toolkit-qualified name, e.g. `Reddit.SubmitTextPost`.
    #[serde(default)]
    pub qualified_name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub toolkit: Option<ToolkitInfo>,
    #[serde(default)]
    pub input: ToolInput,
    #[serde(default)]
    pub requirements: Option<ToolRequirements>,
}

impl ToolDefinition {
    /// `Toolkit.Tool` name used for authorize and execute calls.
    pub fn qualified_name(&self) -> String {
        match (&self.qualified_name, &self.toolkit) {
            (Some(name), _) if !name.is_empty() => name.clone(),
            (_, Some(toolkit)) => format!("{}.{}", toolkit.name, self.name),
            _ => self.name.clone(),
        }
    }

    /// Whether the tool needs a third-party OAuth grant before it runs.
    pub fn requires_authorization(&self) -> bool {
        self.requirements
            .as_ref()
            .and_then(|r| r.authorization.as_ref())
            .is_some_and(|auth| !auth.is_null())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolkitInfo {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub parameters: Vec<ToolParameter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    pub value_schema: ValueSchema,
}

/// Arcade's type description for one parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct ValueSchema {
    pub val_type: String,
    #[serde(default)]
    pub inner_val_type: Option<String>,
    #[serde(default, rename = "enum")]
    pub enum_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolRequirements {
    #[serde(default)]
    pub authorization: Option<Value>,
}

/// Lifecycle of an authorization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    NotStarted,
    Pending,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl AuthStatus {
    /// Whether Arcade may still move this request to another status.
    pub fn is_waiting(self) -> bool {
        matches!(self, Self::NotStarted | Self::Pending)
    }
}

/// Response of `POST /v1/tools/authorize` and `GET /v1/auth/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub status: AuthStatus,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct AuthorizeRequest<'a> {
    pub tool_name: &'a str,
    pub user_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct ExecuteRequest<'a> {
    pub tool_name: &'a str,
    pub input: &'a Value,
    pub user_id: &'a str,
}

/// Response of `POST /v1/tools/execute`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecuteResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub output: Option<ExecuteOutput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecuteOutput {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub error: Option<ExecuteError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteError {
    pub message: String,
    #[serde(default)]
    pub additional_prompt_content: Option<String>,
}
