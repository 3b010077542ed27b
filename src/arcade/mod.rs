//! HTTP client for the Arcade tool platform.
//!
//! Arcade hosts the Reddit tools, holds users' OAuth grants, and executes
//! tool calls on their behalf. [`ArcadeClient`] wraps the handful of REST
//! endpoints the agent needs and implements the crate's collaborator traits
//! ([`ToolSource`], [`ToolBackend`], [`AuthorizationWaiter`]) on top of them.

mod types;

pub use types::{
    AuthStatus, AuthorizationResponse, ExecuteResponse, ToolDefinition, ToolPage, ToolParameter,
    ValueSchema,
};

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::{ARCADE_REQUEST_TIMEOUT_SECS, AUTH_WAIT_SECS, AUTH_WAIT_SLACK_SECS};
use crate::resolver::AuthorizationWaiter;
use crate::tools::{ToolBackend, ToolOutcome, ToolSource};
use types::{AuthorizeRequest, ExecuteRequest};

/// Errors talking to Arcade.
#[derive(Debug, Error)]
pub enum ArcadeError {
    #[error("request to Arcade {path} failed: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Arcade returned {status} for {path}: {body}")]
    Api {
        status: StatusCode,
        path: String,
        body: String,
    },
    #[error("invalid Arcade URL {0}")]
    Url(String),
    #[error("authorization for {0} returned no request id")]
    MissingRequestId(String),
}

/// A configured connection to the Arcade API.
pub struct ArcadeClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ArcadeClient {
    /// Creates a client for `base_url` authenticating with `api_key`.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, ArcadeError> {
        let raw = format!("{}{}", self.base_url, path);
        let url = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        url.map_err(|_| ArcadeError::Url(raw))
    }

    /// Sends a request and decodes a JSON body, mapping non-2xx to [`ArcadeError::Api`].
    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ArcadeError> {
        let http_err = |source| ArcadeError::Http {
            path: path.to_string(),
            source,
        };
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArcadeError::Api {
                status,
                path: path.to_string(),
                body,
            });
        }
        response.json::<T>().await.map_err(http_err)
    }

    /// Lists the tools of one toolkit (`GET /v1/tools`).
    pub async fn list_tools(
        &self,
        toolkit: &str,
        limit: usize,
        user_id: &str,
    ) -> Result<ToolPage, ArcadeError> {
        let path = "/v1/tools";
        let url = self.url(
            path,
            &[
                ("toolkit", toolkit.to_string()),
                ("limit", limit.to_string()),
                ("offset", "0".to_string()),
                ("user_id", user_id.to_string()),
            ],
        )?;
        debug!(toolkit, limit, "listing Arcade tools");
        self.send(
            path,
            self.http
                .get(url)
                .timeout(Duration::from_secs(ARCADE_REQUEST_TIMEOUT_SECS)),
        )
        .await
    }

    /// Fetches one tool definition (`GET /v1/tools/{name}`).
    pub async fn tool(&self, name: &str, user_id: &str) -> Result<ToolDefinition, ArcadeError> {
        let path = format!("/v1/tools/{}", name);
        let url = self.url(&path, &[("user_id", user_id.to_string())])?;
        self.send(
            &path,
            self.http
                .get(url)
                .timeout(Duration::from_secs(ARCADE_REQUEST_TIMEOUT_SECS)),
        )
        .await
    }

    /// Starts authorization of `user_id` for `tool_name` (`POST /v1/tools/authorize`).
    ///
    /// Returns immediately with status `completed` when the user already
    /// granted the needed scopes.
    pub async fn authorize_tool(
        &self,
        tool_name: &str,
        user_id: &str,
    ) -> Result<AuthorizationResponse, ArcadeError> {
        let path = "/v1/tools/authorize";
        let url = self.url(path, &[])?;
        let body = AuthorizeRequest { tool_name, user_id };
        self.send(
            path,
            self.http
                .post(url)
                .json(&body)
                .timeout(Duration::from_secs(ARCADE_REQUEST_TIMEOUT_SECS)),
        )
        .await
    }

    /// Long-polls the status of an authorization request (`GET /v1/auth/status`).
    pub async fn auth_status(
        &self,
        id: &str,
        wait_secs: u64,
    ) -> Result<AuthorizationResponse, ArcadeError> {
        let path = "/v1/auth/status";
        let url = self.url(
            path,
            &[("id", id.to_string()), ("wait", wait_secs.to_string())],
        )?;
        self.send(
            path,
            self.http
                .get(url)
                .timeout(Duration::from_secs(wait_secs + AUTH_WAIT_SLACK_SECS)),
        )
        .await
    }

    /// Polls until the authorization request leaves `pending`.
    pub async fn wait_for_auth(&self, id: &str) -> Result<AuthorizationResponse, ArcadeError> {
        loop {
            let response = self.auth_status(id, AUTH_WAIT_SECS).await?;
            if !response.status.is_waiting() {
                return Ok(response);
            }
            debug!(id, "authorization still pending");
        }
    }

    /// Executes a tool for a user (`POST /v1/tools/execute`).
    pub async fn execute_tool(
        &self,
        tool_name: &str,
        input: &Value,
        user_id: &str,
    ) -> Result<ExecuteResponse, ArcadeError> {
        let path = "/v1/tools/execute";
        let url = self.url(path, &[])?;
        let body = ExecuteRequest {
            tool_name,
            input,
            user_id,
        };
        debug!(tool_name, "executing tool");
        self.send(
            path,
            self.http
                .post(url)
                .json(&body)
                .timeout(Duration::from_secs(ARCADE_REQUEST_TIMEOUT_SECS)),
        )
        .await
    }
}

/// Turns an execute response into the text the model reads.
pub fn outcome_from_response(response: ExecuteResponse) -> ToolOutcome {
    let output = response.output.unwrap_or_default();
    if let Some(error) = output.error {
        let mut text = format!("Error: {}", error.message);
        if let Some(extra) = error.additional_prompt_content {
            text.push('\n');
            text.push_str(&extra);
        }
        return ToolOutcome::error(text);
    }
    let content = match output.value {
        Some(Value::String(s)) => s,
        Some(value) => value.to_string(),
        None => String::new(),
    };
    if response.success == Some(false) {
        ToolOutcome::error(format!("Error: tool call failed. {}", content))
    } else {
        ToolOutcome::success(content)
    }
}

#[async_trait::async_trait]
impl ToolSource for ArcadeClient {
    async fn list_toolkit(
        &self,
        toolkit: &str,
        limit: usize,
        user_id: &str,
    ) -> anyhow::Result<Vec<ToolDefinition>> {
        let page = self.list_tools(toolkit, limit, user_id).await?;
        debug!(toolkit, total = ?page.total_count, returned = page.items.len(), "listed toolkit");
        Ok(page.items)
    }

    async fn get_tool(&self, name: &str, user_id: &str) -> anyhow::Result<ToolDefinition> {
        Ok(self.tool(name, user_id).await?)
    }
}

#[async_trait::async_trait]
impl ToolBackend for ArcadeClient {
    async fn authorize(
        &self,
        tool_name: &str,
        user_id: &str,
    ) -> anyhow::Result<AuthorizationResponse> {
        let response = self.authorize_tool(tool_name, user_id).await?;
        if response.status != AuthStatus::Completed && response.id.is_none() {
            return Err(ArcadeError::MissingRequestId(tool_name.to_string()).into());
        }
        Ok(response)
    }

    async fn execute(
        &self,
        tool_name: &str,
        input: Value,
        user_id: &str,
    ) -> anyhow::Result<ToolOutcome> {
        let response = self.execute_tool(tool_name, &input, user_id).await?;
        let outcome = outcome_from_response(response);
        if outcome.is_error {
            warn!(tool_name, "tool returned an error");
        }
        Ok(outcome)
    }
}

#[async_trait::async_trait]
impl AuthorizationWaiter for ArcadeClient {
    async fn wait_for_completion(&self, id: &str) -> anyhow::Result<AuthorizationResponse> {
        Ok(self.wait_for_auth(id).await?)
    }
}
