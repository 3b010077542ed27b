//! Tool discovery and the seams the engine uses to run tools.
//!
//! Tools are not implemented in this crate: they live on the Arcade
//! platform. [`get_tools`] pulls their definitions into a [`ToolCatalog`],
//! and the engine authorizes and executes calls through a [`ToolBackend`].

pub mod rig_adapter;
pub mod schema;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

use crate::arcade::{AuthorizationResponse, ToolDefinition};

/// The result of executing a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutcome {
    pub fn success(content: String) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    pub fn error(content: String) -> Self {
        Self {
            content,
            is_error: true,
        }
    }
}

/// Where tool definitions come from.
#[async_trait::async_trait]
pub trait ToolSource: Send + Sync {
    /// Every tool of `toolkit`, at most `limit` of them.
    async fn list_toolkit(
        &self,
        toolkit: &str,
        limit: usize,
        user_id: &str,
    ) -> Result<Vec<ToolDefinition>>;

    /// A single tool by qualified name.
    async fn get_tool(&self, name: &str, user_id: &str) -> Result<ToolDefinition>;
}

/// Authorizes and runs tool calls on behalf of a user.
#[async_trait::async_trait]
pub trait ToolBackend: Send + Sync {
    /// Starts (or checks) the authorization `user_id` needs for `tool_name`.
    async fn authorize(&self, tool_name: &str, user_id: &str) -> Result<AuthorizationResponse>;

    /// Executes `tool_name` with `input`.
    async fn execute(&self, tool_name: &str, input: Value, user_id: &str) -> Result<ToolOutcome>;
}

/// A tool as the engine and the model see it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    /// Model-facing name, e.g. `Reddit_SubmitTextPost`.
    pub name: String,
    /// Arcade name, e.g. `Reddit.SubmitTextPost`.
    pub qualified_name: String,
    pub description: String,
    /// JSON Schema of the input object.
    pub parameters: Value,
    pub requires_authorization: bool,
    pub requires_approval: bool,
}

/// Model-facing name for a qualified Arcade tool name.
///
/// Model APIs reject dots in function names.
pub fn model_tool_name(qualified_name: &str) -> String {
    qualified_name.replace('.', "_")
}

impl ToolSpec {
    pub fn from_definition(definition: &ToolDefinition, requires_approval: bool) -> Self {
        let qualified_name = definition.qualified_name();
        Self {
            name: model_tool_name(&qualified_name),
            qualified_name,
            description: definition.description.clone(),
            parameters: schema::parameters_schema(&definition.input.parameters),
            requires_authorization: definition.requires_authorization(),
            requires_approval,
        }
    }
}

/// What to fetch from the tool source.
#[derive(Debug, Clone)]
pub struct ToolQuery {
    /// Toolkits to pull every tool from.
    pub toolkits: Vec<String>,
    /// Individually named tools.
    pub tools: Vec<String>,
    /// User the tools are scoped to.
    pub user_id: String,
    /// Maximum number of definitions kept.
    pub limit: usize,
    /// Tools that need an explicit yes before running (either name form).
    pub require_approval: Vec<String>,
}

/// Holds all discovered tools and looks them up by model-facing name.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolSpec>,
}

impl ToolCatalog {
    pub fn new(tools: Vec<ToolSpec>) -> Self {
        Self { tools }
    }

    /// Look up a tool by the name the model calls it with.
    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolSpec> {
        self.tools.iter()
    }

    /// How many tools are registered.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Fetches the tools described by `query`.
///
/// Toolkits are fetched first, then individually named tools. Duplicates
/// keep their first position, and the result is cut to `query.limit`.
pub async fn get_tools(source: &dyn ToolSource, query: &ToolQuery) -> Result<ToolCatalog> {
    let mut definitions = Vec::new();
    for toolkit in &query.toolkits {
        let listed = source
            .list_toolkit(toolkit, query.limit, &query.user_id)
            .await?;
        debug!(toolkit = %toolkit, count = listed.len(), "fetched toolkit");
        definitions.extend(listed);
    }
    for name in &query.tools {
        definitions.push(source.get_tool(name, &query.user_id).await?);
    }

    // Both `Reddit.SubmitTextPost` and `Reddit_SubmitTextPost` are accepted.
    let needs_approval = |spec_name: &str| {
        query
            .require_approval
            .iter()
            .any(|n| model_tool_name(n) == spec_name)
    };

    let mut seen = HashSet::new();
    let mut specs = Vec::new();
    for definition in &definitions {
        if specs.len() >= query.limit {
            break;
        }
        let qualified = definition.qualified_name();
        if !seen.insert(qualified.clone()) {
            continue;
        }
        let approval = needs_approval(&model_tool_name(&qualified));
        specs.push(ToolSpec::from_definition(definition, approval));
    }

    Ok(ToolCatalog::new(specs))
}
