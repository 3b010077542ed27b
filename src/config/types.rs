//! Struct definitions for reddit-agent configuration.

use serde::{Deserialize, Serialize};

/// Root configuration, deserialized from `config.toml` or `reddit-agent.toml`.
///
/// Every field is optional so the agent runs from environment variables
/// alone when no config file exists.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Model identifier, optionally prefixed (`openai:gpt-4o`, `anthropic/claude-sonnet-4-5`).
    #[serde(default)]
    pub model: Option<String>,
    /// Default provider name (e.g. "openai", "anthropic").
    #[serde(default)]
    pub default_provider: Option<String>,
    /// Arcade user id the tools run as.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Replaces the built-in Reddit system prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Per-provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub arcade: ArcadeConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Provider-specific configuration map.
///
/// Each field corresponds to a supported LLM provider. Only providers
/// the user has configured will be `Some`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    pub openai: Option<ProviderEntry>,
    pub anthropic: Option<ProviderEntry>,
    pub ollama: Option<ProviderEntry>,
    pub openrouter: Option<ProviderEntry>,
}

/// Connection details for a single LLM provider.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderEntry {
    /// API key for authentication. Environment variables take precedence.
    pub api_key: Option<String>,
    /// Custom base URL (only used for Ollama).
    pub base_url: Option<String>,
}

/// Where the Arcade API lives and how to authenticate with it.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ArcadeConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// Which tools to fetch from Arcade.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ToolsConfig {
    /// Toolkits pulled in full. Defaults to `["Reddit"]`.
    pub toolkits: Option<Vec<String>>,
    /// Individually named tools, e.g. `"Math.Sqrt"`.
    pub tools: Option<Vec<String>>,
    /// Maximum number of tool definitions.
    pub limit: Option<usize>,
    /// Tools gated behind a yes/no question.
    pub require_approval: Option<Vec<String>>,
}
