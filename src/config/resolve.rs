//! Environment variable substitution and effective value resolution.
//!
//! Values resolve with precedence: CLI flag > environment > config file >
//! built-in default.

use super::types::{Config, ProviderEntry};
use super::ConfigError;

use crate::constants::{
    ARCADE_DEFAULT_BASE_URL, DEFAULT_APPROVAL_TOOLS, DEFAULT_TOOLKITS, DEFAULT_TOOL_LIMIT,
    ENV_ARCADE_API_KEY, ENV_ARCADE_BASE_URL, ENV_MODEL, ENV_USER_ID,
};
use crate::tools::ToolQuery;

/// Tool selection given on the command line. Empty lists mean "not given".
#[derive(Debug, Clone, Default)]
pub struct ToolOverrides {
    pub toolkits: Vec<String>,
    pub tools: Vec<String>,
    pub limit: Option<usize>,
}

/// Reads an environment variable, treating empty values as unset.
pub(super) fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn pick_list(cli: &[String], file: &Option<Vec<String>>, default: &[&str]) -> Vec<String> {
    if !cli.is_empty() {
        cli.to_vec()
    } else if let Some(list) = file {
        list.clone()
    } else {
        default.iter().map(|s| s.to_string()).collect()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Resolve {env:VAR_NAME} patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        for field in [
            &mut self.model,
            &mut self.default_provider,
            &mut self.user_id,
            &mut self.system_prompt,
            &mut self.arcade.api_key,
            &mut self.arcade.base_url,
        ] {
            if let Some(value) = field {
                *value = Self::resolve_str(value);
            }
        }
        Self::resolve_provider_entry(&mut self.provider.openai);
        Self::resolve_provider_entry(&mut self.provider.anthropic);
        Self::resolve_provider_entry(&mut self.provider.ollama);
        Self::resolve_provider_entry(&mut self.provider.openrouter);
    }

    /// Resolves `{env:VAR}` patterns in a single provider entry's `api_key` and `base_url`.
    fn resolve_provider_entry(entry: &mut Option<ProviderEntry>) {
        if let Some(ref mut e) = entry {
            if let Some(ref mut key) = e.api_key {
                *key = Self::resolve_str(key);
            }
            if let Some(ref mut url) = e.base_url {
                *url = Self::resolve_str(url);
            }
        }
    }

    /// Replace {env:VAR} with the environment variable value.
    ///
    /// Substituted values are copied as-is and never scanned again.
    pub(super) fn resolve_str(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        let mut rest = s;
        while let Some(start) = rest.find("{env:") {
            let Some(end) = rest[start..].find('}') else {
                break;
            };
            let var_name = &rest[start + 5..start + end];
            result.push_str(&rest[..start]);
            result.push_str(&std::env::var(var_name).unwrap_or_default());
            rest = &rest[start + end + 1..];
        }
        result.push_str(rest);
        result
    }

    /// Resolve API key for a provider: env var first, then config value.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        // OPENAI_API_KEY, ANTHROPIC_API_KEY, etc.
        if let Some(val) = env_var(&format!("{}_API_KEY", provider.to_uppercase())) {
            return Some(val);
        }

        let entry = match provider {
            "openai" => &self.provider.openai,
            "anthropic" => &self.provider.anthropic,
            "ollama" => &self.provider.ollama,
            "openrouter" => &self.provider.openrouter,
            _ => &None,
        };
        entry.as_ref().and_then(|e| non_empty(&e.api_key))
    }

    /// Get the configured default provider name, if any.
    pub fn provider_name(&self) -> Option<&str> {
        self.default_provider.as_deref()
    }

    /// The Arcade user the tools run as.
    pub fn user_id(&self) -> Result<String, ConfigError> {
        self.user_id_with(env_var)
    }

    pub(super) fn user_id_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        env(ENV_USER_ID)
            .or_else(|| non_empty(&self.user_id))
            .ok_or(ConfigError::MissingUserId)
    }

    /// The model string, possibly still carrying a provider prefix.
    pub fn model_name(&self, cli_model: Option<&str>) -> Result<String, ConfigError> {
        self.model_name_with(cli_model, env_var)
    }

    pub(super) fn model_name_with(
        &self,
        cli_model: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        cli_model
            .filter(|m| !m.trim().is_empty())
            .map(String::from)
            .or_else(|| env(ENV_MODEL))
            .or_else(|| non_empty(&self.model))
            .ok_or(ConfigError::MissingModel)
    }

    pub fn arcade_api_key(&self) -> Result<String, ConfigError> {
        env_var(ENV_ARCADE_API_KEY)
            .or_else(|| non_empty(&self.arcade.api_key))
            .ok_or(ConfigError::MissingArcadeKey)
    }

    pub fn arcade_base_url(&self) -> String {
        env_var(ENV_ARCADE_BASE_URL)
            .or_else(|| non_empty(&self.arcade.base_url))
            .unwrap_or_else(|| ARCADE_DEFAULT_BASE_URL.to_string())
    }

    /// The configured system prompt, or the built-in Reddit prompt.
    pub fn system_prompt(&self) -> String {
        non_empty(&self.system_prompt)
            .unwrap_or_else(|| crate::prompt::REDDIT_SYSTEM_PROMPT.to_string())
    }

    /// Builds the tool query for `user_id`.
    pub fn tool_query(&self, user_id: String, overrides: &ToolOverrides) -> ToolQuery {
        ToolQuery {
            toolkits: pick_list(&overrides.toolkits, &self.tools.toolkits, DEFAULT_TOOLKITS),
            tools: pick_list(&overrides.tools, &self.tools.tools, &[]),
            user_id,
            limit: overrides
                .limit
                .or(self.tools.limit)
                .unwrap_or(DEFAULT_TOOL_LIMIT),
            require_approval: pick_list(&[], &self.tools.require_approval, DEFAULT_APPROVAL_TOOLS),
        }
    }
}
