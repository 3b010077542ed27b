//! File loading and merging for reddit-agent configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::types::{ArcadeConfig, Config, ProviderConfig, ProviderEntry, ToolsConfig};

impl Config {
    /// Loads the global config from `~/.config/reddit-agent/config.toml`.
    ///
    /// A missing file is not an error: the defaults are returned.
    pub(super) fn load_global() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    /// Look for reddit-agent.toml in current dir, then walk up to git root.
    pub(super) fn load_project() -> Result<Option<Config>> {
        let mut dir = std::env::current_dir()?;
        loop {
            let candidate = dir.join(crate::constants::PROJECT_CONFIG_FILENAME);
            if candidate.exists() {
                return Self::from_file(&candidate).map(Some);
            }
            // Stop at git root or filesystem root
            if dir.join(".git").exists() || !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    pub(super) fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config at {:?}", path))
    }

    /// Merge project config over global config.
    /// Project values win when present.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        Config {
            model: project.model.or(global.model),
            default_provider: project.default_provider.or(global.default_provider),
            user_id: project.user_id.or(global.user_id),
            system_prompt: project.system_prompt.or(global.system_prompt),
            provider: ProviderConfig {
                openai: merge_entry(project.provider.openai, global.provider.openai),
                anthropic: merge_entry(project.provider.anthropic, global.provider.anthropic),
                ollama: merge_entry(project.provider.ollama, global.provider.ollama),
                openrouter: merge_entry(project.provider.openrouter, global.provider.openrouter),
            },
            arcade: ArcadeConfig {
                api_key: project.arcade.api_key.or(global.arcade.api_key),
                base_url: project.arcade.base_url.or(global.arcade.base_url),
            },
            tools: ToolsConfig {
                toolkits: project.tools.toolkits.or(global.tools.toolkits),
                tools: project.tools.tools.or(global.tools.tools),
                limit: project.tools.limit.or(global.tools.limit),
                require_approval: project
                    .tools
                    .require_approval
                    .or(global.tools.require_approval),
            },
        }
    }
}

fn merge_entry(project: Option<ProviderEntry>, global: Option<ProviderEntry>) -> Option<ProviderEntry> {
    match (project, global) {
        (Some(p), Some(g)) => Some(ProviderEntry {
            api_key: p.api_key.or(g.api_key),
            base_url: p.base_url.or(g.base_url),
        }),
        (p, g) => p.or(g),
    }
}
