//! Configuration types and path resolution for reddit-agent.
//!
//! Settings come from `.env`/process environment, an optional TOML file at
//! the platform's XDG config path (e.g. `~/.config/reddit-agent/config.toml`
//! on Linux), and an optional project `reddit-agent.toml`.

mod loader;
mod paths;
mod resolve;
mod types;

pub use resolve::ToolOverrides;
pub use types::Config;

use anyhow::Result;
use thiserror::Error;

/// A required setting is missing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing ARCADE_USER_ID. Add it to your .env file.")]
    MissingUserId,
    #[error("Missing OPENAI_MODEL. Add it to your .env file.")]
    MissingModel,
    #[error("Missing ARCADE_API_KEY. Add it to your .env file.")]
    MissingArcadeKey,
}

impl Config {
    /// Load config with precedence: project > global > defaults.
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project()?;

        let mut config = global;
        if let Some(proj) = project {
            config = Self::merge(config, proj);
        }

        config.resolve_substitutions();
        Ok(config)
    }
}

#[cfg(test)]
mod tests;
