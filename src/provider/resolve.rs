//! Model resolution logic for reddit-agent.
//!
//! Resolves which provider and model to use from the model string, the
//! `--provider` flag and config. Supports `provider:model` and
//! `provider/model` shorthand.

use anyhow::Result;

use super::kind::ProviderKind;
use crate::config::Config;

use crate::constants::DEFAULT_PROVIDER;

/// Resolved provider + model pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub provider: ProviderKind,
    pub model: String,
}

/// Resolve which provider and model to use.
/// Priority: --provider > prefix in the model string > config > openai.
///
/// Accepts these formats:
///   gpt-4o                            (default provider)
///   openai:gpt-4o                     (provider:model)
///   anthropic/claude-sonnet-4-5       (provider/model, only when --provider is omitted)
///   --provider openrouter "org/model" (slash preserved as model name)
///
/// A prefix that is not a known provider is kept as part of the model name.
pub fn resolve_model(
    cli_provider: Option<&str>,
    model: &str,
    config: &Config,
) -> Result<ModelSelection> {
    if let Some(provider) = cli_provider {
        return Ok(ModelSelection {
            provider: ProviderKind::from_str(provider)?,
            model: model.to_string(),
        });
    }

    for separator in [':', '/'] {
        if let Some((prefix, rest)) = model.split_once(separator) {
            if let Some(provider) = ProviderKind::parse(prefix) {
                return Ok(ModelSelection {
                    provider,
                    model: rest.to_string(),
                });
            }
        }
    }

    let provider_str = config.provider_name().unwrap_or(DEFAULT_PROVIDER);
    Ok(ModelSelection {
        provider: ProviderKind::from_str(provider_str)?,
        model: model.to_string(),
    })
}
