//! LLM provider abstraction for reddit-agent.
//!
//! Wraps rig-core's provider clients behind a [`Provider`] struct with enum
//! dispatch, keeping provider-specific details out of the engine. Supports
//! OpenAI, Anthropic, OpenRouter, and Ollama (local) via `ProviderKind`.

mod client;
mod kind;
mod resolve;

pub use client::Provider;
pub use resolve::resolve_model;
