//! LLM provider client.
//!
//! Contains the [`Provider`] struct which wraps rig-core provider clients
//! behind enum dispatch and implements [`ChatModel`] with one raw completion
//! request per call. Tool calls come back to the engine instead of being
//! executed by rig-core, so the engine can pause them.

use anyhow::{bail, Context, Result};
use rig::client::CompletionClient;
use rig::completion::CompletionModel;
use rig::message::{
    AssistantContent, Message as RigMessage, Text, ToolCall as RigToolCall, ToolFunction,
};
use rig::providers::{anthropic, openai, openrouter};
use rig::OneOrMany;
use tracing::{debug, warn};

use super::kind::ProviderKind;
use super::resolve::ModelSelection;
use crate::config::Config;
use crate::constants::MAX_TOKENS;
use crate::engine::{ChatModel, ModelRequest};
use crate::message::{ChatMessage, Role, ToolCall};
use crate::tools::rig_adapter::to_rig_definition;

/// Internal enum wrapping provider-specific clients.
enum ClientKind {
    Anthropic(anthropic::Client),
    OpenAI(openai::Client),
    OpenRouter(openrouter::Client),
    Ollama(openai::Client),
}

/// A configured LLM provider ready to handle completion requests.
pub struct Provider {
    client: ClientKind,
    model: String,
}

/// Dispatches an operation across provider-specific clients.
///
/// Matches on [`ClientKind`] and executes the same block for each variant,
/// letting the compiler monomorphize per provider.
macro_rules! dispatch {
    ($self:expr, |$client:ident| $body:expr) => {
        match &$self.client {
            ClientKind::Anthropic($client) => $body,
            ClientKind::OpenAI($client) => $body,
            ClientKind::OpenRouter($client) => $body,
            ClientKind::Ollama($client) => $body,
        }
    };
}

impl Provider {
    /// Creates a new [`Provider`] from the loaded application config.
    ///
    /// API keys resolve env var first, then config file.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is found for the selected provider
    /// or if client construction fails.
    pub fn from_config(config: &Config, selection: &ModelSelection) -> Result<Self> {
        let client = match selection.provider {
            ProviderKind::Anthropic => {
                let api_key = config
                    .resolve_api_key("anthropic")
                    .context("No API key found for Anthropic. Set ANTHROPIC_API_KEY or configure it in config.toml")?;
                ClientKind::Anthropic(
                    anthropic::Client::new(&api_key)
                        .context("Failed to create Anthropic client")?,
                )
            }
            ProviderKind::OpenAI => {
                let api_key = config
                    .resolve_api_key("openai")
                    .context("No API key found for OpenAI. Set OPENAI_API_KEY or configure it in config.toml")?;
                ClientKind::OpenAI(
                    openai::Client::new(&api_key).context("Failed to create OpenAI client")?,
                )
            }
            ProviderKind::OpenRouter => {
                let api_key = config
                    .resolve_api_key("openrouter")
                    .context("No API key found for OpenRouter. Set OPENROUTER_API_KEY or configure it in config.toml")?;
                ClientKind::OpenRouter(
                    openrouter::Client::new(&api_key)
                        .context("Failed to create OpenRouter client")?,
                )
            }
            ProviderKind::Ollama => {
                let base_url = config
                    .provider
                    .ollama
                    .as_ref()
                    .and_then(|o| o.base_url.as_deref())
                    .unwrap_or(crate::constants::OLLAMA_DEFAULT_BASE_URL);
                ClientKind::Ollama(
                    openai::Client::builder()
                        .api_key("ollama")
                        .base_url(format!("{}/v1", base_url))
                        .build()
                        .context("Failed to create Ollama client")?,
                )
            }
        };
        Ok(Self {
            client,
            model: selection.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl ChatModel for Provider {
    async fn complete(&self, request: ModelRequest) -> Result<ChatMessage> {
        let mut history: Vec<RigMessage> = request
            .messages
            .iter()
            .filter_map(convert_message_to_rig)
            .collect();
        let Some(prompt) = history.pop() else {
            bail!("cannot call the model with an empty conversation");
        };
        let tools: Vec<_> = request.tools.iter().map(to_rig_definition).collect();
        debug!(
            model = %self.model,
            messages = history.len() + 1,
            tools = tools.len(),
            "sending completion request"
        );

        let choice = dispatch!(self, |client| {
            client
                .completion_model(&self.model)
                .completion_request(prompt)
                .preamble(request.system_prompt.clone())
                .messages(history)
                .tools(tools)
                .max_tokens(MAX_TOKENS)
                .send()
                .await
                .context("Model request failed")?
                .choice
        });

        Ok(message_from_choice(choice))
    }
}

/// Builds the crate's assistant message from a completion choice.
///
/// Text parts are concatenated. Reasoning and other content is dropped.
fn message_from_choice(choice: OneOrMany<AssistantContent>) -> ChatMessage {
    let mut text = String::new();
    let mut calls = Vec::new();
    for item in choice {
        match item {
            AssistantContent::Text(t) => text.push_str(&t.text),
            AssistantContent::ToolCall(tc) => {
                let mut call = ToolCall::new(tc.id, tc.function.name, tc.function.arguments);
                call.call_id = tc.call_id;
                calls.push(call);
            }
            _ => {}
        }
    }
    if calls.is_empty() {
        ChatMessage::assistant(text)
    } else {
        ChatMessage::assistant_with_tools(text, calls)
    }
}

/// Converts a [`ChatMessage`] to a rig-core [`RigMessage`].
///
/// Handles all message roles:
/// - **User** → `RigMessage::User` with text content
/// - **Assistant** (text only) → `RigMessage::Assistant` with text content
/// - **Assistant** (with tool calls) → `RigMessage::Assistant` with `ToolCall` content items
/// - **Tool** (result) → `RigMessage::User` with `ToolResult` content
/// - **System** → `None` (the system prompt is sent as the preamble)
fn convert_message_to_rig(msg: &ChatMessage) -> Option<RigMessage> {
    match msg.role {
        Role::User => Some(RigMessage::user(msg.text())),
        Role::Assistant => {
            if msg.tool_calls.is_empty() {
                Some(RigMessage::assistant(msg.text()))
            } else {
                let mut items: Vec<AssistantContent> = Vec::new();
                let text = msg.text();
                if !text.is_empty() {
                    items.push(AssistantContent::Text(Text {
                        text: text.to_string(),
                    }));
                }
                for tc in &msg.tool_calls {
                    let mut call = RigToolCall::new(
                        tc.id.clone(),
                        ToolFunction::new(tc.name.clone(), tc.arguments.clone()),
                    );
                    call.call_id = tc.call_id.clone();
                    items.push(AssistantContent::ToolCall(call));
                }
                Some(RigMessage::Assistant {
                    id: None,
                    content: OneOrMany::many(items)
                        .unwrap_or_else(|_| OneOrMany::one(AssistantContent::text(""))),
                })
            }
        }
        Role::Tool => {
            let tool_call_id = match &msg.tool_call_id {
                Some(id) => id.clone(),
                None => {
                    warn!("tool message missing tool_call_id, using empty string");
                    String::new()
                }
            };
            Some(RigMessage::tool_result_with_call_id(
                tool_call_id,
                msg.tool_call_ref.clone(),
                msg.text(),
            ))
        }
        Role::System => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rig_call(id: &str, call_id: Option<&str>, name: &str) -> AssistantContent {
        let mut call = RigToolCall::new(
            id.to_string(),
            ToolFunction::new(name.to_string(), json!({"subreddit": "rust"})),
        );
        call.call_id = call_id.map(String::from);
        AssistantContent::ToolCall(call)
    }

    #[test]
    fn test_text_choice_becomes_assistant_message() {
        let message = message_from_choice(OneOrMany::one(AssistantContent::text("Hello")));
        assert_eq!(message, ChatMessage::assistant("Hello"));
    }

    #[test]
    fn test_tool_calls_keep_ids() {
        let choice = OneOrMany::many(vec![
            AssistantContent::text("Let me look."),
            rig_call("fc_1", Some("call_1"), "Reddit_GetPostsInSubreddit"),
            rig_call("fc_2", None, "Reddit_GetMyUsername"),
        ])
        .unwrap();

        let message = message_from_choice(choice);

        assert_eq!(message.text(), "Let me look.");
        assert_eq!(message.tool_calls.len(), 2);
        assert_eq!(message.tool_calls[0].id, "fc_1");
        assert_eq!(message.tool_calls[0].call_id.as_deref(), Some("call_1"));
        assert_eq!(message.tool_calls[0].name, "Reddit_GetPostsInSubreddit");
        assert_eq!(message.tool_calls[0].arguments["subreddit"], "rust");
        assert_eq!(message.tool_calls[1].call_id, None);
    }

    #[test]
    fn test_convert_roles() {
        let call = ToolCall::new("fc_1", "Reddit_GetMyUsername", json!({}));
        assert!(matches!(
            convert_message_to_rig(&ChatMessage::user("hi")),
            Some(RigMessage::User { .. })
        ));
        assert!(matches!(
            convert_message_to_rig(&ChatMessage::assistant_with_tools("", vec![call.clone()])),
            Some(RigMessage::Assistant { .. })
        ));
        assert!(matches!(
            convert_message_to_rig(&ChatMessage::tool_result(&call, "u/me")),
            Some(RigMessage::User { .. })
        ));
    }
}
