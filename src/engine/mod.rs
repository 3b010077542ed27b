//! The conversation engine: a model/tools loop that can pause mid-turn.
//!
//! A turn alternates between a model step (send the history, get a reply)
//! and a tools step (run the calls the reply asked for) until the model
//! answers without tool calls. Before a tools step runs anything, each call
//! is gated: a tool that needs an OAuth grant the user has not given, or an
//! explicit approval, suspends the turn with a batch of [`Interrupt`]s. The
//! suspended calls live in the thread's [`Checkpoint`] until the caller
//! resumes the turn with a [`ResumePayload`].
//!
//! Each step yields a [`StreamUpdate`] on a stream, so callers print
//! messages as they happen.

pub mod checkpoint;

use anyhow::{Context, Result};
use futures::stream::{self, BoxStream, StreamExt};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::arcade::AuthStatus;
use crate::interrupt::{AuthorizationRequest, Interrupt, InterruptKind, ResumePayload};
use crate::message::ChatMessage;
use crate::tools::{ToolBackend, ToolCatalog, ToolSpec};

pub use checkpoint::{Checkpoint, CheckpointStore, MemorySaver, PendingCall};

/// Everything a model needs to produce the next assistant message.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system_prompt: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolSpec>,
}

/// A language model that answers with text, tool calls, or both.
#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: ModelRequest) -> Result<ChatMessage>;
}

/// Identifies the conversation a turn belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadConfig {
    pub thread_id: String,
}

impl ThreadConfig {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
        }
    }

    /// A thread with a fresh random id.
    pub fn random() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Input that starts or continues a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnInput {
    /// A new user message.
    Message(String),
    /// Decisions for the interrupts that paused the previous stream.
    Resume(ResumePayload),
}

/// Which step produced a batch of messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Model,
    Tools,
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Model => write!(f, "model"),
            Node::Tools => write!(f, "tools"),
        }
    }
}

/// One item of a turn's stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    /// Messages appended to the history by one step.
    Messages {
        node: Node,
        messages: Vec<ChatMessage>,
    },
    /// The turn is paused. Always the last item of its stream. Each
    /// interrupt carries its JSON wire value for the caller to classify.
    Interrupts(Vec<Interrupt>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("there is no paused turn to resume")]
    NothingToResume,
    #[error("resume carries {got} decisions but {expected} interrupts are pending")]
    ResumeMismatch { expected: usize, got: usize },
}

/// Collaborators the engine is built from.
pub struct EngineParts {
    pub system_prompt: String,
    pub model: Arc<dyn ChatModel>,
    pub tools: ToolCatalog,
    pub backend: Arc<dyn ToolBackend>,
    pub checkpointer: Arc<dyn CheckpointStore>,
    /// Arcade user the tools run as.
    pub user_id: String,
}

pub struct ConversationEngine {
    system_prompt: String,
    model: Arc<dyn ChatModel>,
    tools: ToolCatalog,
    backend: Arc<dyn ToolBackend>,
    checkpointer: Arc<dyn CheckpointStore>,
    user_id: String,
}

enum Step {
    Begin(TurnInput),
    CallModel,
    RunTools,
    Done,
}

impl ConversationEngine {
    pub fn new(parts: EngineParts) -> Self {
        Self {
            system_prompt: parts.system_prompt,
            model: parts.model,
            tools: parts.tools,
            backend: parts.backend,
            checkpointer: parts.checkpointer,
            user_id: parts.user_id,
        }
    }

    /// Message history of a thread.
    #[cfg(test)]
    pub fn history(&self, thread: &ThreadConfig) -> Vec<ChatMessage> {
        self.checkpointer.load(&thread.thread_id).messages
    }

    /// Runs (or resumes) a turn, yielding one update per step.
    ///
    /// The stream ends after the final model reply, after an
    /// [`StreamUpdate::Interrupts`] item, or after the first error.
    pub fn stream<'a>(
        &'a self,
        input: TurnInput,
        thread: &'a ThreadConfig,
    ) -> BoxStream<'a, Result<StreamUpdate>> {
        stream::unfold(Step::Begin(input), move |step| self.advance(step, thread)).boxed()
    }

    async fn advance(
        &self,
        mut step: Step,
        thread: &ThreadConfig,
    ) -> Option<(Result<StreamUpdate>, Step)> {
        loop {
            let result = match step {
                Step::Done => return None,
                Step::Begin(input) => match self.begin(input, thread) {
                    Ok(next) => {
                        step = next;
                        continue;
                    }
                    Err(e) => Err(e),
                },
                Step::CallModel => self.call_model(thread).await,
                Step::RunTools => self.run_tools(thread).await,
            };
            return Some(match result {
                Ok((update, next)) => (Ok(update), next),
                Err(e) => (Err(e), Step::Done),
            });
        }
    }

    fn begin(&self, input: TurnInput, thread: &ThreadConfig) -> Result<Step> {
        let mut checkpoint = self.checkpointer.load(&thread.thread_id);
        let next = match input {
            TurnInput::Message(text) => {
                for pending in std::mem::take(&mut checkpoint.pending) {
                    debug!(tool = %pending.call.name, "cancelling unresolved tool call");
                    checkpoint.messages.push(ChatMessage::tool_result(
                        &pending.call,
                        "Tool call cancelled: the user sent a new message instead of resolving it.",
                    ));
                }
                checkpoint.messages.push(ChatMessage::user(text));
                Step::CallModel
            }
            TurnInput::Resume(payload) => {
                apply_resume(&mut checkpoint, payload)?;
                Step::RunTools
            }
        };
        self.checkpointer.save(&thread.thread_id, checkpoint);
        Ok(next)
    }

    async fn call_model(&self, thread: &ThreadConfig) -> Result<(StreamUpdate, Step)> {
        let mut checkpoint = self.checkpointer.load(&thread.thread_id);
        let request = ModelRequest {
            system_prompt: self.system_prompt.clone(),
            messages: checkpoint.messages.clone(),
            tools: self.tools.iter().cloned().collect(),
        };
        let reply = self.model.complete(request).await?;
        debug!(
            thread = %thread.thread_id,
            tool_calls = reply.tool_calls.len(),
            "model replied"
        );

        checkpoint.messages.push(reply.clone());
        let next = if reply.has_tool_calls() {
            checkpoint.pending = reply
                .tool_calls
                .iter()
                .cloned()
                .map(PendingCall::new)
                .collect();
            Step::RunTools
        } else {
            Step::Done
        };
        self.checkpointer.save(&thread.thread_id, checkpoint);

        Ok((
            StreamUpdate::Messages {
                node: Node::Model,
                messages: vec![reply],
            },
            next,
        ))
    }

    async fn run_tools(&self, thread: &ThreadConfig) -> Result<(StreamUpdate, Step)> {
        let mut checkpoint = self.checkpointer.load(&thread.thread_id);
        let gated = self.gate(&mut checkpoint.pending).await;
        if !matches!(&gated, Ok(interrupts) if interrupts.is_empty()) {
            self.checkpointer.save(&thread.thread_id, checkpoint);
            let interrupts = gated?;
            debug!(count = interrupts.len(), "turn paused on interrupts");
            return Ok((StreamUpdate::Interrupts(interrupts), Step::Done));
        }

        let mut results = Vec::new();
        for pending in std::mem::take(&mut checkpoint.pending) {
            results.push(self.execute(pending).await);
        }
        checkpoint.messages.extend(results.iter().cloned());
        self.checkpointer.save(&thread.thread_id, checkpoint);

        Ok((
            StreamUpdate::Messages {
                node: Node::Tools,
                messages: results,
            },
            Step::CallModel,
        ))
    }

    /// Checks every live call against its tool's requirements.
    ///
    /// Returns the interrupts raised, in call order. Each call raises at most
    /// one per pass: authorization is settled before approval is asked.
    async fn gate(&self, pending: &mut [PendingCall]) -> Result<Vec<Interrupt>> {
        let mut interrupts = Vec::new();
        for call in pending.iter_mut() {
            call.awaiting = None;
            if call.denied {
                continue;
            }
            let Some(spec) = self.tools.get(&call.call.name) else {
                continue;
            };

            if spec.requires_authorization && !call.authorized {
                let response = self
                    .backend
                    .authorize(&spec.qualified_name, &self.user_id)
                    .await?;
                if response.status == AuthStatus::Completed {
                    call.authorized = true;
                } else {
                    let id = response.id.with_context(|| {
                        format!("authorization for {} has no request id", spec.qualified_name)
                    })?;
                    let interrupt = Interrupt::new(InterruptKind::Authorization {
                        tool_name: spec.qualified_name.clone(),
                        request: AuthorizationRequest {
                            id,
                            url: response.url,
                        },
                    });
                    call.awaiting = Some(interrupt.clone());
                    interrupts.push(interrupt);
                    continue;
                }
            }

            if spec.requires_approval && !call.approved {
                let interrupt = Interrupt::new(InterruptKind::HumanApproval {
                    tool_name: spec.qualified_name.clone(),
                    input: call.call.arguments.clone(),
                });
                call.awaiting = Some(interrupt.clone());
                interrupts.push(interrupt);
            }
        }
        Ok(interrupts)
    }

    /// Runs one call and returns the tool message answering it.
    async fn execute(&self, pending: PendingCall) -> ChatMessage {
        let call = &pending.call;
        if pending.denied {
            return ChatMessage::tool_result(
                call,
                format!("The user did not authorize the {} tool call.", call.name),
            );
        }
        let Some(spec) = self.tools.get(&call.name) else {
            return ChatMessage::tool_result(call, format!("Error: unknown tool {}", call.name));
        };

        debug!(tool = %spec.qualified_name, "running tool");
        let content = match self
            .backend
            .execute(&spec.qualified_name, call.arguments.clone(), &self.user_id)
            .await
        {
            Ok(outcome) => outcome.content,
            Err(e) => format!("Error: {:#}", e),
        };
        ChatMessage::tool_result(call, content)
    }
}

/// Records the user's decisions on the calls the turn is paused on.
fn apply_resume(checkpoint: &mut Checkpoint, payload: ResumePayload) -> Result<()> {
    let expected = checkpoint
        .pending
        .iter()
        .filter(|p| p.awaiting.is_some())
        .count();
    if expected == 0 {
        return Err(EngineError::NothingToResume.into());
    }
    let decisions = payload.into_decisions();
    if decisions.len() != expected {
        return Err(EngineError::ResumeMismatch {
            expected,
            got: decisions.len(),
        }
        .into());
    }

    let awaiting = checkpoint
        .pending
        .iter_mut()
        .filter(|p| p.awaiting.is_some());
    for (call, decision) in awaiting.zip(decisions) {
        let Some(interrupt) = call.awaiting.take() else {
            continue;
        };
        if !decision.authorized {
            call.denied = true;
            continue;
        }
        match interrupt.kind() {
            InterruptKind::Authorization { .. } => call.authorized = true,
            InterruptKind::HumanApproval { .. } => call.approved = true,
            InterruptKind::Unrecognized { .. } => call.denied = true,
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests;
