//! Per-thread conversation state kept between turns.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::interrupt::Interrupt;
use crate::message::{ChatMessage, ToolCall};

/// A tool call the model asked for that has not produced a result yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCall {
    pub call: ToolCall,
    /// The user granted the OAuth scopes the tool needs.
    pub authorized: bool,
    /// The user said yes to running it.
    pub approved: bool,
    /// The user refused authorization or approval. The call will not run.
    pub denied: bool,
    /// Interrupt the call is paused on, if any.
    pub awaiting: Option<Interrupt>,
}

impl PendingCall {
    pub fn new(call: ToolCall) -> Self {
        Self {
            call,
            authorized: false,
            approved: false,
            denied: false,
            awaiting: None,
        }
    }
}

/// Everything the engine remembers about one thread.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Checkpoint {
    pub messages: Vec<ChatMessage>,
    pub pending: Vec<PendingCall>,
}

impl Checkpoint {
    /// Whether a paused turn is waiting for a resume payload.
    #[cfg(test)]
    pub fn is_suspended(&self) -> bool {
        self.pending.iter().any(|p| p.awaiting.is_some())
    }
}

/// Storage for checkpoints, keyed by thread id.
pub trait CheckpointStore: Send + Sync {
    /// Latest checkpoint for `thread_id`, empty if the thread is new.
    fn load(&self, thread_id: &str) -> Checkpoint;

    fn save(&self, thread_id: &str, checkpoint: Checkpoint);
}

/// In-memory store that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemorySaver {
    threads: Mutex<HashMap<String, Checkpoint>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for MemorySaver {
    fn load(&self, thread_id: &str) -> Checkpoint {
        self.threads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }

    fn save(&self, thread_id: &str, checkpoint: Checkpoint) {
        self.threads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(thread_id.to_string(), checkpoint);
    }
}
