//! Interactive chat REPL for reddit-agent.
//!
//! Reads a line, runs it through the [`ConversationEngine`] as one turn,
//! and prints every message the turn produces. When the engine pauses on
//! interrupts, the [`InterruptResolver`] gets a decision for each and the
//! turn resumes, until a stream finishes without interrupts.
//!
//! # Readline behavior
//!
//! - **exit**: ends the session (any case)
//! - **Ctrl+C**: cancels current input, stays in REPL
//! - **Ctrl+D**: ends the session
//! - Readline history is persisted to `~/.cache/reddit-agent/chat_history.txt`

use anyhow::Result;
use colored::Colorize;
use futures::StreamExt;
use tracing::debug;

use crate::config::Config;
use crate::console::{Console, ReadOutcome, TerminalConsole};
use crate::constants::{EXIT_COMMAND, FAREWELL_LINE, WELCOME_LINE};
use crate::engine::{ConversationEngine, StreamUpdate, ThreadConfig, TurnInput};
use crate::format;
use crate::interrupt::{Interrupt, ResumePayload};
use crate::resolver::InterruptResolver;

/// What happened during one turn.
#[derive(Debug, Default)]
pub struct TurnSummary {
    /// Resume payloads sent to the engine, in order.
    pub resumes: Vec<ResumePayload>,
}

/// Whether the typed line ends the session.
pub fn is_exit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(EXIT_COMMAND)
}

/// Runs the interactive chat REPL on `thread` until the user exits.
pub async fn run_chat(
    engine: &ConversationEngine,
    resolver: &InterruptResolver,
    thread: &ThreadConfig,
) -> Result<()> {
    let history_path = Config::history_path().ok();
    let mut console = TerminalConsole::new(history_path)?;
    run_session(engine, resolver, &mut console, thread).await?;
    console.save_history()
}

/// Reads lines from `console` and runs each as a turn until `exit` or end
/// of input. A failed turn is reported and the session goes on.
pub async fn run_session(
    engine: &ConversationEngine,
    resolver: &InterruptResolver,
    console: &mut dyn Console,
    thread: &ThreadConfig,
) -> Result<()> {
    console.plain(&WELCOME_LINE.green().to_string());

    loop {
        match console.read_line("> ")? {
            ReadOutcome::Line(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if is_exit(line) {
                    break;
                }
                if let Err(e) = run_turn(engine, resolver, console, thread, line).await {
                    console.error(&format!("{:#}", e));
                }
            }
            ReadOutcome::Interrupted => {
                console.plain(&"^C".dimmed().to_string());
                continue;
            }
            ReadOutcome::Eof => break,
        }
    }

    console.plain(&FAREWELL_LINE.red().to_string());
    Ok(())
}

/// Runs one user message to completion, resolving interrupts as they come.
pub async fn run_turn(
    engine: &ConversationEngine,
    resolver: &InterruptResolver,
    console: &mut dyn Console,
    thread: &ThreadConfig,
    text: &str,
) -> Result<TurnSummary> {
    let mut summary = TurnSummary::default();
    let mut input = TurnInput::Message(text.to_string());
    loop {
        let interrupts = stream_turn(engine, input, thread, console).await?;
        let Some(payload) = resolver.resolve_all(&interrupts, console).await else {
            break;
        };
        debug!(decisions = payload.len(), "resuming turn");
        summary.resumes.push(payload.clone());
        input = TurnInput::Resume(payload);
    }
    Ok(summary)
}

/// Drains one engine stream, printing messages and collecting interrupts.
async fn stream_turn(
    engine: &ConversationEngine,
    input: TurnInput,
    thread: &ThreadConfig,
    console: &mut dyn Console,
) -> Result<Vec<Interrupt>> {
    let mut stream = engine.stream(input, thread);
    let mut interrupts = Vec::new();
    while let Some(update) = stream.next().await {
        match update? {
            StreamUpdate::Messages { node, messages } => {
                for message in &messages {
                    debug!(%node, role = %message.role, "message");
                    console.message(&format::format_message(message));
                }
            }
            StreamUpdate::Interrupts(batch) => interrupts.extend(batch),
        }
    }
    Ok(interrupts)
}
