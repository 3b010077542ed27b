//! Terminal input/output used by the chat loop and the interrupt resolver.
//!
//! [`Console`] is the seam between the agent and the person at the
//! keyboard: status lines, model messages, errors, and yes/no questions all
//! go through it. [`TerminalConsole`] implements it over a [`rustyline`]
//! editor so approval prompts share line editing and history with the REPL.

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use crate::constants::{MESSAGE_MARKER, STATUS_MARKER};

/// Everything the agent prints or asks at the terminal.
pub trait Console {
    /// Reads one line of user input with the given prompt.
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;

    /// Writes a plain line with no prefix.
    fn plain(&mut self, text: &str);

    /// Writes a status line prefixed with the status marker.
    fn status(&mut self, text: &str);

    /// Writes a status-marked line to stderr, for problems the agent recovers from.
    fn status_error(&mut self, text: &str);

    /// Writes a formatted model or tool message.
    fn message(&mut self, text: &str);

    /// Writes an error line.
    fn error(&mut self, text: &str);

    /// Asks a yes/no question and returns the answer.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Interprets a typed answer to a yes/no question.
///
/// Only `y` and `yes` (any case, surrounding whitespace ignored) count as
/// approval.
pub fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// One line read from the REPL prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl+C: discard the current line.
    Interrupted,
    /// Ctrl+D or closed stdin.
    Eof,
}

/// [`Console`] backed by stdout/stderr and a rustyline editor.
pub struct TerminalConsole {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
}

impl TerminalConsole {
    /// Creates the console, loading readline history from `history_path` if
    /// it exists.
    pub fn new(history_path: Option<PathBuf>) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        if let Some(path) = history_path.as_deref().filter(|p| p.exists()) {
            let _ = editor.load_history(path);
        }
        Ok(Self {
            editor,
            history_path,
        })
    }

    /// Persists readline history, creating the parent directory if needed.
    pub fn save_history(&mut self) -> Result<()> {
        let Some(path) = self.history_path.clone() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let _ = self.editor.save_history(&path);
        Ok(())
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(e.into()),
        }
    }

    fn plain(&mut self, text: &str) {
        println!("{}", text);
    }

    fn status(&mut self, text: &str) {
        println!("{} {}", STATUS_MARKER, text);
    }

    fn status_error(&mut self, text: &str) {
        eprintln!("{} {}", STATUS_MARKER, text);
    }

    fn message(&mut self, text: &str) {
        println!("{}{}", MESSAGE_MARKER, text);
    }

    fn error(&mut self, text: &str) {
        eprintln!("{} {}", "error:".red().bold(), text);
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        match self.editor.readline(&format!("{} (y/n) ", question)) {
            Ok(answer) => Ok(parse_confirmation(&answer)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_confirmation_accepts_yes() {
        assert!(parse_confirmation("y"));
        assert!(parse_confirmation("YES"));
        assert!(parse_confirmation("  Yes \n"));
    }

    #[test]
    fn test_parse_confirmation_rejects_everything_else() {
        assert!(!parse_confirmation(""));
        assert!(!parse_confirmation("n"));
        assert!(!parse_confirmation("no"));
        assert!(!parse_confirmation("yep"));
        assert!(!parse_confirmation("always"));
    }
}
