//! Entry point for reddit-agent, a terminal Reddit assistant.
//!
//! This binary loads environment variables, initializes logging, parses CLI
//! arguments via [`cli`], and dispatches to the chat REPL or a subcommand.

mod arcade;
mod chat;
mod cli;
mod config;
mod console;
mod constants;
mod engine;
mod format;
mod interrupt;
mod message;
mod prompt;
mod provider;
mod resolver;
mod tools;

use anyhow::Result;

/// Runs the reddit-agent CLI.
///
/// Loads `.env` files (silently ignored if absent) before anything reads the
/// environment. Logs go to stderr, filtered by `RUST_LOG` (default `warn`).
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::parse();
    cli::run(cli).await
}
