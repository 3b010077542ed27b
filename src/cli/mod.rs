//! Command-line interface definition and dispatch for reddit-agent.
//!
//! Uses [`clap`] for argument parsing with derive macros. With no
//! subcommand the agent starts the chat REPL; `tools` prints the catalog
//! the agent would load.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::arcade::ArcadeClient;
use crate::chat;
use crate::config::{Config, ToolOverrides};
use crate::engine::{ConversationEngine, EngineParts, MemorySaver, ThreadConfig};
use crate::provider::{self, Provider};
use crate::resolver::InterruptResolver;
use crate::tools::{self, ToolCatalog};

/// Top-level CLI structure for reddit-agent.
#[derive(Parser)]
#[command(
    name = "reddit-agent",
    version,
    about = "A terminal Reddit agent with human-in-the-loop tool authorization"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Model to use, optionally `provider:model` (overrides OPENAI_MODEL)
    #[arg(short, long, global = true)]
    pub model: Option<String>,
    /// Provider to use (openai, anthropic, openrouter, ollama)
    #[arg(long, global = true)]
    pub provider: Option<String>,
    /// Conversation thread id (random by default)
    #[arg(long)]
    pub thread: Option<String>,
    /// Toolkit to load every tool from (repeatable)
    #[arg(long = "toolkit", global = true)]
    pub toolkits: Vec<String>,
    /// Individual tool to load, e.g. Math.Sqrt (repeatable)
    #[arg(long = "tool", global = true)]
    pub tools: Vec<String>,
    /// Maximum number of tools to load
    #[arg(long, global = true)]
    pub limit: Option<usize>,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// List the tools the agent would load, with their gating flags
    Tools,
}

/// Parses command-line arguments into a [`Cli`] struct.
///
/// Delegates to [`clap::Parser::parse`], which exits the process on invalid input.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Loads configuration, fetches tools, and dispatches to the chosen command.
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let user_id = config.user_id()?;
    let model_name = match cli.command {
        Some(Commands::Tools) => None,
        None => Some(config.model_name(cli.model.as_deref())?),
    };

    let arcade = Arc::new(ArcadeClient::new(
        config.arcade_api_key()?,
        config.arcade_base_url(),
    ));
    let overrides = ToolOverrides {
        toolkits: cli.toolkits.clone(),
        tools: cli.tools.clone(),
        limit: cli.limit,
    };
    let query = config.tool_query(user_id.clone(), &overrides);
    let catalog = tools::get_tools(arcade.as_ref(), &query)
        .await
        .context("Failed to fetch tools from Arcade")?;
    if catalog.is_empty() {
        warn!("Arcade returned no tools; the agent can only chat");
    } else {
        info!(count = catalog.len(), "loaded tools");
    }

    let Some(model_name) = model_name else {
        print_catalog(&catalog);
        return Ok(());
    };

    let selection = provider::resolve_model(cli.provider.as_deref(), &model_name, &config)?;
    let model = Provider::from_config(&config, &selection)?;
    info!(provider = selection.provider.name(), model = %model.model(), "using model");

    let engine = ConversationEngine::new(EngineParts {
        system_prompt: config.system_prompt(),
        model: Arc::new(model),
        tools: catalog,
        backend: arcade.clone(),
        checkpointer: Arc::new(MemorySaver::new()),
        user_id,
    });
    let resolver = InterruptResolver::new(arcade);
    let thread = cli
        .thread
        .map(ThreadConfig::new)
        .unwrap_or_else(ThreadConfig::random);
    info!(thread = %thread.thread_id, "starting session");

    chat::run_chat(&engine, &resolver, &thread).await
}

/// Prints one line per tool: name, then its gating flags.
fn print_catalog(catalog: &ToolCatalog) {
    for tool in catalog.iter() {
        let mut flags = Vec::new();
        if tool.requires_authorization {
            flags.push("auth".yellow().to_string());
        }
        if tool.requires_approval {
            flags.push("approval".magenta().to_string());
        }
        if flags.is_empty() {
            println!("{}", tool.qualified_name.bold());
        } else {
            println!("{} [{}]", tool.qualified_name.bold(), flags.join(", "));
        }
    }
    println!("{}", format!("{} tools", catalog.len()).dimmed());
}
