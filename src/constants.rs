//! Centralized constants for reddit-agent.
//!
//! All magic numbers, default strings, and configuration constants live here
//! so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "reddit-agent";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "reddit-agent.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "chat_history.txt";

/// Maximum tokens for LLM completions.
pub const MAX_TOKENS: u64 = 4096;

// --- Environment ---

/// Identifies who is authorizing each service on Arcade.
pub const ENV_USER_ID: &str = "ARCADE_USER_ID";

/// Model the agent runs on.
pub const ENV_MODEL: &str = "OPENAI_MODEL";

/// Arcade API key.
pub const ENV_ARCADE_API_KEY: &str = "ARCADE_API_KEY";

/// Optional Arcade endpoint override.
pub const ENV_ARCADE_BASE_URL: &str = "ARCADE_BASE_URL";

// --- Provider defaults ---

/// Default provider when the model string does not name one.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Default base URL for local Ollama server.
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

// --- Arcade ---

/// Default Arcade API endpoint.
pub const ARCADE_DEFAULT_BASE_URL: &str = "https://api.arcade.dev";

/// Toolkits whose tools are all pulled from Arcade.
pub const DEFAULT_TOOLKITS: &[&str] = &["Reddit"];

/// Maximum number of tool definitions Arcade will return.
pub const DEFAULT_TOOL_LIMIT: usize = 100;

/// Tools that need an explicit yes from the user before they run.
pub const DEFAULT_APPROVAL_TOOLS: &[&str] = &[
    "Reddit.CommentOnPost",
    "Reddit.ReplyToComment",
    "Reddit.SubmitTextPost",
];

/// Seconds Arcade holds an authorization status request open.
pub const AUTH_WAIT_SECS: u64 = 59;

/// Extra slack on top of the long poll before the HTTP client gives up.
pub const AUTH_WAIT_SLACK_SECS: u64 = 30;

/// Timeout for ordinary Arcade requests.
pub const ARCADE_REQUEST_TIMEOUT_SECS: u64 = 60;

// --- Terminal ---

/// Prefix for status lines written by the agent itself.
pub const STATUS_MARKER: &str = "⚙️:";

/// Prefix for model and tool messages.
pub const MESSAGE_MARKER: &str = "🤖: ";

/// Printed once when the REPL starts.
pub const WELCOME_LINE: &str = "Welcome to the chatbot! Type 'exit' to quit.";

/// Printed once when the REPL ends.
pub const FAREWELL_LINE: &str = "👋 Bye...";

/// Input that ends the session (compared case-insensitively).
pub const EXIT_COMMAND: &str = "exit";

/// Question asked before a human-in-the-loop tool call runs.
pub const APPROVAL_QUESTION: &str = "Do you approve this tool call?";

/// Width of the `=====` header around formatted messages.
pub const MESSAGE_HEADER_WIDTH: usize = 80;
