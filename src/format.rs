//! Terminal rendering of conversation messages.

use colored::Colorize;
use serde_json::Value;

use crate::constants::MESSAGE_HEADER_WIDTH;
use crate::message::{ChatMessage, Role};

/// Formats a message as a titled block: header, tool name, body, tool calls.
///
/// ```text
/// ================================== Ai Message ==================================
///
/// Looking that up.
/// Tool Calls:
///   Reddit_GetMyUsername (call_1)
///  Call ID: call_1
///   Args:
/// ```
pub fn format_message(msg: &ChatMessage) -> String {
    let mut out = message_header(msg.role);
    if msg.role == Role::Tool {
        if let Some(name) = &msg.name {
            out.push_str(&format!("\nName: {}", name));
        }
    }
    out.push_str("\n\n");
    out.push_str(&format_body(msg.text(), msg.role));

    if !msg.tool_calls.is_empty() {
        out.push_str("\nTool Calls:");
        for call in &msg.tool_calls {
            out.push_str(&format!("\n  {} ({})", call.name.bold(), call.id));
            out.push_str(&format!("\n Call ID: {}", call.id));
            out.push_str("\n  Args:");
            for line in format_args_lines(&call.arguments) {
                out.push_str(&format!("\n    {}", line));
            }
        }
    }
    out
}

/// `==== Ai Message ====` padded to the header width.
fn message_header(role: Role) -> String {
    let title = format!(" {} Message ", role);
    let pad = MESSAGE_HEADER_WIDTH.saturating_sub(title.chars().count());
    let left = pad / 2;
    format!("{}{}{}", "=".repeat(left), title, "=".repeat(pad - left))
}

fn format_body(text: &str, role: Role) -> String {
    match role {
        Role::Assistant => render_markdown_lite(text),
        _ => text.to_string(),
    }
}

/// One `key: value` line per top-level argument, strings unquoted.
fn format_args_lines(arguments: &Value) -> Vec<String> {
    match arguments {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => format!("{}: {}", key, s),
                other => format!("{}: {}", key, other),
            })
            .collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// Minimal markdown renderer for terminal output.
/// Not a full parser. Handles the three most common patterns
/// in LLM output: bold, inline code, and fenced code blocks.
pub fn render_markdown_lite(text: &str) -> String {
    let mut output = String::new();
    let mut in_code_block = false;

    for line in text.lines() {
        if line.starts_with("```") {
            if in_code_block {
                in_code_block = false;
                output.push('\n');
            } else {
                in_code_block = true;
                let lang = line.trim_start_matches('`');
                if !lang.is_empty() {
                    output.push_str(&format!("  {}\n", lang.dimmed()));
                }
            }
            continue;
        }

        if in_code_block {
            output.push_str(&format!("  {}\n", line.dimmed()));
            continue;
        }

        output.push_str(&render_inline(line));
        output.push('\n');
    }

    if output.ends_with('\n') {
        output.pop();
    }
    output
}

/// Handle **bold** and `inline code` within a single line.
fn render_inline(line: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        if i + 1 < len && chars[i] == '*' && chars[i + 1] == '*' {
            if let Some(end) = find_closing(&chars, i + 2, &['*', '*']) {
                let bold_text: String = chars[i + 2..end].iter().collect();
                result.push_str(&bold_text.bold().to_string());
                i = end + 2;
                continue;
            }
        }

        if chars[i] == '`' {
            if let Some(end) = find_closing(&chars, i + 1, &['`']) {
                let code_text: String = chars[i + 1..end].iter().collect();
                result.push_str(&code_text.dimmed().to_string());
                i = end + 1;
                continue;
            }
        }

        result.push(chars[i]);
        i += 1;
    }

    result
}

fn find_closing(chars: &[char], start: usize, pattern: &[char]) -> Option<usize> {
    if chars.len() < pattern.len() {
        return None;
    }
    (start..=chars.len() - pattern.len()).find(|&i| chars[i..i + pattern.len()] == *pattern)
}
