//! Prompt assembly for a chat turn.
//!
//! The outbound message list is built in four layers, in order:
//!
//! 1. **System instruction**: fixed text from configuration, always present
//! 2. **Context digest**: one system message rendered from the session's
//!    current [`SessionContext`], omitted when the context is empty
//! 3. **History**: the most recent `2 * max_turns` entries of the log
//! 4. **User turn**: the new message
//!
//! The digest is rebuilt on every call and is never stored in the log.
//! Assembly is deterministic: identical inputs produce identical prompts.

use crate::context::SessionContext;
use pitwall_config::SessionConfig;
use pitwall_core::message::Message;

/// First line of every digest message.
pub const DIGEST_HEADER: &str = "Session context (latest analysis results):";

/// Render the context digest, or `None` when there is nothing to report.
pub fn render_digest(context: &SessionContext, config: &SessionConfig) -> Option<String> {
    if context.is_empty() {
        return None;
    }

    let mut lines = vec![DIGEST_HEADER.to_string()];

    if let Some(t) = &context.telemetry {
        lines.push(format!(
            "Telemetry: {} rows. Columns: {}",
            t.row_count,
            truncate_chars(&t.headers.join(", "), config.header_chars)
        ));
        lines.push(format!("Notable: {}", t.notable));
        if !t.analysis.is_empty() {
            lines.push(format!(
                "Analyst notes: {}",
                truncate_chars(&t.analysis, config.analysis_chars)
            ));
        }
    }

    if let Some(s) = &context.strategy {
        lines.push(format!(
            "Strategy: feasible {}, total {}s, {} pit stop(s)",
            if s.result.feasible { "yes" } else { "no" },
            s.result.total_time,
            s.result.pits
        ));
        lines.push(format!("Assumptions: {}", s.result.assumptions.describe()));
        if !s.commentary.is_empty() {
            lines.push(format!(
                "Strategist notes: {}",
                truncate_chars(&s.commentary, config.commentary_chars)
            ));
        }
    }

    Some(lines.join("\n"))
}

/// Build the full message list for one turn.
pub fn assemble(
    config: &SessionConfig,
    context: &SessionContext,
    log: &[Message],
    user_text: &str,
) -> Vec<Message> {
    let window = config.window();
    let history = &log[log.len().saturating_sub(window)..];

    let mut messages = Vec::with_capacity(history.len() + 3);
    messages.push(Message::system(&config.system_prompt));
    if let Some(digest) = render_digest(context, config) {
        messages.push(Message::system(digest));
    }
    messages.extend_from_slice(history);
    messages.push(Message::user(user_text));
    messages
}

/// The first `max` characters of `text` (characters, not bytes).
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
