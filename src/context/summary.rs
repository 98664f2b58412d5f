//! Fixed-window conversation synopsis
//!
//! The opening prompt plus the last few exchanges, each cut to a fixed
//! number of characters. No content awareness.

use std::fmt::Write;

use crate::conversation::Message;

/// Characters of the first message kept in the summary
pub const INITIAL_PROMPT_CHARS: usize = 200;

/// Characters kept per recent exchange line
pub const RECENT_EXCHANGE_CHARS: usize = 100;

/// Recent exchanges are listed once a conversation has more messages than this
pub const RECENT_EXCHANGES_AFTER: usize = 3;

/// How many trailing messages the recent-exchanges window covers
pub const RECENT_EXCHANGE_WINDOW: usize = 4;

/// Label that opens the summary
pub const INITIAL_PROMPT_LABEL: &str = "Initial prompt: ";

/// Heading of the recent-exchanges section
pub const RECENT_EXCHANGES_HEADING: &str = "Recent exchanges:";

/// Summarize a conversation
///
/// Empty input yields an empty string. Otherwise the summary starts with
/// the first message cut to [`INITIAL_PROMPT_CHARS`]; conversations longer
/// than [`RECENT_EXCHANGES_AFTER`] messages get one line per message from
/// index `max(1, len - 4)` onwards.
#[must_use]
pub fn summarize_conversation(messages: &[Message]) -> String {
    let Some(first) = messages.first() else {
        return String::new();
    };

    let mut summary = String::from(INITIAL_PROMPT_LABEL);
    summary.push_str(truncate_chars(&first.content, INITIAL_PROMPT_CHARS));

    if messages.len() > RECENT_EXCHANGES_AFTER {
        let _ = write!(summary, "\n\n{RECENT_EXCHANGES_HEADING}\n");
        let from = messages.len().saturating_sub(RECENT_EXCHANGE_WINDOW).max(1);
        for message in &messages[from..] {
            let _ = writeln!(
                summary,
                "{}: {}...",
                message.role.summary_label(),
                truncate_chars(&message.content, RECENT_EXCHANGE_CHARS)
            );
        }
    }

    summary
}

/// Borrow at most `max` characters from the front of `text`
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    text.char_indices()
        .nth(max)
        .map_or(text, |(idx, _)| &text[..idx])
}
