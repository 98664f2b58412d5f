//! Context file renderers

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::options::{FormatOptions, OutputFormat};
use crate::context::{ContextFile, select_messages};
use crate::conversation::{Message, MessageRole};
use crate::Result;

/// Line separating the replayed conversation from the closing instruction
pub const END_MARKER: &str = "--- End of previous conversation ---";

/// Instruction handed to the downstream assistant
pub const CONTINUE_INSTRUCTION: &str = "Please continue the conversation as if this context was part of our current exchange. The human will now continue with their next message.";

/// Labels for one of the text encodings
struct TextLayout {
    title: &'static str,
    source: &'static str,
    date: &'static str,
    messages: &'static str,
    summary: &'static str,
    key_points: &'static str,
    conversation: &'static str,
    human: &'static str,
    assistant: &'static str,
}

const MARKUP: TextLayout = TextLayout {
    title: "# Previous Conversation Context",
    source: "**Source:**",
    date: "**Date:**",
    messages: "**Messages:**",
    summary: "## Summary",
    key_points: "## Key Points",
    conversation: "## Conversation",
    human: "**Human:**",
    assistant: "**Assistant:**",
};

const PLAIN_TEXT: TextLayout = TextLayout {
    title: "PREVIOUS CONVERSATION CONTEXT",
    source: "Source:",
    date: "Date:",
    messages: "Messages:",
    summary: "SUMMARY",
    key_points: "KEY POINTS",
    conversation: "CONVERSATION",
    human: "Human:",
    assistant: "Assistant:",
};

impl TextLayout {
    const fn speaker(&self, role: MessageRole) -> &'static str {
        match role {
            MessageRole::User => self.human,
            MessageRole::Assistant => self.assistant,
        }
    }
}

/// Metadata block of a structured rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredMetadata {
    pub source: String,
    /// Human-readable creation date
    pub date: String,
    pub message_count: usize,
}

/// Machine-facing rendering of a context file
///
/// Disabled sections serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredContext {
    pub metadata: StructuredMetadata,
    pub summary: Option<String>,
    pub key_insights: Option<Vec<String>>,
    pub messages: Vec<Message>,
}

/// Output of [`format_context`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Markup or plain text
    Text(String),
    /// Structured value
    Structured(StructuredContext),
}

impl Rendered {
    /// Rendered text, if this is a text encoding
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    /// Structured value, if this is the structured encoding
    #[must_use]
    pub const fn as_structured(&self) -> Option<&StructuredContext> {
        match self {
            Self::Text(_) => None,
            Self::Structured(value) => Some(value),
        }
    }

    /// Serialize to a string; structured values become pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns error if the structured value cannot be serialized
    pub fn into_string(self) -> Result<String> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Structured(value) => Ok(serde_json::to_string_pretty(&value)?),
        }
    }
}

/// Render a context file
///
/// Pure: the same file and options always give the same output. The
/// conversation body is the selected subset, never the full history of a
/// long conversation. `options.max_tokens` does not clip the output.
#[must_use]
pub fn format_context(file: &ContextFile, options: &FormatOptions) -> Rendered {
    match options.format {
        OutputFormat::Markup => Rendered::Text(render_text(file, options, &MARKUP)),
        OutputFormat::PlainText => Rendered::Text(render_text(file, options, &PLAIN_TEXT)),
        OutputFormat::Structured => Rendered::Structured(render_structured(file, options)),
    }
}

fn render_text(file: &ContextFile, options: &FormatOptions, layout: &TextLayout) -> String {
    let mut out = String::new();

    let _ = write!(out, "{}\n\n", layout.title);
    let _ = writeln!(out, "{} {}", layout.source, capitalize(&file.metadata.source));
    let _ = writeln!(out, "{} {}", layout.date, format_date(file.metadata.timestamp));
    let _ = write!(out, "{} {}\n\n", layout.messages, file.metadata.message_count);

    if options.include_summary && !file.summary.is_empty() {
        let _ = write!(out, "{}\n\n{}\n\n", layout.summary, file.summary);
    }

    if options.include_key_insights && !file.key_insights.is_empty() {
        let _ = write!(out, "{}\n\n", layout.key_points);
        for insight in &file.key_insights {
            let _ = writeln!(out, "- {insight}");
        }
        out.push('\n');
    }

    let _ = write!(out, "{}\n\n", layout.conversation);
    for message in select_messages(&file.messages, options) {
        let _ = write!(out, "{}\n{}\n\n", layout.speaker(message.role), message.content);
    }

    let _ = write!(out, "{END_MARKER}\n\n{CONTINUE_INSTRUCTION}\n");
    out
}

fn render_structured(file: &ContextFile, options: &FormatOptions) -> StructuredContext {
    StructuredContext {
        metadata: StructuredMetadata {
            source: file.metadata.source.clone(),
            date: format_date(file.metadata.timestamp),
            message_count: file.metadata.message_count,
        },
        summary: options.include_summary.then(|| file.summary.clone()),
        key_insights: options
            .include_key_insights
            .then(|| file.key_insights.clone()),
        messages: select_messages(&file.messages, options)
            .into_iter()
            .cloned()
            .collect(),
    }
}

/// Human-readable date, e.g. `5/1/2024, 10:00:00 AM` (UTC)
#[must_use]
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Rough token estimate: one token per four characters, rounded up
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Whether `text` is estimated to exceed `max_tokens`
#[must_use]
pub fn exceeds_budget(text: &str, max_tokens: usize) -> bool {
    estimate_tokens(text) > max_tokens
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
