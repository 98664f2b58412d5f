//! Canonical conversation model shared by capture, assembly and rendering

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Who produced a conversational turn
///
/// Anything that is not `user` is treated as an AI turn, including unknown
/// or missing role strings in imported data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    #[default]
    #[serde(other)]
    Assistant,
}

impl MessageRole {
    /// Wire name of the role
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Short speaker name used in summaries
    #[must_use]
    pub const fn summary_label(self) -> &'static str {
        match self {
            Self::User => "Human",
            Self::Assistant => "AI",
        }
    }

    /// Speaker name used in rendered conversations
    #[must_use]
    pub const fn speaker_label(self) -> &'static str {
        match self {
            Self::User => "Human",
            Self::Assistant => "Assistant",
        }
    }

    /// Whether this turn came from the human side
    #[must_use]
    pub const fn is_user(self) -> bool {
        matches!(self, Self::User)
    }
}

/// Read an absent or `null` field as the type's default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A single conversational turn
///
/// Missing or `null` fields in partially-formed input deserialize to empty
/// values so the pipeline stays total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: MessageRole,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message with an explicit timestamp
    pub fn new(role: MessageRole, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    /// Create a user message stamped now
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content, Utc::now())
    }

    /// Create an assistant message stamped now
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content, Utc::now())
    }
}

/// Live snapshot of a conversation as seen by the capture side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationLog {
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
    /// Platform identifier, e.g. `chatgpt`
    #[serde(default = "unknown_source", deserialize_with = "null_as_unknown")]
    pub source: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: DateTime<Utc>,
}

fn unknown_source() -> String {
    "unknown".to_string()
}

fn null_as_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|s| s.unwrap_or_else(unknown_source))
}

impl ConversationLog {
    /// Create a log from already-normalized messages
    pub fn new(source: impl Into<String>, messages: Vec<Message>, updated_at: DateTime<Utc>) -> Self {
        Self {
            messages,
            source: source.into(),
            updated_at,
        }
    }

    /// Whether the log holds no messages
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
