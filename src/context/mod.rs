//! Context file assembly for re-injecting past conversations
//!
//! Combines:
//! - A fixed-window summary of the conversation
//! - Key insights picked out of assistant turns
//! - The full message history, copied at capture time

mod builder;
pub mod insights;
pub mod selection;
pub mod summary;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conversation::{Message, null_as_default};

pub use builder::ContextBuilder;
pub use insights::{InsightLimits, extract_key_insights, extract_key_insights_with};
pub use selection::{MAX_SELECTED_MESSAGES, select_evenly, select_messages, select_recent};
pub use summary::summarize_conversation;

/// Provenance of a context file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMetadata {
    /// Platform identifier the conversation was captured from
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    /// When the context file was created
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message_count: usize,
}

/// Immutable snapshot of a captured conversation
///
/// Field order matches the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextFile {
    pub metadata: ContextMetadata,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    pub messages: Vec<Message>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_insights: Vec<String>,
}

impl ContextFile {
    /// Platform the conversation came from
    #[must_use]
    pub fn source(&self) -> &str {
        &self.metadata.source
    }

    /// Creation instant
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.metadata.timestamp
    }
}
