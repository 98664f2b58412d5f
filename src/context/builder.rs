//! Context builder for assembling context files from captured conversations

use chrono::{DateTime, Utc};

use super::insights::{InsightLimits, extract_key_insights_with};
use super::summary::summarize_conversation;
use super::{ContextFile, ContextMetadata};
use crate::conversation::ConversationLog;

/// Builds context files from conversation logs
#[derive(Debug, Clone, Default)]
pub struct ContextBuilder {
    limits: InsightLimits,
}

impl ContextBuilder {
    /// Create a new context builder
    #[must_use]
    pub const fn new(limits: InsightLimits) -> Self {
        Self { limits }
    }

    /// Insight thresholds used by this builder
    #[must_use]
    pub const fn limits(&self) -> &InsightLimits {
        &self.limits
    }

    /// Build a context file stamped with the current time
    #[must_use]
    pub fn build(&self, log: &ConversationLog) -> ContextFile {
        self.build_at(log, Utc::now())
    }

    /// Build a context file stamped with `created_at`
    ///
    /// Summary and insights are computed once here; the messages are
    /// copied so later changes to the log never reach the context file.
    #[must_use]
    pub fn build_at(&self, log: &ConversationLog, created_at: DateTime<Utc>) -> ContextFile {
        let summary = summarize_conversation(&log.messages);
        let key_insights = extract_key_insights_with(&log.messages, &self.limits);

        tracing::debug!(
            source = %log.source,
            messages = log.messages.len(),
            insights = key_insights.len(),
            "assembled context file"
        );

        ContextFile {
            metadata: ContextMetadata {
                source: log.source.clone(),
                timestamp: created_at,
                message_count: log.messages.len(),
            },
            summary,
            messages: log.messages.clone(),
            key_insights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Message;

    fn log(messages: Vec<Message>) -> ConversationLog {
        ConversationLog::new("chatgpt", messages, Utc::now())
    }

    #[test]
    fn test_build_fills_metadata() {
        let created_at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let log = log(vec![
            Message::user("How do I sort a Vec?"),
            Message::assistant("Use sort(). It is important to remember it is stable."),
        ]);

        let file = ContextBuilder::default().build_at(&log, created_at);

        assert_eq!(file.metadata.source, "chatgpt");
        assert_eq!(file.metadata.timestamp, created_at);
        assert_eq!(file.metadata.message_count, 2);
        assert_eq!(file.messages, log.messages);
        assert_eq!(file.summary, "Initial prompt: How do I sort a Vec?");
        assert_eq!(
            file.key_insights,
            vec!["It is important to remember it is stable."]
        );
    }

    #[test]
    fn test_build_empty_log() {
        let file = ContextBuilder::default().build(&log(vec![]));
        assert_eq!(file.metadata.message_count, 0);
        assert!(file.summary.is_empty());
        assert!(file.key_insights.is_empty());
        assert!(file.messages.is_empty());
    }

    #[test]
    fn test_build_uses_configured_limits() {
        let builder = ContextBuilder::new(InsightLimits {
            max_insights: 1,
            ..InsightLimits::default()
        });
        let file = builder.build(&log(vec![Message::assistant("- a\n- b")]));
        assert_eq!(file.key_insights, vec!["- a"]);
    }
}
