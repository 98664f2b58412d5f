//! Capture, import and export of context files
//!
//! Ties the pure pipeline to a [`ContextStore`]: conversations are
//! assembled into context files, stored under time-based identifiers and
//! rendered back on demand.

use chrono::{DateTime, TimeDelta, Utc};

use crate::context::{ContextBuilder, ContextFile};
use crate::conversation::ConversationLog;
use crate::db::{ContextStore, StoredContextInfo, new_context_id};
use crate::format::{FormatOptions, Rendered, format_context};
use crate::platform::Platform;
use crate::{Error, Result};

/// Identifiers tried per store before giving up
const MAX_ID_ATTEMPTS: u32 = 1000;

/// A context file together with the identifier it is stored under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContext {
    pub id: String,
    pub file: ContextFile,
}

/// File name offered when exporting a context: `chat-context-<unix millis>.json`
#[must_use]
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("chat-context-{}.json", at.timestamp_millis())
}

/// Parse and validate an externally supplied context file
///
/// Both `metadata` and `messages` must be present; a malformed artifact is
/// rejected as a whole.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the text is not a JSON object carrying
/// `metadata` and `messages`, or if those fields have the wrong shape
pub fn parse_context_file(text: &str) -> Result<ContextFile> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| Error::Validation(format!("not valid JSON: {e}")))?;

    let Some(object) = value.as_object() else {
        return Err(Error::Validation("expected a JSON object".to_string()));
    };

    for field in ["metadata", "messages"] {
        if object.get(field).is_none_or(serde_json::Value::is_null) {
            return Err(Error::Validation(format!("missing `{field}`")));
        }
    }

    serde_json::from_value(value).map_err(|e| Error::Validation(e.to_string()))
}

/// Service that captures conversations into a context store
pub struct ContextService<S> {
    store: S,
    builder: ContextBuilder,
}

impl<S: ContextStore> ContextService<S> {
    /// Create a service over `store`
    #[must_use]
    pub const fn new(store: S, builder: ContextBuilder) -> Self {
        Self { store, builder }
    }

    /// Underlying store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Assemble and store a context file for `log`
    ///
    /// # Errors
    ///
    /// Returns error if the store rejects the file
    pub fn capture(&self, log: &ConversationLog) -> Result<StoredContext> {
        self.capture_at(log, Utc::now())
    }

    /// Assemble and store a context file for `log`, created at `now`
    ///
    /// # Errors
    ///
    /// Returns error if the store rejects the file
    pub fn capture_at(&self, log: &ConversationLog, now: DateTime<Utc>) -> Result<StoredContext> {
        let file = self.builder.build_at(log, now);
        let id = self.store_new(&file, now)?;

        tracing::info!(
            id = %id,
            source = %file.metadata.source,
            messages = file.metadata.message_count,
            "captured conversation"
        );
        Ok(StoredContext { id, file })
    }

    /// Extract a conversation from an HTML page snapshot and capture it
    ///
    /// # Errors
    ///
    /// Returns [`Error::Capture`] if the page holds no recognisable
    /// conversation, or a store error
    pub fn capture_page(
        &self,
        platform: Platform,
        html: &str,
        now: DateTime<Utc>,
    ) -> Result<StoredContext> {
        let log = ConversationLog::from_page(platform, html, now);
        if log.is_empty() {
            return Err(Error::Capture(format!(
                "no conversation found to capture on {platform} page"
            )));
        }
        self.capture_at(&log, now)
    }

    /// Validate and store an externally supplied context file
    ///
    /// The file is stored as supplied, under a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for malformed input, or a store error
    pub fn import_json(&self, text: &str) -> Result<StoredContext> {
        self.import_json_at(text, Utc::now())
    }

    /// Like [`Self::import_json`], with an explicit import instant
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for malformed input, or a store error
    pub fn import_json_at(&self, text: &str, now: DateTime<Utc>) -> Result<StoredContext> {
        let file = parse_context_file(text)?;
        let id = self.store_new(&file, now)?;

        tracing::info!(id = %id, source = %file.metadata.source, "imported context file");
        Ok(StoredContext { id, file })
    }

    /// Store `file` under the first free `context_<millis>` id at or after `now`
    fn store_new(&self, file: &ContextFile, now: DateTime<Utc>) -> Result<String> {
        let mut at = now;
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = new_context_id(at);
            if self.store.put(&id, file)? {
                return Ok(id);
            }
            at += TimeDelta::milliseconds(1);
        }

        Err(Error::Database(format!(
            "no free context id after {}",
            new_context_id(now)
        )))
    }

    /// Fetch a stored context file
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if nothing is stored under `id`
    pub fn get(&self, id: &str) -> Result<ContextFile> {
        self.store
            .get(id)?
            .ok_or_else(|| Error::NotFound(format!("context {id}")))
    }

    /// Pretty-printed JSON of a stored context file
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if nothing is stored under `id`
    pub fn export_json(&self, id: &str) -> Result<String> {
        let file = self.get(id)?;
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Render a stored context file
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if nothing is stored under `id`
    pub fn render(&self, id: &str, options: &FormatOptions) -> Result<Rendered> {
        let file = self.get(id)?;
        tracing::debug!(id, format = ?options.format, "rendering context file");
        Ok(format_context(&file, options))
    }

    /// List stored context files, most recent first
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be read
    pub fn list(&self) -> Result<Vec<StoredContextInfo>> {
        self.store.list()
    }

    /// Delete a stored context file
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if nothing is stored under `id`
    pub fn delete(&self, id: &str) -> Result<()> {
        if self.store.delete(id)? {
            Ok(())
        } else {
            Err(Error::NotFound(format!("context {id}")))
        }
    }

    /// Delete every stored context file
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be cleared
    pub fn clear(&self) -> Result<usize> {
        self.store.clear()
    }
}
