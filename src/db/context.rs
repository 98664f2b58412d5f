//! Context repository for storing captured context files

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::OptionalExtension;
use serde::Serialize;

use super::DbPool;
use crate::context::ContextFile;
use crate::{Error, Result};

/// Prefix of generated context identifiers
pub const CONTEXT_ID_PREFIX: &str = "context_";

/// Build an identifier for a context captured at `at`: `context_<unix millis>`
#[must_use]
pub fn new_context_id(at: DateTime<Utc>) -> String {
    format!("{CONTEXT_ID_PREFIX}{}", at.timestamp_millis())
}

/// Listing entry for a stored context file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredContextInfo {
    pub id: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub message_count: usize,
}

/// Storage for context files keyed by an opaque identifier
///
/// The pipeline never touches a storage medium itself; callers persist
/// and retrieve whole context files through this interface.
pub trait ContextStore {
    /// Store `file` under `id` if the id is free
    ///
    /// Returns `false` without writing when a file is already stored under
    /// `id`; stored files are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails
    fn put(&self, id: &str, file: &ContextFile) -> Result<bool>;

    /// Fetch the file stored under `id`
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails or the stored file is corrupt
    fn get(&self, id: &str) -> Result<Option<ContextFile>>;

    /// List stored files, most recently created first
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails
    fn list(&self) -> Result<Vec<StoredContextInfo>>;

    /// Remove the file stored under `id`, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails
    fn delete(&self, id: &str) -> Result<bool>;

    /// Remove every stored file, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails
    fn clear(&self) -> Result<usize>;
}

/// `SQLite`-backed context repository
#[derive(Clone)]
pub struct ContextRepo {
    pool: DbPool,
}

impl ContextRepo {
    /// Create a new context repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Count stored context files
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn count(&self) -> Result<usize> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM contexts", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(usize::try_from(count).unwrap_or(0))
    }
}

impl ContextStore for ContextRepo {
    fn put(&self, id: &str, file: &ContextFile) -> Result<bool> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let body = serde_json::to_string(file)?;
        let created_at = format_datetime(file.metadata.timestamp);
        let message_count = i64::try_from(file.metadata.message_count).unwrap_or(i64::MAX);

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO contexts (id, source, created_at, message_count, body)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, &file.metadata.source, &created_at, message_count, &body],
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        if inserted == 0 {
            tracing::debug!(id, "context id already taken");
            return Ok(false);
        }

        tracing::info!(id, source = %file.metadata.source, "stored context file");
        Ok(true)
    }

    fn get(&self, id: &str) -> Result<Option<ContextFile>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let body: Option<String> = conn
            .query_row("SELECT body FROM contexts WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        body.map(|b| serde_json::from_str(&b).map_err(Error::from))
            .transpose()
    }

    fn list(&self) -> Result<Vec<StoredContextInfo>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT id, source, created_at, message_count
                 FROM contexts ORDER BY created_at DESC, id DESC",
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let contexts = stmt
            .query_map([], |row| {
                Ok(StoredContextInfo {
                    id: row.get(0)?,
                    source: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                    message_count: usize::try_from(row.get::<_, i64>(3)?).unwrap_or(0),
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(contexts)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let removed = conn
            .execute("DELETE FROM contexts WHERE id = ?1", [id])
            .map_err(|e| Error::Database(e.to_string()))?;

        if removed > 0 {
            tracing::info!(id, "deleted context file");
        }
        Ok(removed > 0)
    }

    fn clear(&self) -> Result<usize> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let removed = conn
            .execute("DELETE FROM contexts", [])
            .map_err(|e| Error::Database(e.to_string()))?;

        tracing::info!(count = removed, "cleared context files");
        Ok(removed)
    }
}

/// Fixed-width UTC form so text ordering matches time ordering
fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| DateTime::<Utc>::default(), |dt| dt.with_timezone(&Utc))
}
