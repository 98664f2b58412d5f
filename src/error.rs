//! Error types for chat context capture and formatting

use thiserror::Error;

/// Result type alias for chat context operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while capturing, storing or importing contexts
///
/// The transformation pipeline itself (summary, insights, selection,
/// rendering) is total and never produces these.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Supplied context artifact is malformed
    #[error("invalid context file: {0}")]
    Validation(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Nothing could be captured from a page
    #[error("capture error: {0}")]
    Capture(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
