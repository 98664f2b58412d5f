//! Chat Context - capture AI chat conversations and re-inject them as primers
//!
//! This library provides the core functionality for chat context capture:
//! - Platform adapters that read conversations out of chat page snapshots
//! - Context file assembly (summary, key insights, message history)
//! - Rendering as markup, plain text or structured data
//! - Persistent context storage
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Chat platforms                      │
//! │        ChatGPT  │  Claude  │  Bard  │  JSON logs     │
//! └────────────────────┬────────────────────────────────┘
//!                      │ ConversationLog
//! ┌────────────────────▼────────────────────────────────┐
//! │                 ContextBuilder                       │
//! │      Summary  │  Key insights  │  Message copy      │
//! └────────────────────┬────────────────────────────────┘
//!                      │ ContextFile
//! ┌────────────────────▼────────────────────────────────┐
//! │        ContextStore (SQLite)  │  format_context      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod capture;
pub mod config;
pub mod context;
pub mod conversation;
pub mod db;
pub mod error;
pub mod format;
pub mod platform;

pub use capture::{ContextService, StoredContext, export_file_name, parse_context_file};
pub use config::Config;
pub use context::{ContextBuilder, ContextFile, ContextMetadata, InsightLimits};
pub use conversation::{ConversationLog, Message, MessageRole};
pub use db::{ContextRepo, ContextStore, DbConn, DbPool, StoredContextInfo};
pub use error::{Error, Result};
pub use format::{
    FormatOptions, FormatOverrides, OutputFormat, Rendered, estimate_tokens, format_context,
};
pub use platform::Platform;
