//! Configuration management for chat context capture

pub mod file;

use std::path::PathBuf;

use crate::context::InsightLimits;
use crate::format::{FormatOptions, FormatOverrides};
use crate::Result;

pub use file::{ChatContextConfigFile, config_file_path, load_config_file, load_config_file_from};

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to data directory (database)
    pub data_dir: PathBuf,

    /// Path to the context database
    pub database_path: PathBuf,

    /// Rendering defaults (built-in defaults with the file overlay applied)
    pub format: FormatOptions,

    /// Insight extraction thresholds
    pub insights: InsightLimits,
}

impl Config {
    /// Load configuration from the config file and environment
    ///
    /// # Errors
    ///
    /// Returns error if the data directory cannot be created
    pub fn load() -> Result<Self> {
        let file = load_config_file();
        let database_override = std::env::var("CHAT_CONTEXT_DB").ok().map(PathBuf::from);
        let config = Self::resolve(file, database_override, default_data_dir());

        std::fs::create_dir_all(&config.data_dir)?;
        Ok(config)
    }

    /// Combine a parsed config file with environment overrides
    ///
    /// Priority for the database path: `database_override` (env), then the
    /// file's `[storage] database`, then `<data_dir>/contexts.db`.
    #[must_use]
    pub fn resolve(
        file: ChatContextConfigFile,
        database_override: Option<PathBuf>,
        data_dir: PathBuf,
    ) -> Self {
        let database_path = database_override
            .or(file.storage.database)
            .unwrap_or_else(|| data_dir.join("contexts.db"));

        Self {
            format: file.format.apply(&FormatOptions::default()),
            insights: file.insights.apply(InsightLimits::default()),
            data_dir,
            database_path,
        }
    }

    /// Rendering options with caller overrides applied on top of the configured defaults
    #[must_use]
    pub fn format_options(&self, overrides: &FormatOverrides) -> FormatOptions {
        overrides.apply(&self.format)
    }
}

/// Data directory (`~/.local/share/chat-context` on Linux)
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("chat-context"))
}
