//! TOML configuration file loading
//!
//! Supports `~/.config/chat-context/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::context::InsightLimits;
use crate::format::FormatOverrides;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ChatContextConfigFile {
    /// Default rendering options
    #[serde(default)]
    pub format: FormatOverrides,

    /// Insight extraction thresholds
    #[serde(default)]
    pub insights: InsightsFileConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageFileConfig,
}

/// Insight extraction configuration
#[derive(Debug, Default, Deserialize)]
pub struct InsightsFileConfig {
    pub bullets_per_message: Option<usize>,
    pub sentences_per_keyword: Option<usize>,
    pub max_insights: Option<usize>,
    /// Replaces the default key phrases
    pub keywords: Option<Vec<String>>,
}

impl InsightsFileConfig {
    /// Apply the configured values on top of `base`
    #[must_use]
    pub fn apply(&self, base: InsightLimits) -> InsightLimits {
        InsightLimits {
            bullets_per_message: self.bullets_per_message.unwrap_or(base.bullets_per_message),
            sentences_per_keyword: self
                .sentences_per_keyword
                .unwrap_or(base.sentences_per_keyword),
            max_insights: self.max_insights.unwrap_or(base.max_insights),
            keywords: self.keywords.clone().unwrap_or(base.keywords),
        }
    }
}

/// Storage configuration
#[derive(Debug, Default, Deserialize)]
pub struct StorageFileConfig {
    /// Path to the context database
    pub database: Option<PathBuf>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ChatContextConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ChatContextConfigFile {
    config_file_path().map_or_else(ChatContextConfigFile::default, |path| {
        load_config_file_from(&path)
    })
}

/// Load a TOML config file from `path`, falling back to defaults
pub fn load_config_file_from(path: &Path) -> ChatContextConfigFile {
    if !path.exists() {
        return ChatContextConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ChatContextConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ChatContextConfigFile::default()
        }
    }
}

/// Return the config file path
///
/// `CHAT_CONTEXT_CONFIG` wins; otherwise `~/.config/chat-context/config.toml`.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CHAT_CONTEXT_CONFIG") {
        return Some(PathBuf::from(path));
    }

    directories::BaseDirs::new().map(|d| d.config_dir().join("chat-context").join("config.toml"))
}
