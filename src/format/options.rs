//! Formatting options and their shallow override layer

use serde::{Deserialize, Serialize};

/// Output encoding for a rendered context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum OutputFormat {
    /// Heading-structured text with bold speaker labels
    #[default]
    #[serde(alias = "markdown")]
    #[value(alias = "markdown")]
    Markup,
    /// Upper-case section labels, no decoration
    #[serde(alias = "text")]
    #[value(aliases = ["text", "plainText"])]
    PlainText,
    /// Nested data value for machine consumption
    #[serde(alias = "json")]
    #[value(alias = "json")]
    Structured,
}

/// Options controlling how a context file is rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOptions {
    /// Approximate token limit; carried for callers, never clips output
    pub max_tokens: usize,
    pub include_summary: bool,
    pub include_key_insights: bool,
    /// Keep the most recent turns when the conversation must be cut
    pub prefer_recent_messages: bool,
    pub format: OutputFormat,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_tokens: 4000,
            include_summary: true,
            include_key_insights: true,
            prefer_recent_messages: true,
            format: OutputFormat::Markup,
        }
    }
}

/// Caller-supplied subset of [`FormatOptions`]
///
/// Every field that is set replaces the corresponding field of the base
/// options; unset fields keep the base value. Keys are accepted in
/// snake_case (config file) and camelCase (JSON callers); unknown keys are
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatOverrides {
    #[serde(alias = "maxTokens")]
    pub max_tokens: Option<usize>,
    #[serde(alias = "includeSummary")]
    pub include_summary: Option<bool>,
    #[serde(alias = "includeKeyInsights")]
    pub include_key_insights: Option<bool>,
    #[serde(alias = "preferRecentMessages")]
    pub prefer_recent_messages: Option<bool>,
    pub format: Option<OutputFormat>,
}

impl FormatOverrides {
    /// Apply these overrides on top of `base`
    #[must_use]
    pub fn apply(&self, base: &FormatOptions) -> FormatOptions {
        FormatOptions {
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
            include_summary: self.include_summary.unwrap_or(base.include_summary),
            include_key_insights: self.include_key_insights.unwrap_or(base.include_key_insights),
            prefer_recent_messages: self
                .prefer_recent_messages
                .unwrap_or(base.prefer_recent_messages),
            format: self.format.unwrap_or(base.format),
        }
    }

    /// Layer `other` on top of these overrides
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            max_tokens: other.max_tokens.or(self.max_tokens),
            include_summary: other.include_summary.or(self.include_summary),
            include_key_insights: other.include_key_insights.or(self.include_key_insights),
            prefer_recent_messages: other.prefer_recent_messages.or(self.prefer_recent_messages),
            format: other.format.or(self.format),
        }
    }
}

impl FormatOptions {
    /// Defaults with `overrides` applied
    #[must_use]
    pub fn with_overrides(overrides: &FormatOverrides) -> Self {
        overrides.apply(&Self::default())
    }
}
