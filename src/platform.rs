//! Chat platform adapters
//!
//! Each supported chat site is a variant of [`Platform`] with a static
//! selector table. Extraction reads a parsed page snapshot and yields
//! canonical [`Message`]s in page order.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::conversation::{ConversationLog, Message, MessageRole};
use crate::{Error, Result};

/// Supported chat platforms
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[value(name = "chatgpt")]
    ChatGpt,
    Claude,
    Bard,
    #[default]
    Unknown,
}

/// How a platform marks up conversation turns
#[derive(Debug, Clone, Copy)]
struct Selectors {
    /// One element per turn
    message: &'static str,
    /// Element inside a turn holding its text
    content: &'static str,
    role: RoleRule,
}

/// How to tell a user turn from an assistant turn
#[derive(Debug, Clone, Copy)]
enum RoleRule {
    /// User turns carry this class
    UserHasClass(&'static str),
    /// Assistant turns carry this class; everything else is the user
    AssistantHasClass(&'static str),
}

impl RoleRule {
    fn role_of(self, element: &ElementRef<'_>) -> MessageRole {
        let has_class = |name: &str| element.value().classes().any(|c| c == name);
        let is_user = match self {
            Self::UserHasClass(class) => has_class(class),
            Self::AssistantHasClass(class) => !has_class(class),
        };
        if is_user {
            MessageRole::User
        } else {
            MessageRole::Assistant
        }
    }
}

const CHATGPT: Selectors = Selectors {
    message: ".group",
    content: ".markdown",
    role: RoleRule::AssistantHasClass("assistant"),
};

const CLAUDE: Selectors = Selectors {
    message: ".message",
    content: ".message-content",
    role: RoleRule::UserHasClass("user-message"),
};

const BARD: Selectors = Selectors {
    message: ".conversation-message",
    content: ".response-content",
    role: RoleRule::UserHasClass("user-message"),
};

impl Platform {
    /// All platforms with an extraction adapter
    pub const SUPPORTED: [Self; 3] = [Self::ChatGpt, Self::Claude, Self::Bard];

    /// Identify the platform serving a page
    #[must_use]
    pub fn identify(page_url: &str) -> Self {
        // Match on the host when the URL parses, otherwise on the raw text
        let parsed = url::Url::parse(page_url).ok();
        let haystack = parsed
            .as_ref()
            .and_then(url::Url::host_str)
            .unwrap_or(page_url);

        if haystack.contains("chat.openai.com") {
            Self::ChatGpt
        } else if haystack.contains("claude.ai") {
            Self::Claude
        } else if haystack.contains("bard.google.com") {
            Self::Bard
        } else {
            Self::Unknown
        }
    }

    /// Source identifier stored in context metadata
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChatGpt => "chatgpt",
            Self::Claude => "claude",
            Self::Bard => "bard",
            Self::Unknown => "unknown",
        }
    }

    const fn selectors(self) -> Option<Selectors> {
        match self {
            Self::ChatGpt => Some(CHATGPT),
            Self::Claude => Some(CLAUDE),
            Self::Bard => Some(BARD),
            Self::Unknown => None,
        }
    }

    /// Extract conversation turns from a parsed page
    ///
    /// Turns whose content element is missing or blank are skipped. Pages
    /// carry no timestamps, so every message is stamped with `captured_at`.
    /// An unknown platform yields no messages.
    #[must_use]
    pub fn extract_messages(self, page: &Html, captured_at: DateTime<Utc>) -> Vec<Message> {
        let Some(selectors) = self.selectors() else {
            tracing::debug!(platform = %self, "no extraction adapter for platform");
            return Vec::new();
        };

        let (Ok(message_sel), Ok(content_sel)) = (
            Selector::parse(selectors.message),
            Selector::parse(selectors.content),
        ) else {
            tracing::warn!(platform = %self, "invalid platform selectors");
            return Vec::new();
        };

        let messages: Vec<Message> = page
            .select(&message_sel)
            .filter_map(|element| {
                let content = element
                    .select(&content_sel)
                    .next()
                    .map(|c| c.text().collect::<String>())
                    .unwrap_or_default();
                let content = content.trim();
                if content.is_empty() {
                    return None;
                }
                Some(Message::new(
                    selectors.role.role_of(&element),
                    content,
                    captured_at,
                ))
            })
            .collect();

        tracing::debug!(platform = %self, count = messages.len(), "extracted messages");
        messages
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "chatgpt" => Ok(Self::ChatGpt),
            "claude" => Ok(Self::Claude),
            "bard" => Ok(Self::Bard),
            "unknown" => Ok(Self::Unknown),
            other => Err(Error::Config(format!("unknown platform: {other}"))),
        }
    }
}

impl ConversationLog {
    /// Capture a conversation log from an HTML page snapshot
    #[must_use]
    pub fn from_page(platform: Platform, html: &str, captured_at: DateTime<Utc>) -> Self {
        let page = Html::parse_document(html);
        let messages = platform.extract_messages(&page, captured_at);
        Self::new(platform.as_str(), messages, captured_at)
    }
}
