//! Key-insight extraction from assistant turns
//!
//! Two fixed heuristics, applied per assistant message in order:
//! bullet-style list items, then whole sentences containing a key phrase.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::conversation::Message;

/// Bullet items taken from a single message
pub const BULLETS_PER_MESSAGE: usize = 3;

/// Sentences taken per keyword from a single message
pub const SENTENCES_PER_KEYWORD: usize = 2;

/// Upper bound on insights kept for a whole conversation
pub const MAX_INSIGHTS: usize = 10;

/// Phrases that flag a sentence as worth keeping
pub const DEFAULT_KEYWORDS: &[&str] = &["important", "key point", "remember", "crucial", "essential"];

/// A bullet glyph at line start or after whitespace, followed by text.
/// Group 1 marks where the item begins. Only glyphs from the first one
/// that opens a list (see [`opens_list`]) onwards are items.
static BULLET_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[ \t])([•*\-])[ \t]+\S").expect("valid regex"));

/// Thresholds and phrases for insight extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightLimits {
    /// Bullet items taken from a single message
    pub bullets_per_message: usize,
    /// Sentences taken per keyword from a single message
    pub sentences_per_keyword: usize,
    /// Total insights kept after deduplication
    pub max_insights: usize,
    /// Key phrases, matched case-insensitively
    pub keywords: Vec<String>,
}

impl Default for InsightLimits {
    fn default() -> Self {
        Self {
            bullets_per_message: BULLETS_PER_MESSAGE,
            sentences_per_keyword: SENTENCES_PER_KEYWORD,
            max_insights: MAX_INSIGHTS,
            keywords: DEFAULT_KEYWORDS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Extract key insights with the default limits
#[must_use]
pub fn extract_key_insights(messages: &[Message]) -> Vec<String> {
    extract_key_insights_with(messages, &InsightLimits::default())
}

/// Extract key insights from the assistant turns of a conversation
///
/// Fragments are collected in message order (bullets before keyword
/// sentences within a message), deduplicated by exact text keeping the
/// first occurrence, then capped at `limits.max_insights`.
#[must_use]
pub fn extract_key_insights_with(messages: &[Message], limits: &InsightLimits) -> Vec<String> {
    let keywords: Vec<String> = limits.keywords.iter().map(|k| k.to_lowercase()).collect();
    let mut candidates = Vec::new();

    for message in messages.iter().filter(|m| !m.role.is_user()) {
        candidates.extend(
            bullet_items(&message.content)
                .into_iter()
                .take(limits.bullets_per_message),
        );

        let sentences = split_sentences(&message.content);
        for keyword in &keywords {
            candidates.extend(
                sentences
                    .iter()
                    .filter(|s| s.to_lowercase().contains(keyword.as_str()))
                    .take(limits.sentences_per_keyword)
                    .map(|s| (*s).to_string()),
            );
        }
    }

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.clone()))
        .take(limits.max_insights)
        .collect()
}

/// Bullet-style list items, in order of appearance
///
/// A list opens at a glyph that starts its line or follows a colon. An
/// item runs to the end of its line, or up to the next bullet glyph on the
/// same line, so `points: - A - B` gives two items while `5 - 3 = 2` gives
/// none.
fn bullet_items(content: &str) -> Vec<String> {
    let mut items = Vec::new();

    for line in content.lines() {
        let candidates: Vec<usize> = BULLET_START
            .captures_iter(line)
            .filter_map(|c| c.get(1).map(|m| m.start()))
            .collect();
        let Some(first) = candidates.iter().position(|&at| opens_list(&line[..at])) else {
            continue;
        };
        let starts = &candidates[first..];

        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(line.len());
            let item = line[start..end].trim();
            if !item.is_empty() {
                items.push(item.to_string());
            }
        }
    }

    items
}

/// Whether a bullet glyph preceded by `before` (on its line) opens a list
fn opens_list(before: &str) -> bool {
    let before = before.trim_end();
    before.is_empty() || before.ends_with(':')
}

/// Split text into sentences bounded by `.`, `!`, `?` or the ends of the text
///
/// Terminators stay attached to their sentence; surrounding whitespace is
/// trimmed and blank runs are dropped.
fn split_sentences(content: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for (idx, ch) in content.char_indices() {
        if matches!(ch, '.' | '!' | '?') {
            let end = idx + ch.len_utf8();
            push_sentence(&mut sentences, &content[start..end]);
            start = end;
        }
    }
    push_sentence(&mut sentences, &content[start..]);

    sentences
}

fn push_sentence<'a>(sentences: &mut Vec<&'a str>, raw: &'a str) {
    let sentence = raw.trim();
    // A lone terminator ("...") carries no text
    if sentence.chars().any(|c| !matches!(c, '.' | '!' | '?')) {
        sentences.push(sentence);
    }
}
