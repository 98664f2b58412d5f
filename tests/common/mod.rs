//! Shared test utilities

#![allow(dead_code)]

use chat_context::{
    ContextBuilder, ContextRepo, ContextService, DbPool, Message, MessageRole, db,
};
use chrono::{DateTime, Utc};

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// Create a capture service over an in-memory repository
#[must_use]
pub fn setup_service() -> ContextService<ContextRepo> {
    ContextService::new(ContextRepo::new(setup_test_db()), ContextBuilder::default())
}

/// Parse a fixed instant
#[must_use]
pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

/// Alternating user/assistant messages with the given contents
#[must_use]
pub fn conversation(contents: &[&str]) -> Vec<Message> {
    contents
        .iter()
        .enumerate()
        .map(|(i, content)| {
            let role = if i % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            };
            Message::new(role, *content, at("2024-05-01T10:00:00Z"))
        })
        .collect()
}

/// `count` alternating messages numbered from zero
#[must_use]
pub fn numbered_conversation(count: usize) -> Vec<Message> {
    let contents: Vec<String> = (0..count).map(|i| format!("message {i}")).collect();
    let refs: Vec<&str> = contents.iter().map(String::as_str).collect();
    conversation(&refs)
}
