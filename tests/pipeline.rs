//! End-to-end pipeline tests
//!
//! Capture a conversation, store it, and render it back in every format

use chat_context::context::{extract_key_insights, select_messages};
use chat_context::{
    ContextBuilder, ConversationLog, Error, FormatOptions, OutputFormat, Platform, format_context,
};

mod common;
use common::{at, conversation, numbered_conversation, setup_service};

#[test]
fn test_insight_scenario() {
    let messages = conversation(&[
        "Hi",
        "Hello, here are 3 points: - A - B - C",
        "ok",
        "Remember: this is crucial information.",
        "thanks",
    ]);

    assert_eq!(
        extract_key_insights(&messages),
        vec![
            "- A",
            "- B",
            "- C",
            "Remember: this is crucial information."
        ]
    );
}

#[test]
fn test_even_sampling_scenario() {
    let messages = numbered_conversation(12);
    let options = FormatOptions {
        prefer_recent_messages: false,
        ..FormatOptions::default()
    };

    let selected: Vec<&str> = select_messages(&messages, &options)
        .iter()
        .map(|m| m.content.as_str())
        .collect();

    // step = 12 / 10 = 1: message 0, then 1..=10 truncated to ten in total
    assert_eq!(selected.len(), 10);
    assert_eq!(selected[0], "message 0");
    assert_eq!(selected[1], "message 1");
    assert_eq!(selected[9], "message 9");
}

#[test]
fn test_max_tokens_does_not_clip() {
    let question = "long question ".repeat(200);
    let answer = "long answer ".repeat(200);
    let log = ConversationLog::new(
        "claude",
        conversation(&[question.as_str(), answer.as_str()]),
        at("2024-05-01T10:00:00Z"),
    );
    let file = ContextBuilder::default().build_at(&log, at("2024-05-01T10:00:00Z"));

    let render = |max_tokens| {
        let options = FormatOptions {
            max_tokens,
            ..FormatOptions::default()
        };
        format_context(&file, &options).into_string().unwrap()
    };

    let unbounded = render(usize::MAX);
    assert_eq!(render(1), unbounded);
    assert_eq!(render(4000), unbounded);
    assert!(unbounded.contains(answer.trim_end()));
}

#[test]
fn test_capture_render_round_trip() {
    let service = setup_service();
    let log = ConversationLog::new(
        "chatgpt",
        conversation(&[
            "How do I structure a Rust workspace?",
            "Key tips:\n- Keep crates small\n- Share a lockfile",
            "Thanks",
            "It is essential to pin the toolchain.",
        ]),
        at("2024-05-01T09:30:00Z"),
    );

    let stored = service.capture_at(&log, at("2024-05-01T10:00:00Z")).unwrap();
    assert_eq!(stored.id, "context_1714557600000");

    let markup = service
        .render(&stored.id, &FormatOptions::default())
        .unwrap()
        .into_string()
        .unwrap();
    assert!(markup.starts_with("# Previous Conversation Context\n\n**Source:** Chatgpt\n"));
    assert!(markup.contains("**Date:** 5/1/2024, 10:00:00 AM\n"));
    assert!(markup.contains("**Messages:** 4\n\n"));
    assert!(markup.contains("## Summary\n\nInitial prompt: How do I structure a Rust workspace?\n\nRecent exchanges:\n"));
    assert!(markup.contains("## Key Points\n\n- - Keep crates small\n- - Share a lockfile\n- It is essential to pin the toolchain.\n\n"));
    assert!(markup.contains("**Human:**\nThanks\n\n"));

    let structured = service
        .render(
            &stored.id,
            &FormatOptions {
                format: OutputFormat::Structured,
                include_summary: false,
                ..FormatOptions::default()
            },
        )
        .unwrap();
    let value = structured.as_structured().unwrap();
    assert_eq!(value.metadata.source, "chatgpt");
    assert_eq!(value.metadata.message_count, 4);
    assert_eq!(value.summary, None);
    assert_eq!(value.messages.len(), 4);

    let json: serde_json::Value =
        serde_json::from_str(&structured.into_string().unwrap()).unwrap();
    assert!(json["summary"].is_null());
    assert_eq!(json["metadata"]["messageCount"], 4);
    assert_eq!(json["keyInsights"].as_array().unwrap().len(), 3);
}

#[test]
fn test_long_conversation_keeps_full_history() {
    let service = setup_service();
    let log = ConversationLog::new("bard", numbered_conversation(25), at("2024-05-01T10:00:00Z"));

    let stored = service.capture(&log).unwrap();
    assert_eq!(stored.file.messages.len(), 25);
    assert_eq!(stored.file.metadata.message_count, 25);

    let options = FormatOptions {
        format: OutputFormat::PlainText,
        ..FormatOptions::default()
    };
    let text = service
        .render(&stored.id, &options)
        .unwrap()
        .into_string()
        .unwrap();
    assert!(text.contains("Human:\nmessage 0\n\n"));
    assert!(!text.contains("message 15\n"));
    assert!(text.contains("message 16\n"));
    assert!(text.contains("message 24\n"));
}

#[test]
fn test_page_capture_and_export() {
    let service = setup_service();
    let html = r#"
        <html><body>
          <div class="group"><div class="markdown">What is a lifetime?</div></div>
          <div class="group assistant"><div class="markdown">Remember that references cannot outlive their data.</div></div>
        </body></html>
    "#;

    let platform = Platform::identify("https://chat.openai.com/c/abc");
    assert_eq!(platform, Platform::ChatGpt);

    let stored = service
        .capture_page(platform, html, at("2024-05-01T10:00:00Z"))
        .unwrap();
    assert_eq!(stored.file.source(), "chatgpt");
    assert_eq!(stored.file.messages.len(), 2);
    assert!(stored.file.messages[0].role.is_user());
    assert_eq!(
        stored.file.key_insights,
        vec!["Remember that references cannot outlive their data."]
    );

    let json = service.export_json(&stored.id).unwrap();
    let copy = service.import_json_at(&json, at("2024-05-02T10:00:00Z")).unwrap();
    assert_eq!(copy.file, stored.file);

    let ids: Vec<String> = service.list().unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&stored.id));
    assert!(ids.contains(&copy.id));
}

#[test]
fn test_unknown_platform_captures_nothing() {
    let service = setup_service();
    let err = service
        .capture_page(
            Platform::identify("https://example.com/chat"),
            "<div class=\"message\">hi</div>",
            at("2024-05-01T10:00:00Z"),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Capture(_)));
}

#[test]
fn test_import_rejects_malformed_file() {
    let service = setup_service();
    for text in [
        r#"{"metadata": {"source": "claude"}}"#,
        r#"{"messages": []}"#,
        "42",
    ] {
        assert!(matches!(service.import_json(text), Err(Error::Validation(_))));
    }
    assert!(service.list().unwrap().is_empty());
}

#[test]
fn test_clear_removes_everything() {
    let service = setup_service();
    for minute in 0..3 {
        let now = at(&format!("2024-05-01T10:0{minute}:00Z"));
        let log = ConversationLog::new("claude", conversation(&["Hi"]), now);
        service.capture_at(&log, now).unwrap();
    }

    assert_eq!(service.list().unwrap().len(), 3);
    assert_eq!(service.clear().unwrap(), 3);
    assert!(service.list().unwrap().is_empty());
}

#[test]
fn test_back_to_back_captures_are_all_kept() {
    let service = setup_service();
    let log = ConversationLog::new(
        "claude",
        conversation(&["Hi", "Hello"]),
        at("2024-05-01T10:00:00Z"),
    );

    let ids: Vec<String> = (0..5).map(|_| service.capture(&log).unwrap().id).collect();

    let unique: std::collections::HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), 5);
    assert_eq!(service.list().unwrap().len(), 5);
}

#[test]
fn test_import_accepts_null_message_text() {
    let service = setup_service();
    let stored = service
        .import_json(
            r#"{"metadata": {"source": "bard", "messageCount": 1},
                "messages": [{"role": "user", "content": null, "timestamp": null}]}"#,
        )
        .unwrap();

    assert_eq!(stored.file.messages[0].content, "");
    assert_eq!(service.list().unwrap().len(), 1);
}
