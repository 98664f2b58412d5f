//! Property tests for the capture and rendering pipeline

use std::collections::HashSet;

use chat_context::context::{
    MAX_SELECTED_MESSAGES, extract_key_insights, select_messages, summarize_conversation,
};
use chat_context::{
    ContextBuilder, ConversationLog, FormatOptions, Message, MessageRole, OutputFormat,
    format_context,
};
use proptest::prelude::*;

mod common;
use common::at;

fn message_strategy() -> impl Strategy<Value = Message> {
    let content = prop_oneof![
        "[a-zA-Z ,.!?]{0,300}",
        "(- [a-z]{1,8} ){1,5}",
        "(It is (important|crucial|essential) to [a-z ]{1,20}\\. ){1,4}",
        "\\PC{0,120}",
    ];
    (any::<bool>(), content).prop_map(|(is_user, content)| {
        let role = if is_user {
            MessageRole::User
        } else {
            MessageRole::Assistant
        };
        Message::new(role, content, at("2024-05-01T10:00:00Z"))
    })
}

fn conversation_strategy(max_len: usize) -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec(message_strategy(), 0..max_len)
}

fn options_strategy() -> impl Strategy<Value = FormatOptions> {
    (
        any::<usize>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        prop_oneof![
            Just(OutputFormat::Markup),
            Just(OutputFormat::PlainText),
            Just(OutputFormat::Structured),
        ],
    )
        .prop_map(
            |(max_tokens, include_summary, include_key_insights, prefer_recent_messages, format)| {
                FormatOptions {
                    max_tokens,
                    include_summary,
                    include_key_insights,
                    prefer_recent_messages,
                    format,
                }
            },
        )
}

proptest! {
    #[test]
    fn initial_prompt_is_a_verbatim_prefix(messages in conversation_strategy(8)) {
        prop_assume!(!messages.is_empty());
        let summary = summarize_conversation(&messages);

        let prompt = summary
            .strip_prefix("Initial prompt: ")
            .expect("summary starts with the initial prompt");
        let prompt = prompt.split("\n\nRecent exchanges:\n").next().unwrap_or_default();
        let expected: String = messages[0].content.chars().take(200).collect();
        prop_assert_eq!(prompt, expected);
    }

    #[test]
    fn recent_exchanges_only_for_longer_conversations(messages in conversation_strategy(12)) {
        prop_assume!(!messages.is_empty());
        let summary = summarize_conversation(&messages);
        let len = messages.len();

        match summary.split_once("\n\nRecent exchanges:\n") {
            None => prop_assert!(len <= 3),
            Some((_, section)) => {
                prop_assert!(len > 3);
                let lines = section
                    .split_terminator("...\n")
                    .filter(|line| line.starts_with("Human: ") || line.starts_with("AI: "))
                    .count();
                prop_assert_eq!(lines, len - 1_usize.max(len - 4));
            }
        }
    }

    #[test]
    fn insights_are_bounded_and_unique(messages in conversation_strategy(20)) {
        let insights = extract_key_insights(&messages);
        prop_assert!(insights.len() <= 10);

        let unique: HashSet<&String> = insights.iter().collect();
        prop_assert_eq!(unique.len(), insights.len());
    }

    #[test]
    fn selection_keeps_short_and_bounds_long(messages in conversation_strategy(30)) {
        let recent = FormatOptions::default();
        let selected = select_messages(&messages, &recent);

        if messages.len() <= MAX_SELECTED_MESSAGES {
            prop_assert_eq!(selected.len(), messages.len());
            prop_assert!(selected.iter().zip(&messages).all(|(a, b)| std::ptr::eq(*a, b)));
        } else {
            prop_assert_eq!(selected.len(), MAX_SELECTED_MESSAGES);
            prop_assert!(std::ptr::eq(selected[0], &messages[0]));
            let tail = &messages[messages.len() - 9..];
            prop_assert!(selected[1..].iter().zip(tail).all(|(a, b)| std::ptr::eq(*a, b)));
        }

        let even = FormatOptions { prefer_recent_messages: false, ..FormatOptions::default() };
        prop_assert!(select_messages(&messages, &even).len() <= MAX_SELECTED_MESSAGES);
    }

    #[test]
    fn rendering_is_pure(messages in conversation_strategy(15), options in options_strategy()) {
        let log = ConversationLog::new("claude", messages, at("2024-05-01T10:00:00Z"));
        let file = ContextBuilder::default().build_at(&log, at("2024-05-01T10:00:00Z"));

        prop_assert_eq!(format_context(&file, &options), format_context(&file, &options));
    }

    #[test]
    fn structured_rendering_keeps_metadata(
        messages in conversation_strategy(15),
        source in "[a-z]{1,10}",
        options in options_strategy(),
    ) {
        let log = ConversationLog::new(source.clone(), messages, at("2024-05-01T10:00:00Z"));
        let file = ContextBuilder::default().build_at(&log, at("2024-05-01T10:00:00Z"));
        let options = FormatOptions { format: OutputFormat::Structured, ..options };

        let rendered = format_context(&file, &options);
        let value = rendered.as_structured().expect("structured output");
        prop_assert_eq!(&value.metadata.source, &source);
        prop_assert_eq!(value.metadata.message_count, file.metadata.message_count);
    }
}
