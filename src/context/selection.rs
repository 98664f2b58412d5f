//! Message selection for rendering under a size bound
//!
//! Long conversations are cut down to at most [`MAX_SELECTED_MESSAGES`]
//! turns, either keeping the opening prompt plus the most recent turns or
//! sampling evenly across the whole conversation.

use crate::conversation::Message;
use crate::format::FormatOptions;

/// Upper bound on messages handed to a renderer
pub const MAX_SELECTED_MESSAGES: usize = 10;

/// Trailing messages kept by the recency policy (after the first message)
pub const RECENT_TAIL: usize = MAX_SELECTED_MESSAGES - 1;

/// Select messages for rendering according to `options`
#[must_use]
pub fn select_messages<'a>(messages: &'a [Message], options: &FormatOptions) -> Vec<&'a Message> {
    if options.prefer_recent_messages {
        select_recent(messages)
    } else {
        select_evenly(messages)
    }
}

/// First message plus the last [`RECENT_TAIL`] messages
///
/// Conversations within the bound are returned whole.
#[must_use]
pub fn select_recent(messages: &[Message]) -> Vec<&Message> {
    if messages.len() <= MAX_SELECTED_MESSAGES {
        return messages.iter().collect();
    }

    let tail = &messages[messages.len() - RECENT_TAIL..];
    std::iter::once(&messages[0]).chain(tail).collect()
}

/// Sample every `len / 10`-th message, keeping the first message
///
/// The final message is appended unless it is already the last one taken,
/// then the sample is cut to the first [`MAX_SELECTED_MESSAGES`] taken.
/// Sampling stops before the final index, so on long conversations the cut
/// usually drops the appended final message again.
#[must_use]
pub fn select_evenly(messages: &[Message]) -> Vec<&Message> {
    let len = messages.len();
    if len <= MAX_SELECTED_MESSAGES {
        return messages.iter().collect();
    }

    let step = len / MAX_SELECTED_MESSAGES;
    let last = len - 1;

    let mut taken: Vec<usize> = vec![0];
    taken.extend((1..last).step_by(step));
    if taken.last() != Some(&last) {
        taken.push(last);
    }
    taken.truncate(MAX_SELECTED_MESSAGES);

    taken.into_iter().map(|i| &messages[i]).collect()
}
