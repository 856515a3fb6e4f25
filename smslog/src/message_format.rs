//! Plain-text rendering for records and conversations.

use smslog_core::{Conversation, Direction, LogStats, MessageRecord};

/// Column label for a record's direction; legacy lines never recorded one.
pub fn direction_label(direction: Option<Direction>) -> &'static str {
    match direction {
        Some(Direction::Sent) => "SENT",
        Some(Direction::Received) => "RECV",
        None => "----",
    }
}

/// One line per record for `list`.
pub fn record_row(record: &MessageRecord) -> String {
    format!(
        "{}  {}  {}: {}",
        record.timestamp,
        direction_label(record.direction),
        record.address,
        record.body
    )
}

/// One line per conversation for `conversations`.
pub fn conversation_row(conversation: &Conversation, preview_chars: usize) -> String {
    let latest = conversation
        .latest()
        .map(|r| r.timestamp.as_str())
        .unwrap_or("-");
    format!(
        "{:<20} {:>4}  {}  {}",
        truncate(&conversation.address, 20),
        conversation.records.len(),
        latest,
        conversation.preview(preview_chars)
    )
}

/// Summary block for `stats`.
pub fn stats_block(stats: &LogStats) -> String {
    format!(
        "Total messages: {}\n  Sent:         {}\n  Received:     {}\n  Unspecified:  {}\nUnparsed lines: {}",
        stats.total, stats.sent, stats.received, stats.unspecified, stats.unparsed
    )
}

fn truncate(input: &str, max_chars: usize) -> &str {
    input
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| &input[..idx])
        .unwrap_or(input)
}
