//! Conversation grouping for the read side.
//!
//! Conversations are derived on every read and never persisted.
//!
//! Ordering rules:
//! - Within a conversation, records ascend by parsed timestamp. The sort is
//!   stable, so equal timestamps keep log order.
//! - Conversations descend by the timestamp of their latest record, ties broken
//!   by address ascending.
//! - A timestamp that does not parse sorts as the minimum, before every
//!   parseable timestamp.

use crate::types::MessageRecord;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

/// Records sharing one address, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    pub address: String,
    pub records: Vec<MessageRecord>,
}

impl Conversation {
    /// Most recent record. Conversations are never empty.
    pub fn latest(&self) -> Option<&MessageRecord> {
        self.records.last()
    }

    /// Sort key of the most recent record.
    pub fn latest_key(&self) -> Option<NaiveDateTime> {
        self.latest().and_then(sort_key)
    }

    /// Latest body cut to `max_chars` characters, with `...` when truncated.
    pub fn preview(&self, max_chars: usize) -> String {
        let body = self.latest().map(|r| r.body.as_str()).unwrap_or_default();
        match body.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &body[..cut]),
            None => body.to_string(),
        }
    }
}

/// `None` is the sentinel for unparseable timestamps and orders first.
fn sort_key(record: &MessageRecord) -> Option<NaiveDateTime> {
    record.parsed_timestamp()
}

/// Groups records into conversations.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConversationGrouper;

impl ConversationGrouper {
    pub fn new() -> Self {
        Self
    }

    pub fn group<I>(&self, records: I) -> Vec<Conversation>
    where
        I: IntoIterator<Item = MessageRecord>,
    {
        let mut by_address: BTreeMap<String, Vec<MessageRecord>> = BTreeMap::new();
        for record in records {
            by_address
                .entry(record.address.clone())
                .or_default()
                .push(record);
        }

        let mut conversations: Vec<Conversation> = by_address
            .into_iter()
            .map(|(address, mut records)| {
                records.sort_by_key(sort_key);
                Conversation { address, records }
            })
            .collect();

        // Stable sort over address-ordered input keeps address order on ties
        conversations.sort_by(|a, b| b.latest_key().cmp(&a.latest_key()));
        conversations
    }
}
