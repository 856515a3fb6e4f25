//! Record log line formats
//!
//! | Format | Example |
//! |--------|---------|
//! | [`LineFormat::Hashed`] | `[2023-11-14 22:13:20] RECEIVED \| +2557 \| Hello \| HASH:9f86…` |
//! | [`LineFormat::Bracketed`] | `[2023-11-14 22:13:20] SENT \| +2557 \| Hello` |
//! | [`LineFormat::Legacy`] | `Sender: M-PESA, Timestamp: 2023-11-14 22:13:20, Message: Hello` |
//!
//! Formats are tried richest first. The address is captured up to the first
//! ` | `, so ingestion rejects addresses containing `|`. A body that itself
//! contains ` | HASH:` or `, Timestamp: ` can be split at the wrong place; this
//! is a known limit of the text format.

use crate::types::{Direction, Fingerprint, MessageRecord};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static HASHED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(.*?)\] (SENT|RECEIVED) \| (.*?) \| (.*) \| HASH:([a-f0-9]+)$")
        .expect("hashed line regex should compile")
});

static BRACKETED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(.*?)\] (SENT|RECEIVED) \| (.*?) \| (.*)$")
        .expect("bracketed line regex should compile")
});

static LEGACY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Sender: (.*?), Timestamp: (.*?), Message: (.*)$")
        .expect("legacy line regex should compile")
});

/// One historical layout of a record log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    /// Bracketed timestamp, direction, address, body and fingerprint
    Hashed,
    /// Bracketed line written before fingerprints were recorded
    Bracketed,
    /// `Sender: …, Timestamp: …, Message: …` from the first ingestion endpoint
    Legacy,
}

impl LineFormat {
    /// Tolerance order used by the reader.
    pub const ORDER: [LineFormat; 3] = [LineFormat::Hashed, LineFormat::Bracketed, LineFormat::Legacy];

    pub fn name(&self) -> &'static str {
        match self {
            LineFormat::Hashed => "hashed",
            LineFormat::Bracketed => "bracketed",
            LineFormat::Legacy => "legacy",
        }
    }

    /// Parse a trimmed, non-blank line in this format.
    pub fn parse(&self, line: &str) -> Option<MessageRecord> {
        match self {
            LineFormat::Hashed => HASHED_RE.captures(line).map(|caps| MessageRecord {
                fingerprint: Some(Fingerprint(caps[5].to_string())),
                ..bracketed_record(&caps)
            }),
            LineFormat::Bracketed => BRACKETED_RE.captures(line).map(|caps| bracketed_record(&caps)),
            LineFormat::Legacy => LEGACY_RE.captures(line).map(|caps| MessageRecord {
                timestamp: caps[2].trim().to_string(),
                direction: None,
                address: caps[1].trim().to_string(),
                body: caps[3].trim().to_string(),
                fingerprint: None,
            }),
        }
    }

    /// Try every format in [`Self::ORDER`], returning the first match.
    pub fn detect(line: &str) -> Option<(LineFormat, MessageRecord)> {
        Self::ORDER
            .iter()
            .find_map(|format| format.parse(line).map(|record| (*format, record)))
    }
}

fn bracketed_record(caps: &Captures<'_>) -> MessageRecord {
    let direction = match &caps[2] {
        "SENT" => Direction::Sent,
        _ => Direction::Received,
    };
    MessageRecord {
        timestamp: caps[1].to_string(),
        direction: Some(direction),
        address: caps[3].to_string(),
        body: caps[4].to_string(),
        fingerprint: None,
    }
}
