//! Core domain types for smslog
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **MessageEvent** | An SMS as posted by a client, before validation is finished |
//! | **MessageRecord** | One message as persisted in (or parsed back from) the record log |
//! | **Fingerprint** | Digest of an event's defining fields, used for duplicate detection |
//! | **Record log** | Append-only text file, one line per accepted message |
//! | **Fingerprint index** | Append-only text file, one fingerprint per accepted message |
//! | **Conversation** | Records sharing an address, derived on every read |

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Display timestamp format used in the record log (second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================
// Direction
// ============================================

/// Whether the phone sent or received the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Sent,
    Received,
}

impl Direction {
    /// Canonical uppercase form as written to the record log.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Sent => "SENT",
            Direction::Received => "RECEIVED",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SENT" => Ok(Direction::Sent),
            "RECEIVED" => Ok(Direction::Received),
            _ => Err(format!("unknown message type: {}", s)),
        }
    }
}

// ============================================
// Events and records
// ============================================

/// A validated SMS event ready for fingerprinting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Phone number or short-code of the other party
    pub address: String,
    /// Message text, verbatim
    pub body: String,
    /// Epoch milliseconds as reported by the phone
    pub timestamp_millis: i64,
    pub direction: Direction,
}

impl MessageEvent {
    pub fn new(
        address: impl Into<String>,
        body: impl Into<String>,
        timestamp_millis: i64,
        direction: Direction,
    ) -> Self {
        Self {
            address: address.into(),
            body: body.into(),
            timestamp_millis,
            direction,
        }
    }

    /// Deterministic digest over the raw event fields.
    ///
    /// The timestamp is hashed in milliseconds, before display conversion, so two
    /// events inside the same display second still get distinct fingerprints.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update(self.address.as_bytes());
        hasher.update([FIELD_SEPARATOR]);
        hasher.update(self.body.as_bytes());
        hasher.update([FIELD_SEPARATOR]);
        hasher.update(self.timestamp_millis.to_string().as_bytes());
        hasher.update([FIELD_SEPARATOR]);
        hasher.update(self.direction.as_str().as_bytes());
        Fingerprint(hex::encode(hasher.finalize()))
    }

    /// Render the event timestamp in the record log format at a fixed offset.
    ///
    /// Returns `None` when the millisecond value is outside chrono's range.
    pub fn display_timestamp(&self, offset: &FixedOffset) -> Option<String> {
        let utc = DateTime::from_timestamp_millis(self.timestamp_millis)?;
        Some(utc.with_timezone(offset).format(TIMESTAMP_FORMAT).to_string())
    }

    /// Build the persisted record for this event.
    pub fn to_record(&self, offset: &FixedOffset) -> Option<MessageRecord> {
        Some(MessageRecord {
            timestamp: self.display_timestamp(offset)?,
            direction: Some(self.direction),
            address: single_line(&self.address),
            body: single_line(&self.body),
            fingerprint: Some(self.fingerprint()),
        })
    }
}

/// ASCII unit separator between hashed fields.
const FIELD_SEPARATOR: u8 = 0x1f;

/// One message in the record log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Display timestamp, `%Y-%m-%d %H:%M:%S` for records written by smslog
    pub timestamp: String,
    /// `None` for legacy lines, which never recorded a direction
    pub direction: Option<Direction>,
    pub address: String,
    pub body: String,
    /// Present only on lines in the richest format
    pub fingerprint: Option<Fingerprint>,
}

impl MessageRecord {
    /// Serialize to a record log line, including the trailing newline.
    ///
    /// Records without a direction are written as RECEIVED, matching how
    /// legacy events are ingested.
    pub fn to_line(&self) -> String {
        let direction = self.direction.unwrap_or(Direction::Received);
        match &self.fingerprint {
            Some(fp) => format!(
                "[{}] {} | {} | {} | HASH:{}\n",
                self.timestamp, direction, self.address, self.body, fp
            ),
            None => format!(
                "[{}] {} | {} | {}\n",
                self.timestamp, direction, self.address, self.body
            ),
        }
    }

    /// Parse the display timestamp.
    ///
    /// Accepts the log format and its `T`-separated variant; anything else is `None`.
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        let ts = self.timestamp.trim();
        NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S"))
            .ok()
    }
}

/// Replace line breaks so one message always occupies exactly one log line.
fn single_line(value: &str) -> String {
    if value.contains(['\n', '\r']) {
        value.replace("\r\n", " ").replace(['\n', '\r'], " ")
    } else {
        value.to_string()
    }
}

/// Lowercase hex SHA-256 digest of a message event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================
// Read side
// ============================================

/// One non-blank line of the record log after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// Line matched one of the known formats
    Record(MessageRecord),
    /// Line matched no known format; kept verbatim
    Unparsed(String),
}

impl LogEntry {
    pub fn as_record(&self) -> Option<&MessageRecord> {
        match self {
            LogEntry::Record(record) => Some(record),
            LogEntry::Unparsed(_) => None,
        }
    }

    pub fn into_record(self) -> Option<MessageRecord> {
        match self {
            LogEntry::Record(record) => Some(record),
            LogEntry::Unparsed(_) => None,
        }
    }
}

/// Flat read-endpoint shape: `{"sender", "timestamp", "message"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    pub sender: String,
    pub timestamp: String,
    pub message: String,
}

impl From<&MessageRecord> for MessageView {
    fn from(record: &MessageRecord) -> Self {
        Self {
            sender: record.address.clone(),
            timestamp: record.timestamp.clone(),
            message: record.body.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_direction_from_str_is_case_insensitive() {
        assert_eq!("sent".parse::<Direction>(), Ok(Direction::Sent));
        assert_eq!("Received".parse::<Direction>(), Ok(Direction::Received));
        assert_eq!(" RECEIVED ".parse::<Direction>(), Ok(Direction::Received));
        assert!("draft".parse::<Direction>().is_err());
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = MessageEvent::new("+255700000000", "Hello", 1_700_000_000_000, Direction::Received);
        let b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().as_str().len(), 64);
        assert!(a
            .fingerprint()
            .as_str()
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fingerprint_covers_every_field() {
        let base = MessageEvent::new("+255700000000", "Hello", 1_700_000_000_000, Direction::Received);

        let mut other = base.clone();
        other.direction = Direction::Sent;
        assert_ne!(base.fingerprint(), other.fingerprint());

        // Same display second, different millisecond
        let mut other = base.clone();
        other.timestamp_millis += 1;
        assert_ne!(base.fingerprint(), other.fingerprint());

        // Field boundaries are not ambiguous
        let left = MessageEvent::new("ab", "c", 1, Direction::Sent);
        let right = MessageEvent::new("a", "bc", 1, Direction::Sent);
        assert_ne!(left.fingerprint(), right.fingerprint());
    }

    #[test]
    fn test_display_timestamp_uses_fixed_offset() {
        let event = MessageEvent::new("x", "y", 1_700_000_000_000, Direction::Sent);
        assert_eq!(
            event.display_timestamp(&utc()).as_deref(),
            Some("2023-11-14 22:13:20")
        );

        let eat = FixedOffset::east_opt(3 * 3600).unwrap();
        assert_eq!(
            event.display_timestamp(&eat).as_deref(),
            Some("2023-11-15 01:13:20")
        );
    }

    #[test]
    fn test_display_timestamp_truncates_millis() {
        let event = MessageEvent::new("x", "y", 1_700_000_000_999, Direction::Sent);
        assert_eq!(
            event.display_timestamp(&utc()).as_deref(),
            Some("2023-11-14 22:13:20")
        );
    }

    #[test]
    fn test_record_line_format() {
        let event = MessageEvent::new("+255700000000", "Hello", 1_700_000_000_000, Direction::Received);
        let record = event.to_record(&utc()).unwrap();
        let fp = event.fingerprint();
        assert_eq!(
            record.to_line(),
            format!("[2023-11-14 22:13:20] RECEIVED | +255700000000 | Hello | HASH:{fp}\n")
        );
    }

    #[test]
    fn test_record_flattens_line_breaks() {
        let event = MessageEvent::new("M-PESA", "line one\r\nline two\nthree", 0, Direction::Received);
        let record = event.to_record(&utc()).unwrap();
        assert_eq!(record.body, "line one line two three");
        assert_eq!(record.to_line().matches('\n').count(), 1);
        // Fingerprint still covers the raw body
        assert_eq!(record.fingerprint, Some(event.fingerprint()));
    }

    #[test]
    fn test_parsed_timestamp() {
        let mut record = MessageRecord {
            timestamp: "2024-01-02 03:04:05".to_string(),
            direction: None,
            address: "a".to_string(),
            body: "b".to_string(),
            fingerprint: None,
        };
        assert!(record.parsed_timestamp().is_some());

        record.timestamp = "2024-01-02T03:04:05".to_string();
        assert!(record.parsed_timestamp().is_some());

        record.timestamp = "yesterday".to_string();
        assert!(record.parsed_timestamp().is_none());
    }

    #[test]
    fn test_message_view_serialization() {
        let record = MessageRecord {
            timestamp: "2024-01-02 03:04:05".to_string(),
            direction: Some(Direction::Sent),
            address: "+1555".to_string(),
            body: "hi".to_string(),
            fingerprint: None,
        };
        let json = serde_json::to_value(MessageView::from(&record)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sender": "+1555",
                "timestamp": "2024-01-02 03:04:05",
                "message": "hi"
            })
        );
    }
}
