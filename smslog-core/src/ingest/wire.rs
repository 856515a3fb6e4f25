//! Decoding of the form-encoded ingestion shape.
//!
//! Two shapes reach the same endpoint:
//!
//! | Shape | Fields |
//! |-------|--------|
//! | Current | `address`, `body`, `timestamp`, `type` |
//! | Legacy | `sender`, `body`, `timestamp` (no `type`) |
//!
//! Both decode to a [`MessageEvent`]. Callers never learn which one was used.

use crate::error::{Error, Result};
use crate::types::{Direction, MessageEvent};
use serde::{Deserialize, Serialize};

/// Raw form fields as posted by a client. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl IngestForm {
    /// Decode an `application/x-www-form-urlencoded` body.
    pub fn from_urlencoded(raw: &str) -> Result<Self> {
        serde_urlencoded::from_str(raw)
            .map_err(|e| Error::InvalidInput(format!("malformed form body: {}", e)))
    }

    /// The current-shape form for an event, as the forwarding client posts it.
    pub fn from_event(event: &MessageEvent) -> Self {
        Self {
            address: Some(event.address.clone()),
            sender: None,
            body: Some(event.body.clone()),
            timestamp: Some(event.timestamp_millis.to_string()),
            kind: Some(event.direction.as_str().to_ascii_lowercase()),
        }
    }

    /// Validate required fields and normalize into an event.
    ///
    /// `address` wins over `sender` when both are present. An address may not
    /// contain `|`, which the record log uses to delimit fields. `type` is required with
    /// `address`; with the legacy `sender` it defaults to RECEIVED because the
    /// legacy client only forwarded inbox messages.
    pub fn into_event(self) -> Result<MessageEvent> {
        let (address, legacy) = match (self.address, self.sender) {
            (Some(address), _) => (address, false),
            (None, Some(sender)) => (sender, true),
            (None, None) => return Err(missing("address")),
        };
        check_address(&address)?;

        let body = self.body.ok_or_else(|| missing("body"))?;

        let raw_timestamp = self.timestamp.ok_or_else(|| missing("timestamp"))?;
        let timestamp_millis = raw_timestamp.trim().parse::<i64>().map_err(|_| {
            Error::InvalidInput(format!(
                "timestamp must be epoch milliseconds, got {:?}",
                raw_timestamp
            ))
        })?;

        let direction = match self.kind {
            Some(kind) => kind.parse::<Direction>().map_err(Error::InvalidInput)?,
            None if legacy => Direction::Received,
            None => return Err(missing("type")),
        };

        Ok(MessageEvent {
            address,
            body,
            timestamp_millis,
            direction,
        })
    }
}

/// An address must be non-blank and free of the `|` field delimiter.
pub(crate) fn check_address(address: &str) -> Result<()> {
    if address.trim().is_empty() {
        return Err(Error::InvalidInput("address must not be empty".to_string()));
    }
    if address.contains('|') {
        return Err(Error::InvalidInput(format!(
            "address must not contain '|', got {:?}",
            address
        )));
    }
    Ok(())
}

fn missing(field: &str) -> Error {
    Error::InvalidInput(format!("missing required field: {}", field))
}
