//! Ingestion pipeline for incoming SMS events
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │   Form body     │ ──► │  IngestPipeline  │ ──► │    LogStore     │
//! │ (phone / CLI)   │     │                  │     │ (log + index)   │
//! └─────────────────┘     └──────────────────┘     └─────────────────┘
//!                               │
//!                               ▼
//!                    ┌──────────────────────┐
//!                    │  IngestResponse      │
//!                    │  success | duplicate │
//!                    │  | error             │
//!                    └──────────────────────┘
//! ```
//!
//! Per request: `RECEIVED → VALIDATED → (DUPLICATE | APPENDED) → RESPONDED`.
//! A request that fails validation goes straight to RESPONDED and never
//! touches the store.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use smslog_core::ingest::IngestPipeline;
//! use smslog_core::store::FileLogStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(FileLogStore::from_config(&config.storage));
//! let pipeline = IngestPipeline::new(store, config.storage.display_offset()?);
//! let outcome = pipeline.ingest_form("address=%2B2557&body=Hi&timestamp=1700000000000&type=received")?;
//! ```

mod response;
mod wire;

pub use response::{IngestResponse, ResponseKind};
pub use wire::IngestForm;

use crate::error::{Error, Result};
use crate::store::{AppendOutcome, LogStore};
use crate::types::{Fingerprint, MessageEvent, MessageRecord};
use chrono::FixedOffset;
use std::sync::Arc;

/// Terminal state of one accepted ingestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// New record written to the log
    Appended { record: MessageRecord },
    /// Fingerprint already indexed; nothing written
    Duplicate { fingerprint: Fingerprint },
}

impl IngestOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, IngestOutcome::Duplicate { .. })
    }
}

/// Validates, fingerprints and deduplicates events against a [`LogStore`].
#[derive(Clone)]
pub struct IngestPipeline {
    store: Arc<dyn LogStore>,
    offset: FixedOffset,
}

impl IngestPipeline {
    /// Create a pipeline that renders display timestamps at `offset`.
    pub fn new(store: Arc<dyn LogStore>, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    /// Ingest a form-encoded request body in either wire shape.
    pub fn ingest_form(&self, raw: &str) -> Result<IngestOutcome> {
        let event = IngestForm::from_urlencoded(raw)?.into_event()?;
        self.ingest(&event)
    }

    /// Ingest an already-decoded event.
    pub fn ingest(&self, event: &MessageEvent) -> Result<IngestOutcome> {
        wire::check_address(&event.address)?;
        let record = event.to_record(&self.offset).ok_or_else(|| {
            Error::InvalidInput(format!(
                "timestamp out of range: {}",
                event.timestamp_millis
            ))
        })?;
        let fingerprint = event.fingerprint();

        self.store.ensure_initialized()?;

        match self.store.append_if_absent(&fingerprint, &record)? {
            AppendOutcome::AlreadyPresent => {
                tracing::debug!(
                    address = %event.address,
                    hash = %fingerprint,
                    "Duplicate message skipped"
                );
                Ok(IngestOutcome::Duplicate { fingerprint })
            }
            AppendOutcome::Appended => {
                tracing::info!(
                    address = %record.address,
                    direction = %event.direction,
                    timestamp = %record.timestamp,
                    "Message stored"
                );
                Ok(IngestOutcome::Appended { record })
            }
        }
    }

    /// Ingest a form body and convert the result into a client response.
    pub fn respond_form(&self, raw: &str) -> (IngestResponse, ResponseKind) {
        IngestResponse::from_result(&self.ingest_form(raw))
    }
}
