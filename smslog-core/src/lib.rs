//! # smslog-core
//!
//! Core library for smslog, a personal SMS archive.
//!
//! This library provides:
//! - Domain types for message events, records and fingerprints
//! - The append-only message store (record log + fingerprint index)
//! - The ingestion pipeline with duplicate suppression
//! - The tolerant log reader and conversation grouping
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! ```text
//! event ─► IngestPipeline ─► LogStore ─► LogReader ─► ConversationGrouper
//!          (validate,        (log +      (re-parse)   (group / sort)
//!           fingerprint)      index)
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use smslog_core::{Config, FileLogStore, IngestPipeline, LogReader};
//! use std::sync::Arc;
//!
//! let config = Config::load().expect("failed to load config");
//! let offset = config.storage.display_offset().expect("invalid offset");
//!
//! let store = Arc::new(FileLogStore::from_config(&config.storage));
//! let pipeline = IngestPipeline::new(store.clone(), offset);
//! pipeline
//!     .ingest_form("address=%2B255700000000&body=Hello&timestamp=1700000000000&type=received")
//!     .expect("failed to ingest");
//!
//! let records = LogReader::new(store).records().expect("failed to read log");
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use group::{Conversation, ConversationGrouper};
pub use ingest::{IngestOutcome, IngestPipeline, IngestResponse};
pub use reader::LogReader;
pub use stats::LogStats;
pub use store::{FileLogStore, LogStore, MemoryLogStore};
pub use types::*;

// Public modules
pub mod config;
pub mod error;
pub mod forward;
pub mod group;
pub mod ingest;
pub mod logging;
pub mod reader;
pub mod stats;
pub mod store;
pub mod types;
