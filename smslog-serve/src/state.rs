//! Application state.

use std::sync::Arc;

use chrono::FixedOffset;
use smslog_core::{Config, FileLogStore, IngestPipeline, LogReader, LogStore};

use crate::error::ApiError;

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Validates and appends incoming events.
    pub pipeline: IngestPipeline,

    /// Re-parses the record log for the read endpoints.
    pub reader: LogReader,
}

impl AppState {
    /// Build state over an injected store.
    pub fn new(store: Arc<dyn LogStore>, offset: FixedOffset) -> Self {
        Self {
            pipeline: IngestPipeline::new(Arc::clone(&store), offset),
            reader: LogReader::new(store),
        }
    }

    /// Build state over the file store described by `config.storage`.
    pub fn from_config(config: &Config) -> smslog_core::Result<Self> {
        let offset = config.storage.display_offset()?;
        let store = FileLogStore::from_config(&config.storage);

        tracing::info!(
            log = %store.log_path().display(),
            index = %store.index_path().display(),
            utc_offset_minutes = config.storage.utc_offset_minutes,
            "store configured"
        );

        Ok(Self::new(Arc::new(store), offset))
    }
}

/// Run a store operation on the blocking pool.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> smslog_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}
