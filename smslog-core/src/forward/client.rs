//! HTTP client for a remote ingestion endpoint

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

use crate::config::ForwardConfig;
use crate::error::{Error, Result};
use crate::ingest::{IngestForm, IngestResponse};
use crate::types::MessageEvent;

/// HTTP client posting events to `forward.server_url`
pub struct ForwardClient {
    config: ForwardConfig,
    http_client: reqwest::Client,
    url: String,
}

impl ForwardClient {
    /// Create a new client from configuration
    ///
    /// Returns an error if the configuration is invalid or has no server URL.
    pub fn new(config: ForwardConfig) -> Result<Self> {
        config.validate()?;

        let url = config
            .server_url
            .clone()
            .ok_or_else(|| Error::Config("forward.server_url is required".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            url,
        })
    }

    /// Post one event as a form and decode the server's response.
    ///
    /// Validation errors reported by the server come back as
    /// `Ok(IngestResponse::Error { .. })`; only transport failures are `Err`.
    pub async fn push(&self, event: &MessageEvent) -> Result<IngestResponse> {
        let response = self
            .http_client
            .post(&self.url)
            .form(&IngestForm::from_event(event))
            .send()
            .await
            .map_err(|e| Error::Forward(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Forward(format!("failed to read response: {}", e)))?;

        if status.is_server_error() {
            return Err(Error::Forward(format!("server error ({}): {}", status, text)));
        }

        serde_json::from_str::<IngestResponse>(&text).map_err(|e| {
            Error::Forward(format!(
                "unexpected response ({}): {}: {}",
                status, e, text
            ))
        })
    }

    /// Post with retry logic
    ///
    /// Retries transient failures (5xx, timeouts, connect errors) with exponential backoff.
    pub async fn push_with_retry(&self, event: &MessageEvent) -> Result<IngestResponse> {
        let mut last_error = None;
        let mut delay = Duration::from_millis(500);

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::debug!(
                    "Retrying push (attempt {}/{}), waiting {:?}",
                    attempt + 1,
                    self.config.max_retries + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, Duration::from_secs(30));
            }

            match self.push(event).await {
                Ok(response) => return Ok(response),
                Err(e) if is_retryable_error(&e) => {
                    tracing::warn!("Transient error pushing message: {}", e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Forward("max retries exceeded".to_string())))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Check if an error is retryable (transient)
fn is_retryable_error(error: &Error) -> bool {
    match error {
        Error::Forward(msg) => {
            msg.contains("HTTP request failed") || msg.starts_with("server error")
        }
        _ => false,
    }
}

/// Synchronous wrapper for [`ForwardClient`]
///
/// Provides blocking methods for use in synchronous code.
pub struct SyncForwarder {
    inner: ForwardClient,
    runtime: tokio::runtime::Runtime,
}

impl SyncForwarder {
    /// Create a new forwarder from configuration
    pub fn new(config: &ForwardConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Forward(format!("failed to create runtime: {}", e)))?;

        Ok(Self {
            inner: ForwardClient::new(config.clone())?,
            runtime,
        })
    }

    /// Push one event, retrying transient failures (blocking)
    pub fn push(&self, event: &MessageEvent) -> Result<IngestResponse> {
        self.runtime.block_on(self.inner.push_with_retry(event))
    }

    pub fn url(&self) -> &str {
        self.inner.url()
    }
}
