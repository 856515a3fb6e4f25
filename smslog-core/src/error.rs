//! Error types for smslog-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the smslog-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Ingestion request is missing a required field or carries a bad value
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Filesystem failure on the record log, fingerprint index or lock file
    #[error("storage failure on {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error outside the message store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Logging setup error
    #[error("logging error: {0}")]
    Logging(String),

    /// Forwarding client error
    #[error("forward error: {0}")]
    Forward(String),
}

impl Error {
    /// Wrap an IO error with the store path it happened on.
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Storage {
            path: path.into(),
            source,
        }
    }

    /// True for client-side validation errors.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

/// Result type alias for smslog-core
pub type Result<T> = std::result::Result<T, Error>;
