//! Structured ingestion responses.

use super::IngestOutcome;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// JSON body returned to the posting client.
///
/// ```json
/// {"status": "success"}
/// {"status": "duplicate", "message": "...", "hash": "..."}
/// {"status": "error", "message": "..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IngestResponse {
    Success,
    Duplicate { message: String, hash: String },
    Error { message: String },
}

/// Broad class of a response, for transports that need a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Accepted,
    ClientError,
    ServerError,
}

impl IngestResponse {
    /// Convert a pipeline result at the ingestion boundary.
    ///
    /// Storage failures are logged here and reported with a generic message;
    /// validation messages are passed through to the client.
    pub fn from_result(result: &Result<IngestOutcome>) -> (Self, ResponseKind) {
        match result {
            Ok(IngestOutcome::Appended { .. }) => (IngestResponse::Success, ResponseKind::Accepted),
            Ok(IngestOutcome::Duplicate { fingerprint }) => (
                IngestResponse::Duplicate {
                    message: "Message already stored".to_string(),
                    hash: fingerprint.to_string(),
                },
                ResponseKind::Accepted,
            ),
            Err(Error::InvalidInput(message)) => (
                IngestResponse::Error {
                    message: format!("Invalid data: {}", message),
                },
                ResponseKind::ClientError,
            ),
            Err(e) => {
                tracing::error!(error = %e, "Ingestion failed");
                (
                    IngestResponse::Error {
                        message: "Failed to store message".to_string(),
                    },
                    ResponseKind::ServerError,
                )
            }
        }
    }

    /// Response for a request made with the wrong HTTP method.
    pub fn invalid_method() -> Self {
        IngestResponse::Error {
            message: "Invalid request method".to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, IngestResponse::Success)
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, IngestResponse::Duplicate { .. })
    }
}
