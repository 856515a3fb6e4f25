//! API error types and response formatting.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use smslog_core::ingest::{IngestResponse, ResponseKind};

/// API error type that converts to appropriate HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Error raised by the core library (storage, validation).
    #[error(transparent)]
    Core(#[from] smslog_core::Error),

    /// A blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// HTTP status for an ingestion response class.
pub fn status_for(kind: ResponseKind) -> StatusCode {
    match kind {
        ResponseKind::Accepted => StatusCode::OK,
        ResponseKind::ClientError => StatusCode::BAD_REQUEST,
        ResponseKind::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Core(smslog_core::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, format!("Invalid data: {}", msg))
            }
            Self::Core(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to read messages".to_string(),
                )
            }
            Self::Task(err) => {
                tracing::error!(error = %err, "blocking task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(IngestResponse::Error { message })).into_response()
    }
}
