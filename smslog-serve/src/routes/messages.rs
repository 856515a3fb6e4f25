//! Ingestion and flat read endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use smslog_core::ingest::{IngestResponse, ResponseKind};
use smslog_core::MessageView;

use crate::error::{status_for, ApiError};
use crate::state::{run_blocking, AppState};

/// `POST /messages`
///
/// Accepts `address, body, timestamp, type` or the legacy `sender, body,
/// timestamp` form. Duplicates answer 200 with `status: duplicate`.
pub async fn ingest(
    State(state): State<AppState>,
    body: String,
) -> (StatusCode, Json<IngestResponse>) {
    let pipeline = state.pipeline.clone();
    let joined = tokio::task::spawn_blocking(move || pipeline.respond_form(&body)).await;

    let (response, kind) = match joined {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!(error = %e, "ingest task failed");
            (
                IngestResponse::Error {
                    message: "Failed to store message".to_string(),
                },
                ResponseKind::ServerError,
            )
        }
    };

    (status_for(kind), Json(response))
}

/// `GET /messages`
///
/// Returns `[{"sender", "timestamp", "message"}]` in log order. Lines in no
/// known format are left out.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<MessageView>>, ApiError> {
    let reader = state.reader.clone();
    let views = run_blocking(move || reader.views()).await?;
    Ok(Json(views))
}
