//! API route definitions.

mod conversations;
mod health;
mod messages;
mod stats;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use smslog_core::IngestResponse;

use crate::state::AppState;

/// Build the complete API router.
///
/// # Route Structure
///
/// - `GET /health` - Health check
/// - `POST /messages` - Ingest one form-encoded message
/// - `GET /messages` - Flat list of stored messages in log order
/// - `GET /conversations` - Messages grouped by address, most recent first
/// - `GET /stats` - Message counts by direction
///
/// Any other method on these paths answers 405 with the error JSON body.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check).fallback(wrong_method))
        .route(
            "/messages",
            get(messages::list)
                .post(messages::ingest)
                .fallback(wrong_method),
        )
        .route(
            "/conversations",
            get(conversations::list).fallback(wrong_method),
        )
        .route("/stats", get(stats::totals).fallback(wrong_method))
        .with_state(state)
}

async fn wrong_method() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(IngestResponse::invalid_method()),
    )
}
