//! Totals endpoint.

use axum::extract::State;
use axum::Json;
use smslog_core::LogStats;

use crate::error::ApiError;
use crate::state::{run_blocking, AppState};

/// `GET /stats`
pub async fn totals(State(state): State<AppState>) -> Result<Json<LogStats>, ApiError> {
    let reader = state.reader.clone();
    let stats = run_blocking(move || LogStats::collect(reader.read_all()?)).await?;
    Ok(Json(stats))
}
