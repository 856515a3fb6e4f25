//! smslog-serve - HTTP front end for the smslog archive
//!
//! Exposes the core ingestion pipeline and log reader over HTTP. Handlers
//! hold no logic of their own: every request is a thin call into
//! [`smslog_core`], run on the blocking pool because the store does file I/O.
//!
//! # Architecture
//!
//! - **AppState**: shared pipeline and reader over one injected store
//! - **Routes**: endpoint handlers grouped by resource
//! - **ApiError**: maps core errors onto status codes and the `{"status":"error"}` body

mod error;
mod routes;
mod state;

pub use self::error::{status_for, ApiError};
pub use self::routes::router;
pub use self::state::AppState;
