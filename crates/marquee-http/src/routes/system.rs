//! System and health endpoints.

use axum::extract::{Json, State};
use axum::response::IntoResponse;

use crate::state::AppState;
use crate::types::HealthResponse;

/// Check server health.
///
/// Returns server status, version info and catalog size.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse),
    ),
    tag = "System"
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        api_version: state.api_version().to_string(),
        movies: state.store().len(),
        uptime_seconds: state.uptime_secs(),
    })
}
