use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage_backend: &'static str,
    pub queue_headroom: usize,
    pub in_flight_tasks: usize,
}

/// Liveness plus a glance at the pipeline. A closed worker queue means the
/// pool is gone, so the node reports itself degraded.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let orchestrator = &state.orchestrator;
    let (status, label) = if orchestrator.accepting_jobs() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (
        status,
        Json(HealthResponse {
            status: label,
            version: env!("CARGO_PKG_VERSION"),
            storage_backend: orchestrator.storage_backend(),
            queue_headroom: orchestrator.queue_headroom(),
            in_flight_tasks: orchestrator.cancellations().len(),
        }),
    )
}
