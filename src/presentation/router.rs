use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    cancel_transcription_handler, create_transcription_handler, delete_transcription_handler,
    download_transcription_handler, get_transcription_handler, health_handler,
    list_transcriptions_handler, preview_transcription_handler, test_channel_handler,
    transcription_stats_handler, update_channel_status_handler,
};
use crate::presentation::state::AppState;

/// Room for the multipart envelope and the option fields around the file.
const FORM_OVERHEAD_BYTES: u64 = 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let body_limit = state
        .settings
        .limits
        .max_file_size
        .saturating_add(FORM_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    let transcriptions = Router::new()
        .route(
            "/api/v1/transcriptions",
            post(create_transcription_handler).get(list_transcriptions_handler),
        )
        .route(
            "/api/v1/transcriptions/stats",
            get(transcription_stats_handler),
        )
        .route(
            "/api/v1/transcriptions/{id}",
            get(get_transcription_handler).delete(delete_transcription_handler),
        )
        .route(
            "/api/v1/transcriptions/{id}/cancel",
            post(cancel_transcription_handler),
        )
        .route(
            "/api/v1/transcriptions/{id}/download",
            get(download_transcription_handler),
        )
        .route(
            "/api/v1/transcriptions/{id}/preview",
            get(preview_transcription_handler),
        )
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/admin/channels/{id}/test", post(test_channel_handler))
        .route(
            "/api/admin/channels/status",
            post(update_channel_status_handler),
        )
        .merge(transcriptions)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
