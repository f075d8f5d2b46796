use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Focus timer
        .route("/focus/start", post(handlers::focus_start))
        .route("/focus/pause", post(handlers::focus_pause))
        .route("/focus/reset", post(handlers::focus_reset))
        .route("/focus/status", get(handlers::focus_status))
        .route("/focus/events", get(handlers::focus_events))
        // Voice recorder
        .route("/voice/record/start", post(handlers::record_start))
        .route("/voice/record/pause", post(handlers::record_pause))
        .route("/voice/record/resume", post(handlers::record_resume))
        .route("/voice/record/stop", post(handlers::record_stop))
        .route(
            "/voice/record/acknowledge",
            post(handlers::record_acknowledge),
        )
        .route("/voice/status", get(handlers::voice_status))
        .route("/voice/events", get(handlers::voice_events))
        .route("/voice/library", get(handlers::voice_library))
        // Ambient soundscape
        .route("/ambient", get(handlers::ambient_status))
        .route("/ambient/sound", post(handlers::ambient_select))
        .route("/ambient/volume", post(handlers::ambient_volume))
        .route("/ambient/toggle", post(handlers::ambient_toggle))
        // Browser front-ends call from another origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
