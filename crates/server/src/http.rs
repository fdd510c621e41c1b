//! HTTP endpoints

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::transcribe::transcribe;
use vaani_core::SpeechToText;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.config.server.cors_origins,
        state.config.server.cors_enabled,
    );
    let body_limit = DefaultBodyLimit::max(state.config.server.max_upload_bytes);

    Router::new()
        .route("/transcribe", post(transcribe))
        .route("/health", get(health_check))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build the CORS layer from configured origins
///
/// An empty origin list means browser clients may call from anywhere, which
/// matches the service's intended use behind recording front ends.
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        return CorsLayer::new();
    }

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::warn!("All configured CORS origins are invalid, allowing all");
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Health check reporting the loaded model
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let fine_tuned_present = std::path::Path::new(&state.config.models.stt_dir).exists();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "model": state.stt.model_name(),
            "fine_tuned_present": fine_tuned_present,
        })),
    )
}
