use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, chat, forecast};
use crate::state::AppState;
use std::sync::Arc;

/// Slack on top of the audio ceiling for the other form fields and the
/// multipart framing, so a clip just over the ceiling still reaches the
/// 413-producing validation instead of dying in the body-limit layer.
const BODY_LIMIT_SLACK: usize = 2 * 1024 * 1024;

pub fn create_api_router(max_audio_bytes: usize, allowed_origins: &[String]) -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(api::health_check))
        .route("/api/weather/forecast", get(forecast::forecast_handler))
        .route("/api/rag/chat", post(chat::chat_handler))
        .layer(DefaultBodyLimit::max(max_audio_bytes + BODY_LIMIT_SLACK))
        .layer(build_cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS with an explicit origin allowlist from configuration; methods and
/// headers stay open.
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
