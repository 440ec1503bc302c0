use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, health};
use crate::state::AppState;

/// Application router: the embedded chat page, the synchronous chat
/// endpoint, and a constant-time liveness probe.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(chat::chat_page))
        .route("/chat", post(chat::chat))
        .route("/healthz", get(health::healthz))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
