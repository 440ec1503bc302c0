use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Liveness only. Deliberately touches neither the search backend nor the
/// model API, so it stays constant-time under upstream outages.
pub async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
