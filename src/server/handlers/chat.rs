use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::agent::{run_turn, GENERIC_FAILURE};
use crate::memory::Role;
use crate::server::page::CHAT_PAGE;
use crate::state::AppState;
use crate::tools::ToolContext;

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    pub user_input: String,
    /// Sent by the chat page so each browser tab gets its own memory. A
    /// missing or blank id gets a fresh single-use session.
    #[serde(default)]
    pub session_id: Option<String>,
}

pub async fn chat_page() -> impl IntoResponse {
    Html(CHAT_PAGE)
}

/// One synchronous conversational exchange. Orchestration faults are replaced
/// with a generic failure line; the turn is recorded either way and the next
/// request is unaffected.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequestBody>,
) -> impl IntoResponse {
    let session_id = payload
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let ctx = ToolContext {
        es: state.es.clone(),
        index: state.settings.elastic.index.clone(),
        sessions: state.sessions.clone(),
        session_id: session_id.clone(),
    };

    let response = match run_turn(state.llm.as_ref(), &state.tools, &ctx, &payload.user_input).await
    {
        Ok(answer) => answer,
        Err(err) => {
            tracing::error!("agent turn failed: {}", err);
            GENERIC_FAILURE.to_string()
        }
    };

    state
        .sessions
        .append(&session_id, Role::User, &payload.user_input);
    state
        .sessions
        .append(&session_id, Role::Assistant, &response);

    Json(json!({ "response": response, "session_id": session_id }))
}
