use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Fault raised by the Elasticsearch adapter. Connectivity and missing-index
/// conditions are distinguished so tools can word their replies differently.
#[derive(Debug, Error)]
pub enum SearchFault {
    #[error("cannot reach Elasticsearch: {0}")]
    Connectivity(String),
    #[error("index not found: {0}")]
    IndexNotFound(String),
    #[error("backend error: {0}")]
    Backend(String),
}

impl SearchFault {
    pub fn connectivity<E: std::fmt::Display>(err: E) -> Self {
        SearchFault::Connectivity(err.to_string())
    }
}

/// Fault raised by tool dispatch. Never propagated past the agent loop:
/// the caller renders it into prose so a failed tool degrades to an error
/// sentence inside the conversation instead of aborting the turn.
#[derive(Debug, Error)]
pub enum ToolFault {
    #[error("invalid arguments for {tool}: {message}")]
    Validation { tool: String, message: String },
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error(transparent)]
    Search(#[from] SearchFault),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    #[allow(dead_code)]
    BadRequest(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    pub fn upstream<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
