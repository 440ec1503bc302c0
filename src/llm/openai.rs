use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::LlmSettings;
use crate::core::errors::ApiError;

use super::types::{AssistantTurn, ChatMessage, ToolCall};
use super::ChatProvider;

/// OpenAI-compatible chat-completions client speaking the function-calling
/// ("tools") protocol.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl OpenAiClient {
    pub fn new(settings: &LlmSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[Value],
    ) -> Result<AssistantTurn, ApiError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });
        if !tools.is_empty() {
            if let Some(obj) = body.as_object_mut() {
                obj.insert("tools".to_string(), json!(tools));
            }
        }

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!(
                "chat completion failed ({}): {}",
                status, text
            )));
        }

        let payload: Value = res.json().await.map_err(ApiError::upstream)?;
        parse_chat_response(&payload)
    }
}

/// Pulls either the final content or the requested tool calls out of a
/// chat-completion response.
pub fn parse_chat_response(payload: &Value) -> Result<AssistantTurn, ApiError> {
    let message = payload
        .get("choices")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("message"))
        .ok_or_else(|| ApiError::Upstream("chat response had no choices".to_string()))?;

    if let Some(raw_calls) = message.get("tool_calls").and_then(|v| v.as_array()) {
        if !raw_calls.is_empty() {
            let calls: Vec<ToolCall> = raw_calls
                .iter()
                .map(|call| serde_json::from_value(call.clone()))
                .collect::<Result<_, _>>()
                .map_err(ApiError::upstream)?;
            return Ok(AssistantTurn::ToolCalls(calls));
        }
    }

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    Ok(AssistantTurn::Final(content))
}
