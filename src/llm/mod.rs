pub mod openai;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::errors::ApiError;
pub use openai::OpenAiClient;
pub use types::{AssistantTurn, ChatMessage, ToolCall};

/// Seam between the agent loop and the model API, so the loop can be driven
/// by a scripted provider in tests.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// One chat-completion round trip. `tools` are function descriptors in
    /// the OpenAI tools format; the reply is either a final answer or a
    /// batch of requested tool calls.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[Value],
    ) -> Result<AssistantTurn, ApiError>;
}
