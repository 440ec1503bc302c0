use serde_json::{json, Value};

use crate::core::errors::{ApiError, ToolFault};
use crate::llm::{AssistantTurn, ChatMessage, ChatProvider};
use crate::memory::Role;
use crate::tools::{fault_text, ToolContext, ToolRegistry};

use super::instructions::build_system_prompt;

/// Upper bound on model round trips per user turn; mirrors the recursion
/// limit a graph-based orchestrator would enforce.
const MAX_STEPS: usize = 6;

pub const GENERIC_FAILURE: &str = "An error occurred while processing your request.";

/// Runs one conversational turn: prior session turns plus the new user input
/// go to the model, requested tool calls are dispatched and their results fed
/// back, until the model produces a final answer or the step limit trips.
///
/// The caller appends the user input and the returned answer to memory after
/// this resolves, so tools observing the session see only completed turns.
pub async fn run_turn(
    provider: &dyn ChatProvider,
    registry: &ToolRegistry,
    ctx: &ToolContext,
    user_input: &str,
) -> Result<String, ApiError> {
    let tools = registry.descriptors();

    let mut messages = vec![ChatMessage::system(build_system_prompt(
        &registry.tool_names(),
    ))];
    for (role, text) in ctx.sessions.context(&ctx.session_id) {
        messages.push(match role {
            Role::User => ChatMessage::user(text),
            Role::Assistant => ChatMessage::assistant(text),
        });
    }
    messages.push(ChatMessage::user(user_input));

    for step in 0..MAX_STEPS {
        let turn = provider.chat(&messages, &tools).await?;

        match turn {
            AssistantTurn::Final(text) => {
                tracing::debug!(steps = step + 1, "agent turn complete");
                return Ok(text);
            }
            AssistantTurn::ToolCalls(calls) => {
                messages.push(ChatMessage::assistant_tool_calls(calls.clone()));

                for call in calls {
                    let name = call.function.name.clone();
                    let output = match parse_arguments(&name, &call.function.arguments) {
                        Ok(args) => match registry.dispatch(ctx, &name, &args).await {
                            Ok(text) => text,
                            Err(fault) => {
                                tracing::warn!(tool = %name, %fault, "tool call failed");
                                fault_text(&name, &fault)
                            }
                        },
                        Err(fault) => {
                            tracing::warn!(tool = %name, %fault, "malformed tool arguments");
                            fault_text(&name, &fault)
                        }
                    };
                    tracing::info!(tool = %name, "tool call dispatched");
                    messages.push(ChatMessage::tool_result(call.id, output));
                }
            }
        }
    }

    Err(ApiError::Internal(format!(
        "agent exceeded {} tool-call steps without a final answer",
        MAX_STEPS
    )))
}

/// The wire format carries tool arguments as a JSON string; an empty string
/// means "no arguments".
fn parse_arguments(tool: &str, raw: &str) -> Result<Value, ToolFault> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(raw).map_err(|e| ToolFault::Validation {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::config::ElasticSettings;
    use crate::es::EsClient;
    use crate::llm::types::{FunctionCall, ToolCall};
    use crate::memory::SessionStore;
    use crate::tools::ToolRegistry;

    /// Plays back a fixed script of assistant turns and records what it was
    /// sent.
    struct ScriptedProvider {
        script: Mutex<Vec<AssistantTurn>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<AssistantTurn>) -> Self {
            Self {
                script: Mutex::new(script),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn chat(
            &self,
            messages: &[ChatMessage],
            _tools: &[Value],
        ) -> Result<AssistantTurn, ApiError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return Err(ApiError::Upstream("script exhausted".to_string()));
            }
            Ok(script.remove(0))
        }
    }

    fn test_context() -> ToolContext {
        let settings = ElasticSettings {
            host: "localhost".to_string(),
            port: 9200,
            username: "elastic".to_string(),
            password: "changeme".to_string(),
            index: "shipments".to_string(),
            verify_certs: false,
        };
        ToolContext {
            es: EsClient::new(&settings).expect("client"),
            index: settings.index.clone(),
            sessions: SessionStore::new(),
            session_id: "s1".to_string(),
        }
    }

    fn tool_call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn direct_answer_needs_one_round_trip() {
        let provider = ScriptedProvider::new(vec![AssistantTurn::Final("Hello!".to_string())]);
        let registry = ToolRegistry::new();
        let ctx = test_context();

        let answer = run_turn(&provider, &registry, &ctx, "hi").await.unwrap();
        assert_eq!(answer, "Hello!");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][0].role, "system");
        assert_eq!(seen[0].last().unwrap().content.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn tool_results_are_fed_back() {
        let ctx = test_context();
        ctx.sessions.append(&ctx.session_id, Role::User, "remember me");
        ctx.sessions
            .append(&ctx.session_id, Role::Assistant, "noted");

        let provider = ScriptedProvider::new(vec![
            AssistantTurn::ToolCalls(vec![tool_call("last_user_message", "")]),
            AssistantTurn::Final("You said: remember me".to_string()),
        ]);
        let registry = ToolRegistry::new();

        let answer = run_turn(&provider, &registry, &ctx, "what did I say?")
            .await
            .unwrap();
        assert_eq!(answer, "You said: remember me");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let second = &seen[1];
        let tool_msg = second.iter().find(|m| m.role == "tool").unwrap();
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool_msg.content.as_deref(), Some("remember me"));
        // Prior session turns made it into the context.
        assert!(second
            .iter()
            .any(|m| m.role == "user" && m.content.as_deref() == Some("remember me")));
    }

    #[tokio::test]
    async fn failed_tool_degrades_to_text() {
        let provider = ScriptedProvider::new(vec![
            AssistantTurn::ToolCalls(vec![tool_call("RAG_Search", "{}")]),
            AssistantTurn::Final("sorry".to_string()),
        ]);
        let registry = ToolRegistry::new();
        let ctx = test_context();

        let answer = run_turn(&provider, &registry, &ctx, "find widgets")
            .await
            .unwrap();
        assert_eq!(answer, "sorry");

        let seen = provider.seen.lock().unwrap();
        let tool_msg = seen[1].iter().find(|m| m.role == "tool").unwrap();
        let text = tool_msg.content.as_deref().unwrap();
        assert!(text.contains("invalid arguments"), "got: {}", text);
    }

    #[tokio::test]
    async fn step_limit_is_an_error() {
        let loops: Vec<AssistantTurn> = (0..10)
            .map(|_| AssistantTurn::ToolCalls(vec![tool_call("last_user_message", "")]))
            .collect();
        let provider = ScriptedProvider::new(loops);
        let registry = ToolRegistry::new();
        let ctx = test_context();

        let result = run_turn(&provider, &registry, &ctx, "loop forever").await;
        assert!(result.is_err());
    }
}
