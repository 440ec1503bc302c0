use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::errors::{SearchFault, ToolFault};
use crate::es::render::{format_keyword_hits, format_semantic_hits};
use crate::es::{EsClient, SearchRequest};
use crate::memory::{Role, SessionStore};

pub const NO_PREVIOUS_USER_MESSAGE: &str = "No previous user message found.";

/// Everything a tool handler may touch during one dispatch. Built per turn
/// by the agent loop; tools never reach global state.
pub struct ToolContext {
    pub es: EsClient,
    pub index: String,
    pub sessions: SessionStore,
    pub session_id: String,
}

/// The closed set of tools exposed to the model. Adding a tool means adding
/// a variant here and wiring it into `ALL`; there is no runtime registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentTool {
    EsStatus,
    EsDocCount,
    RagSearch,
    SemanticSearch,
    LastUserMessage,
    GetUserMessage,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RagSearchArgs {
    /// Free-text query over the shipment records.
    pub query: String,
    /// Optional date filter: a year ("2020") or a range
    /// ("2020-01-01 to 2020-12-31").
    #[serde(default)]
    pub dates: Option<String>,
    /// Number of results to return (capped server-side).
    #[serde(default)]
    pub size: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SemanticSearchArgs {
    /// Free-text query; matched by meaning, not keywords.
    pub query: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetUserMessageArgs {
    /// 1 for the user's last message, 2 for the one before, and so on.
    #[serde(default = "default_n")]
    pub n: i64,
}

fn default_n() -> i64 {
    1
}

impl AgentTool {
    pub const ALL: [AgentTool; 6] = [
        AgentTool::EsStatus,
        AgentTool::EsDocCount,
        AgentTool::RagSearch,
        AgentTool::SemanticSearch,
        AgentTool::LastUserMessage,
        AgentTool::GetUserMessage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AgentTool::EsStatus => "es_status",
            AgentTool::EsDocCount => "es_doc_count",
            AgentTool::RagSearch => "RAG_Search",
            AgentTool::SemanticSearch => "Semantic_Search",
            AgentTool::LastUserMessage => "last_user_message",
            AgentTool::GetUserMessage => "get_user_message",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AgentTool::EsStatus => "Check if Elasticsearch is connected.",
            AgentTool::EsDocCount => "Get the number of documents in the shipment index.",
            AgentTool::RagSearch => {
                "Search the trade-shipment knowledge base by keyword. \
                 Input: query (string), dates (optional string), size (optional integer)."
            }
            AgentTool::SemanticSearch => {
                "Search the knowledge base by meaning using vector similarity. \
                 Input: query (string)."
            }
            AgentTool::LastUserMessage => "Returns the user's last message.",
            AgentTool::GetUserMessage => {
                "Returns a previous message from the user. \
                 Input: n (integer) = 1 for the last message, 2 for the one before, etc."
            }
        }
    }

    fn parameters(self) -> Value {
        match self {
            AgentTool::EsStatus | AgentTool::EsDocCount | AgentTool::LastUserMessage => {
                json!({ "type": "object", "properties": {} })
            }
            AgentTool::RagSearch => schema_value::<RagSearchArgs>(),
            AgentTool::SemanticSearch => schema_value::<SemanticSearchArgs>(),
            AgentTool::GetUserMessage => schema_value::<GetUserMessageArgs>(),
        }
    }

    /// Function descriptor in the OpenAI tools format.
    pub fn descriptor(self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name(),
                "description": self.description(),
                "parameters": self.parameters(),
            }
        })
    }

    pub async fn invoke(self, ctx: &ToolContext, args: &Value) -> Result<String, ToolFault> {
        match self {
            AgentTool::EsStatus => self.es_status(ctx).await,
            AgentTool::EsDocCount => self.es_doc_count(ctx).await,
            AgentTool::RagSearch => self.rag_search(ctx, args).await,
            AgentTool::SemanticSearch => self.semantic_search(ctx, args).await,
            AgentTool::LastUserMessage => Ok(self.user_message(ctx, 1)),
            AgentTool::GetUserMessage => {
                let parsed: GetUserMessageArgs = self.parse_args(args)?;
                Ok(self.user_message(ctx, parsed.n))
            }
        }
    }

    async fn es_status(self, ctx: &ToolContext) -> Result<String, ToolFault> {
        match ctx.es.ping().await? {
            true => Ok("Elasticsearch is connected.".to_string()),
            false => Ok(
                "Error pinging Elasticsearch: cluster responded with a non-success status."
                    .to_string(),
            ),
        }
    }

    async fn es_doc_count(self, ctx: &ToolContext) -> Result<String, ToolFault> {
        let count = ctx.es.count(&ctx.index).await?;
        Ok(format!(
            "The index '{}' contains {} documents.",
            ctx.index, count
        ))
    }

    async fn rag_search(self, ctx: &ToolContext, args: &Value) -> Result<String, ToolFault> {
        let parsed: RagSearchArgs = self.parse_args(args)?;
        let request = SearchRequest::keyword(&parsed.query, parsed.dates.as_deref(), parsed.size);
        let hits = ctx.es.search(&ctx.index, &request).await?;
        Ok(format_keyword_hits(&hits, request.size()).text)
    }

    async fn semantic_search(self, ctx: &ToolContext, args: &Value) -> Result<String, ToolFault> {
        let parsed: SemanticSearchArgs = self.parse_args(args)?;
        let request = SearchRequest::semantic(&parsed.query);
        let hits = ctx.es.search(&ctx.index, &request).await?;
        Ok(format_semantic_hits(&hits).text)
    }

    fn user_message(self, ctx: &ToolContext, n: i64) -> String {
        match ctx
            .sessions
            .nth_most_recent(&ctx.session_id, Role::User, n)
        {
            Some(text) => text,
            None if n == 1 => NO_PREVIOUS_USER_MESSAGE.to_string(),
            None => format!("No user message found {} messages ago.", n),
        }
    }

    fn parse_args<T: serde::de::DeserializeOwned>(self, args: &Value) -> Result<T, ToolFault> {
        serde_json::from_value(args.clone()).map_err(|e| ToolFault::Validation {
            tool: self.name().to_string(),
            message: e.to_string(),
        })
    }
}

fn schema_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| json!({ "type": "object" }))
}

/// Explicit tool table, built once at startup.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<AgentTool>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        ToolRegistry {
            tools: AgentTool::ALL.to_vec(),
        }
    }

    /// Function descriptors handed to the model on every request.
    pub fn descriptors(&self) -> Vec<Value> {
        self.tools.iter().map(|tool| tool.descriptor()).collect()
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    /// Resolves `name` and invokes the tool. Faults are typed; rendering
    /// them into conversational prose is the caller's job (see
    /// [`fault_text`]).
    pub async fn dispatch(
        &self,
        ctx: &ToolContext,
        name: &str,
        args: &Value,
    ) -> Result<String, ToolFault> {
        let tool = self
            .tools
            .iter()
            .copied()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| ToolFault::UnknownTool(name.to_string()))?;
        tool.invoke(ctx, args).await
    }
}

/// User/model-facing text for a failed tool call. Wording follows the tool
/// so the model can relay something sensible; one failed call degrades to a
/// sentence, never an aborted turn.
pub fn fault_text(tool_name: &str, fault: &ToolFault) -> String {
    match fault {
        ToolFault::Validation { .. } | ToolFault::UnknownTool(_) => fault.to_string(),
        ToolFault::Search(search_fault) => match tool_name {
            "es_status" => format!("Error pinging Elasticsearch: {}", search_fault),
            "es_doc_count" => match search_fault {
                SearchFault::IndexNotFound(index) => {
                    format!("Error fetching document count: index '{}' does not exist.", index)
                }
                other => format!("Error fetching document count: {}", other),
            },
            _ => format!("Search error: {}", search_fault),
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::ElasticSettings;
    use crate::memory::Role;

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
            session_id: "test-session".to_string(),
        }
    }

    #[test]
    fn registry_exposes_all_six_tools() {
        let registry = ToolRegistry::new();
        let names = registry.tool_names();
        assert_eq!(
            names,
            vec![
                "es_status",
                "es_doc_count",
                "RAG_Search",
                "Semantic_Search",
                "last_user_message",
                "get_user_message",
            ]
        );

        for descriptor in registry.descriptors() {
            assert_eq!(descriptor["type"], "function");
            assert!(descriptor["function"]["name"].is_string());
            assert!(descriptor["function"]["parameters"].is_object());
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_a_typed_fault() {
        let registry = ToolRegistry::new();
        let ctx = test_context();
        let result = registry.dispatch(&ctx, "open_pod_bay_doors", &json!({})).await;
        assert!(matches!(result, Err(ToolFault::UnknownTool(_))));
    }

    #[tokio::test]
    async fn missing_query_is_a_validation_fault() {
        let registry = ToolRegistry::new();
        let ctx = test_context();
        let result = registry.dispatch(&ctx, "RAG_Search", &json!({})).await;
        assert!(matches!(result, Err(ToolFault::Validation { .. })));

        let result = registry
            .dispatch(&ctx, "RAG_Search", &json!({ "query": 7 }))
            .await;
        assert!(matches!(result, Err(ToolFault::Validation { .. })));
    }

    #[tokio::test]
    async fn get_user_message_counts_backward() {
        let registry = ToolRegistry::new();
        let ctx = test_context();
        // Two prior turns; the third user utterance is still in flight and
        // has not been appended yet.
        ctx.sessions.append(&ctx.session_id, Role::User, "hi");
        ctx.sessions.append(&ctx.session_id, Role::Assistant, "hello!");
        ctx.sessions.append(&ctx.session_id, Role::User, "hello");
        ctx.sessions.append(&ctx.session_id, Role::Assistant, "hi again");

        let out = registry
            .dispatch(&ctx, "get_user_message", &json!({ "n": 2 }))
            .await
            .unwrap();
        assert_eq!(out, "hi");

        let out = registry
            .dispatch(&ctx, "get_user_message", &json!({}))
            .await
            .unwrap();
        assert_eq!(out, "hello");

        let out = registry
            .dispatch(&ctx, "get_user_message", &json!({ "n": 9 }))
            .await
            .unwrap();
        assert_eq!(out, "No user message found 9 messages ago.");
    }

    #[tokio::test]
    async fn last_user_message_sentinel_when_empty() {
        let registry = ToolRegistry::new();
        let ctx = test_context();
        let out = registry
            .dispatch(&ctx, "last_user_message", &json!({}))
            .await
            .unwrap();
        assert_eq!(out, NO_PREVIOUS_USER_MESSAGE);
    }

    #[test]
    fn ping_fault_text_has_the_expected_prefix() {
        let fault = ToolFault::Search(SearchFault::Connectivity(
            "connection refused".to_string(),
        ));
        let text = fault_text("es_status", &fault);
        assert!(text.starts_with("Error pinging"));

        let text = fault_text("es_doc_count", &fault);
        assert!(text.starts_with("Error fetching document count"));

        let fault = ToolFault::Search(SearchFault::IndexNotFound("shipments".to_string()));
        let text = fault_text("es_doc_count", &fault);
        assert!(text.contains("does not exist"));
    }
}
