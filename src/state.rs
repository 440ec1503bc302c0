use std::sync::Arc;

use crate::config::Settings;
use crate::es::EsClient;
use crate::llm::{ChatProvider, OpenAiClient};
use crate::memory::SessionStore;
use crate::tools::ToolRegistry;

/// Application state shared by both front doors: settings, the two outbound
/// clients, the tool table, and the per-session memories.
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub es: EsClient,
    pub llm: Arc<dyn ChatProvider>,
    pub tools: ToolRegistry,
    pub sessions: SessionStore,
}

impl AppState {
    pub async fn initialize(settings: Settings) -> anyhow::Result<Arc<Self>> {
        let es = EsClient::new(&settings.elastic)?;

        // Startup connectivity report, like the original deployment script.
        // A dead cluster is logged, not fatal: every tool fails soft.
        match es.ping().await {
            Ok(ok) => tracing::info!("Elasticsearch connected: {}", ok),
            Err(err) => tracing::warn!("Elasticsearch unreachable at startup: {}", err),
        }

        let llm: Arc<dyn ChatProvider> = Arc::new(OpenAiClient::new(&settings.llm));

        Ok(Arc::new(AppState {
            settings,
            es,
            llm,
            tools: ToolRegistry::new(),
            sessions: SessionStore::new(),
        }))
    }
}
