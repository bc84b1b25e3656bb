//! MCP server implementation for Meridian.

use std::sync::Arc;
use std::time::Instant;

use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::*,
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::alerts::AlertNotifier;
use crate::config::Config;
use crate::error::Result as MeridianResult;
use crate::llm::TextModel;
use crate::query::{ContextOrchestrator, IntentClassifier, Zone};
use crate::storage::ContextStore;
use crate::synthesis::{SynthesisRequest, Synthesizer};

/// Instructions advertised to MCP clients.
pub const SERVER_INSTRUCTIONS: &str = "Meridian serves AI-search visibility \
context for tracked products. Call 'get_context' with a product id and a \
natural-language request; the server routes the request to the relevant \
data zones (strategist, detective, architect) and answers grounded in \
their records.";

/// Parameters for the get_context tool.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetContextParams {
    /// Product to answer about
    pub product_id: String,
    /// Natural-language request
    pub intent: String,
    /// Keyword filter overriding whatever the classifier extracts
    #[serde(default)]
    pub query_filter: Option<String>,
}

/// Meridian MCP server state.
struct MeridianState {
    config: Config,
    store: Arc<dyn ContextStore>,
    classifier: IntentClassifier,
    orchestrator: ContextOrchestrator,
    synthesizer: Synthesizer,
    alerts: Option<AlertNotifier>,
    start_time: Instant,
}

/// Meridian MCP server handler.
#[derive(Clone)]
pub struct MeridianServer {
    state: Arc<MeridianState>,
    tool_router: ToolRouter<Self>,
}

impl MeridianServer {
    /// Create a new server with its collaborators injected.
    pub fn new(config: Config, store: Arc<dyn ContextStore>, model: Arc<dyn TextModel>) -> Self {
        let classifier = IntentClassifier::new(model.clone());
        let orchestrator = ContextOrchestrator::new(store.clone());
        let synthesizer = Synthesizer::new(model, config.llm.max_tokens);
        let alerts = AlertNotifier::from_config(&config.alerts);

        Self {
            state: Arc::new(MeridianState {
                config,
                store,
                classifier,
                orchestrator,
                synthesizer,
                alerts,
                start_time: Instant::now(),
            }),
            tool_router: Self::tool_router(),
        }
    }

    /// Seconds since the server started.
    pub fn uptime_secs(&self) -> u64 {
        self.state.start_time.elapsed().as_secs()
    }

    /// Run the full context pipeline, rendering every outcome as text.
    ///
    /// All failure modes honor the response contract: client errors and
    /// not-found outcomes get their own messages, and anything
    /// unhandled becomes a generic system-error text rather than a
    /// protocol fault.
    pub async fn get_context_text(&self, params: &GetContextParams) -> String {
        match self.try_get_context(params).await {
            Ok(text) => text,
            Err(e) => {
                error!(product_id = %params.product_id, error = %e, "get_context failed");
                if let Some(alerts) = &self.state.alerts {
                    alerts.notify_error(
                        e.to_string(),
                        format!("get_context product_id={}", params.product_id),
                    );
                }
                format!("A system error occurred while building context: {e}")
            }
        }
    }

    async fn try_get_context(&self, params: &GetContextParams) -> MeridianResult<String> {
        let state = &self.state;

        // Product lookup happens before any classification or fetch.
        let Some(product) = state.store.get_product(&params.product_id).await? else {
            return Ok(format!("Product not found: {}", params.product_id));
        };

        if let Some(user_id) = &state.config.access.user_id {
            if *user_id != product.user_id {
                return Ok(format!("Access denied for product: {}", params.product_id));
            }
        }

        let intent = state.classifier.classify(&params.intent).await?;

        let fetched = state
            .orchestrator
            .orchestrate(&intent, &product.id, params.query_filter.as_deref())
            .await;

        if fetched.is_empty() {
            let checked: Vec<&str> = {
                let mut seen = std::collections::HashSet::new();
                intent
                    .zones
                    .iter()
                    .filter(|zone| seen.insert(**zone))
                    .map(Zone::display_name)
                    .collect()
            };
            return Ok(format!(
                "No data available for \"{}\" yet. Checked zones: {}. Run an \
                 analysis for this product and ask again.",
                product.name,
                checked.join(", ")
            ));
        }

        let text = state
            .synthesizer
            .synthesize(SynthesisRequest {
                request_text: &params.intent,
                product_name: &product.name,
                product_id: &product.id,
                fetched: &fetched,
                intent: &intent,
            })
            .await?;

        Ok(text)
    }
}

#[tool_router]
impl MeridianServer {
    /// Get synthesized context about a product's AI-search visibility.
    #[tool(
        description = "Get synthesized context about a product's AI-search visibility. Routes the request to the relevant data zones and answers grounded in their records."
    )]
    async fn get_context(
        &self,
        Parameters(params): Parameters<GetContextParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let text = self.get_context_text(&params).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for MeridianServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        }
    }
}
