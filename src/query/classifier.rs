//! Intent classifier.
//!
//! Maps a free-form request to a non-empty set of zones plus an
//! optional keyword filter, via the delegated structured-output model.

use std::sync::Arc;

use tracing::info;

use crate::error::ClassificationError;
use crate::llm::{CompletionRequest, TextModel};

use super::types::{IntentAnalysis, Zone};

const SYSTEM_PROMPT: &str = "You are a routing classifier for a product \
context service. You decide which data zones are needed to answer a \
user's request about their product's AI-search visibility. Respond only \
with the requested JSON.";

/// Classifies natural-language requests into zone routing decisions.
pub struct IntentClassifier {
    model: Arc<dyn TextModel>,
}

impl IntentClassifier {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    /// Classify a request.
    ///
    /// Fails when the delegated service errors, the payload fails
    /// validation, or the zone set comes back empty. No retry.
    pub async fn classify(&self, text: &str) -> Result<IntentAnalysis, ClassificationError> {
        let request = CompletionRequest::new(build_prompt(text))
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(512);

        let payload = self
            .model
            .complete_structured(request, intent_schema())
            .await?;

        let mut analysis: IntentAnalysis = serde_json::from_value(payload)
            .map_err(|e| ClassificationError::Invalid(e.to_string()))?;

        if analysis.zones.is_empty() {
            return Err(ClassificationError::EmptyZones);
        }
        if analysis.reasoning.trim().is_empty() {
            return Err(ClassificationError::Invalid(
                "reasoning must be a non-empty string".to_string(),
            ));
        }
        if analysis.primary_focus.trim().is_empty() {
            return Err(ClassificationError::Invalid(
                "primary_focus must be a non-empty string".to_string(),
            ));
        }
        // Models occasionally emit "" instead of omitting the filter.
        if analysis
            .query_filter
            .as_deref()
            .is_some_and(|f| f.trim().is_empty())
        {
            analysis.query_filter = None;
        }

        info!(
            zones = ?analysis.zones,
            query_filter = ?analysis.query_filter,
            reasoning = %analysis.reasoning,
            "classified intent"
        );

        Ok(analysis)
    }
}

fn build_prompt(text: &str) -> String {
    let mut prompt = String::from(
        "Decide which zones are relevant to the request below. Available zones:\n",
    );
    for zone in Zone::ALL {
        prompt.push_str(&format!("- {}: {}\n", zone.display_name(), zone.semantics()));
    }
    prompt.push_str(
        "\nSelect every zone whose data the answer needs; at least one is \
         always required. If the request singles out a specific tracked \
         query (often quoted), extract it as query_filter; otherwise omit \
         it.\n\nRequest: ",
    );
    prompt.push_str(text);
    prompt
}

/// JSON schema the structured-output service must satisfy.
fn intent_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "zones": {
                "type": "array",
                "items": {
                    "type": "string",
                    "enum": ["strategist", "detective", "architect"]
                }
            },
            "query_filter": {
                "type": ["string", "null"]
            },
            "reasoning": { "type": "string" },
            "primary_focus": { "type": "string" }
        },
        "required": ["zones", "reasoning", "primary_focus"],
        "additionalProperties": false
    })
}
