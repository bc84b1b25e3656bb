//! Narrative synthesis from merged zone data.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::SynthesisError;
use crate::llm::{CompletionRequest, TextModel};
use crate::query::{FetchedData, IntentAnalysis, Zone};

const SYSTEM_PROMPT: &str = "You are an AI-search visibility analyst. You \
answer questions about how a product performs in LLM answer engines, \
using only the data supplied in the prompt.";

/// Per-call synthesis input. Not persisted.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisRequest<'a> {
    pub request_text: &'a str,
    pub product_name: &'a str,
    pub product_id: &'a str,
    /// Zone data that was actually fetched; non-empty by contract.
    pub fetched: &'a [FetchedData],
    pub intent: &'a IntentAnalysis,
}

/// Produces the user-facing narrative via the delegated generation
/// service and appends the fixed metadata footer.
pub struct Synthesizer {
    model: Arc<dyn TextModel>,
    max_tokens: u32,
}

impl Synthesizer {
    pub fn new(model: Arc<dyn TextModel>, max_tokens: u32) -> Self {
        Self { model, max_tokens }
    }

    /// Synthesize the answer. Fails only if the generation service
    /// errors; the footer is appended locally with no other
    /// post-processing.
    pub async fn synthesize(&self, request: SynthesisRequest<'_>) -> Result<String, SynthesisError> {
        let completion = CompletionRequest::new(build_prompt(&request))
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(self.max_tokens);

        let narrative = self.model.complete(completion).await?;

        Ok(format!(
            "{}\n\n{}",
            narrative.trim_end(),
            metadata_footer(request.fetched)
        ))
    }
}

fn build_prompt(request: &SynthesisRequest<'_>) -> String {
    let mut prompt = format!(
        "Answer a request about the product \"{}\" (id: {}).\n\n\
         Request: {}\n\n\
         Focus: {}\n\
         Routing rationale: {}\n\n\
         Ground every claim in the data sections below. Do not invent \
         numbers, queries, or recommendations the data does not support.\n",
        request.product_name,
        request.product_id,
        request.request_text,
        request.intent.primary_focus,
        request.intent.reasoning,
    );

    for fetched in request.fetched {
        prompt.push_str(&format!(
            "\n## {} data ({} records)\n{}\n",
            fetched.zone.display_name(),
            fetched.metadata.record_count,
            serde_json::to_string_pretty(&fetched.data).unwrap(),
        ));
    }

    if let Some(artifact) = architect_artifact_name(request.fetched) {
        prompt.push_str(&format!(
            "\nOptimization material is included. When you present it, \
             instruct the reader to save the blueprint to a file named \
             `{artifact}` so it can be applied later.\n",
        ));
    }

    prompt.push_str("\nClose with two or three concrete next steps.\n");
    prompt
}

/// Deterministic artifact name for architect output, derived from the
/// architect envelope's latest data date.
fn architect_artifact_name(fetched: &[FetchedData]) -> Option<String> {
    let architect = fetched.iter().find(|f| f.zone == Zone::Architect)?;
    let date = architect.metadata.latest_date.unwrap_or_else(Utc::now);
    Some(format!("optimization-blueprint-{}.md", date.format("%Y-%m-%d")))
}

/// Fixed-format footer: per-zone record counts, latest analysis date,
/// effective query filter if any.
fn metadata_footer(fetched: &[FetchedData]) -> String {
    let sources: Vec<String> = fetched
        .iter()
        .map(|f| format!("{} ({} records)", f.zone.display_name(), f.metadata.record_count))
        .collect();

    let mut footer = format!("---\nData sources: {}", sources.join(", "));

    let latest: Option<DateTime<Utc>> = fetched.iter().filter_map(|f| f.metadata.latest_date).max();
    if let Some(latest) = latest {
        footer.push_str(&format!("\nLatest analysis: {}", latest.to_rfc3339()));
    }

    let filter = fetched.iter().find_map(|f| f.metadata.query_filter.as_deref());
    if let Some(filter) = filter {
        footer.push_str(&format!("\nQuery filter: \"{filter}\""));
    }

    footer
}
