//! Language-model trait definitions.

use async_trait::async_trait;

use crate::error::LlmError;

/// A single completion request to the delegated model service.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Optional system instruction.
    pub system: Option<String>,
    /// User prompt.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            temperature: 0.2,
            max_tokens: 2048,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Trait for delegated text-model services.
///
/// Two implementations exist: the live OpenAI-compatible client and a
/// deterministic fixture-replay model, so the orchestration, fetch, and
/// synthesis logic can be tested without a model in the loop.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Generate free text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;

    /// Generate a schema-constrained JSON payload.
    ///
    /// The returned value is parsed JSON; callers validate it against
    /// their own domain invariants.
    async fn complete_structured(
        &self,
        request: CompletionRequest,
        schema: serde_json::Value,
    ) -> Result<serde_json::Value, LlmError>;
}
