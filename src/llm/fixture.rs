//! Deterministic fixture-replay text model for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::LlmError;

use super::{CompletionRequest, TextModel};

/// Replays scripted responses in FIFO order.
///
/// Structured and free-text responses are queued separately; an empty
/// queue yields [`LlmError::FixtureExhausted`], which tests use to
/// exercise the delegate-failure paths. Every prompt the model sees is
/// recorded for assertions on the prompt contract.
#[derive(Default)]
pub struct FixtureModel {
    text: Mutex<VecDeque<String>>,
    structured: Mutex<VecDeque<serde_json::Value>>,
    prompts: Mutex<Vec<String>>,
}

impl FixtureModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a free-text response.
    pub fn push_text(&self, response: impl Into<String>) {
        self.text.lock().unwrap().push_back(response.into());
    }

    /// Queue a structured response.
    pub fn push_structured(&self, response: serde_json::Value) {
        self.structured.lock().unwrap().push_back(response);
    }

    /// All prompts seen so far, in call order.
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextModel for FixtureModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(request.prompt);
        self.text
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(LlmError::FixtureExhausted("text"))
    }

    async fn complete_structured(
        &self,
        request: CompletionRequest,
        _schema: serde_json::Value,
    ) -> Result<serde_json::Value, LlmError> {
        self.prompts.lock().unwrap().push(request.prompt);
        self.structured
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(LlmError::FixtureExhausted("structured"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replay_order() {
        let model = FixtureModel::new();
        model.push_text("first");
        model.push_text("second");

        let a = model.complete(CompletionRequest::new("p1")).await.unwrap();
        let b = model.complete(CompletionRequest::new("p2")).await.unwrap();
        assert_eq!(a, "first");
        assert_eq!(b, "second");
        assert_eq!(model.recorded_prompts(), vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_exhausted_queue_errors() {
        let model = FixtureModel::new();
        let err = model
            .complete_structured(CompletionRequest::new("p"), serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::FixtureExhausted("structured")));
    }
}
