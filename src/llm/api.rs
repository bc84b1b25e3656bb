//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::LlmError;

use super::{CompletionRequest, TextModel};

/// OpenAI-compatible text-model client.
///
/// Free-text completions use the synthesis model; structured
/// completions use the (typically lighter) classifier model.
pub struct ApiTextModel {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    classifier_model: String,
}

/// Chat completion request format.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Chat completion response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// API error response format.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl ApiTextModel {
    /// Create a new client from configuration.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                LlmError::Api("API key not provided and OPENAI_API_KEY env var not set".to_string())
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            classifier_model: config.classifier_model().to_string(),
        })
    }

    async fn chat(
        &self,
        model: &str,
        request: &CompletionRequest,
        response_format: Option<serde_json::Value>,
    ) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = ChatRequest {
            model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Api(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(LlmError::Api(format!("HTTP {}: {}", status, message)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(format!("Invalid response body: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::MalformedResponse("Response contained no content".to_string()))
    }
}

#[async_trait]
impl TextModel for ApiTextModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        self.chat(&self.model, &request, None).await
    }

    async fn complete_structured(
        &self,
        request: CompletionRequest,
        schema: serde_json::Value,
    ) -> Result<serde_json::Value, LlmError> {
        let response_format = serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": "structured_response",
                "strict": true,
                "schema": schema,
            }
        });

        let content = self
            .chat(&self.classifier_model, &request, Some(response_format))
            .await?;

        serde_json::from_str(&content)
            .map_err(|e| LlmError::MalformedResponse(format!("Invalid JSON payload: {}", e)))
    }
}
