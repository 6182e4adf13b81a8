// Completion backend trait — the generative model behind the scorer.

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::openai::client::OpenAiClient;
use crate::openai::types::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat};

/// Default chat model for aggressiveness ratings.
pub const DEFAULT_AGGRESSION_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_TOP_P: f32 = 1.0;

/// One JSON-mode completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub top_p: f32,
}

/// Trait for generative backends that answer a prompt with a JSON object.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Return the raw message content (expected to be a JSON object).
    async fn complete_json(&self, request: &CompletionRequest) -> Result<String>;
}

/// Chat completions on the OpenAI API with `response_format: json_object`.
pub struct OpenAiCompletion {
    client: OpenAiClient,
}

impl OpenAiCompletion {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompletion {
    async fn complete_json(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            top_p: request.top_p,
            response_format: ResponseFormat::json_object(),
        };

        let response: ChatResponse = self
            .client
            .post_json("chat/completions", &body)
            .await
            .context("Chat completion call failed")?;

        completion_content(response)
    }
}

/// Pull the message text out of the first choice.
pub fn completion_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| anyhow::anyhow!("Chat completion returned no content"))
}
