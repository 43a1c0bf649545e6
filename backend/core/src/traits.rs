use anyhow::Result;
use async_trait::async_trait;

use crate::types::SentimentScore;

/// Trait for hosted language models.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "gemini", "mock").
    fn name(&self) -> &str;

    /// Send a completion request and return the response text.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse>;
}

/// Request to an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Response from an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub latency_ms: u64,
}

/// Trait for the external text-classification model.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    fn name(&self) -> &str;

    /// Classify non-empty text. Callers handle empty input themselves.
    async fn classify(&self, text: &str) -> Result<SentimentScore>;
}
