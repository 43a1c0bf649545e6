use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use ambassador_core::{LlmProvider, LlmRequest, LlmResponse};

/// A mock LLM provider that returns canned responses or fails on demand.
///
/// Every request is kept so callers can assert on the prompt that was sent.
pub struct MockProvider {
    name: String,
    fixed_response: Option<String>,
    failing: bool,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixed_response: None,
            failing: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub async fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, req: &LlmRequest) -> Result<LlmResponse> {
        self.requests.lock().await.push(req.clone());
        if self.failing {
            anyhow::bail!("{} is configured to fail", self.name);
        }
        Ok(LlmResponse {
            content: self.fixed_response.clone().unwrap_or_else(|| "Mock response".to_string()),
            provider: self.name.clone(),
            model: req.model.clone(),
            latency_ms: 0,
        })
    }
}
