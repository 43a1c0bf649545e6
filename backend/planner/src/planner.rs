use std::sync::Arc;

use tracing::{info, instrument, warn};

use ambassador_core::{LlmProvider, LlmRequest};

/// Reply used whenever the model cannot be reached.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble connecting to my brain right now. Please try again in a moment.";

/// Per-request model parameters.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: crate::providers::gemini::DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

/// Wraps the configured provider. Never fails: errors and a missing
/// provider both turn into [`FALLBACK_REPLY`].
pub struct ModelPlanner {
    provider: Option<Arc<dyn LlmProvider>>,
    settings: ModelSettings,
}

impl ModelPlanner {
    pub fn new(provider: Option<Arc<dyn LlmProvider>>, settings: ModelSettings) -> Self {
        Self { provider, settings }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    #[instrument(skip_all, fields(model = %self.settings.model))]
    pub async fn respond(&self, system_prompt: &str, user_prompt: &str) -> String {
        let Some(provider) = &self.provider else {
            warn!("No language model configured, returning fallback");
            return FALLBACK_REPLY.to_string();
        };

        let request = LlmRequest {
            model: self.settings.model.clone(),
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        match provider.complete(&request).await {
            Ok(response) => {
                info!(
                    provider = %response.provider,
                    latency_ms = response.latency_ms,
                    "Model responded"
                );
                response.content
            }
            Err(e) => {
                warn!(provider = %provider.name(), error = %e, "Model call failed, returning fallback");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
