pub mod gemini;
pub mod mock;

use std::sync::Arc;

use tracing::{error, info, warn};

use ambassador_core::LlmProvider;

use self::gemini::GeminiProvider;
use self::mock::MockProvider;

/// Build the configured provider by name.
///
/// Returns `None` when the provider cannot be used (unknown name, missing
/// key); the caller keeps running and answers every model turn with the
/// fallback reply.
pub fn build_provider(name: &str, api_key: &str, base_url: Option<&str>) -> Option<Arc<dyn LlmProvider>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "gemini" => {
            if api_key.trim().is_empty() {
                error!("No Gemini API key configured (set GEMINI_API_KEY); model replies will use the fallback message");
                return None;
            }
            let mut provider = GeminiProvider::new(api_key.trim());
            if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
                provider = provider.with_base_url(url);
            }
            info!(provider = "gemini", "Language model provider ready");
            Some(Arc::new(provider))
        }
        "mock" => {
            warn!("Using the mock language model provider");
            Some(Arc::new(MockProvider::new("mock")))
        }
        other => {
            error!(provider = %other, "Unknown language model provider; model replies will use the fallback message");
            None
        }
    }
}
