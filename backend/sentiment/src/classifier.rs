/// Sentiment classifiers.
///
/// - `HuggingFaceClassifier` calls the hosted inference API.
/// - `DisabledClassifier` always fails, so every message scores neutral 0.0.
/// - `FixedClassifier` returns one verdict and counts calls (tests).
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use ambassador_core::{SentimentClassifier, SentimentLabel, SentimentScore};

pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/cardiffnlp/twitter-roberta-base-sentiment-latest";

// ---------------------------------------------------------------------------
// Hugging Face
// ---------------------------------------------------------------------------

pub struct HuggingFaceClassifier {
    client: Client,
    endpoint: String,
    api_token: String,
}

impl HuggingFaceClassifier {
    pub fn new(endpoint: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_token: api_token.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// The API answers `[[{label, score}, ...]]` for a single input; some
/// deployments drop the outer list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batched(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

fn best_label(response: InferenceResponse) -> Result<SentimentScore> {
    let candidates = match response {
        InferenceResponse::Batched(mut batches) => {
            if batches.is_empty() {
                Vec::new()
            } else {
                batches.swap_remove(0)
            }
        }
        InferenceResponse::Flat(list) => list,
    };
    let best = candidates
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .context("classifier returned no labels")?;
    let label: SentimentLabel = best.label.parse().map_err(anyhow::Error::msg)?;
    Ok(SentimentScore { label, score: best.score })
}

#[async_trait]
impl SentimentClassifier for HuggingFaceClassifier {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn classify(&self, text: &str) -> Result<SentimentScore> {
        debug!(chars = text.len(), "Classifying message sentiment");
        let mut request = self.client.post(&self.endpoint).json(&serde_json::json!({ "inputs": text }));
        if !self.api_token.is_empty() {
            request = request.bearer_auth(&self.api_token);
        }
        let response = request.send().await.context("Sentiment HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Sentiment endpoint returned {}: {}", status, body);
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .context("Failed to parse sentiment response")?;
        best_label(parsed)
    }
}

// ---------------------------------------------------------------------------
// Disabled / fixed
// ---------------------------------------------------------------------------

pub struct DisabledClassifier;

#[async_trait]
impl SentimentClassifier for DisabledClassifier {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn classify(&self, _text: &str) -> Result<SentimentScore> {
        anyhow::bail!("sentiment classification is disabled")
    }
}

pub struct FixedClassifier {
    verdict: SentimentScore,
    calls: AtomicUsize,
}

impl FixedClassifier {
    pub fn new(label: SentimentLabel, score: f64) -> Self {
        Self {
            verdict: SentimentScore { label, score },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentClassifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn classify(&self, _text: &str) -> Result<SentimentScore> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.verdict)
    }
}

/// Build the configured classifier. Unknown names fall back to disabled.
pub fn build_classifier(provider: &str, endpoint: &str, api_token: &str) -> Arc<dyn SentimentClassifier> {
    match provider.trim().to_ascii_lowercase().as_str() {
        "huggingface" | "hf" => {
            if api_token.trim().is_empty() {
                warn!("No Hugging Face token configured (HF_API_TOKEN); requests may be rate limited");
            }
            let endpoint = if endpoint.trim().is_empty() { DEFAULT_ENDPOINT } else { endpoint.trim() };
            info!(endpoint = %endpoint, "Sentiment classifier ready");
            Arc::new(HuggingFaceClassifier::new(endpoint, api_token.trim()))
        }
        "disabled" | "none" | "" => {
            info!("Sentiment classifier disabled; messages score neutral");
            Arc::new(DisabledClassifier)
        }
        other => {
            warn!(provider = %other, "Unknown sentiment provider, classifier disabled");
            Arc::new(DisabledClassifier)
        }
    }
}
