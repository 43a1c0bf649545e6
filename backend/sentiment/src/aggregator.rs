/// Sentiment aggregator: scores each user message and folds records into
/// summaries.
///
/// Scoring never fails the caller: empty input short-circuits to neutral
/// 1.0, classifier errors become neutral 0.0, and store errors are logged.
use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use ambassador_core::{SentimentClassifier, SentimentLabel, SentimentScore};

use crate::store::SentimentStore;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub conversation_id: String,
    pub text: String,
    pub label: SentimentLabel,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub total: usize,
    pub mean_score: f64,
    /// Most frequent label; `None` when there are no records.
    pub dominant: Option<SentimentLabel>,
}

impl SentimentSummary {
    pub fn count(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub summary: SentimentSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: String,
    pub author: String,
    pub closed_at: DateTime<Utc>,
    pub summary: SentimentSummary,
}

/// Fold records into counts, mean score and dominant label.
///
/// Ties go to the label listed first in [`SentimentLabel::PRIORITY`].
pub fn fold<'a>(records: impl IntoIterator<Item = &'a SentimentRecord>) -> SentimentSummary {
    let mut summary = SentimentSummary::default();
    let mut score_sum = 0.0;
    for record in records {
        match record.label {
            SentimentLabel::Positive => summary.positive += 1,
            SentimentLabel::Negative => summary.negative += 1,
            SentimentLabel::Neutral => summary.neutral += 1,
        }
        summary.total += 1;
        score_sum += record.score;
    }
    if summary.total == 0 {
        return summary;
    }
    summary.mean_score = score_sum / summary.total as f64;

    let mut dominant = SentimentLabel::PRIORITY[0];
    for label in SentimentLabel::PRIORITY {
        if summary.count(label) > summary.count(dominant) {
            dominant = label;
        }
    }
    summary.dominant = Some(dominant);
    summary
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

pub struct SentimentAggregator {
    classifier: Arc<dyn SentimentClassifier>,
    store: SentimentStore,
}

impl SentimentAggregator {
    pub fn new(classifier: Arc<dyn SentimentClassifier>, store: SentimentStore) -> Self {
        Self { classifier, store }
    }

    /// Score one message and append it to the store.
    pub async fn record(&self, author: &str, conversation_id: &str, text: &str) -> SentimentRecord {
        let verdict = self.score(text).await;
        let record = SentimentRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            author: author.to_string(),
            conversation_id: conversation_id.to_string(),
            text: text.to_string(),
            label: verdict.label,
            score: verdict.score,
        };
        if let Err(e) = self.store.insert(&record).await {
            error!(error = %e, "Failed to store sentiment record");
        }
        debug!(label = %record.label, score = record.score, "Message sentiment recorded");
        record
    }

    async fn score(&self, text: &str) -> SentimentScore {
        if text.trim().is_empty() {
            return SentimentScore::empty_input();
        }
        match self.classifier.classify(text).await {
            Ok(score) => score,
            Err(e) => {
                warn!(classifier = %self.classifier.name(), error = %e, "Sentiment classification failed");
                SentimentScore::unavailable()
            }
        }
    }

    /// One summary per UTC calendar day, oldest first.
    pub async fn daily_summaries(&self) -> Result<Vec<DailySummary>> {
        let records = self.store.all().await?;
        let mut by_day: BTreeMap<NaiveDate, Vec<&SentimentRecord>> = BTreeMap::new();
        for record in &records {
            by_day.entry(record.timestamp.date_naive()).or_default().push(record);
        }
        Ok(by_day
            .into_iter()
            .map(|(date, day)| DailySummary { date, summary: fold(day) })
            .collect())
    }

    /// Fold one conversation and store its summary. Returns `None` when the
    /// conversation has no records.
    pub async fn close_conversation(&self, conversation_id: &str, author: &str) -> Option<ConversationSummary> {
        let records = match self.store.for_conversation(conversation_id).await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, conversation_id, "Failed to read conversation sentiment");
                return None;
            }
        };
        if records.is_empty() {
            return None;
        }
        let summary = ConversationSummary {
            conversation_id: conversation_id.to_string(),
            author: author.to_string(),
            closed_at: Utc::now(),
            summary: fold(&records),
        };
        if let Err(e) = self.store.insert_summary(&summary).await {
            error!(error = %e, conversation_id, "Failed to store conversation summary");
        }
        info!(
            conversation_id,
            messages = summary.summary.total,
            dominant = ?summary.summary.dominant,
            "Conversation sentiment summarized"
        );
        Some(summary)
    }

    pub async fn conversation_summaries(&self) -> Result<Vec<ConversationSummary>> {
        self.store.summaries().await
    }

    /// All records as CSV with a header row.
    pub async fn export_csv(&self) -> Result<String> {
        let records = self.store.all().await?;
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["id", "timestamp", "author", "conversation_id", "text", "label", "score"])?;
        for r in &records {
            writer.write_record([
                r.id.to_string(),
                r.timestamp.to_rfc3339(),
                r.author.clone(),
                r.conversation_id.clone(),
                r.text.clone(),
                r.label.to_string(),
                format!("{:.4}", r.score),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
        String::from_utf8(bytes).context("CSV output was not UTF-8")
    }
}
