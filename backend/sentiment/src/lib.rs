//! Sentiment scoring for every user message, with per-day and
//! per-conversation summaries.

pub mod aggregator;
pub mod classifier;
pub mod store;

pub use aggregator::{
    fold, ConversationSummary, DailySummary, SentimentAggregator, SentimentRecord, SentimentSummary,
};
pub use classifier::{build_classifier, DisabledClassifier, FixedClassifier, HuggingFaceClassifier};
pub use store::SentimentStore;
