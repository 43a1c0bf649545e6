use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output label of the sentiment classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Tie-break order for "most frequent label": earlier wins.
    pub const PRIORITY: [SentimentLabel; 3] = [
        SentimentLabel::Neutral,
        SentimentLabel::Positive,
        SentimentLabel::Negative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    /// Accepts plain names in any casing plus the `LABEL_0..2` convention of
    /// three-class sentiment models (negative, neutral, positive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" | "label_2" => Ok(SentimentLabel::Positive),
            "negative" | "neg" | "label_0" => Ok(SentimentLabel::Negative),
            "neutral" | "neu" | "label_1" => Ok(SentimentLabel::Neutral),
            other => Err(format!("unknown sentiment label: {other}")),
        }
    }
}

/// A classifier verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    pub score: f64,
}

impl SentimentScore {
    /// Result for empty input; the classifier is never consulted.
    pub fn empty_input() -> Self {
        Self { label: SentimentLabel::Neutral, score: 1.0 }
    }

    /// Result when the classifier is unreachable or returns garbage.
    pub fn unavailable() -> Self {
        Self { label: SentimentLabel::Neutral, score: 0.0 }
    }
}
