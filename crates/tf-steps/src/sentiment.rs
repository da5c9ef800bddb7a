//! Word-list sentiment scoring.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "positive", "wonderful", "amazing", "love", "best", "happy",
    "pleasant", "fantastic", "perfect", "better", "nice",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "negative",
    "horrible",
    "hate",
    "worst",
    "poor",
    "sad",
    "unpleasant",
    "disappointing",
    "worse",
    "problem",
];

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Positive,
    Negative,
    Neutral,
}

/// Result of [`analyze_sentiment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    /// In `[-1.0, 1.0]`.
    pub score: f64,
    pub positive_words: usize,
    pub negative_words: usize,
    pub classification: Classification,
}

/// Score `text` by counting known positive and negative words.
///
/// The raw difference is normalized by a tenth of the word count (at least
/// one) and clamped to `[-1, 1]`.
pub fn analyze_sentiment(text: &str) -> SentimentReport {
    let lowered = PUNCTUATION.replace_all(text, "").to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    let positive = words.iter().filter(|w| POSITIVE_WORDS.contains(*w)).count();
    let negative = words.iter().filter(|w| NEGATIVE_WORDS.contains(*w)).count();

    let score = if words.is_empty() {
        0.0
    } else {
        let scale = (words.len() as f64 * 0.1).max(1.0);
        ((positive as f64 - negative as f64) / scale).clamp(-1.0, 1.0)
    };

    let classification = if score > 0.0 {
        Classification::Positive
    } else if score < 0.0 {
        Classification::Negative
    } else {
        Classification::Neutral
    };

    SentimentReport {
        score,
        positive_words: positive,
        negative_words: negative,
        classification,
    }
}

/// [`analyze_sentiment`] rendered as pretty-printed JSON.
pub fn sentiment_json(text: &str) -> String {
    serde_json::to_string_pretty(&analyze_sentiment(text)).unwrap_or_else(|_| "{}".to_string())
}
