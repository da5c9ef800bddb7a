//! # tf-steps
//!
//! The text-processing steps bundled with textflow. Each one ships as its
//! own executable (`data-cleaning`, `sentiment-analysis`,
//! `text-summarization`) following the step contract in [`contract`]; the
//! transformations themselves live here so they can be tested in-process.

pub mod clean;
pub mod contract;
pub mod sentiment;
pub mod summarize;

pub use clean::clean_text;
pub use sentiment::{analyze_sentiment, sentiment_json, SentimentReport};
pub use summarize::summarize_text;
