//! Recognized options parsed out of the request text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Options derived once per request and read-only afterwards.
///
/// Serializes as a map that only contains the options that were recognized,
/// so a request with none of them renders as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParameters {
    /// Desired summary length in sentences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_length: Option<u32>,
    /// The request asked for concurrent execution.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub parallel: bool,
}

impl ExecutionParameters {
    /// Whether no option was recognized.
    pub fn is_empty(&self) -> bool {
        self.target_length.is_none() && !self.parallel
    }
}

/// Parse recognized options from `request`. Never fails; unmatched text
/// yields empty parameters.
pub fn extract_parameters(request: &str) -> ExecutionParameters {
    static TARGET_LENGTH_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"summarize\s+.*?\s+to\s+(\d+)\s+sentences").expect("valid regex")
    });

    let lowered = request.to_lowercase();

    let target_length = TARGET_LENGTH_RE
        .captures(&lowered)
        .and_then(|caps| caps[1].parse::<u32>().ok());

    let parallel = lowered.contains("parallel") || lowered.contains("concurrently");

    ExecutionParameters {
        target_length,
        parallel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_length_from_phrase() {
        let params = extract_parameters("summarize this to 2 sentences");
        assert_eq!(params.target_length, Some(2));
        assert!(!params.parallel);
        assert_eq!(serde_json::to_value(params).unwrap(), serde_json::json!({"target_length": 2}));
    }

    #[test]
    fn phrase_is_case_insensitive() {
        let params = extract_parameters("Please SUMMARIZE the article To 5 Sentences");
        assert_eq!(params.target_length, Some(5));
    }

    #[test]
    fn unmatched_text_is_empty() {
        let params = extract_parameters("clean this text");
        assert!(params.is_empty());
        assert_eq!(serde_json::to_string(&params).unwrap(), "{}");
    }

    #[test]
    fn phrase_without_number_is_ignored() {
        assert_eq!(extract_parameters("summarize this to a few sentences").target_length, None);
    }

    #[test]
    fn oversized_number_is_ignored() {
        let params = extract_parameters("summarize it to 99999999999999 sentences");
        assert_eq!(params.target_length, None);
    }

    #[test]
    fn parallel_synonyms() {
        assert!(extract_parameters("summarize (run in parallel)").parallel);
        assert!(extract_parameters("run these concurrently").parallel);
        assert!(!extract_parameters("run these one by one").parallel);
    }

    #[test]
    fn both_options_together() {
        let params = extract_parameters("summarize this text to 3 sentences in parallel");
        assert_eq!(
            params,
            ExecutionParameters {
                target_length: Some(3),
                parallel: true,
            }
        );
    }
}
