//! Classifier-driven step selection with keyword-matching fallback.

use std::time::Duration;

use tf_core::StepRegistry;

use crate::classifier::{Classifier, ClassifierPrompt};
use crate::heuristic::HeuristicSelector;
use crate::selector::{ExecutionPlan, Selection, SelectionSource};

/// Asks a [`Classifier`] for a plan and falls back to a
/// [`HeuristicSelector`] on any failure.
///
/// The classifier's answer may name the same step more than once; duplicates
/// are preserved. Names that are not registered are dropped. An answer that
/// is an empty list yields an empty plan rather than a fallback.
pub struct ModelBackedSelector {
    classifier: Box<dyn Classifier>,
    fallback: HeuristicSelector,
    timeout: Duration,
}

impl ModelBackedSelector {
    pub fn new(
        classifier: Box<dyn Classifier>,
        fallback: HeuristicSelector,
        timeout: Duration,
    ) -> Self {
        Self {
            classifier,
            fallback,
            timeout,
        }
    }

    pub fn registry(&self) -> &StepRegistry {
        self.fallback.registry()
    }

    /// Choose a plan for `request`, using `sample` as context for the
    /// classifier.
    pub async fn select(&self, request: &str, sample: &str) -> Selection {
        let registry = self.registry();
        let prompt = ClassifierPrompt::build(registry, request, sample);

        let content = match tokio::time::timeout(self.timeout, self.classifier.classify(&prompt))
            .await
        {
            Ok(Ok(content)) => content,
            Ok(Err(e)) => {
                tracing::warn!("Classifier {} failed: {e}", self.classifier.name());
                return self.fall_back(request);
            }
            Err(_) => {
                tracing::warn!(
                    "Classifier {} timed out after {:?}",
                    self.classifier.name(),
                    self.timeout
                );
                return self.fall_back(request);
            }
        };

        let names = match parse_step_names(&content) {
            Ok(Some(names)) => names,
            Ok(None) => {
                tracing::warn!("Classifier response has an unexpected shape");
                return self.fall_back(request);
            }
            Err(e) => {
                tracing::warn!("Unparseable classifier response: {e}");
                return self.fall_back(request);
            }
        };

        if names.is_empty() {
            tracing::warn!("Classifier selected no steps");
            return Selection {
                plan: ExecutionPlan::default(),
                source: SelectionSource::Model,
            };
        }

        let (known, unknown): (Vec<String>, Vec<String>) =
            names.into_iter().partition(|n| registry.contains(n));
        for name in &unknown {
            tracing::warn!("Classifier named unknown step '{name}'; dropping it");
        }

        if known.is_empty() {
            tracing::warn!("None of the classifier's steps are registered");
            return self.fall_back(request);
        }

        Selection {
            plan: ExecutionPlan::new(known),
            source: SelectionSource::Model,
        }
    }

    fn fall_back(&self, request: &str) -> Selection {
        Selection {
            plan: self.fallback.select(request),
            source: SelectionSource::Fallback,
        }
    }
}

/// Interpret a classifier answer as an ordered list of step names.
///
/// A bare JSON array is accepted, as is an object with a `containers` array.
/// Any other valid JSON shape yields `None`. Array items that are not
/// strings are kept as their JSON text so they fail the registry check
/// downstream.
pub fn parse_step_names(content: &str) -> serde_json::Result<Option<Vec<String>>> {
    let value: serde_json::Value = serde_json::from_str(content.trim())?;

    let items = match &value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => match map.get("containers") {
            Some(serde_json::Value::Array(items)) => items,
            _ => return Ok(None),
        },
        _ => return Ok(None),
    };

    Ok(Some(
        items
            .iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum Reply {
        Text(&'static str),
        Fail,
        Hang,
    }

    struct FakeClassifier {
        reply: Reply,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Classifier for FakeClassifier {
        fn name(&self) -> &str {
            "fake"
        }

        async fn classify(&self, prompt: &ClassifierPrompt) -> tf_core::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(prompt.system.contains("data-cleaning"));
            match self.reply {
                Reply::Text(s) => Ok(s.to_string()),
                Reply::Fail => Err(tf_core::Error::Classifier("boom".into())),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok("[]".into())
                }
            }
        }
    }

    fn selector(reply: Reply) -> (ModelBackedSelector, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = FakeClassifier {
            reply,
            calls: calls.clone(),
        };
        let selector = ModelBackedSelector::new(
            Box::new(classifier),
            HeuristicSelector::new(StepRegistry::builtin()),
            Duration::from_millis(200),
        );
        (selector, calls)
    }

    #[tokio::test]
    async fn valid_answer_is_used() {
        let (s, calls) = selector(Reply::Text(r#"["text-summarization", "data-cleaning"]"#));
        let selection = s.select("clean it", "sample").await;
        assert_eq!(selection.source, SelectionSource::Model);
        assert_eq!(selection.plan.steps(), ["text-summarization", "data-cleaning"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn containers_object_is_accepted() {
        let (s, _) = selector(Reply::Text(r#"{"containers": ["sentiment-analysis"]}"#));
        let selection = s.select("anything", "").await;
        assert_eq!(selection.source, SelectionSource::Model);
        assert_eq!(selection.plan.steps(), ["sentiment-analysis"]);
    }

    #[tokio::test]
    async fn duplicates_are_preserved() {
        let (s, _) = selector(Reply::Text(r#"["data-cleaning", "data-cleaning"]"#));
        let selection = s.select("anything", "").await;
        assert_eq!(selection.plan.steps(), ["data-cleaning", "data-cleaning"]);
        assert!(selection.plan.is_uniform());
    }

    #[tokio::test]
    async fn unknown_names_are_dropped() {
        let (s, _) = selector(Reply::Text(r#"["translate", "data-cleaning", 7]"#));
        let selection = s.select("anything", "").await;
        assert_eq!(selection.source, SelectionSource::Model);
        assert_eq!(selection.plan.steps(), ["data-cleaning"]);
    }

    #[tokio::test]
    async fn all_unknown_falls_back() {
        let (s, _) = selector(Reply::Text(r#"["translate"]"#));
        let selection = s.select("summarize this", "").await;
        assert_eq!(selection.source, SelectionSource::Fallback);
        assert_eq!(selection.plan.steps(), ["text-summarization"]);
    }

    #[tokio::test]
    async fn malformed_answer_falls_back() {
        let (s, _) = selector(Reply::Text("data-cleaning please"));
        let selection = s.select("analyze the sentiment", "").await;
        assert_eq!(selection.source, SelectionSource::Fallback);
        assert_eq!(selection.plan.steps(), ["sentiment-analysis"]);
    }

    #[tokio::test]
    async fn classifier_error_falls_back() {
        let (s, _) = selector(Reply::Fail);
        let selection = s.select("nothing matches here", "").await;
        assert_eq!(selection.source, SelectionSource::Fallback);
        assert_eq!(selection.plan.steps(), ["data-cleaning"]);
    }

    #[tokio::test]
    async fn slow_classifier_times_out() {
        let (s, _) = selector(Reply::Hang);
        let selection = s.select("summarize", "").await;
        assert_eq!(selection.source, SelectionSource::Fallback);
        assert_eq!(selection.plan.steps(), ["text-summarization"]);
    }

    #[tokio::test]
    async fn empty_answer_yields_empty_plan() {
        for reply in ["[]", r#"{"containers": []}"#] {
            let (s, _) = selector(Reply::Text(reply));
            let selection = s.select("clean this", "").await;
            assert_eq!(selection.source, SelectionSource::Model, "reply {reply}");
            assert!(selection.plan.is_empty(), "reply {reply}");
        }
    }

    #[tokio::test]
    async fn unexpected_shape_falls_back() {
        let (s, _) = selector(Reply::Text(r#"{"steps": ["sentiment-analysis"]}"#));
        let selection = s.select("summarize this", "").await;
        assert_eq!(selection.source, SelectionSource::Fallback);
        assert_eq!(selection.plan.steps(), ["text-summarization"]);
    }

    #[test]
    fn parse_shapes() {
        assert_eq!(parse_step_names(r#"["a"]"#).unwrap(), Some(vec!["a".to_string()]));
        assert_eq!(
            parse_step_names(r#"{"containers": ["b"]}"#).unwrap(),
            Some(vec!["b".to_string()])
        );
        assert_eq!(parse_step_names("[]").unwrap(), Some(vec![]));
        assert_eq!(parse_step_names(r#"{"steps": ["b"]}"#).unwrap(), None);
        assert_eq!(parse_step_names(r#"{"containers": "b"}"#).unwrap(), None);
        assert_eq!(parse_step_names("42").unwrap(), None);
        assert!(parse_step_names("not json").is_err());
        assert_eq!(
            parse_step_names("[1, null]").unwrap(),
            Some(vec!["1".to_string(), "null".to_string()])
        );
    }
}
