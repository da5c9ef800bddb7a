//! Deterministic keyword-based step selection.

use tf_core::registry::{DATA_CLEANING, SENTIMENT_ANALYSIS, TEXT_SUMMARIZATION};
use tf_core::StepRegistry;

use crate::selector::ExecutionPlan;

/// Keywords that select one step.
#[derive(Debug, Clone, Copy)]
pub struct KeywordGroup {
    pub step: &'static str,
    pub keywords: &'static [&'static str],
}

const BUILTIN_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        step: DATA_CLEANING,
        keywords: &["clean", "remove"],
    },
    KeywordGroup {
        step: SENTIMENT_ANALYSIS,
        keywords: &[
            "sentiment",
            "analyze",
            "feeling",
            "emotion",
            "positive",
            "negative",
        ],
    },
    KeywordGroup {
        step: TEXT_SUMMARIZATION,
        keywords: &["summarize", "summary", "shorten", "brief", "concise"],
    },
];

/// Case-insensitive substring matching against fixed keyword groups.
///
/// Matching steps are emitted once each, in registry declaration order. A
/// request that matches nothing gets the default step.
#[derive(Debug, Clone)]
pub struct HeuristicSelector {
    registry: StepRegistry,
    groups: &'static [KeywordGroup],
    default_step: &'static str,
}

impl HeuristicSelector {
    /// Keyword matching over the builtin groups.
    pub fn new(registry: StepRegistry) -> Self {
        Self {
            registry,
            groups: BUILTIN_GROUPS,
            default_step: DATA_CLEANING,
        }
    }

    /// Keyword matching over caller-supplied groups.
    pub fn with_groups(
        registry: StepRegistry,
        groups: &'static [KeywordGroup],
        default_step: &'static str,
    ) -> Self {
        Self {
            registry,
            groups,
            default_step,
        }
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Choose a plan for `request`.
    pub fn select(&self, request: &str) -> ExecutionPlan {
        let lowered = request.to_lowercase();

        let steps: Vec<&str> = self
            .registry
            .names()
            .filter(|name| {
                self.groups
                    .iter()
                    .filter(|g| g.step == *name)
                    .any(|g| g.keywords.iter().any(|kw| lowered.contains(kw)))
            })
            .collect();

        if steps.is_empty() {
            tracing::debug!("No keyword group matched; using default step {}", self.default_step);
            return ExecutionPlan::new(vec![self.default_step.to_string()]);
        }

        tracing::debug!("Keyword groups matched: {steps:?}");
        steps.into_iter().collect()
    }
}
