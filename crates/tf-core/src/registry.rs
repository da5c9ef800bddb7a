//! The static catalogue of steps textflow knows how to run.
//!
//! Entries are declared once, at compile time, and never change while the
//! process runs. Declaration order matters: the heuristic selector emits
//! steps in this order and capability descriptions are rendered in this
//! order when prompting a classifier.

use serde::Serialize;

/// Name of the text cleaning step.
pub const DATA_CLEANING: &str = "data-cleaning";
/// Name of the sentiment analysis step.
pub const SENTIMENT_ANALYSIS: &str = "sentiment-analysis";
/// Name of the extractive summarization step.
pub const TEXT_SUMMARIZATION: &str = "text-summarization";

/// Description of one registered step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepSpec {
    /// Unique step name, also the executable / image name.
    pub name: &'static str,
    /// Capability description shown to the classifier.
    pub description: &'static str,
    /// Whether the step takes the target length as a trailing argument.
    pub accepts_length_hint: bool,
}

const BUILTIN_STEPS: &[StepSpec] = &[
    StepSpec {
        name: DATA_CLEANING,
        description: "Cleans text by removing special characters, normalizing spaces, and converting to lowercase",
        accepts_length_hint: false,
    },
    StepSpec {
        name: SENTIMENT_ANALYSIS,
        description: "Analyzes the sentiment of text, providing a score from -1 (negative) to 1 (positive)",
        accepts_length_hint: false,
    },
    StepSpec {
        name: TEXT_SUMMARIZATION,
        description: "Creates a concise summary of longer text by extracting key sentences",
        accepts_length_hint: true,
    },
];

/// Immutable lookup table over a static list of [`StepSpec`]s.
#[derive(Debug, Clone, Copy)]
pub struct StepRegistry {
    steps: &'static [StepSpec],
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StepRegistry {
    /// The registry of steps bundled with textflow.
    pub fn builtin() -> Self {
        Self {
            steps: BUILTIN_STEPS,
        }
    }

    /// Build a registry over a caller-supplied static list.
    pub fn from_static(steps: &'static [StepSpec]) -> Self {
        Self { steps }
    }

    /// Look up a step by name.
    pub fn get(&self, name: &str) -> Option<&'static StepSpec> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Whether `name` is a registered step.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All entries in declaration order.
    pub fn steps(&self) -> &'static [StepSpec] {
        self.steps
    }

    /// Step names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.steps.iter().map(|s| s.name)
    }

    /// Render `- name: description` lines for prompting.
    pub fn describe(&self) -> String {
        self.steps
            .iter()
            .map(|s| format!("- {}: {}", s.name, s.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
