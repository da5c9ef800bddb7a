//! Per-step lifecycle and outcome records.

use serde::{Deserialize, Serialize};

/// Maximum number of characters kept in an output preview.
pub const PREVIEW_CHARS: usize = 100;

/// Terminal outcome of one attempted step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Success,
    Error,
}

/// Lifecycle of a planned step: `Pending -> Running -> {Succeeded, Failed}`.
///
/// Terminal states are final; there are no retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl StepState {
    pub fn is_terminal(self) -> bool {
        matches!(self, StepState::Succeeded | StepState::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_advance_to(self, next: StepState) -> bool {
        matches!(
            (self, next),
            (StepState::Pending, StepState::Running)
                | (StepState::Running, StepState::Succeeded)
                | (StepState::Running, StepState::Failed)
        )
    }
}

/// Lifecycle tracker for every step of one plan.
#[derive(Debug)]
pub(crate) struct StepStates {
    steps: Vec<String>,
    states: Vec<StepState>,
}

impl StepStates {
    pub(crate) fn new(steps: &[String]) -> Self {
        Self {
            steps: steps.to_vec(),
            states: vec![StepState::Pending; steps.len()],
        }
    }

    pub(crate) fn advance(&mut self, index: usize, next: StepState) {
        let current = self.states[index];
        if !current.can_advance_to(next) {
            tracing::warn!(
                "Ignoring illegal transition {current:?} -> {next:?} for step {}",
                self.steps[index]
            );
            return;
        }
        tracing::trace!("Step {} [{index}]: {current:?} -> {next:?}", self.steps[index]);
        self.states[index] = next;
    }

    #[cfg(test)]
    pub(crate) fn get(&self, index: usize) -> StepState {
        self.states[index]
    }
}

/// Outcome record for one attempted step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub step: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    pub fn success(step: impl Into<String>, output: &str) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Success,
            output_preview: Some(preview(output)),
            error: None,
        }
    }

    pub fn failure(step: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Error,
            output_preview: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }
}

/// The first [`PREVIEW_CHARS`] characters of `output`, with `...` appended
/// when anything was cut.
pub fn preview(output: &str) -> String {
    let mut chars = output.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
