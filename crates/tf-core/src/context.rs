//! Run-scoped context threaded through selection and execution.

use tracing::Span;

use crate::ids::RunId;

/// Correlation id and logging span for one request.
///
/// Created once per run and passed by reference to the selector, parameter
/// extraction, and the executor. Futures that belong to the run are
/// instrumented with [`RunContext::span`] so every log line carries the id.
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: RunId,
    span: Span,
}

impl RunContext {
    /// Start a new run with a fresh id.
    pub fn new() -> Self {
        Self::with_id(RunId::new())
    }

    /// Start a run with a caller-supplied id.
    pub fn with_id(run_id: RunId) -> Self {
        let span = tracing::info_span!("run", run_id = %run_id.short());
        Self { run_id, span }
    }

    /// The run's correlation id.
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// The span every run-scoped future is instrumented with.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
