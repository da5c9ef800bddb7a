//! Assembly of the per-request run record.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tf_core::RunId;
use tf_planner::{ExecutionParameters, ExecutionPlan};

use crate::step::StepResult;

/// Everything a front end needs to report about one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub run_id: RunId,
    pub execution_plan: ExecutionPlan,
    pub parameters: ExecutionParameters,
    /// One entry per attempted step, in plan order.
    pub results: Vec<StepResult>,
    pub output: String,
    /// Wall-clock duration in seconds.
    pub execution_time: f64,
    pub parallel: bool,
    pub started_at: DateTime<Utc>,
}

impl PipelineRun {
    /// Whether every planned step ran and succeeded.
    pub fn succeeded(&self) -> bool {
        self.results.len() == self.execution_plan.len()
            && self.results.iter().all(StepResult::is_success)
    }
}

/// Build a [`PipelineRun`] from the pieces the executor collected.
#[allow(clippy::too_many_arguments)]
pub fn aggregate(
    run_id: RunId,
    plan: ExecutionPlan,
    parameters: ExecutionParameters,
    results: Vec<StepResult>,
    output: String,
    elapsed: Duration,
    parallel: bool,
    started_at: DateTime<Utc>,
) -> PipelineRun {
    PipelineRun {
        run_id,
        execution_plan: plan,
        parameters,
        results,
        output,
        execution_time: elapsed.as_secs_f64(),
        parallel,
        started_at,
    }
}
