//! Registry listing.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tf_core::config::LaunchMode;

use crate::context::AppContext;

#[derive(Debug, Serialize)]
pub struct StepEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub accepts_length_hint: bool,
    pub available: bool,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StepsResponse {
    pub launcher: LaunchMode,
    pub selector: &'static str,
    /// Concurrent step ceiling for parallel runs.
    pub max_parallel: usize,
    pub step_timeout_secs: Option<u64>,
    pub steps: Vec<StepEntry>,
}

/// GET /steps
pub async fn list_steps(State(ctx): State<AppContext>) -> Json<StepsResponse> {
    let orchestrator = &ctx.orchestrator;
    let registry = orchestrator.registry();
    let launcher = orchestrator.launcher();

    let steps = registry
        .steps()
        .iter()
        .zip(launcher.check_all(registry))
        .map(|(spec, info)| StepEntry {
            name: spec.name,
            description: spec.description,
            accepts_length_hint: spec.accepts_length_hint,
            available: info.available,
            location: info.location,
        })
        .collect();

    Json(StepsResponse {
        launcher: launcher.mode(),
        selector: orchestrator.selector().kind(),
        max_parallel: ctx.config.executor.max_parallel,
        step_timeout_secs: ctx.config.executor.step_timeout_secs,
        steps,
    })
}
