//! Pipeline executor: runs an [`ExecutionPlan`] as a chain of isolated step
//! processes, either one after another or as a bounded concurrent batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use tf_core::config::Config;
use tf_core::{RunContext, StepRegistry};
use tf_exec::{RunWorkspace, StepCommand, StepLauncher};
use tf_planner::{ExecutionParameters, ExecutionPlan};
use tokio::sync::Semaphore;
use tracing::Instrument;

use crate::aggregate::{aggregate, PipelineRun};
use crate::step::{StepResult, StepState, StepStates};

/// Runs execution plans against a [`StepLauncher`].
///
/// Each run gets its own [`RunWorkspace`]; the staged input and every output
/// slot live there and are removed when the run ends, whatever the outcome.
///
/// Sequential mode feeds each step's output into the next step and stops at
/// the first failure. Parallel mode is only used when the request asked for
/// it, more than one step is planned, and every planned step is the same:
/// all steps then read the same staged input, at most
/// `min(steps, max_parallel)` run at once, and every dispatched step is
/// joined regardless of its siblings' outcome.
pub struct PipelineExecutor {
    launcher: StepLauncher,
    registry: StepRegistry,
    max_parallel: usize,
}

impl PipelineExecutor {
    /// Create an executor. A `max_parallel` of zero is treated as one.
    pub fn new(launcher: StepLauncher, registry: StepRegistry, max_parallel: usize) -> Self {
        Self {
            launcher,
            registry,
            max_parallel: max_parallel.max(1),
        }
    }

    /// Discover step executables and apply executor limits from `config`.
    pub fn from_config(config: &Config, registry: StepRegistry) -> Self {
        let timeout = config.executor.step_timeout_secs.map(Duration::from_secs);
        let launcher = StepLauncher::discover(&config.steps, &registry).with_timeout(timeout);
        Self::new(launcher, registry, config.executor.max_parallel)
    }

    pub fn launcher(&self) -> &StepLauncher {
        &self.launcher
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Execute `plan` over `input`.
    ///
    /// # Errors
    ///
    /// Fails before any step runs with [`tf_core::Error::PlanEmpty`] for an
    /// empty plan, [`tf_core::Error::Input`] for empty input, and
    /// [`tf_core::Error::Validation`] for an unregistered step name. A run
    /// whose workspace cannot be staged fails with
    /// [`tf_core::Error::Staging`]. Step failures never fail the call; they
    /// are recorded in [`PipelineRun::results`].
    pub async fn execute(
        &self,
        ctx: &RunContext,
        plan: &ExecutionPlan,
        params: &ExecutionParameters,
        input: &str,
    ) -> tf_core::Result<PipelineRun> {
        self.run(ctx, plan, params, input)
            .instrument(ctx.span().clone())
            .await
    }

    async fn run(
        &self,
        ctx: &RunContext,
        plan: &ExecutionPlan,
        params: &ExecutionParameters,
        input: &str,
    ) -> tf_core::Result<PipelineRun> {
        if plan.is_empty() {
            return Err(tf_core::Error::PlanEmpty);
        }
        if input.is_empty() {
            return Err(tf_core::Error::input("No input text provided"));
        }
        if let Some(unknown) = plan.steps().iter().find(|s| !self.registry.contains(s)) {
            return Err(tf_core::Error::Validation(format!("unknown step '{unknown}'")));
        }

        let started_at = Utc::now();
        let clock = Instant::now();
        let parallel = params.parallel && plan.len() > 1 && plan.is_uniform();

        let workspace = RunWorkspace::new(&ctx.run_id().short())?;
        let staged = workspace.stage_input(input).await?;

        tracing::info!(
            "Executing {plan} ({} step(s), {})",
            plan.len(),
            if parallel { "parallel" } else { "sequential" }
        );

        let (results, output) = if parallel {
            self.run_parallel(&workspace, &staged, plan, params).await
        } else {
            self.run_sequential(&workspace, &staged, plan, params, input)
                .await
        };

        let elapsed = clock.elapsed();
        let failed = results.iter().filter(|r| !r.is_success()).count();
        tracing::info!(
            "Run finished in {:.2}s: {} attempted, {} failed",
            elapsed.as_secs_f64(),
            results.len(),
            failed
        );

        Ok(aggregate(
            ctx.run_id(),
            plan.clone(),
            *params,
            results,
            output,
            elapsed,
            parallel,
            started_at,
        ))
    }

    async fn run_sequential(
        &self,
        workspace: &RunWorkspace,
        staged: &Path,
        plan: &ExecutionPlan,
        params: &ExecutionParameters,
        input: &str,
    ) -> (Vec<StepResult>, String) {
        let mut states = StepStates::new(plan.steps());
        let mut results = Vec::with_capacity(plan.len());
        let mut current_input = staged.to_path_buf();
        let mut output = input.to_string();

        for (index, step) in plan.steps().iter().enumerate() {
            states.advance(index, StepState::Running);
            tracing::info!("Starting {step} [{}/{}]", index + 1, plan.len());

            let outcome = match self.prepare(workspace, index, step, &current_input, params).await {
                Ok((slot, cmd)) => match cmd.execute().await {
                    Ok(_) => match workspace.read(&slot).await {
                        Ok(payload) => Ok((slot, payload)),
                        Err(e) => Err(format!("failed to read output: {e}")),
                    },
                    Err(e) => Err(step_message(e)),
                },
                Err(message) => Err(message),
            };

            match outcome {
                Ok((slot, payload)) => {
                    states.advance(index, StepState::Succeeded);
                    tracing::info!("Completed {step}");
                    results.push(StepResult::success(step, &payload));
                    current_input = slot;
                    output = payload;
                }
                Err(message) => {
                    states.advance(index, StepState::Failed);
                    tracing::warn!("Step {step} failed: {message}");
                    results.push(StepResult::failure(step, message));
                    break;
                }
            }
        }

        (results, output)
    }

    async fn run_parallel(
        &self,
        workspace: &RunWorkspace,
        staged: &Path,
        plan: &ExecutionPlan,
        params: &ExecutionParameters,
    ) -> (Vec<StepResult>, String) {
        let permits = self.max_parallel.min(plan.len());
        let semaphore = Arc::new(Semaphore::new(permits));
        let states = Arc::new(Mutex::new(StepStates::new(plan.steps())));
        let mut handles = Vec::with_capacity(plan.len());

        tracing::debug!("Dispatching {} step(s) with {permits} permit(s)", plan.len());

        for (index, step) in plan.steps().iter().enumerate() {
            let prepared = self.prepare(workspace, index, step, staged, params).await;
            let handle = tokio::spawn(
                dispatch(semaphore.clone(), states.clone(), index, prepared).in_current_span(),
            );
            handles.push(handle);
        }

        let mut results = Vec::with_capacity(plan.len());
        for (index, (step, handle)) in plan.steps().iter().zip(handles).enumerate() {
            let outcome = match handle.await {
                Ok(Ok(slot)) => workspace
                    .read(&slot)
                    .await
                    .map_err(|e| format!("failed to read output: {e}")),
                Ok(Err(message)) => Err(message),
                Err(e) => Err(format!("worker task failed: {e}")),
            };

            match outcome {
                Ok(payload) => {
                    states.lock().advance(index, StepState::Succeeded);
                    tracing::info!("Completed {step} [{}/{}]", index + 1, plan.len());
                    results.push(StepResult::success(step, &payload));
                }
                Err(message) => {
                    states.lock().advance(index, StepState::Failed);
                    tracing::warn!("Step {step} [{}/{}] failed: {message}", index + 1, plan.len());
                    results.push(StepResult::failure(step, message));
                }
            }
        }

        let last = workspace.output_slot(plan.len() - 1);
        let output = match workspace.read(&last).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Failed to read final output {}: {e}", last.display());
                String::new()
            }
        };

        (results, output)
    }

    /// Create the output slot for the step at `index` and build its command.
    async fn prepare(
        &self,
        workspace: &RunWorkspace,
        index: usize,
        step: &str,
        input: &Path,
        params: &ExecutionParameters,
    ) -> Result<(PathBuf, StepCommand), String> {
        let slot = workspace
            .prepare_slot(index)
            .await
            .map_err(|e| format!("failed to prepare output file: {e}"))?;

        let cmd = self
            .launcher
            .command(step, input, &slot, &self.extra_args(step, params))
            .map_err(step_message)?;

        tracing::debug!("Command: {}", cmd.display());
        Ok((slot, cmd))
    }

    fn extra_args(&self, step: &str, params: &ExecutionParameters) -> Vec<String> {
        match (self.registry.get(step), params.target_length) {
            (Some(spec), Some(length)) if spec.accepts_length_hint => vec![length.to_string()],
            _ => Vec::new(),
        }
    }
}

/// Wait for a permit, then run one prepared step of a parallel batch.
///
/// The step only counts as running once it holds a permit.
async fn dispatch(
    semaphore: Arc<Semaphore>,
    states: Arc<Mutex<StepStates>>,
    index: usize,
    prepared: Result<(PathBuf, StepCommand), String>,
) -> Result<PathBuf, String> {
    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| format!("dispatch failed: {e}"))?;
    states.lock().advance(index, StepState::Running);

    let (slot, cmd) = prepared?;
    tracing::debug!("Starting {}", cmd.display());
    cmd.execute().await.map_err(step_message)?;
    Ok(slot)
}

/// The diagnostic text of a step failure, without the error-kind prefix.
fn step_message(err: tf_core::Error) -> String {
    match err {
        tf_core::Error::Step { message, .. } => message,
        other => other.to_string(),
    }
}
