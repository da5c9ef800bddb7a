//! Request-level entry point shared by the CLI and the HTTP server.

use std::path::PathBuf;

use tf_core::config::Config;
use tf_core::{RunContext, StepRegistry};
use tf_exec::StepLauncher;
use tf_planner::classifier::SAMPLE_CHARS;
use tf_planner::{extract_parameters, ExecutionPlan, Selector};
use tracing::Instrument;

use crate::aggregate::PipelineRun;
use crate::executor::PipelineExecutor;

/// Where the input text for a run comes from.
#[derive(Debug, Clone)]
pub enum RunInput {
    Text(String),
    File(PathBuf),
}

/// One request to process.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Free-text instruction, used for selection and parameter extraction.
    pub request: String,
    pub input: RunInput,
    /// Explicit plan that bypasses selection.
    pub plan: Option<Vec<String>>,
}

impl RunRequest {
    pub fn new(request: impl Into<String>, input: RunInput) -> Self {
        Self {
            request: request.into(),
            input,
            plan: None,
        }
    }

    pub fn with_plan(mut self, plan: Vec<String>) -> Self {
        self.plan = Some(plan);
        self
    }
}

/// Ties parameter extraction, step selection, and execution together.
pub struct Orchestrator {
    selector: Selector,
    executor: PipelineExecutor,
}

impl Orchestrator {
    pub fn new(selector: Selector, executor: PipelineExecutor) -> Self {
        Self { selector, executor }
    }

    /// Build the selector and executor described by `config` over the
    /// builtin step registry.
    pub fn from_config(config: &Config) -> Self {
        let registry = StepRegistry::builtin();
        let selector = Selector::from_config(&config.classifier, registry);
        let executor = PipelineExecutor::from_config(config, registry);
        Self::new(selector, executor)
    }

    pub fn registry(&self) -> &StepRegistry {
        self.executor.registry()
    }

    pub fn launcher(&self) -> &StepLauncher {
        self.executor.launcher()
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Process one request end to end.
    ///
    /// # Errors
    ///
    /// Domain errors ([`tf_core::Error::is_domain`]) for unreadable or empty
    /// input, an empty plan, or an explicit plan naming an unknown step;
    /// [`tf_core::Error::Staging`] when the run cannot be staged.
    pub async fn process(&self, req: RunRequest) -> tf_core::Result<PipelineRun> {
        let ctx = RunContext::new();
        self.process_in(&ctx, req).await
    }

    /// Like [`Orchestrator::process`], within a caller-supplied context.
    pub async fn process_in(&self, ctx: &RunContext, req: RunRequest) -> tf_core::Result<PipelineRun> {
        let text = async {
            tracing::info!("Processing request: {}", req.request);
            read_input(&req.input).await
        }
        .instrument(ctx.span().clone())
        .await?;

        if text.is_empty() {
            return Err(tf_core::Error::input("No input text provided"));
        }

        let params = extract_parameters(&req.request);
        ctx.span().in_scope(|| {
            tracing::debug!("Parameters: {}", serde_json::to_string(&params).unwrap_or_default());
        });

        let plan = match req.plan {
            Some(steps) => self.explicit_plan(steps)?,
            None => {
                let sample: String = text.chars().take(SAMPLE_CHARS).collect();
                self.selector.select(ctx, &req.request, &sample).await.plan
            }
        };

        self.executor.execute(ctx, &plan, &params, &text).await
    }

    fn explicit_plan(&self, steps: Vec<String>) -> tf_core::Result<ExecutionPlan> {
        let steps: Vec<String> = steps
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if steps.is_empty() {
            return Err(tf_core::Error::PlanEmpty);
        }
        if let Some(unknown) = steps.iter().find(|s| !self.registry().contains(s)) {
            return Err(tf_core::Error::Validation(format!("unknown step '{unknown}'")));
        }
        Ok(ExecutionPlan::new(steps))
    }
}

async fn read_input(input: &RunInput) -> tf_core::Result<String> {
    match input {
        RunInput::Text(text) => Ok(text.clone()),
        RunInput::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
            tf_core::Error::input(format!(
                "Could not read input file: {} ({e})",
                path.display()
            ))
        }),
    }
}
