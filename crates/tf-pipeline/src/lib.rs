//! # tf-pipeline
//!
//! Execution of step plans for textflow.
//!
//! This crate provides:
//!
//! - **[`PipelineExecutor`]** -- runs an [`ExecutionPlan`](tf_planner::ExecutionPlan)
//!   as isolated step processes, sequentially or as a bounded concurrent
//!   batch, and records one [`StepResult`] per attempted step.
//! - **[`aggregate`]** -- assembles the [`PipelineRun`] record.
//! - **[`Orchestrator`]** -- the request-level entry point: reads input,
//!   extracts parameters, selects a plan, and executes it.

pub mod aggregate;
pub mod executor;
pub mod orchestrator;
pub mod step;

// Re-export key types at the crate root.
pub use aggregate::{aggregate, PipelineRun};
pub use executor::PipelineExecutor;
pub use orchestrator::{Orchestrator, RunInput, RunRequest};
pub use step::{StepResult, StepState, StepStatus};
