//! # tf-exec
//!
//! Process-level plumbing for running steps.
//!
//! This crate provides:
//!
//! - **Command execution** ([`StepCommand`]) -- async builder with optional
//!   timeout for running one step process and capturing its diagnostics.
//! - **Run workspaces** ([`RunWorkspace`]) -- the per-run temporary directory
//!   holding the staged input and one output slot per step, removed on drop.
//! - **Step launching** ([`StepLauncher`]) -- resolve a step name to a local
//!   executable or a docker image and build its invocation.

pub mod command;
pub mod launcher;
pub mod workspace;

// ---- Re-exports for convenience ----

pub use command::{StepCommand, StepOutput};
pub use launcher::{StepInfo, StepLauncher};
pub use workspace::RunWorkspace;
