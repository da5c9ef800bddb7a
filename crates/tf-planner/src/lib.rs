//! # tf-planner
//!
//! Turns a free-text request into something the executor can run.
//!
//! This crate provides:
//!
//! - **[`extract_parameters`]** -- pure parsing of recognized options
//!   (target summary length, parallel hint) out of the request text.
//! - **[`HeuristicSelector`]** -- deterministic keyword matching that always
//!   produces a plan.
//! - **[`ModelBackedSelector`]** -- delegates to a [`Classifier`] and falls
//!   back to the heuristic on any failure.
//! - **[`Selector`]** -- the configured strategy, chosen once at startup.

pub mod classifier;
pub mod heuristic;
pub mod model;
pub mod params;
pub mod selector;

// Re-export key types at the crate root.
pub use classifier::{Classifier, ClassifierPrompt, HttpClassifier};
pub use heuristic::HeuristicSelector;
pub use model::ModelBackedSelector;
pub use params::{extract_parameters, ExecutionParameters};
pub use selector::{ExecutionPlan, Selection, SelectionSource, Selector};
