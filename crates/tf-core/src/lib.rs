//! tf-core: shared types, errors, configuration, and the step registry.
//!
//! This crate is the foundational dependency for all other tf-* crates,
//! providing the unified error type, typed run identifiers, application
//! configuration, and the static catalogue of known steps.

pub mod config;
pub mod context;
pub mod error;
pub mod ids;
pub mod registry;

// Re-export the most commonly used items at the crate root.
pub use context::RunContext;
pub use error::{Error, Result};
pub use ids::RunId;
pub use registry::{StepRegistry, StepSpec};
