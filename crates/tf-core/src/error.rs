//! Unified error type for textflow.
//!
//! All crates funnel their failures into [`Error`]. Variants split into two
//! families: *domain* errors ([`Error::is_domain`]) that a front end reports
//! in-band alongside an otherwise successful response, and faults that abort
//! the request. [`Error::http_status`] derives a status code for either.

/// Unified error type covering all failure modes in textflow.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input text was missing, empty, or could not be read.
    #[error("{0}")]
    Input(String),

    /// No steps could be resolved for the request.
    #[error("Could not determine which steps to run")]
    PlanEmpty,

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The external classifier failed or returned an unusable answer.
    ///
    /// Only ever observed inside the model-backed selector, which converts
    /// it into a heuristic fallback.
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// A single step failed (non-zero exit, spawn failure, I/O fault).
    #[error("Step error [{step}]: {message}")]
    Step {
        /// Name of the step that failed.
        step: String,
        /// Captured diagnostic text.
        message: String,
    },

    /// The per-run staging area could not be prepared.
    #[error("Staging error: {0}")]
    Staging(String),

    /// Configuration could not be parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error is a domain-level orchestration outcome rather
    /// than a fault.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Error::Input(_) | Error::PlanEmpty | Error::Validation(_)
        )
    }

    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Input(_) => 400,
            Error::PlanEmpty => 422,
            Error::Validation(_) => 400,
            Error::Classifier(_) => 502,
            Error::Step { .. } => 502,
            Error::Staging(_) => 500,
            Error::Config(_) => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for the variant.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Input(_) => "input_error",
            Error::PlanEmpty => "plan_empty",
            Error::Validation(_) => "validation_error",
            Error::Classifier(_) => "classifier_error",
            Error::Step { .. } => "step_error",
            Error::Staging(_) => "staging_error",
            Error::Config(_) => "config_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::Step`].
    pub fn step(step: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Step {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Input`].
    pub fn input(message: impl Into<String>) -> Self {
        Error::Input(message.into())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
