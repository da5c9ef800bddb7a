//! Shared state for route handlers.

use std::sync::Arc;

use tf_core::config::Config;
use tf_pipeline::Orchestrator;

/// State shared across all route handlers via Axum state.
#[derive(Clone)]
pub struct AppContext {
    pub orchestrator: Arc<Orchestrator>,
    pub config: Arc<Config>,
}

impl AppContext {
    /// Build the orchestrator described by `config`.
    pub fn new(config: Config) -> Self {
        let orchestrator = Orchestrator::from_config(&config);
        Self {
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
        }
    }
}
