//! The configured step-selection strategy and its output.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tf_core::config::ClassifierConfig;
use tf_core::{RunContext, StepRegistry};
use tracing::Instrument;

use crate::classifier::HttpClassifier;
use crate::heuristic::HeuristicSelector;
use crate::model::ModelBackedSelector;

/// Ordered step names chosen for one request. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionPlan(Vec<String>);

impl ExecutionPlan {
    /// Wrap an ordered list of step names.
    pub fn new(steps: Vec<String>) -> Self {
        Self(steps)
    }

    /// Step names in execution order.
    pub fn steps(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every planned step has the same name.
    pub fn is_uniform(&self) -> bool {
        self.0.windows(2).all(|w| w[0] == w[1])
    }
}

impl<S: Into<String>> FromIterator<S> for ExecutionPlan {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" -> "))
    }
}

/// Which strategy produced a plan. Used for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    /// Keyword matching was the configured strategy.
    Heuristic,
    /// The classifier's answer was used.
    Model,
    /// The classifier failed and keyword matching took over.
    Fallback,
}

/// A plan together with how it was chosen.
#[derive(Debug, Clone)]
pub struct Selection {
    pub plan: ExecutionPlan,
    pub source: SelectionSource,
}

/// Step-selection strategy, fixed for the lifetime of the process.
pub enum Selector {
    /// Deterministic keyword matching.
    Heuristic(HeuristicSelector),
    /// External classifier with keyword-matching fallback.
    ModelBacked(ModelBackedSelector),
}

impl Selector {
    /// Build the strategy described by `config`.
    ///
    /// The model-backed variant is only used when the classifier is enabled
    /// and an API key is available; otherwise selection is heuristic.
    pub fn from_config(config: &ClassifierConfig, registry: StepRegistry) -> Self {
        let heuristic = HeuristicSelector::new(registry);

        if !config.enabled {
            tracing::info!("Step selection: heuristic");
            return Selector::Heuristic(heuristic);
        }

        let Some(api_key) = config.resolved_api_key() else {
            tracing::warn!("Classifier enabled but no API key found; using heuristic selection");
            return Selector::Heuristic(heuristic);
        };

        let timeout = Duration::from_secs(config.timeout_secs);
        match HttpClassifier::new(&config.api_url, api_key, &config.model, timeout) {
            Ok(classifier) => {
                tracing::info!("Step selection: model {} at {}", config.model, config.api_url);
                Selector::ModelBacked(ModelBackedSelector::new(
                    Box::new(classifier),
                    heuristic,
                    timeout,
                ))
            }
            Err(e) => {
                tracing::warn!("Failed to build classifier client: {e}; using heuristic selection");
                Selector::Heuristic(heuristic)
            }
        }
    }

    /// Choose a plan for `request`. Never fails.
    pub async fn select(&self, ctx: &RunContext, request: &str, sample: &str) -> Selection {
        let selection = async {
            match self {
                Selector::Heuristic(h) => Selection {
                    plan: h.select(request),
                    source: SelectionSource::Heuristic,
                },
                Selector::ModelBacked(m) => m.select(request, sample).await,
            }
        }
        .instrument(ctx.span().clone())
        .await;

        ctx.span().in_scope(|| {
            tracing::info!(
                source = ?selection.source,
                "Execution plan: {}",
                selection.plan
            );
        });
        selection
    }

    /// The registry plans are validated against.
    pub fn registry(&self) -> &StepRegistry {
        match self {
            Selector::Heuristic(h) => h.registry(),
            Selector::ModelBacked(m) => m.registry(),
        }
    }

    /// Short strategy name.
    pub fn kind(&self) -> &'static str {
        match self {
            Selector::Heuristic(_) => "heuristic",
            Selector::ModelBacked(_) => "model",
        }
    }
}
