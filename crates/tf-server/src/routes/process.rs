//! The request-processing endpoint.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tf_core::RunContext;
use tf_pipeline::{PipelineRun, RunInput, RunRequest};

use crate::context::AppContext;
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub request: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Explicit plan that bypasses step selection.
    #[serde(default)]
    pub plan: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub request: String,
    #[serde(flatten)]
    pub run: PipelineRun,
}

/// POST /process
///
/// Domain failures (empty plan, empty input, unknown step) are reported with
/// status 200 and an `error` field; faults map to an error status.
pub async fn process(
    State(ctx): State<AppContext>,
    Json(body): Json<ProcessRequest>,
) -> Result<Response, AppError> {
    let (request, text) = match (body.request, body.text) {
        (Some(request), Some(text)) if !request.is_empty() && !text.is_empty() => (request, text),
        _ => {
            return Err(AppError::new(tf_core::Error::Validation(
                "Missing request or text".into(),
            )))
        }
    };

    let run_ctx = RunContext::new();
    let mut run_request = RunRequest::new(request.clone(), RunInput::Text(text));
    if let Some(plan) = body.plan {
        run_request = run_request.with_plan(plan);
    }

    match ctx.orchestrator.process_in(&run_ctx, run_request).await {
        Ok(run) => Ok(Json(ProcessResponse { request, run }).into_response()),
        Err(e) if e.is_domain() => {
            tracing::info!(run_id = %run_ctx.run_id().short(), "Request rejected: {e}");
            Ok(Json(json!({ "error": e.to_string(), "request": request })).into_response())
        }
        Err(e) => Err(AppError::new(e).with_run_id(run_ctx.run_id().to_string())),
    }
}
