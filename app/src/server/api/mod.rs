//! REST API handlers.

pub mod frame;
pub mod process;
pub mod upload;

use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::services::pipeline::PipelineError;

pub type ApiError = (StatusCode, Json<Value>);
pub type ApiResult = Result<Json<Value>, ApiError>;

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> ApiError {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "success": false, "error": message })),
    )
}

/// Map a pipeline failure to its response, logging server-side faults.
pub fn pipeline_err(e: PipelineError) -> ApiError {
    let status = e.status_code();
    if status >= 500 {
        tracing::error!("Pipeline failed: {e}");
    } else {
        tracing::debug!(status, "Request rejected: {e}");
    }
    err_json(status, &e.to_string())
}

/// Run blocking image work on the blocking pool.
pub async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(pipeline_err),
        Err(e) => {
            tracing::error!("Processing worker failed: {e}");
            Err(err_json(500, "Processing worker failed"))
        }
    }
}
