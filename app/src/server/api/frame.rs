//! Current frame serving API.

use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::app::SharedState;
use crate::services::frame_store::FrameStoreError;

/// GET /frame.png – Serve the latest frame for the e-ink device
pub async fn get_frame(State(state): State<SharedState>) -> Response {
    match state.frame_store().read_frame() {
        Ok(data) => {
            let cache = format!("public, max-age={}", state.config().frame_cache_seconds);
            Response::builder()
                .header(header::CONTENT_TYPE, "image/png")
                .header(header::CACHE_CONTROL, cache)
                .body(Body::from(data))
                .unwrap_or_else(|e| plain(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
        Err(FrameStoreError::NotFound) => plain(StatusCode::NOT_FOUND, "No image available".into()),
        Err(e) => {
            tracing::error!("Failed to read frame: {e}");
            plain(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read frame".into())
        }
    }
}

fn plain(status: StatusCode, message: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message,
    )
        .into_response()
}
