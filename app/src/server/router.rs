use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use super::{api, assets};
use crate::app::SharedState;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    let body_limit = state.config().max_upload_bytes;

    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        // --- Frame (polled by the device) ---
        .route("/frame.png", get(api::frame::get_frame))
        // --- Upload / process ---
        .merge(build_upload_routes(body_limit))
        // --- UI ---
        .route("/", get(assets::index))
        .fallback(assets::fallback)
        // --- Middleware ---
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn build_upload_routes(body_limit: usize) -> Router<SharedState> {
    Router::new()
        .route("/upload", post(api::upload::upload_file))
        .route("/process", post(api::process::process_image))
        .layer(DefaultBodyLimit::max(body_limit))
}

async fn status_handler(
    axum::extract::State(state): axum::extract::State<SharedState>,
) -> axum::Json<serde_json::Value> {
    let config = state.config();
    let frame = match state.frame_store().frame_info() {
        Ok(Some(info)) => json!({
            "available": true,
            "size": info.size,
            "updated_at": info.updated_at,
        }),
        Ok(None) => json!({ "available": false }),
        Err(e) => {
            tracing::warn!("Failed to read frame info: {e}");
            json!({ "available": false })
        }
    };

    axum::Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "target": {
            "width": config.target_width,
            "height": config.target_height,
        },
        "frame": frame,
    }))
}
