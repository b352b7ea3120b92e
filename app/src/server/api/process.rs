//! Frame processing API.
//!
//! Accepts either a JSON body referencing a previous upload (with rotation
//! and crop applied server-side) or a multipart `croppedImage` blob that was
//! already transformed by the client.

use axum::Json;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header;
use serde_json::json;

use crate::app::SharedState;
use crate::services::pipeline::ProcessRequest;

use super::upload::multipart_err;
use super::{ApiError, ApiResult, err_json, run_blocking};

const BLOB_FIELD: &str = "croppedImage";

/// POST /process – Transform an image into the current frame
pub async fn process_image(State(state): State<SharedState>, request: Request) -> ApiResult {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();
    let pipeline = state.pipeline();

    let outcome = if content_type.starts_with("application/json") {
        let Json(req) = Json::<ProcessRequest>::from_request(request, &state)
            .await
            .map_err(|e| err_json(e.status().as_u16(), &e.body_text()))?;
        run_blocking(move || pipeline.process_upload(&req)).await?
    } else if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| err_json(e.status().as_u16(), &e.body_text()))?;
        let data = read_blob(&mut multipart).await?;
        run_blocking(move || pipeline.process_blob(&data)).await?
    } else {
        return Err(err_json(
            415,
            "Expected application/json or multipart/form-data",
        ));
    };

    Ok(Json(json!({
        "success": true,
        "preview": outcome.preview,
        "width": outcome.width,
        "height": outcome.height,
    })))
}

async fn read_blob(multipart: &mut Multipart) -> Result<axum::body::Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        if field.name() == Some(BLOB_FIELD) {
            return field.bytes().await.map_err(multipart_err);
        }
    }
    Err(err_json(400, "No cropped image provided"))
}
