//! Source image upload API.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use kindle_image::OutputFormat;
use serde_json::json;

use crate::app::SharedState;
use crate::services::pipeline::PipelineError;
use crate::services::uploads::UploadError;

use super::{ApiError, ApiResult, err_json, run_blocking};

pub(super) fn multipart_err(e: MultipartError) -> ApiError {
    err_json(e.status().as_u16(), &e.body_text())
}

/// POST /upload – Store a source image and return a preview
pub async fn upload_file(State(state): State<SharedState>, mut multipart: Multipart) -> ApiResult {
    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        if filename.is_empty() {
            return Err(super::pipeline_err(UploadError::EmptyFilename.into()));
        }
        let data = field.bytes().await.map_err(multipart_err)?;

        let uploads = state.uploads().clone();
        let quality = state.config().preview_quality;
        let (stored, preview) = run_blocking(move || {
            let stored = uploads.save(&filename, &data)?;
            let preview = kindle_image::encode_jpeg(&stored.image, quality)?;
            Ok::<_, PipelineError>((stored, preview))
        })
        .await?;

        return Ok(Json(json!({
            "success": true,
            "filename": stored.filename,
            "width": stored.image.width(),
            "height": stored.image.height(),
            "preview": kindle_image::data_uri(OutputFormat::Jpeg, &preview),
        })));
    }

    Err(super::pipeline_err(UploadError::MissingFile.into()))
}
