//! Frame processing pipeline.
//!
//! Received -> Decoded -> [Rotated] -> [Cropped] -> Formatted -> Persisted
//! -> PreviewEncoded. Any failure short-circuits; the frame store is only
//! written after every transform succeeded.

use std::sync::Arc;

use image::DynamicImage;
use kindle_image::{CropSpec, ImageError, OutputFormat, RotationDirection};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

use super::frame_store::{FrameStore, FrameStoreError, persist_frame};
use super::uploads::{UploadError, UploadStore};

/// Mode (a) request: transform a previously uploaded file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessRequest {
    pub filename: String,
    /// Degrees in UI convention.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub crop: Option<CropSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub preview: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(String),
    #[error("Upload not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Store(#[from] FrameStoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// HTTP status for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Image(e) if e.is_client_error() => 400,
            Self::Image(_) | Self::Store(_) | Self::Io(_) => 500,
        }
    }
}

impl From<UploadError> for PipelineError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::NotFound(name) => Self::NotFound(name),
            UploadError::Image(e) => Self::Image(e),
            UploadError::Io(e) => Self::Io(e),
            other => Self::Validation(other.to_string()),
        }
    }
}

/// Output parameters taken from the application config.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub target_width: u32,
    pub target_height: u32,
    pub preview_quality: u8,
    pub rotation_direction: RotationDirection,
}

impl From<&AppConfig> for PipelineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            target_width: config.target_width,
            target_height: config.target_height,
            preview_quality: config.preview_quality,
            rotation_direction: config.rotation_direction,
        }
    }
}

/// Everything one process request needs. Cheap to clone into a worker.
#[derive(Clone)]
pub struct Pipeline {
    uploads: UploadStore,
    store: Arc<dyn FrameStore>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(uploads: UploadStore, store: Arc<dyn FrameStore>, settings: PipelineSettings) -> Self {
        Self {
            uploads,
            store,
            settings,
        }
    }

    /// Rotate, crop and format a stored upload, then persist it as the frame.
    pub fn process_upload(&self, req: &ProcessRequest) -> Result<ProcessOutcome, PipelineError> {
        if !req.rotation.is_finite() {
            return Err(PipelineError::Validation("rotation must be a finite number".into()));
        }
        if let Some(crop) = &req.crop {
            crop.validate().map_err(PipelineError::Validation)?;
        }

        let data = self.uploads.open(&req.filename)?;
        let mut img = kindle_image::decode(&data)?;

        if req.rotation != 0.0 {
            img = kindle_image::rotate_ui(&img, req.rotation, self.settings.rotation_direction);
        }
        if let Some(crop) = &req.crop {
            img = kindle_image::crop(&img, crop)?;
        }

        tracing::debug!(
            filename = %req.filename,
            rotation = req.rotation,
            cropped = req.crop.is_some(),
            "Geometry applied"
        );
        self.finish(&img)
    }

    /// Format an already cropped/rotated image blob and persist it.
    pub fn process_blob(&self, data: &[u8]) -> Result<ProcessOutcome, PipelineError> {
        let img = kindle_image::decode(data)?;
        self.finish(&img)
    }

    fn finish(&self, img: &DynamicImage) -> Result<ProcessOutcome, PipelineError> {
        let s = &self.settings;
        let frame = kindle_image::format_for_kindle(img, s.target_width, s.target_height);
        persist_frame(self.store.as_ref(), &frame)?;

        let (width, height) = frame.dimensions();
        let preview = kindle_image::encode_jpeg(&DynamicImage::ImageLuma8(frame), s.preview_quality)?;
        Ok(ProcessOutcome {
            preview: kindle_image::data_uri(OutputFormat::Jpeg, &preview),
            width,
            height,
        })
    }
}
