//! Storage for the single "current frame" served to the e-ink device.
//!
//! Every write fully replaces the previous frame. The file-backed store
//! writes to a temporary file in the same directory and renames it over the
//! frame path, so readers see either the old or the new frame, never a
//! partial one. Concurrent writers race: whichever rename lands last wins.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use image::{DynamicImage, GrayImage};
use kindle_image::ImageError;
use serde::Serialize;

pub const FRAME_FILENAME: &str = "frame.png";

#[derive(Debug, thiserror::Error)]
pub enum FrameStoreError {
    #[error("No frame has been produced yet")]
    NotFound,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] ImageError),
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameInfo {
    pub size: u64,
    pub updated_at: Option<String>,
}

/// A content store holding exactly one encoded frame.
pub trait FrameStore: Send + Sync {
    /// Replace the current frame with `png`.
    fn write_frame(&self, png: &[u8]) -> Result<(), FrameStoreError>;

    /// Encoded bytes of the current frame.
    fn read_frame(&self) -> Result<Vec<u8>, FrameStoreError>;

    /// Size and modification time, or `None` if no frame exists.
    fn frame_info(&self) -> Result<Option<FrameInfo>, FrameStoreError>;
}

/// Encode `frame` as PNG and store it. Returns the encoded bytes.
pub fn persist_frame(store: &dyn FrameStore, frame: &GrayImage) -> Result<Vec<u8>, FrameStoreError> {
    let png = kindle_image::encode_png(&DynamicImage::ImageLuma8(frame.clone()))?;
    store.write_frame(&png)?;
    tracing::info!(
        width = frame.width(),
        height = frame.height(),
        bytes = png.len(),
        "Frame persisted"
    );
    Ok(png)
}

fn format_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

// --- File-backed ---

#[derive(Debug, Clone)]
pub struct FileFrameStore {
    output_dir: PathBuf,
}

impl FileFrameStore {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn frame_path(&self) -> PathBuf {
        self.output_dir.join(FRAME_FILENAME)
    }
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

/// Replace `path` with `data` via a synced sibling temp file and a rename.
///
/// Readers of `path` see either the previous content or `data`, never a mix.
/// The temp name starts with `.` and ends in `.tmp`.
pub fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dir.join(format!(".{name}.{}.tmp", uuid::Uuid::new_v4()));

    if let Err(e) = write_synced(&tmp, data) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

impl FrameStore for FileFrameStore {
    fn write_frame(&self, png: &[u8]) -> Result<(), FrameStoreError> {
        std::fs::create_dir_all(&self.output_dir)?;

        write_atomic(&self.frame_path(), png)?;

        tracing::debug!(path = %self.frame_path().display(), bytes = png.len(), "Frame file replaced");
        Ok(())
    }

    fn read_frame(&self) -> Result<Vec<u8>, FrameStoreError> {
        match std::fs::read(self.frame_path()) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FrameStoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    fn frame_info(&self) -> Result<Option<FrameInfo>, FrameStoreError> {
        let meta = match std::fs::metadata(self.frame_path()) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let updated_at = meta.modified().ok().map(|t| format_time(t.into()));
        Ok(Some(FrameInfo {
            size: meta.len(),
            updated_at,
        }))
    }
}

// --- In-memory ---

/// Frame store kept in process memory. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryFrameStore {
    frame: RwLock<Option<(Vec<u8>, DateTime<Utc>)>>,
}

impl MemoryFrameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameStore for MemoryFrameStore {
    fn write_frame(&self, png: &[u8]) -> Result<(), FrameStoreError> {
        let mut frame = self.frame.write().unwrap_or_else(PoisonError::into_inner);
        *frame = Some((png.to_vec(), Utc::now()));
        Ok(())
    }

    fn read_frame(&self) -> Result<Vec<u8>, FrameStoreError> {
        let frame = self.frame.read().unwrap_or_else(PoisonError::into_inner);
        frame
            .as_ref()
            .map(|(data, _)| data.clone())
            .ok_or(FrameStoreError::NotFound)
    }

    fn frame_info(&self) -> Result<Option<FrameInfo>, FrameStoreError> {
        let frame = self.frame.read().unwrap_or_else(PoisonError::into_inner);
        Ok(frame.as_ref().map(|(data, at)| FrameInfo {
            size: data.len() as u64,
            updated_at: Some(format_time(*at)),
        }))
    }
}
