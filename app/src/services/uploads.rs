//! Raw upload storage with filename sanitization and age-based cleanup.

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::{Duration, SystemTime};

use image::DynamicImage;
use kindle_image::ImageError;
use regex::Regex;

use super::frame_store::write_atomic;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

static RE_UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.\-]").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file part")]
    MissingFile,
    #[error("No selected file")]
    EmptyFilename,
    #[error("Invalid file type")]
    InvalidType,
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
    #[error("Upload not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A decoded upload that has been written to disk.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub filename: String,
    pub image: DynamicImage,
}

/// Whether `filename` carries an allowed image extension.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied filename to a safe flat name.
///
/// Path separators become whitespace, whitespace runs become `_`, every
/// character outside `[A-Za-z0-9_.-]` is dropped, and leading/trailing `.`
/// and `_` are stripped. May return an empty string.
pub fn secure_filename(name: &str) -> String {
    let spaced = name.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = RE_UNSAFE_CHARS.replace_all(&joined, "");
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// On-disk name for an upload whose original name passed `allowed_file`.
///
/// Names that sanitize down to nothing but the extension (e.g. non-Latin
/// stems) get a random stem and the lowercased original extension.
fn stored_name(original_name: &str) -> String {
    let filename = secure_filename(original_name);
    if allowed_file(&filename) {
        return filename;
    }
    let ext = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    format!("{}.{ext}", uuid::Uuid::new_v4())
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    upload_dir: PathBuf,
}

impl UploadStore {
    pub fn new(upload_dir: PathBuf) -> Self {
        Self { upload_dir }
    }

    pub fn upload_dir(&self) -> &PathBuf {
        &self.upload_dir
    }

    /// Validate, decode and persist an upload.
    ///
    /// Nothing is written unless the name is allowed and the data decodes.
    pub fn save(&self, original_name: &str, data: &[u8]) -> Result<StoredUpload, UploadError> {
        if original_name.is_empty() {
            return Err(UploadError::EmptyFilename);
        }
        if !allowed_file(original_name) {
            return Err(UploadError::InvalidType);
        }
        let filename = stored_name(original_name);
        let image = kindle_image::decode(data)?;

        std::fs::create_dir_all(&self.upload_dir)?;
        write_atomic(&self.upload_dir.join(&filename), data)?;
        tracing::info!(
            filename = %filename,
            width = image.width(),
            height = image.height(),
            bytes = data.len(),
            "Upload saved"
        );

        Ok(StoredUpload { filename, image })
    }

    /// Read back a previously saved upload by its sanitized name.
    pub fn open(&self, filename: &str) -> Result<Vec<u8>, UploadError> {
        if filename.is_empty() || secure_filename(filename) != filename {
            return Err(UploadError::InvalidFilename(filename.to_string()));
        }
        match std::fs::read(self.upload_dir.join(filename)) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(UploadError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete uploads last modified more than `max_age` ago.
    pub fn cleanup_older_than(&self, max_age: Duration) -> Result<u64, UploadError> {
        let entries = match std::fs::read_dir(&self.upload_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let now = SystemTime::now();
        let mut deleted = 0u64;

        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(meta) = entry.metadata() else { continue };
            if !meta.is_file() {
                continue;
            }
            let expired = meta
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age > max_age);
            if expired {
                match std::fs::remove_file(&path) {
                    Ok(()) => deleted += 1,
                    Err(e) => tracing::warn!(path = %path.display(), "Failed to delete upload: {e}"),
                }
            }
        }

        tracing::info!(deleted, "Expired uploads cleaned up");
        Ok(deleted)
    }
}
