use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("Invalid crop: {0}")]
    Crop(String),
}

impl ImageError {
    /// Whether the failure was caused by client-supplied data.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Crop(_))
    }
}
