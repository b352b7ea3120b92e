//! Decoding and encoding between byte streams and pixel buffers.
//!
//! The persisted frame is written as maximally compressed PNG; previews are
//! JPEG to keep response payloads small.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, DynamicImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ImageError;

/// Output encodings supported by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Decode an image from raw bytes, sniffing the format from its content.
///
/// Accepts at least PNG, JPEG, GIF, BMP and WEBP.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    let img = image::load_from_memory(bytes).map_err(ImageError::Decode)?;
    debug!(
        width = img.width(),
        height = img.height(),
        color = ?img.color(),
        "Decoded image"
    );
    Ok(img)
}

/// Encode an image into the requested format.
///
/// `quality` only applies to JPEG and is clamped to 1..=100.
pub fn encode(img: &DynamicImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>, ImageError> {
    match format {
        OutputFormat::Png => encode_png(img),
        OutputFormat::Jpeg => encode_jpeg(img, quality),
    }
}

/// Encode as PNG with maximum compression.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    let encoder = PngEncoder::new_with_quality(
        Cursor::new(&mut buffer),
        CompressionType::Best,
        FilterType::Adaptive,
    );
    img.write_with_encoder(encoder).map_err(ImageError::Encode)?;
    debug!(bytes = buffer.len(), "Encoded PNG");
    Ok(buffer)
}

/// Encode as baseline JPEG. Alpha is dropped; grayscale stays single-channel.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let quality = quality.clamp(1, 100);
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buffer), quality);

    let written = match img.color() {
        ColorType::L8 | ColorType::Rgb8 => img.write_with_encoder(encoder),
        ColorType::La8 | ColorType::L16 | ColorType::La16 => {
            DynamicImage::ImageLuma8(img.to_luma8()).write_with_encoder(encoder)
        }
        _ => DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder),
    };
    written.map_err(ImageError::Encode)?;

    debug!(bytes = buffer.len(), quality, "Encoded JPEG");
    Ok(buffer)
}

/// Render encoded bytes as a `data:` URI for inline previews.
pub fn data_uri(format: OutputFormat, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(bytes))
}
