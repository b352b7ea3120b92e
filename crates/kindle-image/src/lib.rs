//! Image processing for e-ink frame output.
//!
//! Provides decoding/encoding, rotation with canvas expansion, percentage
//! cropping, and the fixed-resolution grayscale conversion used for
//! Kindle-style displays.

pub mod codec;
pub mod crop;
pub mod error;
pub mod kindle;
pub mod rotate;

// Re-exports for convenience
pub use codec::{OutputFormat, data_uri, decode, encode, encode_jpeg, encode_png};
pub use crop::{CropSpec, PixelRect, crop};
pub use error::ImageError;
pub use kindle::format_for_kindle;
pub use rotate::{RotationDirection, rotate, rotate_ui};

/// Default Kindle frame width in pixels.
pub const TARGET_WIDTH: u32 = 600;

/// Default Kindle frame height in pixels.
pub const TARGET_HEIGHT: u32 = 800;

/// Default JPEG quality for previews.
pub const PREVIEW_QUALITY: u8 = 85;
