//! Percentage-relative cropping.
//!
//! Crop rectangles are expressed as percentages of the image's current
//! dimensions and resolved to pixels by truncation.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ImageError;

/// Slack for percentages computed from pixel counts on the client.
const PERCENT_EPSILON: f64 = 1e-9;

/// Crop rectangle in percent (0-100) of the current image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropSpec {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Crop rectangle resolved to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CropSpec {
    /// The crop that keeps the whole image.
    pub const FULL: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 100.0,
    };

    /// Check that the rectangle lies within 0-100 on both axes.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(format!("crop {name} must be a finite number"));
            }
        }
        if self.x < 0.0 || self.y < 0.0 {
            return Err("crop x and y must not be negative".into());
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err("crop width and height must be positive".into());
        }
        if self.x + self.width > 100.0 + PERCENT_EPSILON {
            return Err("crop x + width must not exceed 100".into());
        }
        if self.y + self.height > 100.0 + PERCENT_EPSILON {
            return Err("crop y + height must not exceed 100".into());
        }
        Ok(())
    }

    /// Resolve to pixel bounds against an image of `width x height`.
    pub fn resolve(&self, width: u32, height: u32) -> Result<PixelRect, ImageError> {
        self.validate().map_err(ImageError::Crop)?;

        let rect = PixelRect {
            left: percent_of(self.x, width),
            top: percent_of(self.y, height),
            width: percent_of(self.width, width),
            height: percent_of(self.height, height),
        };

        if rect.width == 0 || rect.height == 0 {
            return Err(ImageError::Crop(format!(
                "crop resolves to an empty {}x{} region",
                rect.width, rect.height
            )));
        }
        if u64::from(rect.left) + u64::from(rect.width) > u64::from(width)
            || u64::from(rect.top) + u64::from(rect.height) > u64::from(height)
        {
            return Err(ImageError::Crop(format!(
                "crop {}x{}+{}+{} exceeds {width}x{height} image",
                rect.width, rect.height, rect.left, rect.top
            )));
        }
        Ok(rect)
    }
}

fn percent_of(percent: f64, dimension: u32) -> u32 {
    (percent / 100.0 * f64::from(dimension) + PERCENT_EPSILON).floor() as u32
}

/// Extract the region described by `spec` from the image.
pub fn crop(img: &DynamicImage, spec: &CropSpec) -> Result<DynamicImage, ImageError> {
    let rect = spec.resolve(img.width(), img.height())?;
    debug!(
        src_w = img.width(),
        src_h = img.height(),
        left = rect.left,
        top = rect.top,
        width = rect.width,
        height = rect.height,
        "Cropping image"
    );
    Ok(img.crop_imm(rect.left, rect.top, rect.width, rect.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotate::rotate;
    use image::{GenericImageView, GrayImage, Luma};

    /// Each pixel encodes its own coordinates so regions can be compared.
    fn coordinate_image(width: u32, height: u32) -> DynamicImage {
        let img = GrayImage::from_fn(width, height, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
        DynamicImage::ImageLuma8(img)
    }

    fn spec(x: f64, y: f64, width: f64, height: f64) -> CropSpec {
        CropSpec { x, y, width, height }
    }

    #[test]
    fn test_full_crop_is_identity() {
        let img = coordinate_image(37, 23);
        let cropped = crop(&img, &CropSpec::FULL).unwrap();

        assert_eq!(cropped.dimensions(), (37, 23));
        assert_eq!(cropped.as_bytes(), img.as_bytes());
    }

    #[test]
    fn test_center_crop_bounds() {
        let rect = spec(25.0, 25.0, 50.0, 50.0).resolve(1200, 1600).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                left: 300,
                top: 400,
                width: 600,
                height: 800
            }
        );
    }

    #[test]
    fn test_resolution_truncates() {
        // 33.3% of 10 = 3.33 -> 3, 66.6% of 10 = 6.66 -> 6
        let rect = spec(33.3, 0.0, 66.6, 100.0).resolve(10, 10).unwrap();
        assert_eq!(rect.left, 3);
        assert_eq!(rect.width, 6);
        assert_eq!(rect.height, 10);
    }

    #[test]
    fn test_crop_extracts_region() {
        let img = coordinate_image(20, 10);
        let cropped = crop(&img, &spec(50.0, 50.0, 50.0, 50.0)).unwrap();

        assert_eq!(cropped.dimensions(), (10, 5));
        let src = img.to_luma8();
        let out = cropped.to_luma8();
        for y in 0..5 {
            for x in 0..10 {
                assert_eq!(out.get_pixel(x, y), src.get_pixel(x + 10, y + 5));
            }
        }
    }

    #[test]
    fn test_rotate_then_crop_matches_manual_slice() {
        let img = coordinate_image(30, 20);
        let rotated = rotate(&img, 90.0);
        assert_eq!(rotated.dimensions(), (20, 30));

        let cropped = crop(&rotated, &spec(10.0, 20.0, 45.0, 50.0)).unwrap();

        // Truncated against the rotated 20x30 canvas: 2, 6, 9, 15
        let manual = rotated.crop_imm(2, 6, 9, 15);
        assert_eq!(cropped.dimensions(), (9, 15));
        assert_eq!(cropped.as_bytes(), manual.as_bytes());
    }

    #[test]
    fn test_edge_flush_crop_from_pixel_fractions() {
        // 2/11 + 9/11 sums to slightly above 100 in floating point.
        let flush = spec(2.0 / 11.0 * 100.0, 0.0, 9.0 / 11.0 * 100.0, 100.0);
        assert!(flush.x + flush.width > 100.0);
        assert!(flush.validate().is_ok());

        let img = coordinate_image(11, 11);
        let cropped = crop(&img, &flush).unwrap();
        assert_eq!(cropped.dimensions(), (9, 11));
        assert_eq!(cropped.as_bytes(), img.crop_imm(2, 0, 9, 11).as_bytes());
    }

    #[test]
    fn test_pixel_fractions_resolve_to_exact_pixels() {
        // 29/100 * 100 evaluates to 28.999... before truncation.
        let rect = spec(29.0, 0.0, 71.0, 100.0).resolve(100, 7).unwrap();
        assert_eq!((rect.left, rect.width), (29, 71));

        for width in [7u32, 11, 13, 600, 1201] {
            for left in 0..width.min(50) {
                let n = width - left;
                let s = spec(
                    f64::from(left) / f64::from(width) * 100.0,
                    0.0,
                    f64::from(n) / f64::from(width) * 100.0,
                    100.0,
                );
                let rect = s.resolve(width, 1).unwrap();
                assert_eq!((rect.left, rect.width), (left, n), "{left}+{n} of {width}");
            }
        }
    }

    #[test]
    fn test_rejects_out_of_range_percentages() {
        assert!(spec(-1.0, 0.0, 50.0, 50.0).validate().is_err());
        assert!(spec(60.0, 0.0, 50.0, 50.0).validate().is_err());
        assert!(spec(0.0, 60.0, 50.0, 50.0).validate().is_err());
        assert!(spec(0.0, 0.0, 0.0, 50.0).validate().is_err());
        assert!(spec(0.0, 0.0, f64::NAN, 50.0).validate().is_err());
        assert!(spec(0.0, 0.0, 50.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_rejects_empty_resolved_region() {
        // 1% of 10 pixels truncates to zero.
        let err = crop(&coordinate_image(10, 10), &spec(0.0, 0.0, 1.0, 50.0)).unwrap_err();
        assert!(matches!(err, ImageError::Crop(_)));
    }
}
