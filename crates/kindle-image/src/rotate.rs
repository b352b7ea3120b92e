//! Image rotation with canvas expansion.
//!
//! Quarter turns are lossless; any other angle is resampled with bilinear
//! interpolation onto a canvas large enough to hold every rotated corner.

use std::fmt;
use std::str::FromStr;

use image::imageops;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fill for canvas area not covered by the rotated source.
const FILL: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Angles closer than this to a quarter turn take the lossless path.
const QUARTER_TURN_EPSILON: f64 = 1e-6;

/// How a UI rotation angle maps onto the pixel buffer.
///
/// `Clockwise` means a positive UI angle turns the picture clockwise on
/// screen, `Counterclockwise` inverts that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationDirection {
    #[default]
    Clockwise,
    Counterclockwise,
}

impl RotationDirection {
    /// Clockwise buffer degrees for a UI angle.
    pub fn to_buffer_degrees(self, ui_degrees: f64) -> f64 {
        match self {
            Self::Clockwise => ui_degrees,
            Self::Counterclockwise => -ui_degrees,
        }
    }
}

impl FromStr for RotationDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clockwise" | "cw" => Ok(Self::Clockwise),
            "counterclockwise" | "ccw" => Ok(Self::Counterclockwise),
            other => Err(format!("unknown rotation direction '{other}'")),
        }
    }
}

impl fmt::Display for RotationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clockwise => f.write_str("clockwise"),
            Self::Counterclockwise => f.write_str("counterclockwise"),
        }
    }
}

/// Rotate by a UI angle, honoring the configured direction mapping.
pub fn rotate_ui(img: &DynamicImage, ui_degrees: f64, direction: RotationDirection) -> DynamicImage {
    rotate(img, direction.to_buffer_degrees(ui_degrees))
}

/// Rotate an image clockwise by `degrees`.
///
/// The output canvas grows to fit the rotated content. A rotation that is a
/// whole number of turns returns the input unchanged.
pub fn rotate(img: &DynamicImage, degrees: f64) -> DynamicImage {
    let normalized = degrees.rem_euclid(360.0);
    let (w, h) = (img.width(), img.height());

    if normalized < QUARTER_TURN_EPSILON || 360.0 - normalized < QUARTER_TURN_EPSILON {
        debug!(w, h, degrees, "Rotation is a whole turn, skipping");
        return img.clone();
    }
    if (normalized - 90.0).abs() < QUARTER_TURN_EPSILON {
        debug!(w, h, "Rotating image 90 degrees");
        return img.rotate90();
    }
    if (normalized - 180.0).abs() < QUARTER_TURN_EPSILON {
        debug!(w, h, "Rotating image 180 degrees");
        return img.rotate180();
    }
    if (normalized - 270.0).abs() < QUARTER_TURN_EPSILON {
        debug!(w, h, "Rotating image 270 degrees");
        return img.rotate270();
    }

    let (out_w, out_h) = expanded_size(w, h, normalized);
    debug!(w, h, degrees = normalized, out_w, out_h, "Rotating image with canvas expansion");

    // Work on a canvas that holds both the source and the rotated bounds so
    // the rotation about the center never clips.
    let work_w = out_w.max(w);
    let work_h = out_h.max(h);
    let mut canvas = RgbaImage::from_pixel(work_w, work_h, FILL);
    imageops::replace(
        &mut canvas,
        &img.to_rgba8(),
        i64::from((work_w - w) / 2),
        i64::from((work_h - h) / 2),
    );

    let rotated = rotate_about_center(
        &canvas,
        normalized.to_radians() as f32,
        Interpolation::Bilinear,
        FILL,
    );

    let left = (work_w - out_w) / 2;
    let top = (work_h - out_h) / 2;
    let cropped = imageops::crop_imm(&rotated, left, top, out_w, out_h).to_image();
    DynamicImage::ImageRgba8(cropped)
}

/// Bounding box of a `w x h` rectangle rotated by `degrees`.
fn expanded_size(w: u32, h: u32, degrees: f64) -> (u32, u32) {
    let radians = degrees.to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    let (w, h) = (f64::from(w), f64::from(h));

    let out_w = (w * cos + h * sin).ceil() as u32;
    let out_h = (w * sin + h * cos).ceil() as u32;
    (out_w.max(1), out_h.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, GrayImage, Luma, Pixel};

    /// Create a test image with unique pixel values at corners.
    /// Top-left=10, Top-right=20, Bottom-left=30, Bottom-right=40
    fn create_corner_image(width: u32, height: u32) -> DynamicImage {
        let mut img = GrayImage::from_pixel(width, height, Luma([128]));
        img.put_pixel(0, 0, Luma([10])); // top-left
        img.put_pixel(width - 1, 0, Luma([20])); // top-right
        img.put_pixel(0, height - 1, Luma([30])); // bottom-left
        img.put_pixel(width - 1, height - 1, Luma([40])); // bottom-right
        DynamicImage::ImageLuma8(img)
    }

    fn pixel_value(img: &DynamicImage, x: u32, y: u32) -> u8 {
        img.to_luma8().get_pixel(x, y).channels()[0]
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        let img = create_corner_image(6, 3);
        let rotated = rotate(&img, 0.0);

        assert_eq!(rotated.dimensions(), (6, 3));
        assert_eq!(rotated.as_bytes(), img.as_bytes());
        assert_eq!(rotated.color(), img.color());
    }

    #[test]
    fn test_full_turns_are_identity() {
        let img = create_corner_image(4, 5);
        assert_eq!(rotate(&img, 360.0).as_bytes(), img.as_bytes());
        assert_eq!(rotate(&img, -720.0).as_bytes(), img.as_bytes());
    }

    #[test]
    fn test_rotate_90_is_clockwise() {
        let img = create_corner_image(6, 3);
        let rotated = rotate(&img, 90.0);

        assert_eq!(rotated.dimensions(), (3, 6));
        // Clockwise: top-left moves to top-right, bottom-left to top-left.
        assert_eq!(pixel_value(&rotated, 2, 0), 10);
        assert_eq!(pixel_value(&rotated, 2, 5), 20);
        assert_eq!(pixel_value(&rotated, 0, 0), 30);
        assert_eq!(pixel_value(&rotated, 0, 5), 40);
    }

    #[test]
    fn test_negative_quarter_turn_matches_270() {
        let img = create_corner_image(6, 3);
        let a = rotate(&img, -90.0);
        let b = rotate(&img, 270.0);

        assert_eq!(a.dimensions(), (3, 6));
        assert_eq!(a.as_bytes(), b.as_bytes());
        // Counterclockwise: top-right moves to top-left.
        assert_eq!(pixel_value(&a, 0, 0), 20);
    }

    #[test]
    fn test_rotate_180_corner_values() {
        let img = create_corner_image(4, 4);
        let rotated = rotate(&img, 180.0);

        assert_eq!(pixel_value(&rotated, 0, 0), 40);
        assert_eq!(pixel_value(&rotated, 3, 0), 30);
        assert_eq!(pixel_value(&rotated, 0, 3), 20);
        assert_eq!(pixel_value(&rotated, 3, 3), 10);
    }

    #[test]
    fn test_arbitrary_angle_expands_canvas() {
        let img = create_corner_image(10, 10);
        let rotated = rotate(&img, 45.0);

        // 10 * cos45 + 10 * sin45 = 14.14 -> 15
        assert_eq!(rotated.dimensions(), (15, 15));
        // Corners of the expanded canvas are uncovered fill.
        assert_eq!(pixel_value(&rotated, 0, 0), 0);
        // Center still carries source content.
        let center = pixel_value(&rotated, 7, 7);
        assert!((120..=136).contains(&center), "center was {center}");
    }

    #[test]
    fn test_thin_image_rotation_fits_bounds() {
        let img = create_corner_image(100, 2);
        let rotated = rotate(&img, 30.0);

        // 100 * cos30 + 2 * sin30 = 87.6 -> 88; 100 * sin30 + 2 * cos30 = 51.7 -> 52
        assert_eq!(rotated.dimensions(), (88, 52));
    }

    #[test]
    fn test_direction_mapping() {
        assert_eq!(RotationDirection::Clockwise.to_buffer_degrees(15.0), 15.0);
        assert_eq!(RotationDirection::Counterclockwise.to_buffer_degrees(15.0), -15.0);

        let img = create_corner_image(6, 3);
        let ccw = rotate_ui(&img, 90.0, RotationDirection::Counterclockwise);
        assert_eq!(ccw.as_bytes(), rotate(&img, 270.0).as_bytes());
    }

    #[test]
    fn test_direction_parse_and_display() {
        assert_eq!(
            "clockwise".parse::<RotationDirection>(),
            Ok(RotationDirection::Clockwise)
        );
        assert_eq!(
            " CCW ".parse::<RotationDirection>(),
            Ok(RotationDirection::Counterclockwise)
        );
        assert!("sideways".parse::<RotationDirection>().is_err());
        assert_eq!(RotationDirection::Counterclockwise.to_string(), "counterclockwise");
    }
}
