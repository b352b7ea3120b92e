//! Fixed-resolution grayscale conversion for e-ink frames.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use tracing::debug;

/// Resize to exactly `width x height` and convert to 8-bit grayscale.
///
/// The aspect ratio is not preserved: the image is stretched to fill the
/// target. Uses Lanczos3 filtering; skips resampling when the input already
/// has the target size.
pub fn format_for_kindle(img: &DynamicImage, width: u32, height: u32) -> GrayImage {
    let (orig_w, orig_h) = (img.width(), img.height());

    if (orig_w, orig_h) == (width, height) {
        debug!(width, height, "Image already at target size, skipping resize");
        return img.to_luma8();
    }

    debug!(
        orig_w,
        orig_h,
        new_width = width,
        new_height = height,
        "Resizing image to Kindle frame"
    );

    img.resize_exact(width, height, FilterType::Lanczos3).to_luma8()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    fn create_rgb_image(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn test_output_is_exact_target_size() {
        for (w, h) in [(1200, 1600), (1920, 1080), (10, 3000), (1, 1)] {
            let img = create_rgb_image(w, h, [200, 100, 50]);
            let out = format_for_kindle(&img, crate::TARGET_WIDTH, crate::TARGET_HEIGHT);
            assert_eq!(out.dimensions(), (600, 800), "input {w}x{h}");
        }
    }

    #[test]
    fn test_output_is_single_channel() {
        let img = create_rgb_image(64, 48, [10, 20, 30]);
        let out = DynamicImage::ImageLuma8(format_for_kindle(&img, 30, 40));
        assert_eq!(out.color(), image::ColorType::L8);
    }

    #[test]
    fn test_luminance_weighting() {
        // Green contributes far more to luminance than blue.
        let green = format_for_kindle(&create_rgb_image(4, 4, [0, 255, 0]), 4, 4);
        let blue = format_for_kindle(&create_rgb_image(4, 4, [0, 0, 255]), 4, 4);
        assert!(green.get_pixel(0, 0).0[0] > blue.get_pixel(0, 0).0[0]);

        let white = format_for_kindle(&create_rgb_image(4, 4, [255, 255, 255]), 4, 4);
        assert_eq!(white.get_pixel(2, 2).0[0], 255);
    }

    #[test]
    fn test_same_size_skips_resample() {
        let gray = GrayImage::from_fn(6, 8, |x, y| Luma([(x * 10 + y) as u8]));
        let out = format_for_kindle(&DynamicImage::ImageLuma8(gray.clone()), 6, 8);
        assert_eq!(out, gray);
    }

    #[test]
    fn test_stretches_instead_of_letterboxing() {
        // A uniform landscape source stays uniform after stretching to portrait.
        let img = create_rgb_image(800, 200, [128, 128, 128]);
        let out = format_for_kindle(&img, 60, 80);
        assert!(out.pixels().all(|p| (126..=130).contains(&p.0[0])));
    }

    #[test]
    fn test_alpha_input_is_flattened() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 0])));
        let out = format_for_kindle(&img, 5, 5);
        assert_eq!(out.dimensions(), (5, 5));
    }
}
