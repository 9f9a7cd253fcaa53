//! Image cropping operations.
//!
//! Crop regions are boxes in image pixels given as `left, top, right, bottom`
//! with `right` and `bottom` exclusive. Two policies exist:
//!
//! - [`CropBox::clamped`] + [`apply_crop`]: the box is forced inside the
//!   image and never empty. Used by the editing session.
//! - [`crop_padded`]: the box is taken as given; areas outside the image
//!   are filled with black. Used by batch processing.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left pixel
//! - (width, height) = one past the bottom-right pixel

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{within_pixel_budget, DecodedImage};

/// Errors from crop operations that do not clamp their input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// The right or bottom edge is not past the left or top edge.
    #[error("Invalid crop box ({left}, {top}, {right}, {bottom}): right/bottom must exceed left/top")]
    InvalidBox {
        left: i64,
        top: i64,
        right: i64,
        bottom: i64,
    },

    /// The box would produce an image past [`MAX_PIXELS`](crate::decode::MAX_PIXELS).
    #[error("Crop box {width}x{height} is too large")]
    TooLarge { width: i64, height: i64 },
}

/// A crop rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl CropBox {
    pub fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build a box from two arbitrary corners, sorting each axis.
    pub fn from_corners(a: (i64, i64), b: (i64, i64)) -> Self {
        Self {
            left: a.0.min(b.0),
            top: a.1.min(b.1),
            right: a.0.max(b.0),
            bottom: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> i64 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i64 {
        self.bottom.saturating_sub(self.top)
    }

    /// Force the box inside a `width` x `height` image.
    ///
    /// Left/top are clamped to `[0, dim-1]`, right/bottom to `[1, dim]`, each
    /// independently. A box that collapses is widened to one pixel instead of
    /// becoming empty, so the result always satisfies
    /// `0 <= left < right <= width` and `0 <= top < bottom <= height` for a
    /// non-empty image.
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        let (left, right) = clamp_axis(self.left, self.right, width as i64);
        let (top, bottom) = clamp_axis(self.top, self.bottom, height as i64);
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// True when the box lies within a `width` x `height` image and is non-empty.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.left >= 0
            && self.top >= 0
            && self.left < self.right
            && self.top < self.bottom
            && self.right <= width as i64
            && self.bottom <= height as i64
    }
}

impl std::fmt::Display for CropBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

fn clamp_axis(low: i64, high: i64, dim: i64) -> (i64, i64) {
    let low = low.min(dim - 1).max(0);
    let mut high = high.min(dim).max(1);
    if high <= low {
        high = (low + 1).min(dim);
    }
    (low, high)
}

/// Crop an image to a box, clamping the box to the image first.
///
/// Never fails: the clamped box always covers at least one pixel of a
/// non-empty image.
pub fn apply_crop(image: &DecodedImage, crop: &CropBox) -> DecodedImage {
    let crop = crop.clamped(image.width, image.height);

    // Fast path: full crop returns a clone
    if crop.left == 0
        && crop.top == 0
        && crop.right == image.width as i64
        && crop.bottom == image.height as i64
    {
        return image.clone();
    }

    crop_padded(image, &crop).unwrap_or_else(|_| image.clone())
}

/// Crop an image to a box without clamping.
///
/// Parts of the box outside the source image are filled with black, so the
/// output is always exactly `box.width() x box.height()`.
///
/// # Errors
///
/// Returns `TransformError::InvalidBox` when the box is empty or inverted,
/// and `TransformError::TooLarge` when the output would exceed
/// [`MAX_PIXELS`](crate::decode::MAX_PIXELS).
pub fn crop_padded(image: &DecodedImage, crop: &CropBox) -> Result<DecodedImage, TransformError> {
    if crop.width() <= 0 || crop.height() <= 0 {
        return Err(TransformError::InvalidBox {
            left: crop.left,
            top: crop.top,
            right: crop.right,
            bottom: crop.bottom,
        });
    }

    let too_large = || TransformError::TooLarge {
        width: crop.width(),
        height: crop.height(),
    };
    let out_width = u32::try_from(crop.width()).map_err(|_| too_large())?;
    let out_height = u32::try_from(crop.height()).map_err(|_| too_large())?;
    if !within_pixel_budget(out_width as u64, out_height as u64) {
        return Err(too_large());
    }
    let src_w = image.width as i64;
    let src_h = image.height as i64;

    let mut output = vec![0u8; (out_width as usize) * (out_height as usize) * 3];

    // Horizontal overlap with the source, in output coordinates
    let x_start = crop.left.saturating_neg().clamp(0, crop.width());
    let x_end = src_w.saturating_sub(crop.left).clamp(0, crop.width());
    if x_end > x_start {
        let row_bytes = ((x_end - x_start) * 3) as usize;
        for y in 0..out_height as i64 {
            let src_y = crop.top + y;
            if src_y < 0 || src_y >= src_h {
                continue;
            }
            let src_idx = ((src_y * src_w + crop.left + x_start) * 3) as usize;
            let dst_idx = ((y * out_width as i64 + x_start) * 3) as usize;
            output[dst_idx..dst_idx + row_bytes]
                .copy_from_slice(&image.pixels[src_idx..src_idx + row_bytes]);
        }
    }

    Ok(DecodedImage {
        width: out_width,
        height: out_height,
        pixels: output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a test image where each pixel has a unique value based on position.
    fn test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.push(v);
                pixels.push(v);
                pixels.push(v);
            }
        }
        DecodedImage {
            width,
            height,
            pixels,
        }
    }

    #[test]
    fn test_full_crop_is_identity() {
        let img = test_image(50, 50);
        let result = apply_crop(&img, &CropBox::new(0, 0, 50, 50));
        assert_eq!(result, img);
    }

    #[test]
    fn test_center_crop() {
        let img = test_image(10, 10);
        let result = apply_crop(&img, &CropBox::new(2, 2, 8, 8));

        assert_eq!(result.dimensions(), (6, 6));
        // First pixel comes from (2, 2): 2 * 10 + 2 = 22
        assert_eq!(result.pixels[0], 22);
    }

    #[test]
    fn test_clamp_rules_per_axis() {
        let clamped = CropBox::new(-5, 3, 200, 7).clamped(100, 50);
        assert_eq!(clamped, CropBox::new(0, 3, 100, 7));

        let clamped = CropBox::new(20, -10, 30, 80).clamped(100, 50);
        assert_eq!(clamped, CropBox::new(20, 0, 30, 50));
    }

    #[test]
    fn test_clamp_degenerate_box_gets_one_pixel() {
        let clamped = CropBox::new(40, 40, 40, 40).clamped(100, 100);
        assert_eq!(clamped, CropBox::new(40, 40, 41, 41));
    }

    #[test]
    fn test_clamp_box_outside_image() {
        // Entirely to the right/below
        let clamped = CropBox::new(500, 500, 600, 600).clamped(100, 50);
        assert_eq!(clamped, CropBox::new(99, 49, 100, 50));

        // Entirely to the left/above
        let clamped = CropBox::new(-60, -60, -10, -10).clamped(100, 50);
        assert_eq!(clamped, CropBox::new(0, 0, 1, 1));
    }

    #[test]
    fn test_clamp_inverted_box_never_inverts() {
        let clamped = CropBox::new(80, 30, 20, 10).clamped(100, 50);
        assert!(clamped.fits(100, 50));
        assert_eq!(clamped, CropBox::new(80, 30, 81, 31));
    }

    #[test]
    fn test_from_corners_sorts_axes() {
        let a = CropBox::from_corners((60, 10), (10, 60));
        let b = CropBox::from_corners((10, 60), (60, 10));
        assert_eq!(a, CropBox::new(10, 10, 60, 60));
        assert_eq!(a, b);
    }

    #[test]
    fn test_padded_crop_inside_matches_clamped() {
        let img = test_image(20, 20);
        let crop = CropBox::new(3, 4, 13, 9);
        assert_eq!(crop_padded(&img, &crop).unwrap(), apply_crop(&img, &crop));
    }

    #[test]
    fn test_padded_crop_fills_outside_with_black() {
        let img = DecodedImage::filled(4, 4, [200, 200, 200]);
        let result = crop_padded(&img, &CropBox::new(-2, -2, 2, 2)).unwrap();

        assert_eq!(result.dimensions(), (4, 4));
        assert_eq!(result.get_pixel(0, 0), Some([0, 0, 0]));
        assert_eq!(result.get_pixel(1, 3), Some([0, 0, 0]));
        assert_eq!(result.get_pixel(2, 2), Some([200, 200, 200]));
        assert_eq!(result.get_pixel(3, 3), Some([200, 200, 200]));
    }

    #[test]
    fn test_padded_crop_fully_outside() {
        let img = DecodedImage::filled(4, 4, [200, 200, 200]);
        let result = crop_padded(&img, &CropBox::new(10, 10, 13, 12)).unwrap();
        assert_eq!(result.dimensions(), (3, 2));
        assert!(result.pixels.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_padded_crop_rejects_inverted_or_empty() {
        let img = test_image(10, 10);
        assert!(crop_padded(&img, &CropBox::new(5, 5, 2, 8)).is_err());
        assert!(crop_padded(&img, &CropBox::new(5, 5, 5, 8)).is_err());
    }

    #[test]
    fn test_padded_crop_rejects_oversized_boxes() {
        let img = test_image(10, 10);
        for crop in [
            CropBox::new(0, 0, 3_000_000_000, 3_000_000_000),
            CropBox::new(0, 0, 4_294_967_297, 2),
            CropBox::new(0, 0, 20_000, 20_000),
            CropBox::new(i64::MIN, i64::MIN, i64::MAX, i64::MAX),
        ] {
            assert!(
                matches!(crop_padded(&img, &crop), Err(TransformError::TooLarge { .. })),
                "{} was accepted",
                crop
            );
        }
    }

    #[test]
    fn test_padded_crop_far_offset_is_black() {
        let img = test_image(10, 10);
        let result = crop_padded(&img, &CropBox::new(i64::MIN, 0, i64::MIN + 4, 3)).unwrap();
        assert_eq!(result.dimensions(), (4, 3));
        assert!(result.pixels.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(CropBox::new(1, 2, 3, 4).to_string(), "(1, 2, 3, 4)");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
