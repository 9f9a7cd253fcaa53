//! Mapping between image pixels and a scaled, centred preview.
//!
//! The preview is never upscaled. The ratio is the largest value `<= 1.0`
//! that fits the whole image inside the display area, and the scaled image
//! is centred in that area:
//!
//! ```text
//! display = image * ratio + offset
//! image   = (display - offset) / ratio   (truncated toward zero)
//! ```

use serde::{Deserialize, Serialize};

use crate::decode::{scale_by, DecodeError, DecodedImage, FilterType};

/// Smallest display edge considered, in pixels.
pub const MIN_DISPLAY_EDGE: u32 = 200;

/// Display area used before any explicit size is known.
pub const DEFAULT_DISPLAY_AREA: (u32, u32) = (900, 600);

/// Scale ratio and centring offset for one image in one display area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewMapping {
    ratio: f64,
    offset: (i64, i64),
    display_size: (u32, u32),
    area: (u32, u32),
}

impl Default for PreviewMapping {
    fn default() -> Self {
        Self {
            ratio: 1.0,
            offset: (0, 0),
            display_size: (0, 0),
            area: DEFAULT_DISPLAY_AREA,
        }
    }
}

impl PreviewMapping {
    /// Fit a `width` x `height` image into an `area_width` x `area_height`
    /// display area. Area edges below [`MIN_DISPLAY_EDGE`] are raised to it.
    pub fn compute(width: u32, height: u32, area_width: u32, area_height: u32) -> Self {
        let area = (
            area_width.max(MIN_DISPLAY_EDGE),
            area_height.max(MIN_DISPLAY_EDGE),
        );
        if width == 0 || height == 0 {
            return Self {
                area,
                ..Self::default()
            };
        }

        let ratio = (area.0 as f64 / width as f64)
            .min(area.1 as f64 / height as f64)
            .min(1.0);
        let display_size = (
            ((width as f64 * ratio) as u32).max(1),
            ((height as f64 * ratio) as u32).max(1),
        );
        let offset = (
            (area.0 / 2) as i64 - (display_size.0 / 2) as i64,
            (area.1 / 2) as i64 - (display_size.1 / 2) as i64,
        );

        Self {
            ratio,
            offset,
            display_size,
            area,
        }
    }

    /// A mapping with explicit ratio and offset, for callers that manage
    /// their own layout.
    pub fn with_parts(ratio: f64, offset: (i64, i64), image_size: (u32, u32)) -> Self {
        let display_size = (
            (image_size.0 as f64 * ratio) as u32,
            (image_size.1 as f64 * ratio) as u32,
        );
        Self {
            ratio,
            offset,
            display_size,
            area: display_size,
        }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn offset(&self) -> (i64, i64) {
        self.offset
    }

    pub fn display_size(&self) -> (u32, u32) {
        self.display_size
    }

    pub fn area(&self) -> (u32, u32) {
        self.area
    }

    /// Map a display point to image coordinates, truncating toward zero.
    ///
    /// The result is not clamped; points outside the preview map outside
    /// the image.
    pub fn to_image(&self, x: f64, y: f64) -> (i64, i64) {
        (
            ((x - self.offset.0 as f64) / self.ratio) as i64,
            ((y - self.offset.1 as f64) / self.ratio) as i64,
        )
    }

    /// Map an image pixel to the display point of its top-left corner.
    pub fn to_display(&self, x: i64, y: i64) -> (f64, f64) {
        (
            x as f64 * self.ratio + self.offset.0 as f64,
            y as f64 * self.ratio + self.offset.1 as f64,
        )
    }

    /// Whether a display point falls on the preview image.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (ox, oy) = (self.offset.0 as f64, self.offset.1 as f64);
        x >= ox
            && y >= oy
            && x < ox + self.display_size.0 as f64
            && y < oy + self.display_size.1 as f64
    }
}

/// Downscale `image` for display according to `mapping`.
pub fn render_preview(
    image: &DecodedImage,
    mapping: &PreviewMapping,
) -> Result<DecodedImage, DecodeError> {
    scale_by(image, mapping.ratio(), FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_image_is_not_upscaled() {
        let m = PreviewMapping::compute(100, 100, 900, 600);
        assert_eq!(m.ratio(), 1.0);
        assert_eq!(m.display_size(), (100, 100));
        assert_eq!(m.offset(), (400, 250));
    }

    #[test]
    fn test_large_image_fits_area() {
        let m = PreviewMapping::compute(1800, 600, 900, 600);
        assert_eq!(m.ratio(), 0.5);
        assert_eq!(m.display_size(), (900, 300));
        assert_eq!(m.offset(), (0, 150));
    }

    #[test]
    fn test_tall_image_limited_by_height() {
        let m = PreviewMapping::compute(600, 1200, 900, 600);
        assert_eq!(m.ratio(), 0.5);
        assert_eq!(m.display_size(), (300, 600));
        assert_eq!(m.offset(), (300, 0));
    }

    #[test]
    fn test_area_is_floored() {
        let m = PreviewMapping::compute(400, 400, 50, 10);
        assert_eq!(m.area(), (200, 200));
        assert_eq!(m.ratio(), 0.5);
        assert_eq!(m.display_size(), (200, 200));
        assert_eq!(m.offset(), (0, 0));
    }

    #[test]
    fn test_integer_halves_for_offset() {
        let m = PreviewMapping::compute(101, 51, 900, 600);
        // 450 - 50, 300 - 25
        assert_eq!(m.offset(), (400, 275));
    }

    #[test]
    fn test_empty_image() {
        let m = PreviewMapping::compute(0, 0, 900, 600);
        assert_eq!(m.ratio(), 1.0);
        assert_eq!(m.display_size(), (0, 0));
    }

    #[test]
    fn test_to_image_and_back() {
        let m = PreviewMapping::compute(1800, 1200, 900, 600);
        assert_eq!(m.to_image(0.0, 0.0), (0, 0));
        assert_eq!(m.to_image(450.0, 300.0), (900, 600));
        assert_eq!(m.to_display(900, 600), (450.0, 300.0));
    }

    #[test]
    fn test_to_image_truncates_toward_zero() {
        let m = PreviewMapping::with_parts(1.0, (10, 10), (100, 100));
        assert_eq!(m.to_image(9.5, 9.5), (0, 0));
        assert_eq!(m.to_image(8.0, 5.0), (-2, -5));
    }

    #[test]
    fn test_contains() {
        let m = PreviewMapping::compute(100, 100, 900, 600);
        assert!(m.contains(400.0, 250.0));
        assert!(m.contains(499.0, 349.0));
        assert!(!m.contains(500.0, 300.0));
        assert!(!m.contains(399.0, 300.0));
    }

    #[test]
    fn test_render_preview_size() {
        let image = DecodedImage::filled(1800, 600, [10, 20, 30]);
        let m = PreviewMapping::compute(1800, 600, 900, 600);
        let preview = render_preview(&image, &m).unwrap();
        assert_eq!(preview.dimensions(), m.display_size());
    }
}
