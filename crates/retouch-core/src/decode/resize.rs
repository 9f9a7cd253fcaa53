//! Image resizing functions for edits and preview generation.
//!
//! Provides resize operations using the `image` crate's algorithms.
//! All functions return new `DecodedImage` instances without modifying the input.

use super::{within_pixel_budget, DecodeError, DecodedImage, FilterType};

/// Resize an image to exact dimensions.
///
/// # Arguments
///
/// * `image` - The source image to resize
/// * `width` - Target width in pixels
/// * `height` - Target height in pixels
/// * `filter` - Interpolation filter to use
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` if either target dimension is
/// zero, and `DecodeError::TooLarge` past [`MAX_PIXELS`](super::MAX_PIXELS).
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }
    if !within_pixel_budget(width as u64, height as u64) {
        return Err(DecodeError::TooLarge { width, height });
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image
        .to_rgb_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbImage".to_string()))?;

    let resized = image::imageops::resize(&rgb_image, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Resize an image to a target width, deriving the height from the aspect ratio.
///
/// The height is `floor(h0 * width / w0)`, never less than one pixel.
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` for a zero target width or an
/// empty source image.
pub fn resize_to_width(
    image: &DecodedImage,
    width: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    let height = height_for_width(image.width, image.height, width).ok_or(
        DecodeError::InvalidDimensions {
            width,
            height: image.height,
        },
    )?;
    resize(image, width, height, filter)
}

/// Compute the aspect-preserving height for a target width.
///
/// Returns `None` when the target width or the source width is zero.
pub fn height_for_width(src_width: u32, src_height: u32, width: u32) -> Option<u32> {
    if width == 0 || src_width == 0 {
        return None;
    }
    let ratio = width as f64 / src_width as f64;
    Some(((src_height as f64 * ratio) as u32).max(1))
}

/// Resize an image by a uniform scale ratio, used for preview rendering.
///
/// Dimensions are truncated and floored at one pixel. A ratio of 1.0 or more
/// returns a copy of the input.
pub fn scale_by(
    image: &DecodedImage,
    ratio: f64,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if ratio >= 1.0 {
        return Ok(image.clone());
    }
    let width = ((image.width as f64 * ratio) as u32).max(1);
    let height = ((image.height as f64 * ratio) as u32).max(1);
    resize(image, width, height, filter)
}
