//! Output format selection and encoding for save/export.
//!
//! The format is picked from the destination file extension. JPEG is written
//! with a configurable quality (95 by default); PNG, WEBP, TIFF and BMP are
//! lossless.

use std::io::Cursor;
use std::path::Path;

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::DecodedImage;

/// JPEG quality used when saving unless configured otherwise.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Errors that can occur while encoding or writing an image.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The encoder rejected the image
    #[error("{format:?} encoding failed: {message}")]
    EncodingFailed {
        format: OutputFormat,
        message: String,
    },

    /// Writing the encoded bytes failed
    #[error("I/O error: {0}")]
    IoError(String),
}

/// File formats the editor can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    WebP,
    Tiff,
    Bmp,
}

impl OutputFormat {
    /// Look up a format from a file extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "webp" => Some(OutputFormat::WebP),
            "tif" | "tiff" => Some(OutputFormat::Tiff),
            "bmp" => Some(OutputFormat::Bmp),
            _ => None,
        }
    }

    /// Pick the format for a destination path. Unknown or missing extensions
    /// fall back to JPEG.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .unwrap_or_default()
    }

    /// Canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Bmp => "bmp",
        }
    }
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height)?;

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    write_with(encoder, OutputFormat::Jpeg, pixels, width, height)?;

    Ok(buffer.into_inner())
}

/// Encode an image in the given format.
///
/// `quality` only affects JPEG output.
pub fn encode_image(
    image: &DecodedImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    let (pixels, width, height) = (&image.pixels[..], image.width, image.height);
    if format == OutputFormat::Jpeg {
        return encode_jpeg(pixels, width, height, quality);
    }

    validate(pixels, width, height)?;
    let mut buffer = Cursor::new(Vec::new());
    match format {
        OutputFormat::Png => write_with(PngEncoder::new(&mut buffer), format, pixels, width, height)?,
        OutputFormat::WebP => write_with(
            WebPEncoder::new_lossless(&mut buffer),
            format,
            pixels,
            width,
            height,
        )?,
        OutputFormat::Tiff => write_with(TiffEncoder::new(&mut buffer), format, pixels, width, height)?,
        OutputFormat::Bmp => write_with(BmpEncoder::new(&mut buffer), format, pixels, width, height)?,
        OutputFormat::Jpeg => unreachable!("handled above"),
    }
    Ok(buffer.into_inner())
}

/// Encode an image and write it to `path`, choosing the format from the
/// extension. Returns the format that was written.
pub fn save_image(
    image: &DecodedImage,
    path: impl AsRef<Path>,
    quality: u8,
) -> Result<OutputFormat, EncodeError> {
    let path = path.as_ref();
    let format = OutputFormat::from_path(path);
    let bytes = encode_image(image, format, quality)?;
    std::fs::write(path, bytes)
        .map_err(|e| EncodeError::IoError(format!("{}: {}", path.display(), e)))?;
    log::debug!("wrote {} as {:?}", path.display(), format);
    Ok(format)
}

fn validate(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }
    Ok(())
}

fn write_with(
    encoder: impl ImageEncoder,
    format: OutputFormat,
    pixels: &[u8],
    width: u32,
    height: u32,
) -> Result<(), EncodeError> {
    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format,
            message: e.to_string(),
        })
}


// ============================================================================
// Property-Based Tests
// ============================================================================
