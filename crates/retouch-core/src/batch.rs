//! Folder batch processing.
//!
//! Every image in a folder goes through the same fixed pipeline and is
//! written to an output folder as `mod_<original name>`:
//!
//! 1. crop (unclamped, black padding outside the image)
//! 2. rotate counter-clockwise, expanding the canvas
//! 3. resize to a width, keeping the aspect ratio
//! 4. filter
//! 5. watermark in the top-left corner
//!
//! Steps without a setting are skipped. A file that fails is logged and
//! recorded in the [`BatchReport`]; the remaining files are still processed.

use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{self, DecodeError, DecodedImage, FilterType};
use crate::encode::{self, EncodeError, DEFAULT_JPEG_QUALITY};
use crate::filters::{self, FilterKind};
use crate::transform::{self, CropBox, InterpolationFilter, TransformError};
use crate::watermark::{self, WatermarkError, WatermarkStyle};

/// Extensions picked up from the input folder.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Prefix added to every output file name.
pub const OUTPUT_PREFIX: &str = "mod_";

/// Font size of batch watermarks, in pixels.
pub const STAMP_FONT_SIZE: f32 = 16.0;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("{path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("No images found in {0}")]
    NoImages(PathBuf),
}

/// Why a single file failed.
#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Watermark(#[from] WatermarkError),
}

/// What to do to every image. `None` and a zero angle skip a step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    pub resize_width: Option<u32>,
    /// Counter-clockwise, in degrees.
    pub rotate_angle: f64,
    pub crop_box: Option<CropBox>,
    pub filter: Option<FilterKind>,
    pub watermark_text: Option<String>,
    /// Font for watermarks; a system font is searched for when unset.
    pub font_path: Option<PathBuf>,
    /// JPEG quality; zero means the default of 95.
    pub jpeg_quality: u8,
}

impl BatchOptions {
    /// Resize to 800 px, rotate 90°, sharpen and stamp a watermark.
    pub fn everything() -> Self {
        Self {
            resize_width: Some(800),
            rotate_angle: 90.0,
            crop_box: None,
            filter: Some(FilterKind::Sharpen),
            watermark_text: Some("© MyProject".to_string()),
            ..Self::default()
        }
    }

    fn quality(&self) -> u8 {
        if self.jpeg_quality == 0 {
            DEFAULT_JPEG_QUALITY
        } else {
            self.jpeg_quality
        }
    }

    fn stamp_text(&self) -> Option<&str> {
        self.watermark_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Files written, in processing order.
    pub processed: Vec<PathBuf>,
    /// Input file name and error message of every failure.
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

fn is_image_name(name: &Path) -> bool {
    name.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Image files directly inside `folder`, sorted by name.
pub fn list_images(folder: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let io_err = |e: std::io::Error| BatchError::Io {
        path: folder.to_path_buf(),
        message: e.to_string(),
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && is_image_name(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Run the pipeline on one decoded image.
pub fn process_image(
    image: DecodedImage,
    options: &BatchOptions,
    font: Option<&FontArc>,
) -> Result<DecodedImage, FileError> {
    let mut img = image;

    if let Some(crop) = &options.crop_box {
        img = transform::crop_padded(&img, crop)?;
    }

    if options.rotate_angle != 0.0 {
        img = transform::apply_rotation(&img, options.rotate_angle, InterpolationFilter::Bilinear);
    }

    if let Some(width) = options.resize_width {
        img = decode::resize_to_width(&img, width, FilterType::Lanczos3)?;
    }

    if let Some(kind) = options.filter {
        img = filters::apply_filter(&img, kind);
    }

    if let (Some(text), Some(font)) = (options.stamp_text(), font) {
        img = watermark::apply_watermark(&img, font, text, &WatermarkStyle::stamp(STAMP_FONT_SIZE))?;
    }

    Ok(img)
}

fn process_file(
    input: &Path,
    output_dir: &Path,
    options: &BatchOptions,
    font: Option<&FontArc>,
) -> Result<PathBuf, FileError> {
    let image = decode::open_image(input)?;
    let result = process_image(image, options, font)?;

    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let out_path = output_dir.join(format!("{}{}", OUTPUT_PREFIX, name));
    encode::save_image(&result, &out_path, options.quality())?;
    Ok(out_path)
}

/// Process every image in `input_dir`, writing results to `output_dir`.
///
/// # Errors
///
/// Fails before touching any image when the output folder cannot be
/// created or the input folder cannot be read or holds no images. Failures
/// of individual files are reported in the returned [`BatchReport`]. When
/// no watermark font can be loaded the images are processed without the
/// stamp.
pub fn process_folder(
    input_dir: &Path,
    output_dir: &Path,
    options: &BatchOptions,
) -> Result<BatchReport, BatchError> {
    std::fs::create_dir_all(output_dir).map_err(|e| BatchError::Io {
        path: output_dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let files = list_images(input_dir)?;
    if files.is_empty() {
        log::warn!("No images in {}", input_dir.display());
        return Err(BatchError::NoImages(input_dir.to_path_buf()));
    }

    let font = match options.stamp_text() {
        Some(_) => match watermark::find_font(options.font_path.as_deref()) {
            Ok(font) => Some(font),
            Err(e) => {
                log::warn!("Watermark skipped: {}", e);
                None
            }
        },
        None => None,
    };

    log::info!("Process start: {} images from {}", files.len(), input_dir.display());

    let mut report = BatchReport::default();
    for file in &files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match process_file(file, output_dir, options, font.as_ref()) {
            Ok(out) => {
                log::info!("Success: {}", name);
                report.processed.push(out);
            }
            Err(e) => {
                log::error!("Failed {}: {}", name, e);
                report.failed.push((name, e.to_string()));
            }
        }
    }

    log::info!(
        "Process complete: {} succeeded, {} failed",
        report.processed.len(),
        report.failed.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("retouch_batch_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_image(path: &Path, width: u32, height: u32) {
        let image = DecodedImage::filled(width, height, [40, 120, 200]);
        encode::save_image(&image, path, 95).unwrap();
    }

    #[test]
    fn test_is_image_name() {
        assert!(is_image_name(Path::new("a.png")));
        assert!(is_image_name(Path::new("a.JPG")));
        assert!(is_image_name(Path::new("a.jpeg")));
        assert!(is_image_name(Path::new("a.bmp")));
        assert!(!is_image_name(Path::new("a.webp")));
        assert!(!is_image_name(Path::new("notes.txt")));
        assert!(!is_image_name(Path::new("png")));
    }

    #[test]
    fn test_everything_preset() {
        let options = BatchOptions::everything();
        assert_eq!(options.resize_width, Some(800));
        assert_eq!(options.rotate_angle, 90.0);
        assert_eq!(options.crop_box, None);
        assert_eq!(options.filter, Some(FilterKind::Sharpen));
        assert_eq!(options.watermark_text.as_deref(), Some("© MyProject"));
        assert_eq!(options.quality(), 95);
    }

    #[test]
    fn test_pipeline_order() {
        let image = DecodedImage::filled(40, 20, [10, 20, 30]);
        let options = BatchOptions {
            crop_box: Some(CropBox::new(0, 0, 30, 20)),
            rotate_angle: 90.0,
            resize_width: Some(10),
            ..BatchOptions::default()
        };
        // crop 30x20, rotate to 20x30, resize to 10x15
        let result = process_image(image, &options, None).unwrap();
        assert_eq!(result.dimensions(), (10, 15));
    }

    #[test]
    fn test_crop_pads_outside_image() {
        let image = DecodedImage::filled(10, 10, [200, 200, 200]);
        let options = BatchOptions {
            crop_box: Some(CropBox::new(5, 5, 15, 15)),
            ..BatchOptions::default()
        };
        let result = process_image(image, &options, None).unwrap();
        assert_eq!(result.dimensions(), (10, 10));
        assert_eq!(result.get_pixel(0, 0), Some([200, 200, 200]));
        assert_eq!(result.get_pixel(9, 9), Some([0, 0, 0]));
    }

    #[test]
    fn test_inverted_crop_fails() {
        let image = DecodedImage::filled(10, 10, [0, 0, 0]);
        let options = BatchOptions {
            crop_box: Some(CropBox::new(8, 0, 2, 10)),
            ..BatchOptions::default()
        };
        let err = process_image(image, &options, None).unwrap_err();
        assert!(matches!(err, FileError::Transform(_)));
    }

    #[test]
    fn test_oversized_crop_fails_without_panic() {
        for crop in [
            CropBox::new(0, 0, 3_000_000_000, 3_000_000_000),
            CropBox::new(0, 0, 4_294_967_297, 2),
        ] {
            let options = BatchOptions {
                crop_box: Some(crop),
                ..BatchOptions::default()
            };
            let image = DecodedImage::filled(10, 10, [0, 0, 0]);
            let err = process_image(image, &options, None).unwrap_err();
            assert!(matches!(err, FileError::Transform(TransformError::TooLarge { .. })));
        }
    }

    #[test]
    fn test_oversized_resize_fails_without_panic() {
        let options = BatchOptions {
            resize_width: Some(u32::MAX),
            ..BatchOptions::default()
        };
        let image = DecodedImage::filled(10, 10, [0, 0, 0]);
        let err = process_image(image, &options, None).unwrap_err();
        assert!(matches!(err, FileError::Decode(DecodeError::TooLarge { .. })));
    }

    #[test]
    fn test_missing_font_skips_stamp() {
        let input = temp_dir("nofont_in");
        let output = input.join("out");
        write_image(&input.join("a.png"), 20, 10);

        let options = BatchOptions {
            watermark_text: Some("© Me".to_string()),
            font_path: Some(input.join("missing.ttf")),
            ..BatchOptions::default()
        };
        let report = process_folder(&input, &output, &options).unwrap();
        assert!(report.is_success());
        assert_eq!(report.processed, vec![output.join("mod_a.png")]);

        let _ = std::fs::remove_dir_all(&input);
    }

    #[test]
    fn test_empty_folder() {
        let input = temp_dir("empty_in");
        let output = temp_dir("empty_out");
        std::fs::write(input.join("readme.txt"), b"not an image").unwrap();

        let err = process_folder(&input, &output, &BatchOptions::default()).unwrap_err();
        assert!(matches!(err, BatchError::NoImages(_)));

        let _ = std::fs::remove_dir_all(&input);
        let _ = std::fs::remove_dir_all(&output);
    }

    #[test]
    fn test_missing_input_folder() {
        let input = std::env::temp_dir().join("retouch_batch_no_such_dir");
        let output = temp_dir("missing_out");
        let err = process_folder(&input, &output, &BatchOptions::default()).unwrap_err();
        assert!(matches!(err, BatchError::Io { .. }));
        let _ = std::fs::remove_dir_all(&output);
    }

    #[test]
    fn test_process_folder_continues_after_failure() {
        let input = temp_dir("mixed_in");
        let output = input.join("out");
        write_image(&input.join("b.png"), 40, 20);
        write_image(&input.join("a.bmp"), 20, 20);
        std::fs::write(input.join("c.jpg"), b"broken").unwrap();

        let options = BatchOptions {
            resize_width: Some(10),
            filter: Some(FilterKind::Greyscale),
            ..BatchOptions::default()
        };
        let report = process_folder(&input, &output, &options).unwrap();

        assert_eq!(report.processed, vec![output.join("mod_a.bmp"), output.join("mod_b.png")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "c.jpg");
        assert!(!report.is_success());

        let b = decode::open_image(output.join("mod_b.png")).unwrap();
        assert_eq!(b.dimensions(), (10, 5));
        let [r, g, bl] = b.get_pixel(0, 0).unwrap();
        assert!(r == g && g == bl);

        let _ = std::fs::remove_dir_all(&input);
    }

    #[test]
    fn test_list_images_sorted() {
        let dir = temp_dir("list");
        for name in ["z.png", "a.jpg", "m.JPEG", "skip.gif"] {
            std::fs::write(dir.join(name), b"x").unwrap();
        }
        let names: Vec<String> = list_images(&dir)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "m.JPEG", "z.png"]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_blank_watermark_text_needs_no_font() {
        let options = BatchOptions {
            watermark_text: Some("   ".to_string()),
            ..BatchOptions::default()
        };
        assert_eq!(options.stamp_text(), None);
    }
}
