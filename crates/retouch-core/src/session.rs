//! Single-image editing session.
//!
//! An [`EditSession`] owns the image being edited, the original it was
//! loaded from, the undo history, the preview mapping and the crop
//! selector. Every mutating operation follows the same sequence:
//!
//! 1. fail with [`EditError::NoImage`] if nothing is loaded
//! 2. validate the input
//! 3. compute the new image from the current one
//! 4. push the current image onto the history and commit the new one
//! 5. refresh the preview mapping and the status line
//!
//! A failure in steps 1 to 3 leaves both the image and the history
//! untouched.

use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adjustments;
use crate::decode::{self, DecodeError, DecodedImage, FilterType};
use crate::encode::{self, EncodeError, DEFAULT_JPEG_QUALITY};
use crate::filters::{self, FilterKind};
use crate::histogram;
use crate::history::{History, DEFAULT_MAX_UNDO};
use crate::preview::{self, PreviewMapping, DEFAULT_DISPLAY_AREA};
use crate::selection::{
    CancelReason, CropOutcome, CropSelector, DisplayRect, DEFAULT_MIN_CROP_EXTENT,
};
use crate::transform::{self, CropBox, InterpolationFilter};
use crate::watermark::{self, WatermarkError, WatermarkStyle};

/// Brightness and contrast factors accepted by the editor.
pub const FACTOR_RANGE: std::ops::RangeInclusive<f32> = 0.2..=2.0;

/// Watermark font sizes accepted by the editor.
pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<u32> = 8..=200;

const NO_IMAGE_STATUS: &str = "No image loaded";

/// Recoverable editing failures. None of them change the session state.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("No image loaded")]
    NoImage,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Crop cancelled: {0}")]
    CropCancelled(CancelReason),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Watermark(#[from] WatermarkError),
}

impl EditError {
    /// Whether the error is a user-facing notice rather than an image I/O
    /// or codec failure. A watermark that cannot find its font is a notice.
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            EditError::NoImage
                | EditError::InvalidInput(_)
                | EditError::NothingToUndo
                | EditError::CropCancelled(_)
                | EditError::Watermark(_)
        )
    }
}

/// Tunables for an editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of undo snapshots kept.
    pub max_undo: usize,
    /// Smallest crop selection edge, in pixels.
    pub min_crop_extent: u32,
    /// Preview area size in display pixels.
    pub display_area: (u32, u32),
    /// Quality for JPEG output, 1-100.
    pub jpeg_quality: u8,
    /// Font for watermarks. When unset a system font is searched for.
    pub font_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
            min_crop_extent: DEFAULT_MIN_CROP_EXTENT,
            display_area: DEFAULT_DISPLAY_AREA,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            font_path: None,
        }
    }
}

/// Colour of one image pixel picked from the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub x: u32,
    pub y: u32,
    pub rgb: [u8; 3],
}

/// Parse a positive pixel width.
pub fn parse_width(input: &str) -> Result<u32, EditError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(EditError::InvalidInput("enter a width in pixels".into()));
    }
    match s.parse::<i64>() {
        Ok(w) if w > 0 && w <= u32::MAX as i64 => Ok(w as u32),
        _ => Err(EditError::InvalidInput(format!("invalid width '{}'", s))),
    }
}

/// Parse a finite angle in degrees.
pub fn parse_angle(input: &str) -> Result<f64, EditError> {
    let s = input.trim();
    match s.parse::<f64>() {
        Ok(a) if a.is_finite() => Ok(a),
        _ => Err(EditError::InvalidInput(format!("invalid angle '{}'", s))),
    }
}

/// Parse four integers `left, top, right, bottom`, separated by commas or
/// whitespace.
pub fn parse_crop_box(input: &str) -> Result<CropBox, EditError> {
    let invalid = || EditError::InvalidInput(format!("invalid crop values '{}'", input.trim()));
    let values: Vec<i64> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<i64>().map_err(|_| invalid()))
        .collect::<Result<_, _>>()?;
    match values.as_slice() {
        [l, t, r, b] => Ok(CropBox::new(*l, *t, *r, *b)),
        _ => Err(invalid()),
    }
}

pub struct EditSession {
    config: SessionConfig,
    original: Option<DecodedImage>,
    current: Option<DecodedImage>,
    source_path: Option<PathBuf>,
    history: History,
    preview: PreviewMapping,
    display_area: (u32, u32),
    selector: CropSelector,
    font: Option<FontArc>,
    status: String,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl EditSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            history: History::new(config.max_undo),
            selector: CropSelector::new(config.min_crop_extent),
            display_area: config.display_area,
            preview: PreviewMapping::default(),
            original: None,
            current: None,
            source_path: None,
            font: None,
            status: NO_IMAGE_STATUS.to_string(),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn current(&self) -> Option<&DecodedImage> {
        self.current.as_ref()
    }

    pub fn original(&self) -> Option<&DecodedImage> {
        self.original.as_ref()
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn preview(&self) -> &PreviewMapping {
        &self.preview
    }

    pub fn selector(&self) -> &CropSelector {
        &self.selector
    }

    /// Last status line.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Use `font` for watermarks instead of loading one.
    pub fn set_font(&mut self, font: FontArc) {
        self.font = Some(font);
    }

    /// Open an image file as the new base image. History is cleared.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), EditError> {
        let path = path.as_ref();
        let image = decode::open_image(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let (w, h) = image.dimensions();
        self.set_base(image);
        self.source_path = Some(path.to_path_buf());
        self.status = format!("Opened: {} ({}x{})", name, w, h);
        log::info!("{}", self.status);
        Ok(())
    }

    /// Use an in-memory image as the new base image. History is cleared.
    pub fn load(&mut self, image: DecodedImage) {
        let (w, h) = image.dimensions();
        self.set_base(image);
        self.source_path = None;
        self.status = format!("Loaded image ({}x{})", w, h);
    }

    fn set_base(&mut self, image: DecodedImage) {
        self.original = Some(image.clone());
        self.current = Some(image);
        self.history.clear();
        self.selector.cancel();
        self.refresh_preview();
    }

    /// Encode the current image to `path`, format chosen by extension.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), EditError> {
        let path = path.as_ref();
        let image = self.current.as_ref().ok_or(EditError::NoImage)?;
        let format = encode::save_image(image, path, self.config.jpeg_quality)?;
        self.status = format!("Saved: {}", path.display());
        log::info!("Saved {:?} to {}", format, path.display());
        Ok(())
    }

    /// Store a snapshot of the current image. No-op when nothing is loaded.
    pub fn push_undo(&mut self) {
        if let Some(image) = &self.current {
            self.history.push(image.clone());
        }
    }

    fn commit(&mut self, image: DecodedImage, status: String) {
        self.push_undo();
        self.current = Some(image);
        self.refresh_preview();
        log::debug!("{}", status);
        self.status = status;
    }

    fn require_image(&self) -> Result<&DecodedImage, EditError> {
        self.current.as_ref().ok_or(EditError::NoImage)
    }

    pub fn undo(&mut self) -> Result<(), EditError> {
        let previous = self.history.restore().ok_or(EditError::NothingToUndo)?;
        self.current = Some(previous);
        self.refresh_preview();
        self.status = "Undo".to_string();
        Ok(())
    }

    /// Replace the current image with a copy of the original.
    pub fn reset(&mut self) -> Result<(), EditError> {
        let original = self.original.clone().ok_or(EditError::NoImage)?;
        self.commit(original, "Reset to original".to_string());
        Ok(())
    }

    /// Resize to `width`, keeping the aspect ratio.
    pub fn resize_to_width(&mut self, width: u32) -> Result<(), EditError> {
        let image = self.require_image()?;
        if width == 0 {
            return Err(EditError::InvalidInput("width must be positive".into()));
        }
        let height = decode::height_for_width(image.width, image.height, width).unwrap_or(0);
        if !decode::within_pixel_budget(width as u64, height as u64) {
            return Err(EditError::InvalidInput(format!(
                "{}x{} exceeds the largest supported image",
                width, height
            )));
        }
        let resized = decode::resize_to_width(image, width, FilterType::Lanczos3)?;
        let status = format!("Resized to {}x{}", resized.width, resized.height);
        self.commit(resized, status);
        Ok(())
    }

    /// Rotate clockwise, expanding the canvas.
    pub fn rotate(&mut self, angle_degrees: f64) -> Result<(), EditError> {
        let image = self.require_image()?;
        if !angle_degrees.is_finite() {
            return Err(EditError::InvalidInput(format!(
                "invalid angle '{}'",
                angle_degrees
            )));
        }
        let rotated = transform::rotate_clockwise(image, angle_degrees, InterpolationFilter::Bilinear);
        self.commit(rotated, format!("Rotated {}°", angle_degrees));
        Ok(())
    }

    /// Crop to a numeric box after clamping it into the image.
    pub fn crop(&mut self, crop: CropBox) -> Result<(), EditError> {
        let image = self.require_image()?;
        let clamped = crop.clamped(image.width, image.height);
        let cropped = transform::apply_crop(image, &clamped);
        self.commit(cropped, format!("Cropped to box {}", clamped));
        Ok(())
    }

    pub fn apply_filter(&mut self, kind: FilterKind) -> Result<(), EditError> {
        let image = self.require_image()?;
        let filtered = filters::apply_filter(image, kind);
        self.commit(filtered, format!("Applied filter: {}", kind));
        Ok(())
    }

    /// Apply brightness, then contrast. Both factors must lie in
    /// [`FACTOR_RANGE`].
    pub fn brightness_contrast(&mut self, brightness: f32, contrast: f32) -> Result<(), EditError> {
        let image = self.require_image()?;
        for (name, v) in [("brightness", brightness), ("contrast", contrast)] {
            if !FACTOR_RANGE.contains(&v) {
                return Err(EditError::InvalidInput(format!(
                    "{} factor {} outside {:.1}-{:.1}",
                    name,
                    v,
                    FACTOR_RANGE.start(),
                    FACTOR_RANGE.end()
                )));
            }
        }
        let adjusted = adjustments::brightness_contrast(image, brightness, contrast);
        self.commit(
            adjusted,
            format!("Applied B/C: {:.2}/{:.2}", brightness, contrast),
        );
        Ok(())
    }

    /// Stamp `text` in the bottom-right corner.
    pub fn watermark(&mut self, text: &str, font_size: u32) -> Result<(), EditError> {
        self.require_image()?;
        let text = watermark::validate_text(text)
            .map_err(|_| EditError::InvalidInput("enter watermark text".into()))?;
        if !FONT_SIZE_RANGE.contains(&font_size) {
            return Err(EditError::InvalidInput(format!(
                "font size {} outside {}-{}",
                font_size,
                FONT_SIZE_RANGE.start(),
                FONT_SIZE_RANGE.end()
            )));
        }
        if self.font.is_none() {
            self.font = Some(watermark::find_font(self.config.font_path.as_deref())?);
        }
        let (Some(image), Some(font)) = (&self.current, &self.font) else {
            return Err(EditError::NoImage);
        };
        let style = WatermarkStyle::signature(font_size as f32);
        let marked = watermark::apply_watermark(image, font, text, &style)?;
        self.commit(marked, "Watermark applied".to_string());
        Ok(())
    }

    /// Autocontrast followed by a mild sharpen.
    pub fn auto_enhance(&mut self) -> Result<(), EditError> {
        let image = self.require_image()?;
        let enhanced = adjustments::auto_enhance(image);
        self.commit(enhanced, "Auto-enhance applied".to_string());
        Ok(())
    }

    /// Equalize the luma histogram.
    pub fn equalize(&mut self) -> Result<(), EditError> {
        let image = self.require_image()?;
        let equalized = histogram::equalize_luma(image);
        self.commit(equalized, "Histogram equalize applied".to_string());
        Ok(())
    }

    /// Pointer pressed on the preview.
    pub fn begin_crop_drag(&mut self, x: f64, y: f64) -> Result<(), EditError> {
        self.require_image()?;
        self.selector.pointer_down(x, y);
        Ok(())
    }

    /// Pointer moved; returns the selection rectangle to draw.
    pub fn update_crop_drag(&mut self, x: f64, y: f64) -> Option<DisplayRect> {
        self.selector.pointer_move(x, y)
    }

    /// Pointer released. Crops and returns the applied box, or `Ok(None)`
    /// when no drag was in progress.
    pub fn finish_crop_drag(&mut self, x: f64, y: f64) -> Result<Option<CropBox>, EditError> {
        let dims = match &self.current {
            Some(image) => image.dimensions(),
            None => {
                self.selector.cancel();
                return Err(EditError::NoImage);
            }
        };
        match self.selector.pointer_up(x, y, &self.preview, dims) {
            None => Ok(None),
            Some(CropOutcome::Cancelled(reason)) => {
                self.status = format!("Crop cancelled: {}", reason);
                log::info!("{}", self.status);
                Err(EditError::CropCancelled(reason))
            }
            Some(CropOutcome::Apply(crop)) => {
                self.crop(crop)?;
                Ok(Some(crop))
            }
        }
    }

    pub fn cancel_crop_drag(&mut self) {
        self.selector.cancel();
    }

    /// Resize the preview area and recompute the mapping.
    pub fn set_display_area(&mut self, width: u32, height: u32) {
        self.display_area = (width, height);
        self.refresh_preview();
    }

    fn refresh_preview(&mut self) {
        let (w, h) = self
            .current
            .as_ref()
            .map(|i| i.dimensions())
            .unwrap_or((0, 0));
        self.preview = PreviewMapping::compute(w, h, self.display_area.0, self.display_area.1);
    }

    /// Downscaled copy of the current image for display.
    pub fn render_preview(&self) -> Result<DecodedImage, EditError> {
        let image = self.require_image()?;
        Ok(preview::render_preview(image, &self.preview)?)
    }

    /// Colour of the image pixel under a display point, clamped to the image.
    pub fn probe(&mut self, x: f64, y: f64) -> Result<Probe, EditError> {
        let image = self.require_image()?;
        if !x.is_finite() || !y.is_finite() {
            return Err(EditError::InvalidInput(format!("invalid position ({}, {})", x, y)));
        }
        let (ix, iy) = self.preview.to_image(x, y);
        let px = ix.min(image.width as i64 - 1).max(0) as u32;
        let py = iy.min(image.height as i64 - 1).max(0) as u32;
        let rgb = image.get_pixel(px, py).ok_or(EditError::NoImage)?;
        self.status = format!("Pos: ({},{}) Color: ({}, {}, {})", px, py, rgb[0], rgb[1], rgb[2]);
        Ok(Probe { x: px, y: py, rgb })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, 128]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    fn session_with(image: DecodedImage) -> EditSession {
        let mut session = EditSession::default();
        session.load(image);
        session
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("retouch_session_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.max_undo, 10);
        assert_eq!(config.min_crop_extent, 5);
        assert_eq!(config.display_area, (900, 600));
        assert_eq!(config.jpeg_quality, 95);
        assert!(config.font_path.is_none());
    }

    #[test]
    fn test_operations_without_image() {
        let mut session = EditSession::default();
        assert_eq!(session.status(), "No image loaded");
        assert!(matches!(session.resize_to_width(10), Err(EditError::NoImage)));
        assert!(matches!(session.rotate(90.0), Err(EditError::NoImage)));
        assert!(matches!(session.reset(), Err(EditError::NoImage)));
        assert!(matches!(session.equalize(), Err(EditError::NoImage)));
        assert!(matches!(session.begin_crop_drag(0.0, 0.0), Err(EditError::NoImage)));
        assert!(matches!(session.probe(0.0, 0.0), Err(EditError::NoImage)));
        assert!(matches!(session.undo(), Err(EditError::NothingToUndo)));
        // push_undo is a no-op with nothing loaded
        session.push_undo();
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_resize_keeps_aspect() {
        let mut session = session_with(gradient(200, 100));
        session.resize_to_width(50).unwrap();
        assert_eq!(session.current().unwrap().dimensions(), (50, 25));
        assert_eq!(session.status(), "Resized to 50x25");
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_invalid_width_does_not_mutate() {
        let mut session = session_with(gradient(20, 20));
        assert!(matches!(session.resize_to_width(0), Err(EditError::InvalidInput(_))));
        let err = session.resize_to_width(u32::MAX).unwrap_err();
        assert!(matches!(err, EditError::InvalidInput(_)));
        assert!(err.is_notice());
        assert!(session.history().is_empty());
        assert_eq!(session.current().unwrap().dimensions(), (20, 20));
    }

    #[test]
    fn test_undo_restores_exact_image() {
        let original = gradient(30, 20);
        let mut session = session_with(original.clone());
        session.apply_filter(FilterKind::Blur).unwrap();
        assert_ne!(session.current(), Some(&original));
        session.undo().unwrap();
        assert_eq!(session.current(), Some(&original));
        assert_eq!(session.status(), "Undo");
        assert!(matches!(session.undo(), Err(EditError::NothingToUndo)));
        assert_eq!(session.current(), Some(&original));
    }

    #[test]
    fn test_undo_is_bounded() {
        let mut session = EditSession::new(SessionConfig {
            max_undo: 3,
            ..SessionConfig::default()
        });
        session.load(gradient(10, 10));
        for _ in 0..5 {
            session.rotate(90.0).unwrap();
        }
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn test_reset_is_undoable() {
        let original = gradient(40, 40);
        let mut session = session_with(original.clone());
        session.resize_to_width(20).unwrap();
        session.reset().unwrap();
        assert_eq!(session.current(), Some(&original));
        assert_eq!(session.status(), "Reset to original");
        session.undo().unwrap();
        assert_eq!(session.current().unwrap().dimensions(), (20, 20));
    }

    #[test]
    fn test_load_clears_history() {
        let mut session = session_with(gradient(10, 10));
        session.rotate(90.0).unwrap();
        session.load(gradient(5, 5));
        assert!(session.history().is_empty());
        assert_eq!(session.original().unwrap().dimensions(), (5, 5));
    }

    #[test]
    fn test_rotate_is_clockwise() {
        let image = DecodedImage::new(2, 1, vec![255, 0, 0, 0, 255, 0]);
        let mut session = session_with(image);
        session.rotate(90.0).unwrap();
        let rotated = session.current().unwrap();
        assert_eq!(rotated.dimensions(), (1, 2));
        assert_eq!(rotated.get_pixel(0, 0), Some([255, 0, 0]));
        assert_eq!(session.status(), "Rotated 90°");
    }

    #[test]
    fn test_numeric_crop_is_clamped() {
        let mut session = session_with(gradient(100, 80));
        session.crop(CropBox::new(-10, 20, 500, 10)).unwrap();
        // left 0, right 100, top 20, bottom collapses to 21
        assert_eq!(session.current().unwrap().dimensions(), (100, 1));
        assert_eq!(session.status(), "Cropped to box (0, 20, 100, 21)");
    }

    #[test]
    fn test_brightness_contrast_range() {
        let mut session = session_with(gradient(10, 10));
        assert!(matches!(
            session.brightness_contrast(0.1, 1.0),
            Err(EditError::InvalidInput(_))
        ));
        assert!(matches!(
            session.brightness_contrast(1.0, 2.5),
            Err(EditError::InvalidInput(_))
        ));
        assert!(session.history().is_empty());
        session.brightness_contrast(1.2, 0.8).unwrap();
        assert_eq!(session.status(), "Applied B/C: 1.20/0.80");
    }

    #[test]
    fn test_watermark_validation_before_font_lookup() {
        let mut session = session_with(gradient(10, 10));
        assert!(matches!(session.watermark("   ", 24), Err(EditError::InvalidInput(_))));
        assert!(matches!(session.watermark("hi", 2), Err(EditError::InvalidInput(_))));
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_missing_font_is_reported() {
        let mut session = EditSession::new(SessionConfig {
            font_path: Some(std::env::temp_dir().join("retouch_missing_font.ttf")),
            ..SessionConfig::default()
        });
        session.load(gradient(10, 10));
        let err = session.watermark("hi", 24).unwrap_err();
        assert!(matches!(err, EditError::Watermark(WatermarkError::FontIo { .. })));
        assert!(err.is_notice());
        assert!(session.history().is_empty());
        assert_eq!(session.current().unwrap(), &gradient(10, 10));
    }

    #[test]
    fn test_filters_and_enhance_push_history() {
        let mut session = session_with(gradient(16, 16));
        for kind in FilterKind::ALL {
            session.apply_filter(kind).unwrap();
        }
        session.auto_enhance().unwrap();
        session.equalize().unwrap();
        assert_eq!(session.history().len(), 6);
        assert_eq!(session.status(), "Histogram equalize applied");
    }

    #[test]
    fn test_drag_crop_end_to_end() {
        let original = gradient(100, 100);
        let mut session = session_with(original.clone());
        session.set_display_area(200, 200);
        assert_eq!(session.preview().ratio(), 1.0);
        assert_eq!(session.preview().offset(), (50, 50));

        let (ox, oy) = session.preview().offset();
        let (ox, oy) = (ox as f64, oy as f64);
        session.begin_crop_drag(ox + 10.0, oy + 10.0).unwrap();
        assert!(session.update_crop_drag(ox + 40.0, oy + 40.0).is_some());
        let applied = session.finish_crop_drag(ox + 60.0, oy + 60.0).unwrap();

        assert_eq!(applied, Some(CropBox::new(10, 10, 60, 60)));
        assert_eq!(session.current().unwrap().dimensions(), (50, 50));
        assert_eq!(session.current().unwrap().get_pixel(0, 0), Some([10, 10, 128]));

        session.undo().unwrap();
        assert_eq!(session.current(), Some(&original));
    }

    #[test]
    fn test_small_drag_cancelled_without_push() {
        let mut session = session_with(gradient(100, 100));
        let (ox, oy) = session.preview().offset();
        let (ox, oy) = (ox as f64, oy as f64);
        session.begin_crop_drag(ox + 10.0, oy + 10.0).unwrap();
        let err = session.finish_crop_drag(ox + 13.0, oy + 13.0).unwrap_err();
        assert!(matches!(err, EditError::CropCancelled(CancelReason::AreaTooSmall)));
        assert!(err.is_notice());
        assert!(session.history().is_empty());
        assert_eq!(session.current().unwrap().dimensions(), (100, 100));
    }

    #[test]
    fn test_finish_without_begin_is_ignored() {
        let mut session = session_with(gradient(20, 20));
        assert_eq!(session.finish_crop_drag(5.0, 5.0).unwrap(), None);
        session.begin_crop_drag(0.0, 0.0).unwrap();
        session.cancel_crop_drag();
        assert_eq!(session.finish_crop_drag(50.0, 50.0).unwrap(), None);
    }

    #[test]
    fn test_preview_follows_image_size() {
        let mut session = session_with(gradient(1800, 1200));
        assert_eq!(session.preview().ratio(), 0.5);
        session.resize_to_width(900).unwrap();
        assert_eq!(session.preview().ratio(), 1.0);
        assert_eq!(session.preview().offset(), (0, 0));
    }

    #[test]
    fn test_probe_uses_offset_and_clamps() {
        let mut session = session_with(gradient(100, 100));
        // Preview of a 100x100 image sits at (400, 250) in a 900x600 area
        let probe = session.probe(420.0, 280.0).unwrap();
        assert_eq!(probe, Probe { x: 20, y: 30, rgb: [20, 30, 128] });
        assert_eq!(session.status(), "Pos: (20,30) Color: (20, 30, 128)");

        let probe = session.probe(0.0, 5000.0).unwrap();
        assert_eq!((probe.x, probe.y), (0, 99));

        assert!(matches!(session.probe(f64::NAN, 280.0), Err(EditError::InvalidInput(_))));
    }

    #[test]
    fn test_nan_drag_is_cancelled_without_push() {
        let mut session = session_with(gradient(100, 100));
        session.begin_crop_drag(f64::NAN, f64::NAN).unwrap();
        let err = session.finish_crop_drag(460.0, 310.0).unwrap_err();
        assert!(matches!(err, EditError::CropCancelled(CancelReason::InvalidPoint)));
        assert!(session.history().is_empty());
        assert_eq!(session.current().unwrap().dimensions(), (100, 100));
    }

    #[test]
    fn test_open_and_save_round_trip() {
        let dir = temp_dir("roundtrip");
        let png = dir.join("input.png");
        let image = gradient(12, 8);
        encode::save_image(&image, &png, 95).unwrap();

        let mut session = EditSession::default();
        session.open(&png).unwrap();
        assert_eq!(session.status(), "Opened: input.png (12x8)");
        assert_eq!(session.source_path(), Some(png.as_path()));
        assert_eq!(session.current(), Some(&image));

        session.rotate(90.0).unwrap();
        let out = dir.join("out.png");
        session.save_as(&out).unwrap();
        let saved = decode::open_image(&out).unwrap();
        assert_eq!(saved.dimensions(), (8, 12));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_open_missing_file() {
        let mut session = EditSession::default();
        let err = session
            .open(std::env::temp_dir().join("retouch_does_not_exist.png"))
            .unwrap_err();
        assert!(matches!(err, EditError::Decode(_)));
        assert!(session.current().is_none());
    }

    #[test]
    fn test_parse_width() {
        assert_eq!(parse_width(" 800 ").unwrap(), 800);
        assert!(matches!(parse_width(""), Err(EditError::InvalidInput(_))));
        assert!(matches!(parse_width("0"), Err(EditError::InvalidInput(_))));
        assert!(matches!(parse_width("-5"), Err(EditError::InvalidInput(_))));
        assert!(matches!(parse_width("wide"), Err(EditError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_angle() {
        assert_eq!(parse_angle("90").unwrap(), 90.0);
        assert_eq!(parse_angle(" -12.5 ").unwrap(), -12.5);
        assert!(parse_angle("abc").is_err());
        assert!(parse_angle("NaN").is_err());
        assert!(parse_angle("inf").is_err());
    }

    #[test]
    fn test_parse_crop_box() {
        assert_eq!(parse_crop_box("10,20,30,40").unwrap(), CropBox::new(10, 20, 30, 40));
        assert_eq!(parse_crop_box("10 20 30 40").unwrap(), CropBox::new(10, 20, 30, 40));
        assert_eq!(parse_crop_box("-5, 0, 30, 40").unwrap(), CropBox::new(-5, 0, 30, 40));
        assert!(parse_crop_box("10,20,30").is_err());
        assert!(parse_crop_box("a,b,c,d").is_err());
    }
}
