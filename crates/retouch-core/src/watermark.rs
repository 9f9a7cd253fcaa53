//! Text watermarks rendered with `ab_glyph`.
//!
//! Rendering happens in two steps. [`render_text_mask`] lays out a single
//! line of text and rasterizes it into a coverage mask, then
//! [`composite_mask`] blends that mask onto the image in a given colour.
//! [`apply_watermark`] ties both together using a [`WatermarkStyle`].

use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::DecodedImage;

/// Default editor font size in pixels.
pub const DEFAULT_FONT_SIZE: f32 = 24.0;

/// Fonts tried, in order, when no font path is configured.
pub const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("Watermark text is empty")]
    EmptyText,

    #[error("Could not read font {path}: {message}")]
    FontIo { path: PathBuf, message: String },

    #[error("Invalid font data in {0}")]
    InvalidFont(String),

    #[error("No usable font found (tried {tried} locations); pass a font path")]
    NoFont { tried: usize },
}

/// Corner of the image the watermark is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkAnchor {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

/// Placement, size and colours of a watermark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkStyle {
    pub anchor: WatermarkAnchor,
    /// Distance from the anchored edges, in pixels.
    pub margin: u32,
    pub font_size: f32,
    /// RGBA text colour.
    pub fill: [u8; 4],
    /// RGBA shadow colour and its offset from the text.
    pub shadow: Option<([u8; 4], (i32, i32))>,
}

impl WatermarkStyle {
    /// Semi-transparent white text with a soft drop shadow, bottom-right.
    pub fn signature(font_size: f32) -> Self {
        Self {
            anchor: WatermarkAnchor::BottomRight,
            margin: 10,
            font_size,
            fill: [255, 255, 255, 200],
            shadow: Some(([0, 0, 0, 140], (1, 1))),
        }
    }

    /// Opaque white text in the top-left corner, used by batch runs.
    pub fn stamp(font_size: f32) -> Self {
        Self {
            anchor: WatermarkAnchor::TopLeft,
            margin: 10,
            font_size,
            fill: [255, 255, 255, 255],
            shadow: None,
        }
    }
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self::signature(DEFAULT_FONT_SIZE)
    }
}

/// Single-channel coverage of rendered text, values in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMask {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<f32>,
}

impl TextMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0.0; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.coverage[(y * self.width + x) as usize]
    }

    fn add(&mut self, x: i64, y: i64, c: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = (y as usize) * self.width as usize + x as usize;
        self.coverage[idx] = (self.coverage[idx] + c).min(1.0);
    }
}

/// Load a TrueType/OpenType font from disk.
pub fn load_font(path: &Path) -> Result<FontArc, WatermarkError> {
    let bytes = std::fs::read(path).map_err(|e| WatermarkError::FontIo {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    FontArc::try_from_vec(bytes)
        .map_err(|_| WatermarkError::InvalidFont(path.display().to_string()))
}

/// Load `preferred` if given, otherwise the first readable font among
/// [`FONT_CANDIDATES`].
pub fn find_font(preferred: Option<&Path>) -> Result<FontArc, WatermarkError> {
    if let Some(path) = preferred {
        return load_font(path);
    }
    for candidate in FONT_CANDIDATES {
        let path = Path::new(candidate);
        if !path.is_file() {
            continue;
        }
        match load_font(path) {
            Ok(font) => {
                log::debug!("Using watermark font {}", path.display());
                return Ok(font);
            }
            Err(e) => log::warn!("Skipping font {}: {}", path.display(), e),
        }
    }
    Err(WatermarkError::NoFont {
        tried: FONT_CANDIDATES.len(),
    })
}

/// Trimmed watermark text, or `EmptyText` if nothing remains.
pub fn validate_text(text: &str) -> Result<&str, WatermarkError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(WatermarkError::EmptyText);
    }
    Ok(trimmed)
}

/// Rasterize one line of text into a coverage mask sized to its layout box.
pub fn render_text_mask(font: &FontArc, text: &str, font_size: f32) -> TextMask {
    let scaled = font.as_scaled(font_size);
    let ascent = scaled.ascent();
    let descent = scaled.descent();

    let mut glyphs = Vec::new();
    let mut cursor_x = 0.0f32;
    let mut last_glyph: Option<GlyphId> = None;
    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = last_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }
        glyphs.push((glyph_id, cursor_x));
        cursor_x += scaled.h_advance(glyph_id);
        last_glyph = Some(glyph_id);
    }

    let width = cursor_x.ceil().max(1.0) as u32;
    let height = (ascent - descent).ceil().max(1.0) as u32;
    let mut mask = TextMask::new(width, height);

    for (glyph_id, x) in glyphs {
        let glyph = glyph_id.with_scale_and_position(font_size, point(x, ascent));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let (bx, by) = (bounds.min.x as i64, bounds.min.y as i64);
            outlined.draw(|px, py, cov| {
                mask.add(bx + px as i64, by + py as i64, cov);
            });
        }
    }

    mask
}

/// Top-left position of a `mask_w` x `mask_h` block anchored inside an image.
///
/// The result can be negative when the text is larger than the image.
pub fn anchor_position(
    image_size: (u32, u32),
    mask_size: (u32, u32),
    anchor: WatermarkAnchor,
    margin: u32,
) -> (i64, i64) {
    let (w, h) = (image_size.0 as i64, image_size.1 as i64);
    let (mw, mh) = (mask_size.0 as i64, mask_size.1 as i64);
    let m = margin as i64;
    match anchor {
        WatermarkAnchor::TopLeft => (m, m),
        WatermarkAnchor::TopRight => (w - mw - m, m),
        WatermarkAnchor::BottomLeft => (m, h - mh - m),
        WatermarkAnchor::BottomRight => (w - mw - m, h - mh - m),
    }
}

/// Alpha-blend `color` onto `image` through `mask`, with the mask's
/// top-left corner at `(x, y)`. Parts falling outside the image are dropped.
pub fn composite_mask(image: &mut DecodedImage, mask: &TextMask, x: i64, y: i64, color: [u8; 4]) {
    let alpha_scale = color[3] as f32 / 255.0;
    for my in 0..mask.height {
        let iy = y + my as i64;
        if iy < 0 || iy >= image.height as i64 {
            continue;
        }
        for mx in 0..mask.width {
            let ix = x + mx as i64;
            if ix < 0 || ix >= image.width as i64 {
                continue;
            }
            let a = mask.get(mx, my) * alpha_scale;
            if a <= 0.0 {
                continue;
            }
            let idx = ((iy as usize) * image.width as usize + ix as usize) * 3;
            for c in 0..3 {
                let dst = image.pixels[idx + c] as f32;
                let v = dst + (color[c] as f32 - dst) * a;
                image.pixels[idx + c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Draw `text` onto a copy of `image`.
pub fn apply_watermark(
    image: &DecodedImage,
    font: &FontArc,
    text: &str,
    style: &WatermarkStyle,
) -> Result<DecodedImage, WatermarkError> {
    let text = validate_text(text)?;
    let mask = render_text_mask(font, text, style.font_size);
    let (x, y) = anchor_position(
        image.dimensions(),
        (mask.width, mask.height),
        style.anchor,
        style.margin,
    );

    let mut out = image.clone();
    if let Some((shadow, (dx, dy))) = style.shadow {
        composite_mask(&mut out, &mask, x + dx as i64, y + dy as i64, shadow);
    }
    composite_mask(&mut out, &mask, x, y, style.fill);

    log::debug!(
        "Watermarked {}x{} image at ({}, {}) with {}x{} text",
        image.width,
        image.height,
        x,
        y,
        mask.width,
        mask.height
    );
    Ok(out)
}
