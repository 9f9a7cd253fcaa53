//! Tonal enhancement: brightness, contrast, sharpness and autocontrast.
//!
//! The enhancers share one model. Each builds a *degenerate* version of
//! the image and interpolates from it towards the original by `factor`:
//!
//! | enhancer   | degenerate image                  |
//! |------------|-----------------------------------|
//! | brightness | black                             |
//! | contrast   | flat grey at the rounded mean luma |
//! | sharpness  | the image smoothed with [`SMOOTH`] |
//!
//! A factor of 1.0 returns the original, 0.0 the degenerate image, and
//! values above 1.0 extrapolate away from it.
//!
//! [`SMOOTH`]: crate::filters::SMOOTH

use crate::decode::DecodedImage;
use crate::filters::{convolve, SMOOTH};
use crate::histogram::{channel_bounds, compute_histogram};

/// Sharpness factor applied after autocontrast by [`auto_enhance`].
pub const AUTO_SHARPNESS: f32 = 1.2;

/// Interpolate `base + factor * (image - base)` per channel, truncating and
/// clamping to 0-255.
#[inline]
fn blend_channel(base: u8, value: u8, factor: f32) -> u8 {
    let v = base as f32 + factor * (value as f32 - base as f32);
    v.clamp(0.0, 255.0) as u8
}

fn blend_with(image: &DecodedImage, factor: f32, base: impl Fn(usize) -> u8) -> DecodedImage {
    let pixels = image
        .pixels
        .iter()
        .enumerate()
        .map(|(i, &v)| blend_channel(base(i), v, factor))
        .collect();
    DecodedImage {
        width: image.width,
        height: image.height,
        pixels,
    }
}

/// Scale every channel by `factor`.
pub fn enhance_brightness(image: &DecodedImage, factor: f32) -> DecodedImage {
    blend_with(image, factor, |_| 0)
}

/// Push channels away from (or towards) the image's mean luma.
pub fn enhance_contrast(image: &DecodedImage, factor: f32) -> DecodedImage {
    let mean = compute_histogram(image)
        .mean_luma()
        .map(|m| (m + 0.5) as u8)
        .unwrap_or(0);
    blend_with(image, factor, |_| mean)
}

/// Blend between a smoothed copy and the original.
pub fn enhance_sharpness(image: &DecodedImage, factor: f32) -> DecodedImage {
    let smoothed = convolve(image, &SMOOTH);
    blend_with(image, factor, |i| smoothed.pixels[i])
}

/// Brightness followed by contrast, the order the editor's sliders apply.
pub fn brightness_contrast(image: &DecodedImage, brightness: f32, contrast: f32) -> DecodedImage {
    enhance_contrast(&enhance_brightness(image, brightness), contrast)
}

/// Stretch each channel so its darkest value becomes 0 and its brightest 255.
///
/// Channels with a single value are left alone.
pub fn autocontrast(image: &DecodedImage) -> DecodedImage {
    let hist = compute_histogram(image);
    let luts = [
        stretch_lut(&hist.red),
        stretch_lut(&hist.green),
        stretch_lut(&hist.blue),
    ];

    let pixels = image
        .pixels
        .iter()
        .enumerate()
        .map(|(i, &v)| luts[i % 3][v as usize])
        .collect();

    DecodedImage {
        width: image.width,
        height: image.height,
        pixels,
    }
}

fn stretch_lut(bins: &[u32; 256]) -> [u8; 256] {
    let mut lut = [0u8; 256];
    let bounds = channel_bounds(bins).filter(|(lo, hi)| hi > lo);
    match bounds {
        Some((lo, hi)) => {
            let (lo, span) = (lo as i64, (hi - lo) as i64);
            for (ix, v) in lut.iter_mut().enumerate() {
                let mapped = (ix as i64 - lo) * 255 / span;
                *v = mapped.clamp(0, 255) as u8;
            }
        }
        None => {
            for (ix, v) in lut.iter_mut().enumerate() {
                *v = ix as u8;
            }
        }
    }
    lut
}

/// One-click enhancement: autocontrast, then a gentle sharpen.
pub fn auto_enhance(image: &DecodedImage) -> DecodedImage {
    enhance_sharpness(&autocontrast(image), AUTO_SHARPNESS)
}
