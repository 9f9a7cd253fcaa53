//! Histogram computation and luma histogram equalization.
//!
//! Equalization works on the Y channel of a full-range YCbCr copy of the
//! image, so brightness is redistributed while hue and saturation stay put.

use crate::decode::DecodedImage;
use crate::luminance::{calculate_luma_u8, rgb_to_ycbcr, ycbcr_to_rgb};

/// Per-channel 256-bin histograms of an RGB image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    /// Red channel histogram (256 bins)
    pub red: [u32; 256],
    /// Green channel histogram (256 bins)
    pub green: [u32; 256],
    /// Blue channel histogram (256 bins)
    pub blue: [u32; 256],
    /// BT.601 luma histogram (256 bins)
    pub luma: [u32; 256],
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            red: [0; 256],
            green: [0; 256],
            blue: [0; 256],
            luma: [0; 256],
        }
    }
}

impl Histogram {
    /// Create a new empty histogram
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pixels counted.
    pub fn total(&self) -> u64 {
        self.luma.iter().map(|&c| c as u64).sum()
    }

    /// Mean luma, or `None` for an empty histogram.
    pub fn mean_luma(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let sum: u64 = self
            .luma
            .iter()
            .enumerate()
            .map(|(v, &c)| v as u64 * c as u64)
            .sum();
        Some(sum as f64 / total as f64)
    }

    /// Lowest and highest occupied luma bins.
    pub fn luma_range(&self) -> Option<(u8, u8)> {
        channel_bounds(&self.luma)
    }

    /// Check for highlight clipping (values at 255)
    pub fn has_highlight_clipping(&self) -> bool {
        self.red[255] > 0 || self.green[255] > 0 || self.blue[255] > 0
    }

    /// Check for shadow clipping (values at 0)
    pub fn has_shadow_clipping(&self) -> bool {
        self.red[0] > 0 || self.green[0] > 0 || self.blue[0] > 0
    }
}

/// Compute RGB and luma histograms of an image in a single pass.
///
/// # Example
/// ```
/// use retouch_core::decode::DecodedImage;
/// use retouch_core::histogram::compute_histogram;
///
/// let image = DecodedImage::new(2, 1, vec![255, 0, 0, 0, 255, 0]);
/// let hist = compute_histogram(&image);
/// assert_eq!(hist.red[255], 1);
/// assert_eq!(hist.green[255], 1);
/// ```
pub fn compute_histogram(image: &DecodedImage) -> Histogram {
    let mut hist = Histogram::new();

    for chunk in image.pixels.chunks_exact(3) {
        hist.red[chunk[0] as usize] += 1;
        hist.green[chunk[1] as usize] += 1;
        hist.blue[chunk[2] as usize] += 1;
        hist.luma[calculate_luma_u8(chunk[0], chunk[1], chunk[2]) as usize] += 1;
    }

    hist
}

/// First and last non-empty bins of a channel histogram.
pub fn channel_bounds(bins: &[u32; 256]) -> Option<(u8, u8)> {
    let lo = bins.iter().position(|&c| c > 0)?;
    let hi = bins.iter().rposition(|&c| c > 0)?;
    Some((lo as u8, hi as u8))
}

/// Build an equalization lookup table for one 256-bin histogram.
///
/// The step is the pixel count excluding the top occupied bin, spread over
/// 255 levels. Each bin maps to the cumulative count of the bins below it
/// (plus half a step) divided by the step. Histograms with a single
/// occupied bin, or too few pixels to fill a step, map to identity.
pub fn equalize_lut(bins: &[u32; 256]) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = i as u8;
    }

    let occupied: Vec<u64> = bins.iter().filter(|&&c| c > 0).map(|&c| c as u64).collect();
    let Some(&last) = occupied.last() else {
        return lut;
    };
    if occupied.len() <= 1 {
        return lut;
    }

    let total: u64 = occupied.iter().sum();
    let step = (total - last) / 255;
    if step == 0 {
        return lut;
    }

    let mut n = step / 2;
    for (i, v) in lut.iter_mut().enumerate() {
        *v = (n / step).min(255) as u8;
        n += bins[i] as u64;
    }
    lut
}

/// Equalize the luma channel, leaving chroma untouched.
pub fn equalize_luma(image: &DecodedImage) -> DecodedImage {
    let ycbcr: Vec<[u8; 3]> = image
        .pixels
        .chunks_exact(3)
        .map(|p| rgb_to_ycbcr(p[0], p[1], p[2]))
        .collect();

    let mut bins = [0u32; 256];
    for p in &ycbcr {
        bins[p[0] as usize] += 1;
    }
    let lut = equalize_lut(&bins);

    let mut pixels = Vec::with_capacity(image.pixels.len());
    for [y, cb, cr] in ycbcr {
        pixels.extend_from_slice(&ycbcr_to_rgb(lut[y as usize], cb, cr));
    }

    log::debug!("Equalized luma of {}x{} image", image.width, image.height);

    DecodedImage {
        width: image.width,
        height: image.height,
        pixels,
    }
}
