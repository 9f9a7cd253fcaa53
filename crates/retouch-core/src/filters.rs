//! Named convolution filters and greyscale conversion.
//!
//! Kernels are applied to the interior of the image only. Pixels closer to
//! the edge than the kernel radius are copied through unfiltered.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::DecodedImage;
use crate::luminance::calculate_luma_u8;

/// A square convolution kernel with a divisor and bias.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel {
    /// Edge length, 3 or 5.
    pub size: usize,
    /// Row-major weights, `size * size` entries.
    pub weights: &'static [i32],
    pub scale: i32,
    pub offset: i32,
}

#[rustfmt::skip]
pub const BLUR: Kernel = Kernel {
    size: 5,
    weights: &[
        1, 1, 1, 1, 1,
        1, 0, 0, 0, 1,
        1, 0, 0, 0, 1,
        1, 0, 0, 0, 1,
        1, 1, 1, 1, 1,
    ],
    scale: 16,
    offset: 0,
};

#[rustfmt::skip]
pub const SHARPEN: Kernel = Kernel {
    size: 3,
    weights: &[
        -2, -2, -2,
        -2, 32, -2,
        -2, -2, -2,
    ],
    scale: 16,
    offset: 0,
};

#[rustfmt::skip]
pub const FIND_EDGES: Kernel = Kernel {
    size: 3,
    weights: &[
        -1, -1, -1,
        -1,  8, -1,
        -1, -1, -1,
    ],
    scale: 1,
    offset: 0,
};

/// Mild smoothing, the base image for sharpness enhancement.
#[rustfmt::skip]
pub const SMOOTH: Kernel = Kernel {
    size: 3,
    weights: &[
        1, 1, 1,
        1, 5, 1,
        1, 1, 1,
    ],
    scale: 13,
    offset: 0,
};

/// Filter selectable by name from the editor and batch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Blur,
    Sharpen,
    Edge,
    #[serde(rename = "bw", alias = "greyscale")]
    Greyscale,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown filter '{0}' (expected blur, sharpen, edge or bw)")]
pub struct UnknownFilter(pub String);

impl FilterKind {
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Blur,
        FilterKind::Sharpen,
        FilterKind::Edge,
        FilterKind::Greyscale,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Blur => "blur",
            FilterKind::Sharpen => "sharpen",
            FilterKind::Edge => "edge",
            FilterKind::Greyscale => "bw",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blur" => Ok(FilterKind::Blur),
            "sharpen" => Ok(FilterKind::Sharpen),
            "edge" | "edges" | "find_edges" => Ok(FilterKind::Edge),
            "bw" | "grayscale" | "greyscale" | "gray" | "grey" => Ok(FilterKind::Greyscale),
            _ => Err(UnknownFilter(s.to_string())),
        }
    }
}

/// Apply a named filter, returning a new image.
pub fn apply_filter(image: &DecodedImage, kind: FilterKind) -> DecodedImage {
    log::debug!("Applying {} filter", kind);
    match kind {
        FilterKind::Blur => convolve(image, &BLUR),
        FilterKind::Sharpen => convolve(image, &SHARPEN),
        FilterKind::Edge => convolve(image, &FIND_EDGES),
        FilterKind::Greyscale => to_greyscale(image),
    }
}

/// Convert to BT.601 luma, stored with equal RGB channels.
pub fn to_greyscale(image: &DecodedImage) -> DecodedImage {
    let mut pixels = Vec::with_capacity(image.pixels.len());
    for p in image.pixels.chunks_exact(3) {
        let l = calculate_luma_u8(p[0], p[1], p[2]);
        pixels.extend_from_slice(&[l, l, l]);
    }
    DecodedImage {
        width: image.width,
        height: image.height,
        pixels,
    }
}

/// Convolve every channel with `kernel`.
pub fn convolve(image: &DecodedImage, kernel: &Kernel) -> DecodedImage {
    let mut out = image.clone();
    let (w, h) = (image.width as usize, image.height as usize);
    let r = kernel.size / 2;
    if w < kernel.size || h < kernel.size {
        return out;
    }

    let scale = kernel.scale as f32;
    let offset = kernel.offset as f32;

    for y in r..h - r {
        for x in r..w - r {
            let mut acc = [0i32; 3];
            for ky in 0..kernel.size {
                let row = (y + ky - r) * w;
                for kx in 0..kernel.size {
                    let weight = kernel.weights[ky * kernel.size + kx];
                    if weight == 0 {
                        continue;
                    }
                    let idx = (row + x + kx - r) * 3;
                    for (c, a) in acc.iter_mut().enumerate() {
                        *a += weight * image.pixels[idx + c] as i32;
                    }
                }
            }
            let dst = (y * w + x) * 3;
            for (c, a) in acc.iter().enumerate() {
                let v = *a as f32 / scale + offset;
                out.pixels[dst + c] = (v + 0.5).clamp(0.0, 255.0) as u8;
            }
        }
    }

    out
}
