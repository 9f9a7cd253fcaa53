//! Luma and YCbCr conversion using ITU-R BT.601 coefficients.
//!
//! This is the full-range (JPEG) variant: Y, Cb and Cr all span 0-255 and
//! chroma is centred on 128.

/// ITU-R BT.601 coefficient for red channel in luma calculation.
pub const LUMA_R: f32 = 0.299;

/// ITU-R BT.601 coefficient for green channel in luma calculation.
pub const LUMA_G: f32 = 0.587;

/// ITU-R BT.601 coefficient for blue channel in luma calculation.
pub const LUMA_B: f32 = 0.114;

/// Calculate luma from normalized RGB values (0.0 to 1.0).
#[inline]
pub fn calculate_luma(r: f32, g: f32, b: f32) -> f32 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

/// Calculate luma from u8 RGB values in 16-bit fixed point.
///
/// The weights are the BT.601 coefficients scaled by 65536, so results are
/// bit-exact across platforms.
#[inline]
pub fn calculate_luma_u8(r: u8, g: u8, b: u8) -> u8 {
    let v = r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000;
    (v >> 16) as u8
}

/// Convert one RGB pixel to full-range YCbCr.
#[inline]
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let y = LUMA_R * r + LUMA_G * g + LUMA_B * b;
    let cb = 128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b;
    let cr = 128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b;
    [to_u8(y), to_u8(cb), to_u8(cr)]
}

/// Convert one full-range YCbCr pixel back to RGB.
#[inline]
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y = y as f32;
    let cb = cb as f32 - 128.0;
    let cr = cr as f32 - 128.0;
    let r = y + 1.402 * cr;
    let g = y - 0.344_136 * cb - 0.714_136 * cr;
    let b = y + 1.772 * cb;
    [to_u8(r), to_u8(g), to_u8(b)]
}

#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
