//! Image decoding and resampling for Retouch.
//!
//! This module provides functionality for:
//! - Decoding images from bytes or files (JPEG, PNG, WEBP, TIFF, BMP)
//! - Applying EXIF orientation on load
//! - Image resizing for edits and for preview rendering
//!
//! Every decoded image is converted to RGB; the rest of the crate only ever
//! sees 3-byte pixels.
//!
//! # Examples
//!
//! ```ignore
//! use retouch_core::decode::{open_image, resize_to_width, FilterType};
//!
//! let image = open_image("photo.jpg").unwrap();
//! let smaller = resize_to_width(&image, 800, FilterType::Lanczos3).unwrap();
//! println!("Resized to {}x{}", smaller.width, smaller.height);
//! ```

mod open;
mod resize;
mod types;

pub use open::{decode_image, get_orientation, open_image};
pub use resize::{height_for_width, resize, resize_to_width, scale_by};
pub use types::{
    within_pixel_budget, DecodeError, DecodedImage, FilterType, Orientation, MAX_PIXELS,
};
