//! Image encoding for save/export.
//!
//! This module provides functionality for:
//! - Choosing an output format from a file extension
//! - Encoding to JPEG (configurable quality), PNG, WEBP, TIFF and BMP
//! - Writing the result to disk
//!
//! # Examples
//!
//! ```ignore
//! use retouch_core::encode::{save_image, DEFAULT_JPEG_QUALITY};
//!
//! let format = save_image(&image, "out.webp", DEFAULT_JPEG_QUALITY).unwrap();
//! println!("Saved as {:?}", format);
//! ```

mod format;

pub use format::{
    encode_image, encode_jpeg, save_image, EncodeError, OutputFormat, DEFAULT_JPEG_QUALITY,
};
