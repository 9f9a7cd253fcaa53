//! Retouch Core - Image editing library
//!
//! This crate provides the image processing behind Retouch: decoding and
//! encoding, geometric transforms, filters and tonal adjustments, text
//! watermarks, a bounded undo history, preview mapping with pointer-drag
//! crop selection, the editing session tying these together, and folder
//! batch processing.

pub mod adjustments;
pub mod batch;
pub mod decode;
pub mod encode;
pub mod filters;
pub mod histogram;
pub mod history;
pub mod luminance;
pub mod preview;
pub mod selection;
pub mod session;
pub mod transform;
pub mod watermark;

pub use batch::{process_folder, BatchError, BatchOptions, BatchReport};
pub use decode::{DecodeError, DecodedImage};
pub use encode::{EncodeError, OutputFormat};
pub use filters::FilterKind;
pub use histogram::Histogram;
pub use history::History;
pub use preview::PreviewMapping;
pub use selection::{CancelReason, CropOutcome, CropSelector};
pub use session::{EditError, EditSession, SessionConfig};
pub use transform::{CropBox, InterpolationFilter};
pub use watermark::{WatermarkAnchor, WatermarkError, WatermarkStyle};
