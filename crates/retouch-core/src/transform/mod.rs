//! Geometric transforms: rotation and cropping.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees. [`apply_rotation`] treats positive as
//!   counter-clockwise, [`rotate_clockwise`] as clockwise.
//! - Crop boxes are integer pixel coordinates `(left, top, right, bottom)`
//!   with exclusive right and bottom edges.
//! - Origin is the top-left corner.

mod crop;
mod rotation;

pub use crop::{apply_crop, crop_padded, CropBox, TransformError};
pub use rotation::{
    apply_rotation, compute_rotated_bounds, quarter_turns, rotate_clockwise, InterpolationFilter,
};
