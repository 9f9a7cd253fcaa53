//! Pointer-drag crop selection over a scaled preview.
//!
//! The selector is a two-state machine. A pointer-down in `Idle` starts a
//! drag; moves update it; the pointer-up ends it and yields either a crop
//! box in image coordinates or a cancellation. Events that make no sense in
//! the current state are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::preview::PreviewMapping;
use crate::transform::CropBox;

/// Smallest selection edge accepted, in pixels.
pub const DEFAULT_MIN_CROP_EXTENT: u32 = 5;

/// Why a drag did not produce a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    /// The dragged rectangle was too small on screen.
    AreaTooSmall,
    /// The rectangle shrank below the minimum once mapped and clamped to
    /// the image.
    TooSmallAfterMapping,
    /// A pointer coordinate was NaN or infinite.
    InvalidPoint,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::AreaTooSmall => write!(f, "crop area too small"),
            CancelReason::TooSmallAfterMapping => {
                write!(f, "crop area too small after mapping to the image")
            }
            CancelReason::InvalidPoint => write!(f, "pointer position is not a number"),
        }
    }
}

/// Result of releasing the pointer during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropOutcome {
    Apply(CropBox),
    Cancelled(CancelReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        anchor: (f64, f64),
        current: (f64, f64),
    },
}

/// Normalized rectangle in display coordinates, for drawing the rubber band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl DisplayRect {
    fn spanning(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            x0: a.0.min(b.0),
            y0: a.1.min(b.1),
            x1: a.0.max(b.0),
            y1: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

#[derive(Debug, Clone)]
pub struct CropSelector {
    state: DragState,
    min_extent: u32,
}

impl Default for CropSelector {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CROP_EXTENT)
    }
}

impl CropSelector {
    pub fn new(min_extent: u32) -> Self {
        Self {
            state: DragState::Idle,
            min_extent,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn min_extent(&self) -> u32 {
        self.min_extent
    }

    /// Start a drag at a display point. A drag already in progress is
    /// replaced.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.state = DragState::Dragging {
            anchor: (x, y),
            current: (x, y),
        };
    }

    /// Track the pointer; returns the rectangle to draw, or `None` when idle.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<DisplayRect> {
        match &mut self.state {
            DragState::Idle => None,
            DragState::Dragging { anchor, current } => {
                *current = (x, y);
                Some(DisplayRect::spanning(*anchor, *current))
            }
        }
    }

    /// Finish the drag at a display point and decide the crop.
    ///
    /// Returns `None` if no drag was in progress.
    pub fn pointer_up(
        &mut self,
        x: f64,
        y: f64,
        mapping: &PreviewMapping,
        image_size: (u32, u32),
    ) -> Option<CropOutcome> {
        let DragState::Dragging { anchor, .. } = self.state else {
            return None;
        };
        self.state = DragState::Idle;
        Some(selection_to_crop(
            anchor,
            (x, y),
            mapping,
            image_size,
            self.min_extent,
        ))
    }

    /// Abandon any drag in progress.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

/// Convert a display-space drag into a validated, clamped crop box.
pub fn selection_to_crop(
    start: (f64, f64),
    end: (f64, f64),
    mapping: &PreviewMapping,
    image_size: (u32, u32),
    min_extent: u32,
) -> CropOutcome {
    if ![start.0, start.1, end.0, end.1].iter().all(|v| v.is_finite()) {
        return CropOutcome::Cancelled(CancelReason::InvalidPoint);
    }
    let min = min_extent as f64;
    if (end.0 - start.0).abs() < min || (end.1 - start.1).abs() < min {
        return CropOutcome::Cancelled(CancelReason::AreaTooSmall);
    }

    let a = mapping.to_image(start.0, start.1);
    let b = mapping.to_image(end.0, end.1);
    let crop = CropBox::from_corners(a, b).clamped(image_size.0, image_size.1);

    let min = min_extent as i64;
    if crop.width() < min || crop.height() < min {
        return CropOutcome::Cancelled(CancelReason::TooSmallAfterMapping);
    }
    CropOutcome::Apply(crop)
}
