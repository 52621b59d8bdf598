//! Geometric transforms: size arithmetic, canvas crop/extent, rotation and
//! orientation correction.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise
//! - Crop and extent offsets are pixels, signed, relative to the current image
//! - Origin is top-left corner

mod crop;
mod geometry;
mod orientation;
mod rotation;

pub use crop::{crop_canvas, extent_canvas};
pub use geometry::{
    extent_is_noop, extent_offsets, fill_zero_dimensions, fit_dimensions, rotation_angle,
};
pub use orientation::{correction_steps, OrientStep};
pub use rotation::{compute_rotated_bounds, rotate_canvas};
