//! Orientation metadata for decoded images.
//!
//! This module provides functionality for:
//! - Reading the EXIF orientation tag from an encoded image container
//! - Exposing EXIF fields as `exif:<Tag>` properties
//! - Reconciling the EXIF value with the tag the engine stored on decode
//!
//! # Resolution order
//!
//! 1. EXIF `Orientation` in the primary IFD, when present and an integer
//! 2. The orientation the pixel engine embedded in the decoded raster
//!
//! A missing or malformed EXIF block is expected and never fatal.
//!
//! # Examples
//!
//! ```ignore
//! use retouch_core::decode::{read_orientation, resolve_orientation, Orientation};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let orientation = resolve_orientation(read_orientation(&bytes), Orientation::Undefined);
//! ```

mod metadata;
mod types;

pub use metadata::{read_orientation, read_properties, read_raw_orientation, resolve_orientation};
pub use types::{ExifError, Orientation};
