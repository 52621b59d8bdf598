//! Orientation and metadata types shared by the decoder and the engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons EXIF metadata could not supply an orientation.
///
/// These never abort image construction; the resolver falls back to the
/// engine's embedded tag instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExifError {
    /// The container carries no EXIF block.
    #[error("no EXIF metadata found")]
    Missing,

    /// The EXIF block exists but could not be parsed.
    #[error("malformed EXIF metadata: {0}")]
    Malformed(String),

    /// The primary IFD has no orientation tag.
    #[error("EXIF metadata has no orientation tag")]
    NoOrientationTag,

    /// The orientation tag is present but not an integer.
    #[error("EXIF orientation tag is not an integer: {0}")]
    InvalidValue(String),
}

/// Image orientation as stored in the EXIF `Orientation` tag (0-8).
///
/// Names describe where row 0 and column 0 of the stored pixels sit when the
/// image is displayed correctly. `Undefined` means no orientation data.
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum Orientation {
    /// No orientation data.
    #[default]
    Undefined = 0,
    /// Canonical; no transformation needed.
    TopLeft = 1,
    /// Mirrored left-right.
    TopRight = 2,
    /// Rotated 180 degrees.
    BottomRight = 3,
    /// Mirrored top-bottom.
    BottomLeft = 4,
    /// Transposed.
    LeftTop = 5,
    /// Needs a 90 degree clockwise rotation.
    RightTop = 6,
    /// Transversed.
    RightBottom = 7,
    /// Needs a 90 degree counter-clockwise rotation.
    LeftBottom = 8,
}

impl Orientation {
    /// The numeric EXIF tag value.
    #[inline]
    pub fn exif_value(self) -> u8 {
        self as u8
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::TopLeft,
            2 => Orientation::TopRight,
            3 => Orientation::BottomRight,
            4 => Orientation::BottomLeft,
            5 => Orientation::LeftTop,
            6 => Orientation::RightTop,
            7 => Orientation::RightBottom,
            8 => Orientation::LeftBottom,
            _ => Orientation::Undefined,
        }
    }
}
