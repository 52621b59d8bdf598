//! Retouch Core - single-image transform layer
//!
//! Wraps an encoded image and exposes the editing operations a web photo
//! pipeline needs: EXIF orientation correction, resize/extend/crop/rotate,
//! mirroring, tone adjustments, color overlays, red-eye correction and
//! export optimization.
//!
//! Pixel work goes through the [`PixelEngine`] trait. [`RasterEngine`] is the
//! default implementation, built on the `image` crate.
//!
//! ```ignore
//! use retouch_core::{Direction, Image};
//!
//! let mut image: Image = Image::from_bytes(&jpeg_bytes)?;
//! image.correct_orientation()?;
//! image.resize(800, 600, true)?;
//! image.mirror(Direction::Horizontal)?;
//! image.optimize()?;
//! let out = image.to_bytes()?;
//! ```

pub mod adjustments;
pub mod color;
pub mod decode;
pub mod encode;
pub mod engine;
pub mod image;
pub mod luminance;
pub mod optimize;
pub mod redeye;
pub mod transform;

#[cfg(test)]
mod test_support;

pub use self::image::{Direction, Image, ImageError};
pub use color::{parse_color, Color, ColorError};
pub use decode::{ExifError, Orientation};
pub use engine::{EngineError, PixelEngine, RasterEngine, RegionCursor};
pub use optimize::{JpegPreset, PngPreset};
pub use transform::compute_rotated_bounds;
