//! Pixel engine boundary.
//!
//! The [`PixelEngine`] trait is the complete contract between [`Image`] and
//! the raster library underneath it: decode/encode, metadata, geometric and
//! tone primitives, and a row cursor over a rectangular pixel region. Nothing
//! above this trait touches pixels directly except through [`RegionCursor`].
//!
//! The production implementation is [`RasterEngine`], built on the `image`
//! crate. Tests swap in a recording mock so primitive sequences can be
//! asserted exactly.
//!
//! [`Image`]: crate::Image

pub mod raster;

#[cfg(test)]
pub(crate) mod mock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{parse_color, Color, ColorError};
use crate::decode::Orientation;

pub use raster::{RasterEngine, RasterRegion};

/// Failures reported by a pixel engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The input bytes are not a decodable image.
    #[error("cannot decode image: {0}")]
    Decode(String),

    /// The raster could not be serialized.
    #[error("cannot encode image as {format}: {reason}")]
    Encode { format: String, reason: String },

    /// The format name is not one the engine can write.
    #[error("unsupported image format {0:?}")]
    UnsupportedFormat(String),

    /// A geometry argument leaves nothing of the image.
    #[error("geometry {width}x{height}{x:+}{y:+} does not contain image")]
    InvalidGeometry {
        width: u32,
        height: u32,
        x: i64,
        y: i64,
    },

    /// A pixel region extends past the canvas.
    #[error("region {width}x{height}{x:+}{y:+} exceeds {canvas_width}x{canvas_height} canvas")]
    RegionOutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        canvas_width: u32,
        canvas_height: u32,
    },

    /// A row commit was requested before any row was fetched.
    #[error("no region row to sync")]
    NoCurrentRow,

    /// A row of pixel mutations could not be written back.
    #[error("cannot sync region row {row}: {reason}")]
    Sync { row: u32, reason: String },

    /// A profile payload was rejected.
    #[error("invalid {name} profile: {reason}")]
    Profile { name: String, reason: String },

    /// Any other primitive failure.
    #[error("{0}")]
    Primitive(String),
}

/// Reconstruction filter for the resize primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    /// Two-lobe Lanczos windowed sinc.
    #[default]
    Lanczos2,
    Lanczos3,
}

/// Color-type hint applied to the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorType {
    #[default]
    TrueColor,
    Grayscale,
    /// Let the encoder pick the smallest representation.
    Optimize,
}

/// Interlace scheme used when encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interlace {
    #[default]
    None,
    Line,
    Plane,
}

/// How an overlay is combined with the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositeOperator {
    /// Alpha-blend the overlay atop the base.
    #[default]
    Over,
    /// Replace base pixels with overlay pixels, alpha included.
    Copy,
}

/// One pixel of a region row, channels normalized to `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionPixel {
    red: f64,
    green: f64,
    blue: f64,
    alpha: f64,
    dirty: bool,
}

impl RegionPixel {
    pub fn new(color: Color) -> Self {
        let [red, green, blue, alpha] = color.normalized();
        Self {
            red,
            green,
            blue,
            alpha,
            dirty: false,
        }
    }

    #[inline]
    pub fn red(&self) -> f64 {
        self.red
    }

    #[inline]
    pub fn green(&self) -> f64 {
        self.green
    }

    #[inline]
    pub fn blue(&self) -> f64 {
        self.blue
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Whether the pixel was assigned since it was fetched.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Assign a color from a descriptor such as `"red"` or `"rgb(1,2,3)"`.
    pub fn set_color(&mut self, descriptor: &str) -> Result<(), ColorError> {
        let color = parse_color(descriptor)?;
        self.assign(color);
        Ok(())
    }

    pub fn assign(&mut self, color: Color) {
        let [red, green, blue, alpha] = color.normalized();
        self.red = red;
        self.green = green;
        self.blue = blue;
        self.alpha = alpha;
        self.dirty = true;
    }

    /// The pixel quantized back to 8 bits per channel.
    pub fn to_color(&self) -> Color {
        let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color::rgba(q(self.red), q(self.green), q(self.blue), q(self.alpha))
    }
}

/// Forward-only cursor over the rows of a pixel region.
///
/// Rows come back in top-to-bottom order and cannot be revisited. Mutations
/// to a row only reach the raster when [`sync_row`](Self::sync_row) succeeds;
/// dropping the cursor releases the region and discards an unsynced row.
pub trait RegionCursor {
    /// Fetch the next row, or `None` once every row has been handed out.
    fn next_row(&mut self) -> Option<&mut [RegionPixel]>;

    /// Commit the row most recently returned by [`next_row`](Self::next_row).
    fn sync_row(&mut self) -> Result<(), EngineError>;
}

/// Capabilities an [`Image`](crate::Image) needs from a raster library.
///
/// The engine owns the decoded raster exclusively. Dimensions reported by
/// [`width`](Self::width) and [`height`](Self::height) always reflect the
/// buffer after the most recent primitive.
pub trait PixelEngine: Sized {
    type Region<'a>: RegionCursor
    where
        Self: 'a;

    /// Decode an encoded image blob.
    fn decode(bytes: &[u8]) -> Result<Self, EngineError>;

    /// Encode the raster in its current format.
    fn encode(&self) -> Result<Vec<u8>, EngineError>;

    /// Deep copy of the raster and all of its metadata.
    fn duplicate(&self) -> Self;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Upper-case format name, e.g. `JPEG`, `PJPEG`, `PNG`.
    fn format(&self) -> &str;

    fn set_format(&mut self, format: &str) -> Result<(), EngineError>;

    /// Maximum channel value representable at the engine's color depth.
    fn quantum_range(&self) -> u32;

    /// Metadata property lookup; keys are case-insensitive.
    fn property(&self, key: &str) -> Option<&str>;

    fn set_property(&mut self, key: &str, value: &str) -> Result<(), EngineError>;

    /// Embed a named binary profile such as `icc`.
    fn apply_profile(&mut self, name: &str, data: &[u8]) -> Result<(), EngineError>;

    /// Encoder hint; survives [`strip`](Self::strip).
    fn set_coder_option(&mut self, key: &str, value: &str) -> Result<(), EngineError>;

    /// Orientation tag stored with the raster.
    fn orientation(&self) -> Orientation;

    fn set_orientation(&mut self, orientation: Orientation) -> Result<(), EngineError>;

    /// Remove all metadata properties and profiles.
    fn strip(&mut self) -> Result<(), EngineError>;

    fn resize(
        &mut self,
        width: u32,
        height: u32,
        filter: ResizeFilter,
        blur: f64,
    ) -> Result<(), EngineError>;

    fn crop(&mut self, width: u32, height: u32, x: i64, y: i64) -> Result<(), EngineError>;

    /// Resize the canvas to `width x height`; the new canvas origin sits at
    /// `(x, y)` in the old image's coordinates.
    fn extent(&mut self, width: u32, height: u32, x: i64, y: i64) -> Result<(), EngineError>;

    /// Rotate clockwise by `degrees`, filling uncovered pixels with `fill`.
    fn rotate(&mut self, fill: Color, degrees: f64) -> Result<(), EngineError>;

    /// Mirror top-bottom.
    fn flip(&mut self) -> Result<(), EngineError>;

    /// Mirror left-right.
    fn flop(&mut self) -> Result<(), EngineError>;

    /// Both arguments are percentages in `-100..=100`.
    fn brightness_contrast(&mut self, brightness: f64, contrast: f64) -> Result<(), EngineError>;

    fn set_color_type(&mut self, color_type: ColorType) -> Result<(), EngineError>;

    /// `threshold` is in quantum units (`0..=quantum_range`).
    fn sepia_tone(&mut self, threshold: f64) -> Result<(), EngineError>;

    /// Blend toward `tint`, each channel weighted by the matching channel of
    /// `opacity`.
    fn colorize(&mut self, tint: Color, opacity: Color) -> Result<(), EngineError>;

    fn composite(
        &mut self,
        overlay: &Self,
        operator: CompositeOperator,
        x: i64,
        y: i64,
    ) -> Result<(), EngineError>;

    fn set_interlace(&mut self, interlace: Interlace) -> Result<(), EngineError>;

    fn set_compression_quality(&mut self, quality: u8) -> Result<(), EngineError>;

    /// Open a row cursor over `[x, x + width) x [y, y + height)`.
    fn region(
        &mut self,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    ) -> Result<Self::Region<'_>, EngineError>;
}
