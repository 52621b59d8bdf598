//! The [`Image`] handle: one decoded raster and every transform over it.
//!
//! An `Image` exclusively owns its engine. All operations are synchronous
//! and mutate in place; a failed operation is not rolled back, so callers
//! wanting atomicity should [`duplicate`](Image::duplicate) first.

use std::cell::OnceCell;
use std::str::FromStr;

use thiserror::Error;

use crate::color::{parse_color, Color, ColorError};
use crate::decode::{read_orientation, resolve_orientation, ExifError, Orientation};
use crate::engine::{
    ColorType, CompositeOperator, EngineError, PixelEngine, RasterEngine, ResizeFilter,
};
use crate::optimize::{JpegPreset, PngPreset};
use crate::redeye;
use crate::transform::{
    correction_steps, extent_is_noop, extent_offsets, fill_zero_dimensions, fit_dimensions,
    rotation_angle, OrientStep,
};

/// Errors returned by [`Image`] operations.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The input bytes could not be decoded.
    #[error("cannot decode image: {0}")]
    Decode(#[source] EngineError),

    /// Orientation correction was requested without orientation data.
    #[error("cannot correct orientation: {0}")]
    Orientation(String),

    /// A red-eye region with a zero dimension.
    #[error("fix red eye: invalid region {width}x{height}")]
    InvalidRegion { width: u32, height: u32 },

    /// The red-eye pixel region could not be opened.
    #[error("fix red eye: cannot load region: {0}")]
    RegionLoad(#[source] EngineError),

    /// A replacement color could not be written to a pixel.
    #[error("fix red eye: cannot set pixel color {color:?}: {source}")]
    PixelWrite {
        color: String,
        #[source]
        source: ColorError,
    },

    /// A row of red-eye changes could not be committed.
    #[error("fix red eye: cannot commit row {row}: {source}")]
    RowCommit {
        row: u32,
        #[source]
        source: EngineError,
    },

    /// An invert direction other than `v` or `h`.
    #[error("invert: unknown direction {0:?}, expected \"v\" or \"h\"")]
    Direction(String),

    /// An engine primitive failed.
    #[error("{operation}: {source}")]
    Primitive {
        operation: &'static str,
        #[source]
        source: EngineError,
    },

    /// A color descriptor built for a primitive did not parse.
    #[error("{operation}: {source}")]
    InvalidColor {
        operation: &'static str,
        #[source]
        source: ColorError,
    },
}

fn primitive(operation: &'static str) -> impl FnOnce(EngineError) -> ImageError {
    move |source| ImageError::Primitive { operation, source }
}

/// Mirror axis for [`Image::invert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Top-bottom mirror (`"v"`).
    Vertical,
    /// Left-right mirror (`"h"`).
    Horizontal,
}

impl FromStr for Direction {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v" => Ok(Direction::Vertical),
            "h" => Ok(Direction::Horizontal),
            other => Err(ImageError::Direction(other.to_string())),
        }
    }
}

/// A decoded raster with its resolved orientation.
///
/// # Example
///
/// ```ignore
/// use retouch_core::Image;
///
/// let mut image: Image = Image::from_bytes(&std::fs::read("photo.jpg")?)?;
/// image.correct_orientation()?;
/// image.resize(1024, 1024, true)?;
/// image.optimize()?;
/// std::fs::write("photo.web.jpg", image.to_bytes()?)?;
/// ```
#[derive(Debug)]
pub struct Image<E: PixelEngine = RasterEngine> {
    engine: E,
    quantum_range: OnceCell<u32>,
    orientation: Orientation,
}

impl<E: PixelEngine> Image<E> {
    /// Decode `bytes` and resolve the orientation from EXIF, falling back to
    /// the engine's own tag.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        let engine = E::decode(bytes).map_err(ImageError::Decode)?;
        let orientation = resolve_exif_orientation(bytes, engine.orientation());
        Ok(Self {
            engine,
            quantum_range: OnceCell::new(),
            orientation,
        })
    }

    /// Wrap an already decoded engine; the orientation is the engine's tag.
    pub fn from_engine(engine: E) -> Self {
        let orientation = engine.orientation();
        Self {
            engine,
            quantum_range: OnceCell::new(),
            orientation,
        }
    }

    /// Replace the raster with freshly decoded `bytes`.
    ///
    /// The memoized quantum range is kept.
    pub fn set_bytes(&mut self, bytes: &[u8]) -> Result<(), ImageError> {
        let engine = E::decode(bytes).map_err(ImageError::Decode)?;
        self.orientation = resolve_exif_orientation(bytes, engine.orientation());
        self.engine = engine;
        Ok(())
    }

    /// Encode the raster in its current format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ImageError> {
        self.engine.encode().map_err(primitive("encode"))
    }

    /// Deep copy, including metadata and the resolved orientation.
    pub fn duplicate(&self) -> Self {
        Self {
            engine: self.engine.duplicate(),
            quantum_range: self.quantum_range.clone(),
            orientation: self.orientation,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn width(&self) -> u32 {
        self.engine.width()
    }

    pub fn height(&self) -> u32 {
        self.engine.height()
    }

    pub fn format(&self) -> &str {
        self.engine.format()
    }

    pub fn set_format(&mut self, format: &str) -> Result<(), ImageError> {
        self.engine
            .set_format(format)
            .map_err(primitive("set format"))
    }

    /// Maximum channel value, read from the engine once and memoized.
    pub fn quantum_range(&self) -> u32 {
        *self
            .quantum_range
            .get_or_init(|| self.engine.quantum_range())
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.engine.property(key)
    }

    pub fn set_property(&mut self, key: &str, value: &str) -> Result<(), ImageError> {
        self.engine
            .set_property(key, value)
            .map_err(primitive("set property"))
    }

    /// Embed a named profile such as `icc`.
    pub fn set_profile(&mut self, name: &str, data: &[u8]) -> Result<(), ImageError> {
        self.engine
            .apply_profile(name, data)
            .map_err(primitive("set profile"))
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Set the orientation and persist it as the engine's tag.
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), ImageError> {
        self.engine
            .set_orientation(orientation)
            .map_err(primitive("set orientation"))?;
        self.orientation = orientation;
        Ok(())
    }

    /// Transform the pixels so the image is upright, then record top-left.
    ///
    /// # Errors
    ///
    /// `ImageError::Orientation` when the orientation is undefined; nothing
    /// is changed in that case. A failing primitive is returned as is and
    /// leaves the orientation untouched.
    pub fn correct_orientation(&mut self) -> Result<(), ImageError> {
        let steps = correction_steps(self.orientation).ok_or_else(|| {
            ImageError::Orientation("no orientation data found in file".to_string())
        })?;

        tracing::debug!(orientation = ?self.orientation, ?steps, "correcting orientation");
        for step in steps {
            match *step {
                OrientStep::Flip => self.engine.flip().map_err(primitive("orient"))?,
                OrientStep::Flop => self.engine.flop().map_err(primitive("orient"))?,
                OrientStep::Rotate(degrees) => self
                    .engine
                    .rotate(Color::TRANSPARENT, degrees)
                    .map_err(primitive("orient"))?,
            }
        }

        self.set_orientation(Orientation::TopLeft)
    }

    /// Resize to `width x height`.
    ///
    /// With `preserve_aspect` the target is fitted inside the box (a zero
    /// axis is unconstrained); otherwise a zero axis keeps its current size.
    /// Nothing is issued when the target equals the current size.
    pub fn resize(&mut self, width: u32, height: u32, preserve_aspect: bool) -> Result<(), ImageError> {
        let current = (self.width(), self.height());
        let (w, h) = if preserve_aspect {
            fit_dimensions(current, (width, height))
        } else {
            fill_zero_dimensions(current, (width, height))
        };

        if (w, h) == current {
            tracing::debug!(width = w, height = h, "resize is a no-op");
            return Ok(());
        }

        tracing::debug!(from = ?current, to = ?(w, h), "resize");
        self.engine
            .resize(w, h, ResizeFilter::Lanczos2, 1.0)
            .map_err(primitive("resize"))
    }

    /// Change the canvas to `width x height`, keeping the content centered.
    ///
    /// A zero axis keeps its current size.
    pub fn extend(&mut self, width: u32, height: u32) -> Result<(), ImageError> {
        let current = (self.width(), self.height());
        if extent_is_noop(current, (width, height)) {
            tracing::debug!(width, height, "extend is a no-op");
            return Ok(());
        }

        let target = fill_zero_dimensions(current, (width, height));
        let (x, y) = extent_offsets(current, target);

        tracing::debug!(?target, x, y, "extend");
        self.engine
            .extent(target.0, target.1, x, y)
            .map_err(primitive("extend"))
    }

    /// Crop to `width x height` at `(x, y)`.
    pub fn crop(&mut self, x: i64, y: i64, width: u32, height: u32) -> Result<(), ImageError> {
        tracing::debug!(x, y, width, height, "crop");
        self.engine
            .crop(width, height, x, y)
            .map_err(primitive("crop"))
    }

    /// Rotate clockwise by `degrees` with a transparent fill.
    ///
    /// Angles above 359 wrap; zero and negative angles do nothing.
    pub fn rotate(&mut self, degrees: f64) -> Result<(), ImageError> {
        let Some(angle) = rotation_angle(degrees) else {
            tracing::debug!(degrees, "rotate is a no-op");
            return Ok(());
        };

        tracing::debug!(angle, "rotate");
        self.engine
            .rotate(Color::TRANSPARENT, angle)
            .map_err(primitive("rotate"))
    }

    /// Mirror along `direction`: `"v"` top-bottom, `"h"` left-right.
    pub fn invert(&mut self, direction: &str) -> Result<(), ImageError> {
        self.mirror(direction.parse()?)
    }

    pub fn mirror(&mut self, direction: Direction) -> Result<(), ImageError> {
        tracing::debug!(?direction, "mirror");
        match direction {
            Direction::Vertical => self.engine.flip(),
            Direction::Horizontal => self.engine.flop(),
        }
        .map_err(primitive("invert"))
    }

    /// Brightness change in percent (`-100..=100`).
    pub fn brightness(&mut self, value: f64) -> Result<(), ImageError> {
        tracing::debug!(value, "brightness");
        self.engine
            .brightness_contrast(value, 0.0)
            .map_err(primitive("brightness"))
    }

    /// Contrast change in percent (`-100..=100`).
    pub fn contrast(&mut self, value: f64) -> Result<(), ImageError> {
        tracing::debug!(value, "contrast");
        self.engine
            .brightness_contrast(0.0, value)
            .map_err(primitive("contrast"))
    }

    pub fn grayscale(&mut self) -> Result<(), ImageError> {
        tracing::debug!("grayscale");
        self.engine
            .set_color_type(ColorType::Grayscale)
            .map_err(primitive("grayscale"))
    }

    /// Sepia tone with the highlight threshold as a percentage of the
    /// quantum range.
    pub fn sepia(&mut self, threshold_percent: f64) -> Result<(), ImageError> {
        let threshold = threshold_percent * self.quantum_range() as f64 / 100.0;
        tracing::debug!(threshold, "sepia");
        self.engine
            .sepia_tone(threshold)
            .map_err(primitive("sepia"))
    }

    /// Fade toward white by `fade_percent`.
    pub fn white_fade(&mut self, fade_percent: f64) -> Result<(), ImageError> {
        let opacity = parse_color(&format!("hsl(0,0%,{}%)", fade_percent)).map_err(|source| {
            ImageError::InvalidColor {
                operation: "white fade",
                source,
            }
        })?;

        tracing::debug!(fade_percent, "white fade");
        self.engine
            .colorize(Color::WHITE, opacity)
            .map_err(primitive("white fade"))
    }

    /// Draw `overlay` over this image with its top-left corner at `(x, y)`.
    pub fn add_overlay(&mut self, overlay: &Image<E>, x: i64, y: i64) -> Result<(), ImageError> {
        tracing::debug!(x, y, "add overlay");
        self.engine
            .composite(&overlay.engine, CompositeOperator::Over, x, y)
            .map_err(primitive("add overlay"))
    }

    /// Rewrite red-eye pixels inside `width x height` at `(x, y)`.
    ///
    /// `color` is `"auto"` or any color descriptor. Returns how many pixels
    /// were rewritten.
    pub fn fix_red_eye(
        &mut self,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        color: &str,
    ) -> Result<usize, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidRegion { width, height });
        }

        let mut region = self
            .engine
            .region(x, y, width, height)
            .map_err(ImageError::RegionLoad)?;

        let rewritten = redeye::fix_red_eye(&mut region, color)?;
        tracing::debug!(x, y, width, height, rewritten, "fixed red eye");
        Ok(rewritten)
    }

    /// Apply the default export presets for the current format, then strip.
    pub fn optimize(&mut self) -> Result<(), ImageError> {
        self.optimize_with(&JpegPreset::default(), &PngPreset::default())
    }

    /// Apply `jpeg` or `png` depending on the current format, then strip.
    ///
    /// Other formats are only stripped.
    pub fn optimize_with(&mut self, jpeg: &JpegPreset, _png: &PngPreset) -> Result<(), ImageError> {
        let format = self.format().to_string();
        match format.as_str() {
            "JPEG" => {
                tracing::debug!(?jpeg, "optimizing JPEG");
                self.apply_jpeg_preset(jpeg)
                    .map_err(primitive("optimize"))?;
            }
            "PNG" => tracing::debug!("optimizing PNG"),
            other => tracing::debug!(format = other, "no optimizer preset"),
        }

        self.strip()
    }

    fn apply_jpeg_preset(&mut self, preset: &JpegPreset) -> Result<(), EngineError> {
        self.engine.set_interlace(preset.interlace)?;
        self.engine.set_color_type(preset.color_type)?;
        self.engine.set_format(&preset.format)?;
        self.engine.set_compression_quality(preset.quality)?;
        for (key, value) in preset.coder_options() {
            self.engine.set_coder_option(key, &value)?;
        }
        Ok(())
    }

    /// Remove all metadata properties and profiles.
    pub fn strip(&mut self) -> Result<(), ImageError> {
        self.engine.strip().map_err(primitive("strip"))
    }
}

/// EXIF first, engine tag second. Missing EXIF is routine; anything
/// unreadable is worth a warning.
fn resolve_exif_orientation(bytes: &[u8], embedded: Orientation) -> Orientation {
    let from_exif = read_orientation(bytes);
    if let Err(ExifError::Malformed(reason)) = &from_exif {
        tracing::warn!(%reason, "ignoring unreadable EXIF metadata");
    }
    resolve_orientation(from_exif, embedded)
}
