//! [`PixelEngine`] implementation on top of the `image` crate.
//!
//! The raster is held as 8-bit RGBA regardless of the source layout, so the
//! quantum range is always 255. Metadata lives beside the pixels:
//!
//! - properties: case-insensitive string map, seeded from EXIF on decode
//! - profiles: named binary blobs (`icc` is embedded on JPEG output)
//! - coder options: encoder hints that survive `strip`

use std::collections::BTreeMap;
use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, Rgba, RgbaImage};

use super::{
    ColorType, CompositeOperator, EngineError, Interlace, PixelEngine, RegionCursor, RegionPixel,
    ResizeFilter,
};
use crate::adjustments::{apply_brightness_contrast, apply_colorize, apply_grayscale, apply_sepia};
use crate::color::Color;
use crate::decode::{read_properties, read_raw_orientation, Orientation};
use crate::encode::{encode_raster, EncodeError, EncodeSettings};
use crate::transform::{crop_canvas, extent_canvas, rotate_canvas};

const QUANTUM_RANGE: u32 = 255;

const ORIENTATION_PROPERTY: &str = "exif:orientation";

const OPTIMIZE_CODING_OPTION: &str = "jpeg:optimize-coding";

const WRITABLE_FORMATS: &[&str] = &["JPEG", "PJPEG", "PNG", "GIF", "WEBP"];

/// Decoded raster plus the metadata an encoder needs.
#[derive(Debug, Clone)]
pub struct RasterEngine {
    pixels: RgbaImage,
    format: String,
    orientation: Orientation,
    properties: BTreeMap<String, String>,
    profiles: BTreeMap<String, Vec<u8>>,
    coder_options: BTreeMap<String, String>,
    color_type: ColorType,
    interlace: Interlace,
    quality: Option<u8>,
}

impl RasterEngine {
    /// Wrap an in-memory raster, as if it had been decoded from `format`.
    pub fn from_raster(pixels: RgbaImage, format: &str) -> Self {
        Self {
            pixels,
            format: format.to_ascii_uppercase(),
            orientation: Orientation::Undefined,
            properties: BTreeMap::new(),
            profiles: BTreeMap::new(),
            coder_options: BTreeMap::new(),
            color_type: ColorType::default(),
            interlace: Interlace::default(),
            quality: None,
        }
    }

    /// The pixels as they stand.
    pub fn raster(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn coder_option(&self, key: &str) -> Option<&str> {
        self.coder_options.get(key).map(String::as_str)
    }

    pub fn profile(&self, name: &str) -> Option<&[u8]> {
        self.profiles
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    pub fn color_type(&self) -> ColorType {
        self.color_type
    }

    pub fn compression_quality(&self) -> Option<u8> {
        self.quality
    }
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::WebP => "WEBP".to_string(),
        other => format!("{:?}", other).to_ascii_uppercase(),
    }
}

fn filter_type(filter: ResizeFilter) -> FilterType {
    match filter {
        ResizeFilter::Nearest => FilterType::Nearest,
        ResizeFilter::Triangle => FilterType::Triangle,
        // No two-lobe Lanczos in `image`; Catmull-Rom has the same support
        ResizeFilter::CatmullRom | ResizeFilter::Lanczos2 => FilterType::CatmullRom,
        ResizeFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

fn decode_error(e: impl std::fmt::Display) -> EngineError {
    EngineError::Decode(e.to_string())
}

impl PixelEngine for RasterEngine {
    type Region<'a>
        = RasterRegion<'a>
    where
        Self: 'a;

    fn decode(bytes: &[u8]) -> Result<Self, EngineError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(decode_error)?;
        let format = reader
            .format()
            .ok_or_else(|| EngineError::Decode("unrecognized image format".to_string()))?;

        let mut decoder = reader.into_decoder().map_err(decode_error)?;

        // Only an explicit tag counts; EXIF without one stays undefined
        let orientation = match decoder.exif_metadata() {
            Ok(Some(chunk)) => read_raw_orientation(chunk).unwrap_or(Orientation::Undefined),
            _ => Orientation::Undefined,
        };
        let icc = decoder.icc_profile().ok().flatten();

        let pixels = DynamicImage::from_decoder(decoder)
            .map_err(decode_error)?
            .to_rgba8();

        let mut engine = Self::from_raster(pixels, &format_name(format));
        engine.orientation = orientation;
        if let Some(icc) = icc {
            engine.profiles.insert("icc".to_string(), icc);
        }
        for (key, value) in read_properties(bytes) {
            engine.properties.insert(key.to_ascii_lowercase(), value);
        }

        tracing::trace!(
            format = %engine.format,
            width = engine.pixels.width(),
            height = engine.pixels.height(),
            ?orientation,
            "decoded raster"
        );
        Ok(engine)
    }

    fn encode(&self) -> Result<Vec<u8>, EngineError> {
        let settings = EncodeSettings {
            quality: self.quality,
            color_type: self.color_type,
            icc_profile: self.profiles.get("icc").cloned(),
            progressive: self.interlace != Interlace::None,
            optimize_coding: self.coder_option(OPTIMIZE_CODING_OPTION) == Some("true"),
        };

        encode_raster(&self.pixels, &self.format, &settings).map_err(|e| match e {
            EncodeError::UnsupportedFormat(f) => EngineError::UnsupportedFormat(f),
            other => EngineError::Encode {
                format: self.format.clone(),
                reason: other.to_string(),
            },
        })
    }

    fn duplicate(&self) -> Self {
        self.clone()
    }

    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn format(&self) -> &str {
        &self.format
    }

    fn set_format(&mut self, format: &str) -> Result<(), EngineError> {
        let upper = format.trim().to_ascii_uppercase();
        let upper = if upper == "JPG" { "JPEG".to_string() } else { upper };

        if !WRITABLE_FORMATS.contains(&upper.as_str()) {
            return Err(EngineError::UnsupportedFormat(format.to_string()));
        }
        self.format = upper;
        Ok(())
    }

    fn quantum_range(&self) -> u32 {
        QUANTUM_RANGE
    }

    fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn set_property(&mut self, key: &str, value: &str) -> Result<(), EngineError> {
        if key.is_empty() {
            return Err(EngineError::Primitive("empty property key".to_string()));
        }
        self.properties
            .insert(key.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    fn apply_profile(&mut self, name: &str, data: &[u8]) -> Result<(), EngineError> {
        if data.is_empty() {
            return Err(EngineError::Profile {
                name: name.to_string(),
                reason: "empty payload".to_string(),
            });
        }
        let name = match name.to_ascii_lowercase().as_str() {
            "icm" => "icc".to_string(),
            other => other.to_string(),
        };
        self.profiles.insert(name, data.to_vec());
        Ok(())
    }

    fn set_coder_option(&mut self, key: &str, value: &str) -> Result<(), EngineError> {
        self.coder_options
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn set_orientation(&mut self, orientation: Orientation) -> Result<(), EngineError> {
        self.orientation = orientation;
        self.properties.insert(
            ORIENTATION_PROPERTY.to_string(),
            orientation.exif_value().to_string(),
        );
        Ok(())
    }

    fn strip(&mut self) -> Result<(), EngineError> {
        self.properties.clear();
        self.profiles.clear();
        Ok(())
    }

    fn resize(
        &mut self,
        width: u32,
        height: u32,
        filter: ResizeFilter,
        blur: f64,
    ) -> Result<(), EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::Primitive(format!(
                "cannot resize to {}x{}",
                width, height
            )));
        }

        let mut resized = imageops::resize(&self.pixels, width, height, filter_type(filter));
        if blur > 1.0 {
            resized = imageops::blur(&resized, (blur - 1.0) as f32);
        }
        self.pixels = resized;
        Ok(())
    }

    fn crop(&mut self, width: u32, height: u32, x: i64, y: i64) -> Result<(), EngineError> {
        self.pixels = crop_canvas(&self.pixels, width, height, x, y).ok_or(
            EngineError::InvalidGeometry {
                width,
                height,
                x,
                y,
            },
        )?;
        Ok(())
    }

    fn extent(&mut self, width: u32, height: u32, x: i64, y: i64) -> Result<(), EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidGeometry {
                width,
                height,
                x,
                y,
            });
        }
        let background = Rgba(Color::TRANSPARENT.to_array());
        self.pixels = extent_canvas(&self.pixels, width, height, x, y, background);
        Ok(())
    }

    fn rotate(&mut self, fill: Color, degrees: f64) -> Result<(), EngineError> {
        if !degrees.is_finite() {
            return Err(EngineError::Primitive(format!(
                "cannot rotate by {}",
                degrees
            )));
        }
        self.pixels = rotate_canvas(&self.pixels, degrees, Rgba(fill.to_array()));
        Ok(())
    }

    fn flip(&mut self) -> Result<(), EngineError> {
        imageops::flip_vertical_in_place(&mut self.pixels);
        Ok(())
    }

    fn flop(&mut self) -> Result<(), EngineError> {
        imageops::flip_horizontal_in_place(&mut self.pixels);
        Ok(())
    }

    fn brightness_contrast(&mut self, brightness: f64, contrast: f64) -> Result<(), EngineError> {
        apply_brightness_contrast(&mut self.pixels, brightness, contrast);
        Ok(())
    }

    fn set_color_type(&mut self, color_type: ColorType) -> Result<(), EngineError> {
        if color_type == ColorType::Grayscale {
            apply_grayscale(&mut self.pixels);
        }
        self.color_type = color_type;
        Ok(())
    }

    fn sepia_tone(&mut self, threshold: f64) -> Result<(), EngineError> {
        apply_sepia(&mut self.pixels, threshold, QUANTUM_RANGE as f64);
        Ok(())
    }

    fn colorize(&mut self, tint: Color, opacity: Color) -> Result<(), EngineError> {
        apply_colorize(&mut self.pixels, tint, opacity);
        Ok(())
    }

    fn composite(
        &mut self,
        overlay: &Self,
        operator: CompositeOperator,
        x: i64,
        y: i64,
    ) -> Result<(), EngineError> {
        match operator {
            CompositeOperator::Over => imageops::overlay(&mut self.pixels, &overlay.pixels, x, y),
            CompositeOperator::Copy => imageops::replace(&mut self.pixels, &overlay.pixels, x, y),
        }
        Ok(())
    }

    fn set_interlace(&mut self, interlace: Interlace) -> Result<(), EngineError> {
        self.interlace = interlace;
        Ok(())
    }

    fn set_compression_quality(&mut self, quality: u8) -> Result<(), EngineError> {
        self.quality = Some(quality.clamp(1, 100));
        Ok(())
    }

    fn region(
        &mut self,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    ) -> Result<RasterRegion<'_>, EngineError> {
        let (canvas_width, canvas_height) = self.pixels.dimensions();
        let within = |start: i64, len: u32, limit: u32| {
            start >= 0 && start.checked_add(len as i64).is_some_and(|end| end <= limit as i64)
        };
        let fits = within(x, width, canvas_width) && within(y, height, canvas_height);

        if !fits {
            return Err(EngineError::RegionOutOfBounds {
                x,
                y,
                width,
                height,
                canvas_width,
                canvas_height,
            });
        }

        Ok(RasterRegion {
            pixels: &mut self.pixels,
            x: x as u32,
            y: y as u32,
            width,
            height,
            next: 0,
            current: None,
            row: Vec::with_capacity(width as usize),
        })
    }
}

/// Row cursor over a rectangle of a [`RasterEngine`] raster.
pub struct RasterRegion<'a> {
    pixels: &'a mut RgbaImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    next: u32,
    /// Row handed out by `next_row` and not yet synced.
    current: Option<u32>,
    row: Vec<RegionPixel>,
}

impl RasterRegion<'_> {
    fn discard_pending(&mut self) {
        if let Some(row) = self.current.take() {
            if self.row.iter().any(RegionPixel::is_dirty) {
                tracing::trace!(row, "discarding unsynced region row");
            }
        }
    }
}

impl RegionCursor for RasterRegion<'_> {
    fn next_row(&mut self) -> Option<&mut [RegionPixel]> {
        self.discard_pending();
        if self.next >= self.height {
            return None;
        }

        let row = self.next;
        self.next += 1;
        self.current = Some(row);

        let py = self.y + row;
        self.row.clear();
        self.row.extend((self.x..self.x + self.width).map(|px| {
            let [r, g, b, a] = self.pixels.get_pixel(px, py).0;
            RegionPixel::new(Color::rgba(r, g, b, a))
        }));
        Some(&mut self.row)
    }

    fn sync_row(&mut self) -> Result<(), EngineError> {
        let row = self.current.take().ok_or(EngineError::NoCurrentRow)?;
        let py = self.y + row;

        for (i, pixel) in self.row.iter().enumerate() {
            if pixel.is_dirty() {
                let px = self.x + i as u32;
                self.pixels.put_pixel(px, py, Rgba(pixel.to_color().to_array()));
            }
        }
        Ok(())
    }
}

impl Drop for RasterRegion<'_> {
    fn drop(&mut self) {
        self.discard_pending();
    }
}
