//! Raster serialization.
//!
//! This module provides functionality for:
//! - Encoding to JPEG with quality, grayscale, progressive, Huffman
//!   optimization and ICC options
//! - Encoding to PNG with the smallest pixel layout that holds the raster
//! - Encoding to the remaining writable formats (GIF, WebP)
//!
//! Format names are upper case as reported by the engine. `PJPEG` is
//! always written as a progressive JPEG; `JPEG` is progressive only when the
//! settings ask for it.
//!
//! # Examples
//!
//! ```ignore
//! use retouch_core::encode::{encode_raster, EncodeSettings};
//!
//! let bytes = encode_raster(&rgba, "PNG", &EncodeSettings::default())?;
//! ```

mod jpeg;
mod png;

use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

use crate::adjustments::is_grayscale;
use crate::engine::ColorType;

pub use jpeg::{encode_jpeg, JpegOptions, DEFAULT_JPEG_QUALITY, MAX_JPEG_DIMENSION};
pub use png::encode_png;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The raster exceeds what the format can describe
    #[error("Image too large: {width}x{height} exceeds the {max} pixel limit")]
    TooLarge { width: u32, height: u32, max: u32 },

    /// No encoder exists for the format name
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// The underlying encoder failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encoder options gathered from the raster's state.
#[derive(Debug, Clone, Default)]
pub struct EncodeSettings {
    /// JPEG quality; `None` uses [`DEFAULT_JPEG_QUALITY`].
    pub quality: Option<u8>,
    pub color_type: ColorType,
    pub icc_profile: Option<Vec<u8>>,
    /// Write JPEG as progressive even when the format is plain `JPEG`.
    pub progressive: bool,
    /// Ask the JPEG encoder for optimized Huffman tables.
    pub optimize_coding: bool,
}

/// Encode `image` in the named format.
pub fn encode_raster(
    image: &RgbaImage,
    format: &str,
    settings: &EncodeSettings,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        "JPEG" | "JPG" | "PJPEG" => encode_jpeg(
            image,
            &JpegOptions {
                quality: settings.quality.unwrap_or(DEFAULT_JPEG_QUALITY),
                grayscale: wants_grayscale(image, settings.color_type),
                progressive: settings.progressive || format == "PJPEG",
                optimize_coding: settings.optimize_coding,
                icc_profile: settings.icc_profile.as_deref(),
            },
        ),
        "PNG" => encode_png(image, settings.color_type),
        "GIF" => write_with(image, ImageFormat::Gif),
        "WEBP" => write_with(image, ImageFormat::WebP),
        other => Err(EncodeError::UnsupportedFormat(other.to_string())),
    }
}

/// Whether the color type calls for a single luma channel.
pub(crate) fn wants_grayscale(image: &RgbaImage, color_type: ColorType) -> bool {
    match color_type {
        ColorType::Grayscale => true,
        ColorType::Optimize => is_grayscale(image),
        ColorType::TrueColor => false,
    }
}

fn write_with(image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut buffer, format)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
    Ok(buffer.into_inner())
}
