//! JPEG encoding.
//!
//! Written with the pure-Rust `jpeg-encoder` crate, which supports both
//! baseline and progressive output as well as optimized Huffman tables.
//! Alpha is dropped, grayscale rasters can be written as single-channel,
//! and an ICC profile is embedded when one is attached to the raster.

use image::RgbaImage;
use jpeg_encoder::{ColorType, Encoder};

use super::EncodeError;
use crate::luminance::intensity_u8;

/// Quality used when the caller never set one.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Largest width or height a JPEG frame header can carry.
pub const MAX_JPEG_DIMENSION: u32 = u16::MAX as u32;

/// Options for [`encode_jpeg`].
#[derive(Debug, Clone, Copy)]
pub struct JpegOptions<'a> {
    /// JPEG quality, clamped to `1..=100`
    pub quality: u8,
    /// Write a single channel holding each pixel's intensity
    pub grayscale: bool,
    /// Emit a progressive (SOF2) frame instead of a baseline (SOF0) one
    pub progressive: bool,
    /// Build Huffman tables from the image statistics
    pub optimize_coding: bool,
    pub icc_profile: Option<&'a [u8]>,
}

impl Default for JpegOptions<'_> {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
            grayscale: false,
            progressive: false,
            optimize_coding: false,
            icc_profile: None,
        }
    }
}

/// Encode an RGBA raster to JPEG bytes.
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for archival or further editing
/// * 60-80: Medium quality, acceptable for web delivery
/// * Below 60: Low quality, visible artifacts
///
/// # Example
///
/// ```ignore
/// use image::{Rgba, RgbaImage};
/// use retouch_core::encode::{encode_jpeg, JpegOptions};
///
/// let img = RgbaImage::from_pixel(100, 100, Rgba([128, 128, 128, 255]));
/// let options = JpegOptions { progressive: true, ..JpegOptions::default() };
/// let jpeg = encode_jpeg(&img, &options)?;
/// assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
/// ```
pub fn encode_jpeg(image: &RgbaImage, options: &JpegOptions<'_>) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    let (Ok(frame_width), Ok(frame_height)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(EncodeError::TooLarge {
            width,
            height,
            max: MAX_JPEG_DIMENSION,
        });
    };

    let mut buffer = Vec::new();
    let mut encoder = Encoder::new(&mut buffer, options.quality.clamp(1, 100));
    encoder.set_progressive(options.progressive);
    encoder.set_optimized_huffman_tables(options.optimize_coding);

    if let Some(icc) = options.icc_profile {
        encoder
            .add_icc_profile(icc)
            .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
    }

    let result = if options.grayscale {
        let luma: Vec<u8> = image
            .pixels()
            .map(|p| intensity_u8(p.0[0], p.0[1], p.0[2]))
            .collect();
        encoder.encode(&luma, frame_width, frame_height, ColorType::Luma)
    } else {
        encoder.encode(image.as_raw(), frame_width, frame_height, ColorType::Rgba)
    };
    result.map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}
