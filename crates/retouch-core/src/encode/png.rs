//! PNG encoding.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use std::io::Cursor;

use super::{wants_grayscale, EncodeError};
use crate::engine::ColorType;
use crate::luminance::intensity_u8;

/// Encode an RGBA raster to PNG bytes.
///
/// Alpha is written only when some pixel is not fully opaque; grayscale
/// output follows the same rule as JPEG.
pub fn encode_png(image: &RgbaImage, color_type: ColorType) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let gray = wants_grayscale(image, color_type);
    let opaque = image.pixels().all(|p| p.0[3] == 255);

    let (pixels, layout): (Vec<u8>, ExtendedColorType) = match (gray, opaque) {
        (true, true) => (
            image
                .pixels()
                .map(|p| intensity_u8(p.0[0], p.0[1], p.0[2]))
                .collect(),
            ExtendedColorType::L8,
        ),
        (true, false) => (
            image
                .pixels()
                .flat_map(|p| [intensity_u8(p.0[0], p.0[1], p.0[2]), p.0[3]])
                .collect(),
            ExtendedColorType::La8,
        ),
        (false, true) => (
            image
                .pixels()
                .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
                .collect(),
            ExtendedColorType::Rgb8,
        ),
        (false, false) => (image.as_raw().clone(), ExtendedColorType::Rgba8),
    };

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(&pixels, width, height, layout)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}
