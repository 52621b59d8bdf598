//! Shared test fixtures: tiny encoded images built in memory.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_support::*;
//!
//! let bytes = jpeg_with_exif_orientation(&solid_jpeg(4, 2), 6);
//! let image: Image = Image::from_bytes(&bytes).unwrap();
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

// =========================================================================
// Encoded fixtures
// =========================================================================

/// Mid-gray baseline JPEG with no metadata.
pub fn solid_jpeg(width: u32, height: u32) -> Vec<u8> {
    let pixels = vec![128u8; (width * height * 3) as usize];
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 90)
        .write_image(&pixels, width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// Lossless PNG of an arbitrary raster.
pub fn png_of(image: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .unwrap();
    out
}

/// Lossless PNG filled with one color.
pub fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    png_of(&RgbaImage::from_pixel(width, height, Rgba(color)))
}

// =========================================================================
// EXIF splicing
// =========================================================================

/// Insert an APP1 EXIF segment carrying a single Orientation entry right
/// after the SOI marker of `jpeg`.
pub fn jpeg_with_exif_orientation(jpeg: &[u8], value: u16) -> Vec<u8> {
    jpeg_with_exif_short(jpeg, 0x0112, value)
}

/// Insert an APP1 EXIF segment whose IFD0 holds one SHORT entry.
///
/// The TIFF block is big-endian with no next IFD.
pub fn jpeg_with_exif_short(jpeg: &[u8], tag: u16, value: u16) -> Vec<u8> {
    assert_eq!(&jpeg[0..2], &[0xFF, 0xD8], "not a JPEG");

    let mut payload = Vec::new();
    payload.extend_from_slice(b"Exif\0\0");
    // TIFF header: MM, 42, IFD0 at offset 8
    payload.extend_from_slice(&[b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08]);
    // One entry
    payload.extend_from_slice(&[0x00, 0x01]);
    // tag, SHORT, count 1, value left-justified
    payload.extend_from_slice(&tag.to_be_bytes());
    payload.extend_from_slice(&[0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    payload.extend_from_slice(&value.to_be_bytes());
    payload.extend_from_slice(&[0x00, 0x00]);
    // No next IFD
    payload.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    let segment_len = (payload.len() + 2) as u16;

    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[0..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

// =========================================================================
// Inspection
// =========================================================================

/// Markers of every start-of-frame segment in `jpeg`, in order
/// (`0xC0` baseline, `0xC2` progressive, ...).
///
/// Walks the segment headers up to the first start-of-scan.
pub fn sof_markers(jpeg: &[u8]) -> Vec<u8> {
    let mut markers = Vec::new();
    let mut pos = 2;
    while pos + 4 <= jpeg.len() && jpeg[pos] == 0xFF {
        let marker = jpeg[pos + 1];
        if marker == 0xDA {
            break;
        }
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            markers.push(marker);
        }
        let len = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
        pos += 2 + len;
    }
    markers
}

/// Raster with a distinct color at every position, handy for tracking
/// where pixels end up after a transform.
pub fn indexed_raster(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 10 % 256) as u8, (y * 10 % 256) as u8, 0, 255])
    })
}
