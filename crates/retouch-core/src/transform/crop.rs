//! Canvas cropping and extension on RGBA rasters.
//!
//! Both operations take pixel geometry with signed offsets. `crop_canvas`
//! keeps the part of the requested rectangle that overlaps the image;
//! `extent_canvas` builds a new canvas and copies the old content into it.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner of the current image
//! - Offsets may be negative or extend past the right/bottom edges

use image::{imageops, Rgba, RgbaImage};

/// Crop to the intersection of `width x height` at `(x, y)` with the image.
///
/// Returns `None` when the rectangle does not overlap the image at all.
///
/// # Example
///
/// ```
/// use image::RgbaImage;
/// use retouch_core::transform::crop_canvas;
///
/// let image = RgbaImage::new(100, 100);
/// let cropped = crop_canvas(&image, 50, 50, 75, 75).unwrap();
/// assert_eq!(cropped.dimensions(), (25, 25));
/// ```
pub fn crop_canvas(image: &RgbaImage, width: u32, height: u32, x: i64, y: i64) -> Option<RgbaImage> {
    let (img_w, img_h) = (image.width() as i64, image.height() as i64);

    let left = x.max(0);
    let top = y.max(0);
    let right = x.saturating_add(width as i64).min(img_w);
    let bottom = y.saturating_add(height as i64).min(img_h);

    if right <= left || bottom <= top {
        return None;
    }

    let view = imageops::crop_imm(
        image,
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    );
    Some(view.to_image())
}

/// Build a `width x height` canvas filled with `background` whose origin sits
/// at `(x, y)` in the source image, and copy the source into it.
///
/// Source pixels that fall outside the new canvas are dropped.
pub fn extent_canvas(
    image: &RgbaImage,
    width: u32,
    height: u32,
    x: i64,
    y: i64,
    background: Rgba<u8>,
) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, background);
    imageops::replace(&mut canvas, image, x.saturating_neg(), y.saturating_neg());
    canvas
}


// ============================================================================
// Property-Based Tests
// ============================================================================
