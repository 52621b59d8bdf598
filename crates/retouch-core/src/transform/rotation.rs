//! Clockwise image rotation with an expanded canvas.
//!
//! Multiples of 90 degrees are exact pixel permutations. Any other angle uses
//! inverse mapping with bilinear interpolation: for each output pixel we find
//! the source position it came from and blend the four nearest source pixels.
//! Output pixels whose source lies outside the image take the fill color.
//!
//! For a clockwise rotation by θ (y axis pointing down) the inverse transform is:
//! ```text
//! src_x =  dx * cos(θ) + dy * sin(θ) + src_cx
//! src_y = -dx * sin(θ) + dy * cos(θ) + src_cy
//! ```
//! where `(dx, dy)` is the output pixel center relative to the output center.

use image::{imageops, Rgba, RgbaImage};

const ANGLE_EPSILON: f64 = 0.001;

/// Compute the bounding box of a `width x height` image rotated by
/// `angle_degrees`.
///
/// # Example
///
/// ```
/// use retouch_core::transform::compute_rotated_bounds;
///
/// assert_eq!(compute_rotated_bounds(100, 50, 90.0), (50, 100));
/// assert_eq!(compute_rotated_bounds(100, 50, 180.0), (100, 50));
/// ```
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    match quarter_turns(angle_degrees) {
        Some(0) | Some(2) => return (width, height),
        Some(_) => return (height, width),
        None => {}
    }

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    let w = width as f64;
    let h = height as f64;

    // new_w = |w*cos| + |h*sin|, new_h = |w*sin| + |h*cos|
    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;

    (new_w.max(1), new_h.max(1))
}

/// Rotate an image clockwise by `angle_degrees` around its center.
///
/// The canvas grows to hold the whole rotated image; corners not covered by
/// the source are painted with `fill`.
pub fn rotate_canvas(image: &RgbaImage, angle_degrees: f64, fill: Rgba<u8>) -> RgbaImage {
    match quarter_turns(angle_degrees) {
        Some(0) => return image.clone(),
        Some(1) => return imageops::rotate90(image),
        Some(2) => return imageops::rotate180(image),
        Some(_) => return imageops::rotate270(image),
        None => {}
    }

    let (src_w, src_h) = (image.width() as f64, image.height() as f64);
    let (dst_w, dst_h) = compute_rotated_bounds(image.width(), image.height(), angle_degrees);

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos();
    let sin = angle_rad.sin();

    let src_cx = src_w / 2.0;
    let src_cy = src_h / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    RgbaImage::from_fn(dst_w, dst_h, |dst_x, dst_y| {
        // Pixel centers, relative to the output center
        let dx = dst_x as f64 + 0.5 - dst_cx;
        let dy = dst_y as f64 + 0.5 - dst_cy;

        let src_x = dx * cos + dy * sin + src_cx - 0.5;
        let src_y = -dx * sin + dy * cos + src_cy - 0.5;

        sample_bilinear(image, src_x, src_y, fill)
    })
}

/// Number of clockwise quarter turns when the angle is a multiple of 90.
fn quarter_turns(angle_degrees: f64) -> Option<u8> {
    let normalized = angle_degrees.rem_euclid(360.0);
    let turns = (normalized / 90.0).round();
    if (normalized - turns * 90.0).abs() < ANGLE_EPSILON {
        Some((turns as u8) % 4)
    } else {
        None
    }
}

/// Sample a pixel using bilinear interpolation.
///
/// Positions farther than half a pixel outside the image return `fill`;
/// positions on the border clamp to the nearest edge pixel.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64, fill: Rgba<u8>) -> Rgba<u8> {
    let (w, h) = (image.width() as i64, image.height() as i64);

    if x < -0.5 || y < -0.5 || x > w as f64 - 0.5 || y > h as f64 - 0.5 {
        return fill;
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let px = |px: i64, py: i64| -> [f64; 4] {
        let p = image.get_pixel(px.clamp(0, w - 1) as u32, py.clamp(0, h - 1) as u32);
        [p[0] as f64, p[1] as f64, p[2] as f64, p[3] as f64]
    };

    let p00 = px(x0, y0);
    let p10 = px(x0 + 1, y0);
    let p01 = px(x0, y0 + 1);
    let p11 = px(x0 + 1, y0 + 1);

    let mut result = [0u8; 4];
    for i in 0..4 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    Rgba(result)
}
