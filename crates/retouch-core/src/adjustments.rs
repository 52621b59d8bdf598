//! Tone adjustment kernels on RGBA rasters.
//!
//! Each kernel rewrites the color channels of every pixel in place and
//! leaves alpha untouched. They back the tone primitives of
//! [`RasterEngine`](crate::engine::RasterEngine):
//!
//! - Brightness/contrast as a linear polynomial on normalized channels
//! - Sepia as a threshold tone curve on pixel intensity
//! - Colorize as a per-channel blend toward a tint
//! - Grayscale as BT.709 intensity

use image::RgbaImage;

use crate::color::Color;
use crate::luminance::{intensity, intensity_u8};

/// Apply a brightness/contrast adjustment.
///
/// Both arguments are percentages in `-100..=100`. Contrast maps to a slope
/// `tan(π(c/100 + 1)/4)` (never negative) and brightness shifts the
/// intercept so that mid-gray moves with it:
///
/// `output = slope * input + brightness/100 + ((100 - brightness)/200) * (1 - slope)`
///
/// # Example
/// ```
/// use image::{Rgba, RgbaImage};
/// use retouch_core::adjustments::apply_brightness_contrast;
///
/// let mut img = RgbaImage::from_pixel(1, 1, Rgba([128, 128, 128, 255]));
/// apply_brightness_contrast(&mut img, 0.0, 0.0);
/// assert_eq!(img.get_pixel(0, 0).0, [128, 128, 128, 255]);
/// ```
pub fn apply_brightness_contrast(image: &mut RgbaImage, brightness: f64, contrast: f64) {
    let (slope, intercept) = brightness_contrast_coefficients(brightness, contrast);

    for pixel in image.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            let v = *channel as f64 / 255.0;
            *channel = to_u8(slope * v + intercept);
        }
    }
}

/// Slope and intercept of the brightness/contrast polynomial.
#[inline]
fn brightness_contrast_coefficients(brightness: f64, contrast: f64) -> (f64, f64) {
    let slope = (std::f64::consts::PI * (contrast / 100.0 + 1.0) / 4.0)
        .tan()
        .max(0.0);
    let intercept = brightness / 100.0 + ((100.0 - brightness) / 200.0) * (1.0 - slope);
    (slope, intercept)
}

/// Apply a sepia tone.
///
/// `threshold` and `quantum` share units: `quantum` is the channel maximum
/// and `threshold` is where the highlights saturate. With intensity `I`:
///
/// - red   = `quantum` if `I > t`, else `I + quantum - t`
/// - green = `quantum` if `I > 7t/6`, else `I + quantum - 7t/6`
/// - blue  = `0` if `I < t/6`, else `I - t/6`
///
/// Green and blue are then raised to at least `t/7`.
pub fn apply_sepia(image: &mut RgbaImage, threshold: f64, quantum: f64) {
    let scale = quantum / 255.0;
    let floor = threshold / 7.0;

    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let i = intensity(r as f64, g as f64, b as f64) * scale;

        let red = if i > threshold {
            quantum
        } else {
            i + quantum - threshold
        };
        let green = if i > 7.0 * threshold / 6.0 {
            quantum
        } else {
            i + quantum - 7.0 * threshold / 6.0
        };
        let blue = if i < threshold / 6.0 {
            0.0
        } else {
            i - threshold / 6.0
        };

        pixel.0[0] = to_u8(red / quantum);
        pixel.0[1] = to_u8(green.max(floor) / quantum);
        pixel.0[2] = to_u8(blue.max(floor) / quantum);
    }
}

/// Blend every pixel toward `tint`.
///
/// Each color channel uses the matching channel of `opacity` as its weight,
/// so `rgb(255,0,0)` as opacity only tints the red channel.
pub fn apply_colorize(image: &mut RgbaImage, tint: Color, opacity: Color) {
    let tint = tint.normalized();
    let weight = opacity.normalized();

    for pixel in image.pixels_mut() {
        for c in 0..3 {
            let p = pixel.0[c] as f64 / 255.0;
            pixel.0[c] = to_u8(p * (1.0 - weight[c]) + tint[c] * weight[c]);
        }
    }
}

/// Replace each pixel's color channels with its intensity.
pub fn apply_grayscale(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let v = intensity_u8(r, g, b);
        pixel.0[0] = v;
        pixel.0[1] = v;
        pixel.0[2] = v;
    }
}

/// Whether every pixel already has equal color channels.
pub fn is_grayscale(image: &RgbaImage) -> bool {
    image.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2])
}

#[inline]
fn to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}


// ============================================================================
// Property-Based Tests
// ============================================================================
