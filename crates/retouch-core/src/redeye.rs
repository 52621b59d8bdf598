//! Red-eye detection and correction over a pixel region.
//!
//! A pixel counts as red-eye when its red channel dominates the mean of
//! green and blue:
//!
//! ```text
//! intensity = r / ((g + b) / 2)
//! ```
//!
//! and `intensity > 1.5`. Flagged pixels are rewritten either with a fixed
//! color or, for `"auto"`, with a color derived from the pixel's own green
//! and blue so the replacement keeps the surrounding shading.
//!
//! Rows are processed top to bottom and committed one at a time. A failure
//! stops the scan; rows committed before it stay applied.

use crate::engine::RegionCursor;
use crate::image::ImageError;

/// Red dominance above which a pixel is rewritten.
pub const RED_EYE_THRESHOLD: f64 = 1.5;

/// Color descriptor that asks for a per-pixel replacement. Matched exactly;
/// other spellings go to the color parser.
pub const AUTO_COLOR: &str = "auto";

/// Red dominance of normalized channels.
///
/// Follows IEEE division: a black pixel yields NaN and is never flagged,
/// while any red over zero green and blue yields infinity and always is.
#[inline]
pub fn red_intensity(r: f64, g: f64, b: f64) -> f64 {
    r / ((g + b) / 2.0)
}

/// Replacement descriptor for `"auto"`: red takes the green/blue mean.
pub fn auto_color(g: f64, b: f64) -> String {
    format!(
        "rgb({:.0},{:.0},{:.0})",
        255.0 * (g + b) / 2.0,
        255.0 * g,
        255.0 * b
    )
}

/// Scan every row of `cursor`, rewriting red-eye pixels with `color_spec`.
///
/// Returns the number of pixels rewritten. A fixed color is only parsed
/// when a pixel is actually flagged.
pub fn fix_red_eye<C: RegionCursor>(cursor: &mut C, color_spec: &str) -> Result<usize, ImageError> {
    let auto = color_spec == AUTO_COLOR;
    let mut rewritten = 0;
    let mut row_index = 0u32;

    while let Some(row) = cursor.next_row() {
        let mut flagged = 0;

        for pixel in row.iter_mut() {
            let intensity = red_intensity(pixel.red(), pixel.green(), pixel.blue());
            if intensity <= RED_EYE_THRESHOLD || intensity.is_nan() {
                continue;
            }

            let color = if auto {
                auto_color(pixel.green(), pixel.blue())
            } else {
                color_spec.to_string()
            };
            pixel
                .set_color(&color)
                .map_err(|source| ImageError::PixelWrite { color, source })?;
            flagged += 1;
        }

        cursor
            .sync_row()
            .map_err(|source| ImageError::RowCommit {
                row: row_index,
                source,
            })?;

        tracing::trace!(row = row_index, flagged, "red-eye row committed");
        rewritten += flagged;
        row_index += 1;
    }

    Ok(rewritten)
}
