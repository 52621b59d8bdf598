//! Pixel intensity using ITU-R BT.709 coefficients.
//!
//! Shared by the sepia tone curve and the grayscale color-type conversion.

/// BT.709 weight of the red channel.
pub const LUMA_R: f64 = 0.2126;

/// BT.709 weight of the green channel.
pub const LUMA_G: f64 = 0.7152;

/// BT.709 weight of the blue channel.
pub const LUMA_B: f64 = 0.0722;

/// Intensity of normalized RGB values (0.0 to 1.0).
#[inline]
pub fn intensity(r: f64, g: f64, b: f64) -> f64 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

/// Intensity of 8-bit RGB values, rounded back to 8 bits.
#[inline]
pub fn intensity_u8(r: u8, g: u8, b: u8) -> u8 {
    let v = LUMA_R * r as f64 + LUMA_G * g as f64 + LUMA_B * b as f64;
    v.clamp(0.0, 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        assert!((LUMA_R + LUMA_G + LUMA_B - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(intensity_u8(0, 0, 0), 0);
        assert_eq!(intensity_u8(255, 255, 255), 255);
        assert!((intensity(1.0, 1.0, 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_gray_is_fixed_point() {
        for v in [0u8, 17, 64, 128, 200, 255] {
            assert_eq!(intensity_u8(v, v, v), v);
        }
    }

    #[test]
    fn test_green_dominates() {
        // 0.7152 * 255 ≈ 182.4, 0.2126 * 255 ≈ 54.2, 0.0722 * 255 ≈ 18.4
        assert_eq!(intensity_u8(0, 255, 0), 182);
        assert_eq!(intensity_u8(255, 0, 0), 54);
        assert_eq!(intensity_u8(0, 0, 255), 18);
    }
}
