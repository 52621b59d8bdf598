//! Pure dimension arithmetic for resize, extent and rotate.
//!
//! Nothing here touches pixels; every function maps sizes and angles to the
//! arguments the engine primitives receive.

/// Fit `current` inside the box `target`, preserving aspect ratio.
///
/// The per-axis ratio is `current / target`, or `0` for a zero target axis,
/// so a zero axis is ignored and the other one alone decides the scale. The
/// larger ratio wins. Results round half up and are at least one pixel.
/// When both target axes are zero there is nothing to fit and `current` is
/// returned unchanged.
///
/// # Example
///
/// ```
/// use retouch_core::transform::fit_dimensions;
///
/// assert_eq!(fit_dimensions((6000, 4000), (3000, 3000)), (3000, 2000));
/// assert_eq!(fit_dimensions((6000, 4000), (0, 1000)), (1500, 1000));
/// ```
pub fn fit_dimensions(current: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (cur_w, cur_h) = (current.0 as f64, current.1 as f64);

    let ratio_w = if target.0 != 0 {
        cur_w / target.0 as f64
    } else {
        0.0
    };
    let ratio_h = if target.1 != 0 {
        cur_h / target.1 as f64
    } else {
        0.0
    };

    let ratio = ratio_w.max(ratio_h);
    if ratio <= 0.0 {
        return current;
    }

    let w = (cur_w / ratio + 0.5) as u32;
    let h = (cur_h / ratio + 0.5) as u32;
    (w.max(1), h.max(1))
}

/// Substitute the current size for any zero target axis.
pub fn fill_zero_dimensions(current: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    (
        if target.0 == 0 { current.0 } else { target.0 },
        if target.1 == 0 { current.1 } else { target.1 },
    )
}

/// Whether an extent request leaves the canvas as it is.
///
/// A zero axis paired with an unchanged other axis counts as unchanged.
pub fn extent_is_noop(current: (u32, u32), requested: (u32, u32)) -> bool {
    let (cur_w, cur_h) = current;
    let (w, h) = requested;
    (w == 0 && h == cur_h) || (h == 0 && w == cur_w) || (w == cur_w && h == cur_h)
}

/// Offset of the new canvas origin in the old image's coordinates so that
/// the content stays centered.
///
/// Halves use integer division before subtracting; negative offsets mean the
/// new canvas is larger than the content on that axis.
pub fn extent_offsets(current: (u32, u32), requested: (u32, u32)) -> (i64, i64) {
    let x = (current.0 / 2) as i64 - (requested.0 / 2) as i64;
    let y = (current.1 / 2) as i64 - (requested.1 / 2) as i64;
    (x, y)
}

/// Reduce an angle above 359 modulo 360 and decide whether to rotate.
///
/// Returns `None` when no rotation should be issued. Only strictly positive
/// angles rotate, so negative inputs are skipped rather than wrapped.
pub fn rotation_angle(degrees: f64) -> Option<f64> {
    let angle = if degrees > 359.0 {
        degrees % 360.0
    } else {
        degrees
    };

    (angle > 0.0).then_some(angle)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
