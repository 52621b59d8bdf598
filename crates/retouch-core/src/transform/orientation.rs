//! Primitive sequences that bring each EXIF orientation back to upright.

use crate::decode::Orientation;

/// One primitive in an orientation correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrientStep {
    /// Mirror top-bottom.
    Flip,
    /// Mirror left-right.
    Flop,
    /// Rotate clockwise by the given degrees.
    Rotate(f64),
}

/// The steps that undo `orientation`, in application order.
///
/// Returns `None` for [`Orientation::Undefined`], which cannot be corrected.
/// [`Orientation::TopLeft`] maps to an empty sequence.
pub fn correction_steps(orientation: Orientation) -> Option<&'static [OrientStep]> {
    use OrientStep::*;

    let steps: &'static [OrientStep] = match orientation {
        Orientation::Undefined => return None,
        Orientation::TopLeft => &[],
        Orientation::TopRight => &[Flop],
        Orientation::BottomRight => &[Rotate(180.0)],
        Orientation::BottomLeft => &[Flip],
        Orientation::LeftTop => &[Flip, Rotate(90.0)],
        Orientation::RightTop => &[Rotate(90.0)],
        Orientation::RightBottom => &[Flop, Rotate(90.0)],
        Orientation::LeftBottom => &[Rotate(-90.0)],
    };
    Some(steps)
}
