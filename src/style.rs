//! Style-driven layout options
//!
//! The small set of placement enums the shaper and icon fitter consume.
//! These mirror the symbol-layout properties of the style specification;
//! parsing them out of a style document happens upstream.

/// Placement anchor of a label relative to its map point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Anchor {
    #[default]
    Center,
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Horizontal justification of the lines inside a label block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextJustify {
    /// Pick the justification that matches the anchor direction.
    Auto,
    Left,
    #[default]
    Center,
    Right,
}

impl TextJustify {
    /// Numeric justify factor: left 0, center 0.5, right 1.
    ///
    /// `Auto` must be resolved against an anchor first; it maps to
    /// center here.
    pub fn factor(self) -> f64 {
        match self {
            TextJustify::Left => 0.0,
            TextJustify::Right => 1.0,
            TextJustify::Auto | TextJustify::Center => 0.5,
        }
    }
}

/// How an icon is scaled to the text it accompanies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IconTextFit {
    #[default]
    None,
    Width,
    Height,
    Both,
}

/// Fractional alignment derived from an anchor: 0 left/top, 0.5 center,
/// 1 right/bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorAlignment {
    pub horizontal_align: f64,
    pub vertical_align: f64,
}

impl AnchorAlignment {
    /// Alignment factors for a placement anchor.
    pub fn for_anchor(anchor: Anchor) -> AnchorAlignment {
        let mut result = AnchorAlignment {
            horizontal_align: 0.5,
            vertical_align: 0.5,
        };

        match anchor {
            Anchor::Right | Anchor::TopRight | Anchor::BottomRight => {
                result.horizontal_align = 1.0;
            }
            Anchor::Left | Anchor::TopLeft | Anchor::BottomLeft => {
                result.horizontal_align = 0.0;
            }
            _ => {}
        }

        match anchor {
            Anchor::Bottom | Anchor::BottomLeft | Anchor::BottomRight => {
                result.vertical_align = 1.0;
            }
            Anchor::Top | Anchor::TopLeft | Anchor::TopRight => {
                result.vertical_align = 0.0;
            }
            _ => {}
        }

        result
    }
}

/// Justification matching the direction of a placement anchor.
///
/// Used to resolve [`TextJustify::Auto`]: a label anchored on its right
/// edge reads best right-justified, and so on.
pub fn justify_for_anchor(anchor: Anchor) -> TextJustify {
    match anchor {
        Anchor::Right | Anchor::TopRight | Anchor::BottomRight => TextJustify::Right,
        Anchor::Left | Anchor::TopLeft | Anchor::BottomLeft => TextJustify::Left,
        _ => TextJustify::Center,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_alignment() {
        let center = AnchorAlignment::for_anchor(Anchor::Center);
        assert_eq!((center.horizontal_align, center.vertical_align), (0.5, 0.5));

        let top_left = AnchorAlignment::for_anchor(Anchor::TopLeft);
        assert_eq!((top_left.horizontal_align, top_left.vertical_align), (0.0, 0.0));

        let bottom_right = AnchorAlignment::for_anchor(Anchor::BottomRight);
        assert_eq!(
            (bottom_right.horizontal_align, bottom_right.vertical_align),
            (1.0, 1.0)
        );
    }

    #[test]
    fn test_justify_for_anchor() {
        assert_eq!(justify_for_anchor(Anchor::Left), TextJustify::Left);
        assert_eq!(justify_for_anchor(Anchor::BottomRight), TextJustify::Right);
        assert_eq!(justify_for_anchor(Anchor::Top), TextJustify::Center);
    }

    #[test]
    fn test_justify_factor() {
        assert_eq!(TextJustify::Left.factor(), 0.0);
        assert_eq!(TextJustify::Center.factor(), 0.5);
        assert_eq!(TextJustify::Right.factor(), 1.0);
    }
}
