//! Icon placement and icon-to-text fitting
//!
//! Pure geometry on top of shaped text: place an icon against an anchor
//! and offset, or stretch it over the text it backs (shields, route
//! badges). Fitting respects the image's optional per-axis text-fit
//! behavior — stretch, stretch-only, or proportional to the content box
//! aspect ratio.

use crate::glyph::Shaping;
use crate::image::{ImagePosition, TextFit};
use crate::style::{Anchor, AnchorAlignment, IconTextFit};

/// Per-edge padding, in layout pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Padding {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Padding {
    /// True when any edge is non-zero.
    pub fn is_any(&self) -> bool {
        self.left != 0.0 || self.top != 0.0 || self.right != 0.0 || self.bottom != 0.0
    }
}

/// A placed icon: its image, box edges relative to the anchor, and the
/// collision padding its content insets imply.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedIcon {
    pub image: ImagePosition,
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    pub collision_padding: Padding,
}

impl PositionedIcon {
    /// Places an icon against an anchor and offset, independent of any
    /// text.
    pub fn shape_icon(image: ImagePosition, icon_offset: [f64; 2], icon_anchor: Anchor) -> PositionedIcon {
        let anchor_align = AnchorAlignment::for_anchor(icon_anchor);
        let display_size = image.display_size();
        let dx = icon_offset[0];
        let dy = icon_offset[1];
        let left = dx - display_size[0] * anchor_align.horizontal_align;
        let right = left + display_size[0];
        let top = dy - display_size[1] * anchor_align.vertical_align;
        let bottom = top + display_size[1];

        let mut collision_padding = Padding::default();
        if let Some(content) = &image.content {
            let pixel_ratio = image.pixel_ratio;
            collision_padding.left = content.left / pixel_ratio;
            collision_padding.top = content.top / pixel_ratio;
            collision_padding.right = display_size[0] - content.right / pixel_ratio;
            collision_padding.bottom = display_size[1] - content.bottom / pixel_ratio;
        }

        PositionedIcon {
            image,
            top,
            bottom,
            left,
            right,
            collision_padding,
        }
    }

    /// Stretches or centers this icon against shaped text.
    ///
    /// The icon anchor is not respected here: with icon-text-fit active
    /// the icon centers on the text and then stretches along the
    /// requested axes. `padding` is `[top, right, bottom, left]`.
    pub fn fit_icon_to_text(
        &mut self,
        shaped_text: &Shaping,
        text_fit: IconTextFit,
        padding: [f64; 4],
        icon_offset: [f64; 2],
        font_scale: f64,
    ) {
        debug_assert!(text_fit != IconTextFit::None);

        let display_size = self.image.display_size();
        let text_left = shaped_text.left * font_scale;
        let text_right = shaped_text.right * font_scale;

        if text_fit == IconTextFit::Width || text_fit == IconTextFit::Both {
            // Stretched horizontally to the text width
            self.left = icon_offset[0] + text_left - padding[3];
            self.right = icon_offset[0] + text_right + padding[1];
        } else {
            // Centered on the text
            self.left = icon_offset[0] + (text_left + text_right - display_size[0]) / 2.0;
            self.right = self.left + display_size[0];
        }

        let text_top = shaped_text.top * font_scale;
        let text_bottom = shaped_text.bottom * font_scale;
        if text_fit == IconTextFit::Height || text_fit == IconTextFit::Both {
            // Stretched vertically to the text height
            self.top = icon_offset[1] + text_top - padding[0];
            self.bottom = icon_offset[1] + text_bottom + padding[2];
        } else {
            // Centered on the text
            self.top = icon_offset[1] + (text_top + text_bottom - display_size[1]) / 2.0;
            self.bottom = self.top + display_size[1];
        }

        self.apply_text_fit();
    }

    /// Applies the image's per-axis text-fit behavior to the fitted box.
    ///
    /// Height wins when both axes ask for proportional scaling.
    fn apply_text_fit(&mut self) {
        if self.image.text_fit_width.is_none() && self.image.text_fit_height.is_none() {
            return;
        }
        let fit_width = self.image.text_fit_width.unwrap_or_default();
        let fit_height = self.image.text_fit_height.unwrap_or_default();
        let display_size = self.image.display_size();

        let content_aspect = match &self.image.content {
            Some(content) if content.height() > 0.0 => content.width() / content.height(),
            _ if display_size[1] > 0.0 => display_size[0] / display_size[1],
            _ => 1.0,
        };

        if fit_width == TextFit::StretchOnly && self.right - self.left < display_size[0] {
            let center = (self.left + self.right) / 2.0;
            self.left = center - display_size[0] / 2.0;
            self.right = center + display_size[0] / 2.0;
        }
        if fit_height == TextFit::StretchOnly && self.bottom - self.top < display_size[1] {
            let center = (self.top + self.bottom) / 2.0;
            self.top = center - display_size[1] / 2.0;
            self.bottom = center + display_size[1] / 2.0;
        }

        let width = self.right - self.left;
        let height = self.bottom - self.top;
        match (fit_width, fit_height) {
            (_, TextFit::Proportional) => {
                let new_height = width / content_aspect;
                let center = (self.top + self.bottom) / 2.0;
                self.top = center - new_height / 2.0;
                self.bottom = center + new_height / 2.0;
            }
            (TextFit::Proportional, _) => {
                let new_width = height * content_aspect;
                let center = (self.left + self.right) / 2.0;
                self.left = center - new_width / 2.0;
                self.right = center + new_width / 2.0;
            }
            _ => {}
        }
    }
}
