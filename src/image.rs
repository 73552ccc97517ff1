//! Image atlas data model
//!
//! Inline images (shields, transit logos) and standalone icons are
//! resolved by an external image atlas before shaping; the core consumes
//! the resolved positions. A lookup supplies the image's atlas rectangle,
//! pixel ratio, an optional content rectangle (the part of a stretchable
//! image that may hold text), and optional per-axis text-fit behavior.

use rustc_hash::FxHashMap;

use crate::glyph::AtlasRect;

/// How an icon axis responds when fitted to shaped text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextFit {
    /// Stretch or shrink the axis to the text box.
    #[default]
    StretchOrShrink,
    /// Stretch to the text box but never below the display size.
    StretchOnly,
    /// Derive this axis from the other one and the content aspect ratio.
    Proportional,
}

/// Content insets of a stretchable image, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageContent {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl ImageContent {
    /// Content box width in source pixels.
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Content box height in source pixels.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// A resolved image in the atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePosition {
    /// Atlas rectangle including the one-texel padding on every side.
    pub padded_rect: AtlasRect,
    /// Device pixels per layout pixel the image was rasterized at.
    pub pixel_ratio: f64,
    /// Content rectangle for icon-text-fit, when the image declares one.
    pub content: Option<ImageContent>,
    /// Horizontal text-fit behavior, when the image declares one.
    pub text_fit_width: Option<TextFit>,
    /// Vertical text-fit behavior, when the image declares one.
    pub text_fit_height: Option<TextFit>,
}

impl ImagePosition {
    /// Padding baked into `padded_rect` on each side.
    pub const PADDING: f64 = 1.0;

    /// Display size in layout pixels.
    pub fn display_size(&self) -> [f64; 2] {
        [
            (self.padded_rect.w as f64 - Self::PADDING * 2.0) / self.pixel_ratio,
            (self.padded_rect.h as f64 - Self::PADDING * 2.0) / self.pixel_ratio,
        ]
    }
}

/// Resolved image positions keyed by image name.
pub type ImagePositions = FxHashMap<String, ImagePosition>;
