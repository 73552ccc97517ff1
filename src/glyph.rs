//! Glyph data model and shaping output types
//!
//! The shaping core never touches font files: callers resolve glyph
//! metrics (and optionally atlas rectangles) ahead of time, keyed by
//! font stack and grapheme cluster, and pass the finished maps in. This
//! module defines those maps plus the positioned output the shaper
//! produces.
//!
//! All dimensions are in the 24-per-em layout space the glyph metrics are
//! generated at; see [`ONE_EM`].

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};

/// Reference em size the glyph metrics are generated at.
///
/// Every advance, offset, and line height in the shaping core is
/// expressed in this space; callers rescale to their actual text size.
pub const ONE_EM: f64 = 24.0;

/// Border in texels around every glyph in the atlas.
pub const GLYPH_BORDER: f64 = 3.0;

/// An ordered list of font names, tried front to back when resolving a
/// glyph.
pub type FontStack = Vec<String>;

/// Hash identifying a font stack in glyph lookup maps.
pub type FontStackHash = u64;

/// Hashes a font stack for use as a glyph-map key.
///
/// Joins names with a separator that cannot occur in a font name so
/// `["a", "bc"]` and `["ab", "c"]` hash differently.
pub fn font_stack_hash(stack: &[String]) -> FontStackHash {
    let mut hasher = FxHasher::default();
    for name in stack {
        name.hash(&mut hasher);
        0xffu8.hash(&mut hasher);
    }
    hasher.finish()
}

/// Metrics for a single glyph, in layout-space units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlyphMetrics {
    /// Ink width.
    pub width: f64,
    /// Ink height.
    pub height: f64,
    /// Left bearing.
    pub left: f64,
    /// Top bearing.
    pub top: f64,
    /// Horizontal advance.
    pub advance: f64,
}

/// A rectangle in atlas texels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AtlasRect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

/// A glyph's atlas rectangle together with its metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlyphPosition {
    pub rect: AtlasRect,
    pub metrics: GlyphMetrics,
}

/// Glyph metrics for one font stack, keyed by grapheme cluster.
///
/// `None` records that the glyph was requested but could not be
/// resolved; shaping skips such clusters.
pub type Glyphs = FxHashMap<String, Option<GlyphMetrics>>;

/// Resolved glyph metrics for every font stack a label references.
pub type GlyphMap = FxHashMap<FontStackHash, Glyphs>;

/// Atlas positions for one font stack, keyed by grapheme cluster.
pub type GlyphPositionMap = FxHashMap<String, GlyphPosition>;

/// Atlas positions for every font stack a label references.
pub type GlyphPositions = FxHashMap<FontStackHash, GlyphPositionMap>;

/// Rendering orientation for a shaped label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WritingMode {
    /// Glyphs advance left to right; nothing is verticalized.
    #[default]
    Horizontal,
    /// Glyphs advance top to bottom; eligible glyphs stand upright.
    Vertical,
}

/// One positioned glyph or inline image in a shaped line.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedGlyph {
    /// Source grapheme cluster (or private-use placeholder for images).
    pub glyph: String,
    /// Horizontal offset from the label anchor.
    pub x: f64,
    /// Vertical offset from the label anchor.
    pub y: f64,
    /// Placed upright in a vertical line.
    pub vertical: bool,
    /// Font stack the metrics were resolved against.
    pub font: FontStackHash,
    /// Scale relative to the layout text size.
    pub scale: f64,
    /// Atlas rectangle, when the glyph has one.
    pub rect: Option<AtlasRect>,
    /// Resolved metrics (glyph cache or image atlas).
    pub metrics: GlyphMetrics,
    /// Image name for image sections.
    pub image_id: Option<String>,
    /// Index into the label's section list.
    pub section_index: usize,
}

/// A shaped line: its glyphs plus the extra room an oversized inline
/// image demanded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionedLine {
    pub positioned_glyphs: Vec<PositionedGlyph>,
    pub line_offset: f64,
}

/// The complete output of shaping one label.
///
/// Owned exclusively by the caller that requested it; the shaper holds
/// no state across invocations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shaping {
    /// Per-line positioned glyphs, top to bottom.
    pub positioned_lines: Vec<PositionedLine>,
    /// Anchor-relative bounding box.
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    /// Orientation this shaping was produced for.
    pub writing_mode: WritingMode,
    /// Some glyph was placed upright in vertical mode.
    pub verticalizable: bool,
    /// Some image section was placed.
    pub icons_in_text: bool,
}

impl Shaping {
    /// Distance from the anchor to the first baseline.
    pub const Y_OFFSET: f64 = -17.0;

    /// Creates an empty shaping anchored at a translation offset.
    pub fn new(x: f64, y: f64, writing_mode: WritingMode) -> Self {
        Shaping {
            positioned_lines: Vec::new(),
            top: y,
            bottom: y,
            left: x,
            right: x,
            writing_mode,
            verticalizable: false,
            icons_in_text: false,
        }
    }

    /// True when at least one glyph was placed on some line.
    pub fn has_glyphs(&self) -> bool {
        self.positioned_lines
            .iter()
            .any(|line| !line.positioned_glyphs.is_empty())
    }
}
