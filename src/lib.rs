//! Multi-script label text layout
//!
//! Lays out formatted, multi-script label text into positioned glyph runs
//! ready for GPU rasterization. The crate owns the layout decisions —
//! grapheme segmentation, script classification, line breaking, bidi
//! integration, glyph positioning, icon fitting — and delegates resource
//! resolution (glyph metrics, atlas rectangles, image positions) to its
//! caller, so a shaping call is synchronous, allocation-light, and safe to
//! run per label on worker threads.
//!
//! # Pipeline
//!
//! ```text
//! FormattedText → TaggedString → (verticalize) → line breaks → bidi → shape
//! ```
//!
//! 1. **[`tagged_string`]** compiles formatted input into one text buffer
//!    with per-cluster formatting sections.
//! 2. **[`line_break`]** picks near-optimal breakpoints with a
//!    Knuth-style dynamic program over break candidates.
//! 3. **[`bidi`]** reorders each line from logical to visual order,
//!    through a pluggable engine with a logical-order fallback.
//! 4. **[`shape`]** positions every grapheme cluster and inline image,
//!    justifies lines, and aligns the block against its anchor.
//! 5. **[`icon`]** places an accompanying icon, optionally fitted to the
//!    shaped text box.
//!
//! # Example
//!
//! ```rust,ignore
//! use labelshaper::{get_shaping, Anchor, TaggedString, TextJustify, WritingMode, ONE_EM};
//!
//! let label = TaggedString::from_formatted(&formatted, &font_stack);
//! let shaping = get_shaping(
//!     &label, 5.0 * ONE_EM, ONE_EM * 1.2, Anchor::Center, TextJustify::Center,
//!     0.0, [0.0, 0.0], WritingMode::Horizontal, Some(&engine),
//!     &glyph_map, &glyph_positions, &image_positions, 16.0, false,
//! );
//! if let Some(shaping) = shaping {
//!     for line in &shaping.positioned_lines { /* emit quads */ }
//! }
//! ```

pub mod bidi;
pub mod error;
pub mod glyph;
pub mod grapheme;
pub mod icon;
pub mod image;
pub mod line_break;
pub mod script;
pub mod shape;
pub mod style;
pub mod tagged_string;

pub use bidi::{reorder_into_lines, BidiEngine, UnicodeBidiEngine};
pub use error::{BidiError, Result, TextError};
pub use glyph::{
    font_stack_hash, AtlasRect, FontStack, FontStackHash, GlyphMap, GlyphMetrics, GlyphPosition,
    GlyphPositionMap, GlyphPositions, Glyphs, PositionedGlyph, PositionedLine, Shaping,
    WritingMode, ONE_EM,
};
pub use icon::{Padding, PositionedIcon};
pub use image::{ImageContent, ImagePosition, ImagePositions, TextFit};
pub use line_break::determine_line_breaks;
pub use shape::get_shaping;
pub use style::{justify_for_anchor, Anchor, AnchorAlignment, IconTextFit, TextJustify};
pub use tagged_string::{
    FormattedSection, FormattedText, SectionOptions, TaggedString, VerticalAlign,
};
