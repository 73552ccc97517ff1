//! Tagged label text: one buffer, many formatting sections
//!
//! A label arrives as a list of formatted sections — runs of text with a
//! font stack and scale, or inline images. [`TaggedString`] flattens that
//! into a single text buffer plus a per-code-unit section table, so the
//! line breaker and shaper can walk one string while still resolving every
//! grapheme cluster to its formatting.
//!
//! Inline images are represented by injecting a private-use-area
//! placeholder code point (U+E000 upward) into the buffer; downstream
//! stages treat image clusters uniformly with glyph clusters and only at
//! metric-resolution time branch to the image atlas.
//!
//! # Invariant
//!
//! The section table always covers the buffer exactly: one section index
//! per code unit, and the derived per-cluster index has one entry per
//! grapheme cluster. Every mutation (append, trim, sub-range,
//! verticalization) re-runs segmentation and rebuilds the derived tables
//! in lockstep.

use std::ops::Range;
use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TextError};
use crate::glyph::{font_stack_hash, FontStack, FontStackHash};
use crate::grapheme::cluster_ranges;
use crate::script::{can_verticalize_punctuation, char_has_rotated_vertical_orientation, is_whitespace, verticalized_form};

/// First private-use code point available for image placeholders.
pub const IMAGE_PUA_BEGIN: u32 = 0xE000;

/// Last private-use code point available for image placeholders.
pub const IMAGE_PUA_END: u32 = 0xF8FF;

/// Maximum number of image sections a single label supports.
pub const IMAGE_SECTION_BUDGET: usize = (IMAGE_PUA_END - IMAGE_PUA_BEGIN + 1) as usize;

/// Vertical alignment of a section against the tallest run in its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerticalAlign {
    Top,
    Center,
    #[default]
    Bottom,
}

impl VerticalAlign {
    /// Fraction of the scale-difference baseline shift this alignment
    /// applies: bottom-aligned runs take the full shift and share the
    /// baseline, top-aligned runs take none.
    pub fn factor(self) -> f64 {
        match self {
            VerticalAlign::Top => 0.0,
            VerticalAlign::Center => 0.5,
            VerticalAlign::Bottom => 1.0,
        }
    }
}

/// Formatting applied to a run of grapheme clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionOptions {
    /// Scale relative to the layout text size.
    pub scale: f64,
    /// Vertical alignment against the line's tallest run.
    pub vertical_align: VerticalAlign,
    /// Font stack glyphs in this section resolve against.
    pub font_stack: FontStack,
    /// Cached hash of `font_stack`.
    pub font_stack_hash: FontStackHash,
    /// Image name; `Some` marks this as an image section.
    pub image_id: Option<String>,
}

impl SectionOptions {
    /// A text section.
    pub fn new(scale: f64, vertical_align: VerticalAlign, font_stack: FontStack) -> Self {
        let font_stack_hash = font_stack_hash(&font_stack);
        SectionOptions {
            scale,
            vertical_align,
            font_stack,
            font_stack_hash,
            image_id: None,
        }
    }

    /// An image section.
    pub fn image(scale: f64, vertical_align: VerticalAlign, image_id: &str) -> Self {
        SectionOptions {
            scale,
            vertical_align,
            font_stack: FontStack::default(),
            font_stack_hash: font_stack_hash(&[]),
            image_id: Some(image_id.to_string()),
        }
    }
}

/// One section of caller-supplied formatted input.
///
/// Either a text run (with optional font stack and scale overrides) or an
/// inline image reference. This is the external representation label text
/// arrives in; [`TaggedString::from_formatted`] compiles it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedSection {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_stack: Option<FontStack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<VerticalAlign>,
}

/// Caller-supplied formatted label input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattedText {
    pub sections: Vec<FormattedSection>,
}

/// The logical text model for one label.
///
/// Built once per label per layout pass, optionally verticalized, then
/// split into per-line visual copies after line breaking and bidi
/// reordering. Sections are immutable once created and shared between the
/// logical string and its per-line copies.
#[derive(Debug, Clone, Default)]
pub struct TaggedString {
    text: String,
    /// Section index per code unit (UTF-8 byte).
    byte_sections: Vec<usize>,
    sections: Arc<Vec<SectionOptions>>,
    /// Byte range per grapheme cluster; derived, rebuilt on mutation.
    clusters: Vec<Range<usize>>,
    /// Section index per grapheme cluster; derived, rebuilt on mutation.
    section_index: Vec<usize>,
    /// Last allocated image placeholder, if any.
    image_section_id: Option<char>,
}

impl TaggedString {
    /// Builds a tagged string from raw text with a single section.
    pub fn from_raw(text: impl Into<String>, section: SectionOptions) -> Self {
        let text = text.into();
        let byte_sections = vec![0; text.len()];
        let mut result = TaggedString {
            text,
            byte_sections,
            sections: Arc::new(vec![section]),
            clusters: Vec::new(),
            section_index: Vec::new(),
            image_section_id: None,
        };
        result.rebuild_clusters();
        result
    }

    /// Compiles caller-supplied formatted input.
    ///
    /// Sections without a font stack inherit `default_font_stack`;
    /// sections without a scale default to 1. Image sections with an
    /// empty or over-budget name are dropped with a warning, matching
    /// [`Self::add_image_section`].
    pub fn from_formatted(formatted: &FormattedText, default_font_stack: &FontStack) -> Self {
        let mut result = TaggedString::default();
        for section in &formatted.sections {
            let scale = section.scale.unwrap_or(1.0);
            let vertical_align = section.vertical_align.unwrap_or_default();
            match &section.image {
                Some(image) => result.add_image_section(image, scale, vertical_align),
                None => {
                    let font_stack = section
                        .font_stack
                        .clone()
                        .unwrap_or_else(|| default_font_stack.clone());
                    result.add_text_section(&section.text, scale, vertical_align, font_stack);
                }
            }
        }
        result
    }

    /// Rebuilds the derived cluster tables after a text mutation.
    fn rebuild_clusters(&mut self) {
        self.clusters = cluster_ranges(&self.text);
        self.section_index = self
            .clusters
            .iter()
            .map(|range| self.byte_sections.get(range.start).copied().unwrap_or(0))
            .collect();
    }

    /// Number of grapheme clusters.
    pub fn length(&self) -> usize {
        self.clusters.len()
    }

    /// True when the string holds no clusters.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// The underlying text buffer.
    pub fn raw_text(&self) -> &str {
        &self.text
    }

    /// Section index per code unit, parallel to `raw_text().as_bytes()`.
    pub fn byte_sections(&self) -> &[usize] {
        &self.byte_sections
    }

    /// The grapheme cluster at a cluster index.
    pub fn cluster(&self, index: usize) -> &str {
        &self.text[self.clusters[index].clone()]
    }

    /// Byte range of the cluster at a cluster index.
    pub fn cluster_range(&self, index: usize) -> Range<usize> {
        self.clusters[index].clone()
    }

    /// Converts a grapheme-cluster offset to a code-unit offset.
    ///
    /// `index == length()` maps to the end of the buffer, so breakpoint
    /// sets that include the end-of-text position translate cleanly.
    pub fn to_code_unit_index(&self, index: usize) -> usize {
        if index >= self.clusters.len() {
            self.text.len()
        } else {
            self.clusters[index].start
        }
    }

    /// The section formatting the given cluster.
    pub fn get_section(&self, cluster_index: usize) -> &SectionOptions {
        &self.sections[self.section_index[cluster_index]]
    }

    /// The section index of the given cluster.
    pub fn get_section_index(&self, cluster_index: usize) -> usize {
        self.section_index[cluster_index]
    }

    /// A section by section index.
    pub fn section_at(&self, section_index: usize) -> &SectionOptions {
        &self.sections[section_index]
    }

    /// All sections.
    pub fn sections(&self) -> &[SectionOptions] {
        &self.sections
    }

    /// Shared handle to the section list.
    pub(crate) fn sections_handle(&self) -> Arc<Vec<SectionOptions>> {
        Arc::clone(&self.sections)
    }

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Largest section scale referenced by any cluster.
    pub fn max_scale(&self) -> f64 {
        self.section_index
            .iter()
            .map(|&index| self.sections[index].scale)
            .fold(0.0, f64::max)
    }

    /// Appends a run of text with its own formatting section.
    pub fn add_text_section(
        &mut self,
        text: &str,
        scale: f64,
        vertical_align: VerticalAlign,
        font_stack: FontStack,
    ) {
        let section_index = self.sections.len();
        Arc::make_mut(&mut self.sections).push(SectionOptions::new(scale, vertical_align, font_stack));
        self.text.push_str(text);
        self.byte_sections
            .extend(std::iter::repeat(section_index).take(text.len()));
        self.rebuild_clusters();
    }

    /// Appends an inline image section.
    ///
    /// Allocates the next private-use placeholder code point. An empty
    /// image name or an exhausted placeholder range drops the section
    /// with a warning; the rest of the label is unaffected.
    pub fn add_image_section(&mut self, image_id: &str, scale: f64, vertical_align: VerticalAlign) {
        if image_id.is_empty() {
            warn!("dropping image section: {}", TextError::EmptyImageName);
            return;
        }
        let placeholder = match self.next_image_section_char() {
            Ok(placeholder) => placeholder,
            Err(err) => {
                warn!("dropping image section {image_id:?}: {err}");
                return;
            }
        };
        let section_index = self.sections.len();
        Arc::make_mut(&mut self.sections).push(SectionOptions::image(scale, vertical_align, image_id));
        self.text.push(placeholder);
        self.byte_sections
            .extend(std::iter::repeat(section_index).take(placeholder.len_utf8()));
        self.rebuild_clusters();
    }

    fn next_image_section_char(&mut self) -> Result<char> {
        let next = match self.image_section_id {
            None => IMAGE_PUA_BEGIN,
            Some(previous) => previous as u32 + 1,
        };
        match char::from_u32(next).filter(|c| (*c as u32) <= IMAGE_PUA_END) {
            Some(placeholder) => {
                self.image_section_id = Some(placeholder);
                Ok(placeholder)
            }
            None => Err(TextError::ImageBudgetExhausted {
                max: IMAGE_SECTION_BUDGET,
            }),
        }
    }

    fn cluster_is_whitespace(&self, index: usize) -> bool {
        self.text[self.clusters[index].clone()].chars().all(is_whitespace)
    }

    /// Strips leading and trailing whitespace clusters.
    pub fn trim(&mut self) {
        let first = (0..self.length()).find(|&i| !self.cluster_is_whitespace(i));
        let Some(first) = first else {
            // All whitespace: nothing survives.
            self.text.clear();
            self.byte_sections.clear();
            self.rebuild_clusters();
            return;
        };
        let last = (0..self.length())
            .rev()
            .find(|&i| !self.cluster_is_whitespace(i))
            .unwrap_or(first);

        let range = self.clusters[first].start..self.clusters[last].end;
        self.text = self.text[range.clone()].to_string();
        self.byte_sections = self.byte_sections[range].to_vec();
        self.rebuild_clusters();
    }

    /// A sub-range of clusters as a new tagged string.
    ///
    /// The section list is shared with `self`; the text buffer and
    /// derived tables are independent. Indices are cluster offsets and
    /// are clamped to the valid range.
    pub fn substring(&self, start: usize, end: usize) -> TaggedString {
        let end = end.min(self.length());
        let start = start.min(end);
        let byte_range = if start == end {
            0..0
        } else {
            self.clusters[start].start..self.clusters[end - 1].end
        };

        let mut result = TaggedString {
            text: self.text[byte_range.clone()].to_string(),
            byte_sections: self.byte_sections[byte_range].to_vec(),
            sections: Arc::clone(&self.sections),
            clusters: Vec::new(),
            section_index: Vec::new(),
            image_section_id: self.image_section_id,
        };
        result.rebuild_clusters();
        result
    }

    /// Rebuilds a per-line tagged string from reordered engine output.
    pub(crate) fn from_visual_line(
        text: String,
        byte_sections: Vec<usize>,
        sections: Arc<Vec<SectionOptions>>,
    ) -> TaggedString {
        debug_assert_eq!(text.len(), byte_sections.len());
        let mut result = TaggedString {
            text,
            byte_sections,
            sections,
            clusters: Vec::new(),
            section_index: Vec::new(),
            image_section_id: None,
        };
        result.rebuild_clusters();
        result
    }

    /// Swaps punctuation for vertical presentation forms.
    ///
    /// A mark is only replaced when neither neighbor is clearly rotated
    /// text: next to upright CJK (or other verticalizable punctuation)
    /// the vertical form is the one that reads correctly, while inside a
    /// rotated Latin run the original form rotates with its neighbors.
    pub fn verticalize_punctuation(&mut self) {
        let mut text = String::with_capacity(self.text.len());
        let mut byte_sections = Vec::with_capacity(self.byte_sections.len());

        for index in 0..self.length() {
            let cluster = self.cluster(index);
            let section = self.section_index[index];

            let replacement = self.verticalized_cluster(index, cluster);
            match replacement {
                Some(form) => {
                    text.push(form);
                    byte_sections.extend(std::iter::repeat(section).take(form.len_utf8()));
                }
                None => {
                    text.push_str(cluster);
                    byte_sections.extend(std::iter::repeat(section).take(cluster.len()));
                }
            }
        }

        self.text = text;
        self.byte_sections = byte_sections;
        self.rebuild_clusters();
    }

    fn verticalized_cluster(&self, index: usize, cluster: &str) -> Option<char> {
        let mut chars = cluster.chars();
        let only = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        let form = verticalized_form(only)?;

        let neighbor_allows = |neighbor: Option<char>| match neighbor {
            None => true,
            Some(c) => !char_has_rotated_vertical_orientation(c) || can_verticalize_punctuation(c),
        };
        let prev = index
            .checked_sub(1)
            .and_then(|i| self.cluster(i).chars().next());
        let next = (index + 1 < self.length())
            .then(|| self.cluster(index + 1).chars().next())
            .flatten();

        (neighbor_allows(prev) && neighbor_allows(next)).then_some(form)
    }
}
