//! Grapheme cluster segmentation for label text
//!
//! Splits label text into the units every downstream stage operates on:
//! line breaking, section lookup, glyph metric lookup, and positioning all
//! work at grapheme-cluster granularity, never at raw code units. Once a
//! cluster is formed here it is never re-split.
//!
//! # Algorithm
//!
//! The baseline partition comes from `unicode-segmentation`'s extended
//! grapheme clusters (UAX #29). Two script-specific fuse-forward rules are
//! applied on top, joining a baseline segment with the one after it:
//!
//! 1. The next segment starts with a spacing combining mark (general
//!    category Mc). UAX #29 already keeps most of these attached, but the
//!    Myanmar vowels and a handful of others are carved out of the
//!    `SpacingMark` property and would otherwise start their own cluster.
//! 2. The current cluster ends in an invisible stacker (Khmer coeng,
//!    Myanmar virama, and the other conjoining virama-like marks), which
//!    joins the following consonant into the stack regardless of its own
//!    category.
//!
//! Fusing repeats until neither rule applies, so `coeng + consonant +
//! vowel sign` collapses into a single cluster.
//!
//! The sequence is lazy and restartable; it must be re-run whenever the
//! underlying text changes.
//!
//! # References
//!
//! - Unicode Standard Annex #29: <https://www.unicode.org/reports/tr29/>

use std::iter::Peekable;
use std::ops::Range;

use unicode_segmentation::{GraphemeIndices, UnicodeSegmentation};

use crate::script::{is_invisible_stacker, is_spacing_combining_mark};

/// One grapheme cluster: a slice of the source text plus its byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grapheme<'a> {
    /// The cluster's substring in the source text.
    pub text: &'a str,
    /// Byte offset of the cluster start in the source text.
    pub offset: usize,
}

impl<'a> Grapheme<'a> {
    /// First scalar of the cluster.
    ///
    /// A cluster is never empty, but the accessor stays total to keep
    /// callers honest.
    pub fn first_scalar(&self) -> Option<char> {
        self.text.chars().next()
    }

    /// Last scalar of the cluster.
    pub fn last_scalar(&self) -> Option<char> {
        self.text.chars().next_back()
    }

    /// Byte range of the cluster in the source text.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.text.len()
    }
}

/// Lazy iterator over fused grapheme clusters.
///
/// Produced by [`segment`]; yields clusters in text order.
pub struct GraphemeClusters<'a> {
    text: &'a str,
    inner: Peekable<GraphemeIndices<'a>>,
}

impl<'a> Iterator for GraphemeClusters<'a> {
    type Item = Grapheme<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (start, first) = self.inner.next()?;
        let mut end = start + first.len();

        while let Some(&(_, next)) = self.inner.peek() {
            let starts_with_spacing_mark = next
                .chars()
                .next()
                .is_some_and(is_spacing_combining_mark);
            let ends_with_stacker = self.text[start..end]
                .chars()
                .next_back()
                .is_some_and(is_invisible_stacker);

            if !(starts_with_spacing_mark || ends_with_stacker) {
                break;
            }
            if let Some((_, fused)) = self.inner.next() {
                end += fused.len();
            }
        }

        Some(Grapheme {
            text: &self.text[start..end],
            offset: start,
        })
    }
}

/// Segments text into fused grapheme clusters.
pub fn segment(text: &str) -> GraphemeClusters<'_> {
    GraphemeClusters {
        text,
        inner: text.grapheme_indices(true).peekable(),
    }
}

/// Byte ranges of every cluster in the text.
///
/// The eager form used by [`TaggedString`](crate::tagged_string::TaggedString),
/// which rebuilds its cluster table after every text mutation.
pub fn cluster_ranges(text: &str) -> Vec<Range<usize>> {
    segment(text).map(|g| g.range()).collect()
}

/// Number of grapheme clusters in the text.
pub fn cluster_count(text: &str) -> usize {
    segment(text).count()
}
