//! Bidirectional text integration (UAX #9)
//!
//! Line breaking works on logical-order text; rendering wants visual
//! order. This module sits between the two: it translates the line
//! breaker's grapheme-index breakpoints into code-unit offsets, hands the
//! logical paragraph to a reordering engine, and rebuilds per-line
//! [`TaggedString`]s from the visually ordered output while preserving
//! each code unit's formatting section.
//!
//! The engine itself is an injected capability, not a hard dependency: a
//! platform may route through ICU or a text service, and headless callers
//! may have nothing at all. [`UnicodeBidiEngine`] wraps the
//! `unicode-bidi` crate as the in-crate default. With no engine — or a
//! failing one — lines fall back to literal logical-order splitting,
//! which is also the correct behavior for LTR-only text.
//!
//! Two protocol details protect grapheme integrity across reordering:
//!
//! - Zero-width joiners are substituted with a sentinel code point before
//!   the engine sees the text, and restored afterwards. Reordering
//!   engines routinely strip format controls, and a dropped joiner
//!   changes Arabic shaping.
//! - A combining mark that trails an RTL base character is swapped ahead
//!   of it first, so reversing the run leaves the mark after its base in
//!   the output and the pair still forms one cluster.
//!
//! Reordering never adds or removes line breaks; it operates strictly
//! downstream of the line breaker.
//!
//! # References
//!
//! - Unicode Standard Annex #9: <https://www.unicode.org/reports/tr9/>

use std::collections::BTreeSet;

use log::warn;
use unicode_bidi::BidiInfo;

use crate::error::BidiError;
use crate::script::{char_in_rtl_script, is_rtl_combining_mark};
use crate::tagged_string::TaggedString;

/// Zero-width joiner, load-bearing in Arabic emoji and ligature control.
const ZWJ: char = '\u{200D}';

/// Stand-in for ZWJ while text is inside the reordering engine.
///
/// A noncharacter with the same UTF-8 width as ZWJ, so break offsets
/// survive the substitution unchanged.
const ZWJ_SENTINEL: char = '\u{FFFE}';

/// A logical-to-visual reordering engine.
///
/// Break points are code-unit (byte) offsets in ascending order, the last
/// one at or before the end of the text; each offset ends one line. The
/// styled variant additionally carries one section index per code unit
/// and must return the reordered section table parallel to each output
/// line.
pub trait BidiEngine {
    /// Reorders uniformly formatted text into visual-order lines.
    fn process_text(&self, logical: &str, break_points: &[usize]) -> Result<Vec<String>, BidiError>;

    /// Reorders text with per-code-unit formatting into visual-order
    /// lines, preserving each code unit's section assignment.
    fn process_styled_text(
        &self,
        logical: &str,
        byte_sections: &[usize],
        break_points: &[usize],
    ) -> Result<Vec<(String, Vec<usize>)>, BidiError>;
}

/// Default reordering engine backed by the `unicode-bidi` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeBidiEngine;

impl UnicodeBidiEngine {
    fn line_ranges(logical: &str, break_points: &[usize]) -> Result<Vec<std::ops::Range<usize>>, BidiError> {
        let mut ranges = Vec::with_capacity(break_points.len() + 1);
        let mut start = 0;
        for &end in break_points {
            if end > logical.len() || !logical.is_char_boundary(end) {
                return Err(BidiError::InvalidBreakOffset(end));
            }
            if end > start {
                ranges.push(start..end);
                start = end;
            }
        }
        if start < logical.len() {
            ranges.push(start..logical.len());
        }
        Ok(ranges)
    }
}

impl BidiEngine for UnicodeBidiEngine {
    fn process_text(&self, logical: &str, break_points: &[usize]) -> Result<Vec<String>, BidiError> {
        let info = BidiInfo::new(logical, None);
        let mut lines = Vec::new();
        for range in Self::line_ranges(logical, break_points)? {
            let para = info
                .paragraphs
                .iter()
                .find(|p| p.range.start <= range.start && range.end <= p.range.end)
                .ok_or(BidiError::ParagraphMismatch {
                    start: range.start,
                    end: range.end,
                })?;
            lines.push(info.reorder_line(para, range).into_owned());
        }
        Ok(lines)
    }

    fn process_styled_text(
        &self,
        logical: &str,
        byte_sections: &[usize],
        break_points: &[usize],
    ) -> Result<Vec<(String, Vec<usize>)>, BidiError> {
        if byte_sections.len() != logical.len() {
            return Err(BidiError::Engine(format!(
                "section table length {} does not match text length {}",
                byte_sections.len(),
                logical.len()
            )));
        }

        let info = BidiInfo::new(logical, None);
        let mut lines = Vec::new();
        for range in Self::line_ranges(logical, break_points)? {
            let para = info
                .paragraphs
                .iter()
                .find(|p| p.range.start <= range.start && range.end <= p.range.end)
                .ok_or(BidiError::ParagraphMismatch {
                    start: range.start,
                    end: range.end,
                })?;

            let (levels, runs) = info.visual_runs(para, range);
            let mut text = String::new();
            let mut sections = Vec::new();
            for run in runs {
                if levels[run.start].is_rtl() {
                    for (offset, ch) in logical[run.clone()].char_indices().rev() {
                        text.push(ch);
                        let section = byte_sections[run.start + offset];
                        sections.extend(std::iter::repeat(section).take(ch.len_utf8()));
                    }
                } else {
                    text.push_str(&logical[run.clone()]);
                    sections.extend_from_slice(&byte_sections[run]);
                }
            }
            lines.push((text, sections));
        }
        Ok(lines)
    }
}

/// Substitutes joiners and pre-swaps trailing RTL combining marks.
///
/// Works on (scalar, section) pairs so the per-code-unit section table
/// stays truthful through the swap.
fn prepare_for_reordering(chars: &[(char, usize)]) -> Vec<(char, usize)> {
    let mut prepared = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let (ch, section) = chars[i];
        let ch = if ch == ZWJ { ZWJ_SENTINEL } else { ch };

        if char_in_rtl_script(ch) && !is_rtl_combining_mark(ch) {
            let marks_end = chars[i + 1..]
                .iter()
                .take_while(|(m, _)| is_rtl_combining_mark(*m))
                .count()
                + i
                + 1;
            if marks_end > i + 1 {
                // Emit the marks first, innermost last, so reversing the
                // run restores base-then-marks order.
                for &(mark, mark_section) in chars[i + 1..marks_end].iter().rev() {
                    prepared.push((mark, mark_section));
                }
                prepared.push((ch, section));
                i = marks_end;
                continue;
            }
        }

        prepared.push((ch, section));
        i += 1;
    }
    prepared
}

fn restore_joiners(text: &str) -> String {
    if text.contains(ZWJ_SENTINEL) {
        text.replace(ZWJ_SENTINEL, "\u{200D}")
    } else {
        text.to_string()
    }
}

/// Splits the logical string literally at the given cluster breakpoints.
///
/// The fallback path when no reordering engine is available, and the
/// whole path for an empty breakpoint set (single line).
fn split_logical(logical: &TaggedString, breakpoints: &BTreeSet<usize>) -> Vec<TaggedString> {
    if breakpoints.is_empty() {
        return vec![logical.clone()];
    }
    let mut lines = Vec::with_capacity(breakpoints.len());
    let mut start = 0;
    for &end in breakpoints {
        lines.push(logical.substring(start, end));
        start = end;
    }
    if start < logical.length() {
        lines.push(logical.substring(start, logical.length()));
    }
    lines
}

/// Converts a logical tagged string plus breakpoints into per-line,
/// visually ordered tagged strings.
///
/// Breakpoints are grapheme-cluster indices from the line breaker; the
/// translation to code units happens here because the engine side of the
/// contract is code-unit based.
pub fn reorder_into_lines(
    logical: &TaggedString,
    breakpoints: &BTreeSet<usize>,
    engine: Option<&dyn BidiEngine>,
) -> Vec<TaggedString> {
    let Some(engine) = engine else {
        return split_logical(logical, breakpoints);
    };
    if breakpoints.is_empty() {
        return split_logical(logical, breakpoints);
    }

    let break_offsets: Vec<usize> = breakpoints
        .iter()
        .map(|&index| logical.to_code_unit_index(index))
        .collect();

    let chars: Vec<(char, usize)> = logical
        .raw_text()
        .char_indices()
        .map(|(offset, ch)| (ch, logical.byte_sections()[offset]))
        .collect();
    let prepared = prepare_for_reordering(&chars);

    let mut text = String::with_capacity(logical.raw_text().len());
    let mut byte_sections = Vec::with_capacity(logical.raw_text().len());
    for &(ch, section) in &prepared {
        text.push(ch);
        byte_sections.extend(std::iter::repeat(section).take(ch.len_utf8()));
    }

    let sections = logical.sections_handle();
    if logical.section_count() > 1 {
        match engine.process_styled_text(&text, &byte_sections, &break_offsets) {
            Ok(lines) => lines
                .into_iter()
                .map(|(line, line_sections)| {
                    TaggedString::from_visual_line(restore_joiners(&line), line_sections, sections.clone())
                })
                .collect(),
            Err(err) => {
                warn!("bidi reordering failed, falling back to logical order: {err}");
                split_logical(logical, breakpoints)
            }
        }
    } else {
        match engine.process_text(&text, &break_offsets) {
            Ok(lines) => lines
                .into_iter()
                .map(|line| {
                    let line = restore_joiners(&line);
                    let line_sections = vec![0; line.len()];
                    TaggedString::from_visual_line(line, line_sections, sections.clone())
                })
                .collect(),
            Err(err) => {
                warn!("bidi reordering failed, falling back to logical order: {err}");
                split_logical(logical, breakpoints)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::FontStack;
    use crate::tagged_string::{SectionOptions, VerticalAlign};

    fn stack() -> FontStack {
        vec!["Test Font".to_string()]
    }

    fn tagged(text: &str) -> TaggedString {
        TaggedString::from_raw(text, SectionOptions::new(1.0, VerticalAlign::default(), stack()))
    }

    fn breaks_at(indices: &[usize]) -> BTreeSet<usize> {
        indices.iter().copied().collect()
    }

    // =========================================================================
    // Logical-order fallback
    // =========================================================================

    #[test]
    fn test_no_engine_splits_in_logical_order() {
        let logical = tagged("abcd");
        let lines = reorder_into_lines(&logical, &breaks_at(&[2, 4]), None);
        let texts: Vec<&str> = lines.iter().map(|l| l.raw_text()).collect();
        assert_eq!(texts, vec!["ab", "cd"]);
    }

    #[test]
    fn test_empty_breakpoints_yield_single_line() {
        let logical = tagged("abcd");
        let lines = reorder_into_lines(&logical, &BTreeSet::new(), Some(&UnicodeBidiEngine));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].raw_text(), "abcd");
    }

    struct FailingEngine;
    impl BidiEngine for FailingEngine {
        fn process_text(&self, _: &str, _: &[usize]) -> Result<Vec<String>, BidiError> {
            Err(BidiError::Engine("broken".into()))
        }
        fn process_styled_text(
            &self,
            _: &str,
            _: &[usize],
            _: &[usize],
        ) -> Result<Vec<(String, Vec<usize>)>, BidiError> {
            Err(BidiError::Engine("broken".into()))
        }
    }

    #[test]
    fn test_engine_error_falls_back_to_logical_order() {
        let logical = tagged("שלום עולם");
        let breakpoints = breaks_at(&[5, 9]);
        let with_failing = reorder_into_lines(&logical, &breakpoints, Some(&FailingEngine));
        let without = reorder_into_lines(&logical, &breakpoints, None);
        let a: Vec<&str> = with_failing.iter().map(|l| l.raw_text()).collect();
        let b: Vec<&str> = without.iter().map(|l| l.raw_text()).collect();
        assert_eq!(a, b);
    }

    // =========================================================================
    // Default engine
    // =========================================================================

    #[test]
    fn test_pure_rtl_is_reversed() {
        let logical = tagged("אבג");
        let lines = reorder_into_lines(&logical, &breaks_at(&[3]), Some(&UnicodeBidiEngine));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].raw_text(), "גבא");
    }

    #[test]
    fn test_ltr_text_is_unchanged() {
        let logical = tagged("abc def");
        let lines = reorder_into_lines(&logical, &breaks_at(&[4, 7]), Some(&UnicodeBidiEngine));
        let texts: Vec<&str> = lines.iter().map(|l| l.raw_text()).collect();
        assert_eq!(texts, vec!["abc ", "def"]);
    }

    #[test]
    fn test_reordering_happens_per_line() {
        // Each line reorders independently; the RTL word stays intact on
        // its own line. The line-end space takes the paragraph level and
        // reverses with it.
        let logical = tagged("אב גד");
        let lines = reorder_into_lines(&logical, &breaks_at(&[3, 5]), Some(&UnicodeBidiEngine));
        let texts: Vec<&str> = lines.iter().map(|l| l.raw_text()).collect();
        assert_eq!(texts, vec![" בא", "דג"]);
    }

    #[test]
    fn test_sections_preserved_per_code_unit() {
        let mut logical = TaggedString::default();
        logical.add_text_section("א", 1.0, VerticalAlign::default(), stack());
        logical.add_text_section("ב", 2.0, VerticalAlign::default(), stack());
        logical.add_text_section("ג", 3.0, VerticalAlign::default(), stack());
        let lines = reorder_into_lines(&logical, &breaks_at(&[3]), Some(&UnicodeBidiEngine));
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.raw_text(), "גבא");
        assert_eq!(line.get_section_index(0), 2);
        assert_eq!(line.get_section_index(1), 1);
        assert_eq!(line.get_section_index(2), 0);
    }

    #[test]
    fn test_zwj_survives_reordering() {
        let logical = tagged("ab\u{200D}cd");
        let lines = reorder_into_lines(&logical, &breaks_at(&[5]), Some(&UnicodeBidiEngine));
        assert_eq!(lines[0].raw_text(), "ab\u{200D}cd");
    }

    #[test]
    fn test_trailing_mark_stays_with_rtl_base() {
        // ALEF + patah, then BET, GIMEL. After reversal the mark must
        // still trail its base so the pair remains one cluster.
        let logical = tagged("\u{05D0}\u{05B7}\u{05D1}\u{05D2}");
        let lines = reorder_into_lines(&logical, &breaks_at(&[6]), Some(&UnicodeBidiEngine));
        assert_eq!(lines[0].raw_text(), "\u{05D2}\u{05D1}\u{05D0}\u{05B7}");
        assert_eq!(lines[0].length(), 3, "mark must fuse with its base after reordering");
    }

    // =========================================================================
    // Preparation helpers
    // =========================================================================

    #[test]
    fn test_prepare_swaps_marks_before_base() {
        let chars: Vec<(char, usize)> = "\u{05D0}\u{05B7}".chars().map(|c| (c, 0)).collect();
        let prepared = prepare_for_reordering(&chars);
        let text: String = prepared.iter().map(|(c, _)| *c).collect();
        assert_eq!(text, "\u{05B7}\u{05D0}");
    }

    #[test]
    fn test_prepare_substitutes_zwj() {
        let chars = vec![('a', 0), (ZWJ, 0), ('b', 0)];
        let prepared = prepare_for_reordering(&chars);
        assert_eq!(prepared[1].0, ZWJ_SENTINEL);
        assert_eq!(restore_joiners("a\u{FFFE}b"), "a\u{200D}b");
    }
}
