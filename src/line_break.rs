//! Near-optimal line breaking for label text
//!
//! Chooses line breaks for a label with a word-level dynamic program in
//! the style of Knuth-Plass: every legal break position becomes a node,
//! each node records the cheapest way to reach it from any earlier break,
//! and the final break set is read back along the recorded links.
//!
//! The optimization target is not the caller's maximum width but the
//! average width that would result from splitting the whole label into
//! the minimum number of lines that respect it. Legal breaks may overflow
//! the maximum when nothing better exists; near the threshold a strict
//! cap produces badly lopsided results.
//!
//! Break candidates come from three sources, unioned:
//!
//! - UAX #14 break opportunities (the `unicode-linebreak` crate),
//! - characters classified as word-breaking or ideographic-breaking,
//! - inline image sections, which break like ideographs.
//!
//! Breaks are determined on the text in logical order. Visual order
//! would be more intuitive, but the visual order is itself changed by
//! the line breaks.
//!
//! # References
//!
//! - Unicode Standard Annex #14: <https://www.unicode.org/reports/tr14/>

use std::collections::BTreeSet;

use unicode_linebreak::linebreaks;

use crate::glyph::{GlyphMap, ONE_EM};
use crate::image::ImagePositions;
use crate::script::{allows_ideographic_breaking, allows_word_breaking, is_whitespace};
use crate::tagged_string::{SectionOptions, TaggedString};

/// Advance of one grapheme cluster, in layout-space units, spacing
/// included.
///
/// Image sections measure their display width rescaled into glyph space;
/// text clusters read the resolved metrics. A cluster with no resolved
/// metrics contributes nothing, matching the shaper, which will skip it.
pub fn glyph_advance(
    cluster: &str,
    section: &SectionOptions,
    glyph_map: &GlyphMap,
    image_positions: &ImagePositions,
    layout_text_size: f64,
    spacing: f64,
) -> f64 {
    if let Some(image_id) = &section.image_id {
        let Some(image) = image_positions.get(image_id) else {
            return 0.0;
        };
        image.display_size()[0] * section.scale * ONE_EM / layout_text_size + spacing
    } else {
        let metrics = glyph_map
            .get(&section.font_stack_hash)
            .and_then(|glyphs| glyphs.get(cluster))
            .and_then(|glyph| glyph.as_ref());
        match metrics {
            Some(metrics) => metrics.advance * section.scale + spacing,
            None => 0.0,
        }
    }
}

fn determine_average_line_width(
    logical_input: &TaggedString,
    spacing: f64,
    max_width: f64,
    glyph_map: &GlyphMap,
    image_positions: &ImagePositions,
    layout_text_size: f64,
) -> f64 {
    let mut total_width = 0.0;
    for i in 0..logical_input.length() {
        total_width += glyph_advance(
            logical_input.cluster(i),
            logical_input.get_section(i),
            glyph_map,
            image_positions,
            layout_text_size,
            spacing,
        );
    }

    let target_line_count = (total_width / max_width).ceil().max(1.0);
    total_width / target_line_count
}

fn calculate_badness(line_width: f64, target_width: f64, penalty: f64, is_last_break: bool) -> f64 {
    let raggedness = (line_width - target_width).powi(2);
    if is_last_break {
        // Favor a final line shorter than average over one longer.
        if line_width < target_width {
            return raggedness / 2.0;
        }
        return raggedness * 2.0;
    }
    if penalty < 0.0 {
        return raggedness - penalty * penalty;
    }
    raggedness + penalty * penalty
}

/// Directional nudge for a break between two clusters.
fn calculate_penalty(code_point: char, next_code_point: Option<char>, penalizable_ideographic_break: bool) -> f64 {
    let mut penalty = 0.0;
    // Force break on newline
    if code_point == '\n' {
        penalty -= 10000.0;
    }
    // Penalize open parenthesis at end of line
    if code_point == '(' || code_point == '\u{FF08}' {
        penalty += 50.0;
    }
    // Penalize close parenthesis at beginning of line
    if let Some(next) = next_code_point {
        if next == ')' || next == '\u{FF09}' {
            penalty += 50.0;
        }
    }
    // Breaks between ideographic characters are less preferable than the
    // zero-width spaces a server may have suggested.
    if penalizable_ideographic_break {
        penalty += 150.0;
    }
    penalty
}

/// A candidate break: grapheme index, cumulative advance, link to the
/// best prior break, and the accumulated badness of that path.
///
/// Candidates live in one growable arena indexed by discovery order;
/// `prior_break` is an arena slot, not a pointer.
#[derive(Debug, Clone, Copy)]
struct PotentialBreak {
    index: usize,
    x: f64,
    prior_break: Option<usize>,
    badness: f64,
}

fn evaluate_break(
    break_index: usize,
    break_x: f64,
    target_width: f64,
    potential_breaks: &[PotentialBreak],
    penalty: f64,
    is_last_break: bool,
) -> PotentialBreak {
    // We could skip evaluating breaks whose line length exceeds maxWidth,
    // but in fact we allow lines longer than maxWidth (if there are no
    // break points at all), and when targetWidth and maxWidth are close,
    // strictly enforcing maxWidth gives more lopsided results.
    let mut best_prior_break = None;
    let mut best_break_badness = calculate_badness(break_x, target_width, penalty, is_last_break);

    for (slot, potential_break) in potential_breaks.iter().enumerate() {
        let line_width = break_x - potential_break.x;
        let break_badness =
            calculate_badness(line_width, target_width, penalty, is_last_break) + potential_break.badness;
        if break_badness <= best_break_badness {
            best_prior_break = Some(slot);
            best_break_badness = break_badness;
        }
    }

    PotentialBreak {
        index: break_index,
        x: break_x,
        prior_break: best_prior_break,
        badness: best_break_badness,
    }
}

fn least_bad_breaks(last_line_break: &PotentialBreak, potential_breaks: &[PotentialBreak]) -> BTreeSet<usize> {
    let mut breaks = BTreeSet::from([last_line_break.index]);
    let mut prior_break = last_line_break.prior_break;
    while let Some(slot) = prior_break {
        let potential_break = &potential_breaks[slot];
        breaks.insert(potential_break.index);
        prior_break = potential_break.prior_break;
    }
    breaks
}

/// UAX #14 break opportunities as code-unit offsets, end of text
/// excluded.
fn uax14_break_offsets(text: &str) -> BTreeSet<usize> {
    linebreaks(text)
        .map(|(offset, _)| offset)
        .filter(|&offset| offset < text.len())
        .collect()
}

/// Computes the ordered set of grapheme-index breakpoints for a label.
///
/// The result always contains the end-of-text index when any break is
/// possible at all; an empty input or a non-positive `max_width` yields
/// an empty set, meaning a single line however long.
pub fn determine_line_breaks(
    logical_input: &TaggedString,
    spacing: f64,
    max_width: f64,
    glyph_map: &GlyphMap,
    image_positions: &ImagePositions,
    layout_text_size: f64,
) -> BTreeSet<usize> {
    if max_width <= 0.0 {
        return BTreeSet::new();
    }
    if logical_input.is_empty() {
        return BTreeSet::new();
    }

    let target_width = determine_average_line_width(
        logical_input,
        spacing,
        max_width,
        glyph_map,
        image_positions,
        layout_text_size,
    );

    let text = logical_input.raw_text();
    let uax14_offsets = uax14_break_offsets(text);
    let has_server_suggested_breaks = text.contains('\u{200b}');

    let mut potential_breaks: Vec<PotentialBreak> = Vec::new();
    let mut current_x = 0.0;
    let length = logical_input.length();

    for i in 0..length {
        let section = logical_input.get_section(i);
        let cluster = logical_input.cluster(i);

        if !cluster.chars().all(is_whitespace) {
            current_x += glyph_advance(
                cluster,
                section,
                glyph_map,
                image_positions,
                layout_text_size,
                spacing,
            );
        }

        // Ideographic characters, spaces, and word-breaking punctuation
        // often appear without surrounding spaces.
        if i + 1 < length {
            let first_scalar = cluster.chars().next();
            let allows_ideographic_break = first_scalar.is_some_and(allows_ideographic_breaking);
            let breakable = section.image_id.is_some()
                || allows_ideographic_break
                || first_scalar.is_some_and(allows_word_breaking)
                || uax14_offsets.contains(&logical_input.cluster_range(i).end);

            if breakable {
                let penalizable_ideographic_break =
                    allows_ideographic_break && has_server_suggested_breaks;
                let next_index = i + 1;
                let penalty = calculate_penalty(
                    first_scalar.unwrap_or('\u{0}'),
                    logical_input.cluster(next_index).chars().next(),
                    penalizable_ideographic_break,
                );
                let potential_break = evaluate_break(
                    next_index,
                    current_x,
                    target_width,
                    &potential_breaks,
                    penalty,
                    false,
                );
                potential_breaks.push(potential_break);
            }
        }
    }

    let last = evaluate_break(length, current_x, target_width, &potential_breaks, 0.0, true);
    least_bad_breaks(&last, &potential_breaks)
}
