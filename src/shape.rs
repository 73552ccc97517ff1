//! Glyph positioning, justification, and block alignment
//!
//! The final pass of the pipeline: walk each visually ordered line of a
//! label and emit positioned glyph and image records, then justify each
//! line and align the whole block against its anchor.
//!
//! # Pipeline
//!
//! ```text
//! TaggedString → line breaks → bidi reordering → shape_lines → Shaping
//! ```
//!
//! [`get_shaping`] drives the whole chain; the earlier stages live in
//! [`line_break`](crate::line_break) and [`bidi`](crate::bidi).
//!
//! Per grapheme cluster the shaper decides verticality (vertical writing
//! mode keeps CJK upright while rotating Latin and leaving whitespace and
//! Arabic horizontal), synthesizes tatweel-joined lookup keys so Arabic
//! clusters find their contextual glyph variants, resolves metrics from
//! the glyph atlas or the image atlas, and applies baseline offsets so
//! mixed scales and inline images share a baseline. A cluster with no
//! resolvable metrics is skipped; a label where nothing resolves at all
//! reports "no shape" rather than an empty box.

use std::borrow::Cow;

use crate::bidi::{reorder_into_lines, BidiEngine};
use crate::glyph::{
    AtlasRect, FontStackHash, GlyphMap, GlyphMetrics, GlyphPositions, PositionedGlyph,
    PositionedLine, Shaping, WritingMode, GLYPH_BORDER, ONE_EM,
};
use crate::image::{ImagePosition, ImagePositions};
use crate::line_break::determine_line_breaks;
use crate::script::{
    char_has_upright_vertical_orientation, char_in_arabic_script, char_in_complex_shaping_script,
    is_whitespace,
};
use crate::style::{justify_for_anchor, Anchor, AnchorAlignment, TextJustify};
use crate::tagged_string::TaggedString;

/// Arabic tatweel, used to synthesize joining context for glyph lookup.
const TATWEEL: char = '\u{0640}';

/// Shapes a formatted label into positioned glyph runs.
///
/// The caller passes fully resolved glyph metrics, atlas positions, and
/// image positions; nothing here fetches or blocks. Returns `None` when
/// no glyph could be placed on any line — the "nothing to render"
/// signal, distinct from a degenerate but placeable box.
#[allow(clippy::too_many_arguments)]
pub fn get_shaping(
    formatted_string: &TaggedString,
    max_width: f64,
    line_height: f64,
    text_anchor: Anchor,
    text_justify: TextJustify,
    spacing: f64,
    translate: [f64; 2],
    writing_mode: WritingMode,
    bidi: Option<&dyn BidiEngine>,
    glyph_map: &GlyphMap,
    glyph_positions: &GlyphPositions,
    image_positions: &ImagePositions,
    layout_text_size: f64,
    allow_vertical_placement: bool,
) -> Option<Shaping> {
    let breakpoints = determine_line_breaks(
        formatted_string,
        spacing,
        max_width,
        glyph_map,
        image_positions,
        layout_text_size,
    );
    let lines = reorder_into_lines(formatted_string, &breakpoints, bidi);

    let mut shaping = Shaping::new(translate[0], translate[1], writing_mode);
    shape_lines(
        &mut shaping,
        lines,
        spacing,
        line_height,
        text_anchor,
        text_justify,
        writing_mode,
        glyph_map,
        glyph_positions,
        image_positions,
        layout_text_size,
        allow_vertical_placement,
    );

    shaping.has_glyphs().then_some(shaping)
}

fn cluster_is_whitespace(cluster: &str) -> bool {
    cluster.chars().all(is_whitespace)
}

fn cluster_first(cluster: &str) -> Option<char> {
    cluster.chars().next()
}

/// Lookup key carrying Arabic joining context.
///
/// When the neighboring cluster joins, the bare glyph would render in
/// its isolated form; appending or prepending a tatweel makes the
/// metrics table resolve the joined variant instead. The key is used
/// only for lookup — the emitted glyph identity stays the bare cluster.
fn arabic_context_key(line: &TaggedString, index: usize, cluster: &str) -> Option<String> {
    let current = cluster_first(cluster)?;
    if !char_in_arabic_script(current) {
        return None;
    }
    let prev_joins = index > 0
        && cluster_first(line.cluster(index - 1)).is_some_and(char_in_arabic_script);
    let next_joins = index + 1 < line.length()
        && cluster_first(line.cluster(index + 1)).is_some_and(char_in_arabic_script);
    if !prev_joins && !next_joins {
        return None;
    }

    let mut key = String::with_capacity(cluster.len() + 2 * TATWEEL.len_utf8());
    if prev_joins {
        key.push(TATWEEL);
    }
    key.push_str(cluster);
    if next_joins {
        key.push(TATWEEL);
    }
    Some(key)
}

/// Resolves a cluster's rect and metrics, preferring the atlas.
fn resolve_glyph(
    font: FontStackHash,
    key: &str,
    glyph_map: &GlyphMap,
    glyph_positions: &GlyphPositions,
) -> Option<(Option<AtlasRect>, GlyphMetrics)> {
    if let Some(position) = glyph_positions.get(&font).and_then(|map| map.get(key)) {
        return Some((Some(position.rect), position.metrics));
    }
    glyph_map
        .get(&font)
        .and_then(|glyphs| glyphs.get(key))
        .and_then(|glyph| glyph.as_ref())
        .map(|metrics| (None, *metrics))
}

#[allow(clippy::too_many_arguments)]
fn shape_lines(
    shaping: &mut Shaping,
    mut lines: Vec<TaggedString>,
    spacing: f64,
    line_height: f64,
    text_anchor: Anchor,
    text_justify: TextJustify,
    writing_mode: WritingMode,
    glyph_map: &GlyphMap,
    glyph_positions: &GlyphPositions,
    image_positions: &ImagePositions,
    layout_text_size: f64,
    allow_vertical_placement: bool,
) {
    let mut x = 0.0;
    let mut y = Shaping::Y_OFFSET;

    let mut max_line_length: f64 = 0.0;
    let mut max_line_height: f64 = 0.0;

    let justify = match text_justify {
        TextJustify::Auto => justify_for_anchor(text_anchor).factor(),
        other => other.factor(),
    };
    let line_count = lines.len();

    for line in &mut lines {
        // Collapse whitespace so it doesn't throw off justification.
        line.trim();

        let line_max_scale = line.max_scale();
        let max_line_offset = (line_max_scale - 1.0) * ONE_EM;
        let mut line_offset: f64 = 0.0;
        let mut positioned_glyphs: Vec<PositionedGlyph> = Vec::new();

        if line.is_empty() {
            // Still need a line feed after an empty line.
            shaping.positioned_lines.push(PositionedLine::default());
            y += line_height;
            continue;
        }

        for i in 0..line.length() {
            let section_index = line.get_section_index(i);
            let section = line.section_at(section_index);
            let cluster = line.cluster(i);
            let mut section_scale = section.scale;

            let vertical = !(writing_mode == WritingMode::Horizontal
                // Don't verticalize glyphs with no upright orientation
                // when vertical placement is disabled.
                || (!allow_vertical_placement
                    && !cluster_first(cluster).is_some_and(char_has_upright_vertical_orientation))
                // With vertical placement enabled, whitespace and
                // complex-shaping clusters still stay horizontal.
                || (allow_vertical_placement
                    && (cluster_is_whitespace(cluster)
                        || cluster_first(cluster).is_some_and(char_in_complex_shaping_script))));

            let baseline_offset;
            let rect;
            let metrics;
            let advance;
            let vertical_advance;

            if let Some(image_id) = &section.image_id {
                let Some(image) = image_positions.get(image_id) else {
                    continue;
                };
                shaping.icons_in_text = true;

                let display_size = image.display_size();
                metrics = GlyphMetrics {
                    width: display_size[0],
                    height: display_size[1],
                    left: ImagePosition::PADDING,
                    top: -GLYPH_BORDER,
                    advance: if vertical { display_size[1] } else { display_size[0] },
                };
                rect = Some(image.padded_rect);

                // The image scale alias is relative to one em rather
                // than the layout text size.
                section_scale = section.scale * ONE_EM / layout_text_size;

                // Aligns the bottom of the image to the baseline.
                let image_offset = ONE_EM - display_size[1] * section_scale;
                baseline_offset = max_line_offset + image_offset;

                vertical_advance = metrics.advance;
                advance = metrics.advance;

                // Push the line down when the image overflows one em at
                // the line's max scale.
                let offset = (if vertical { display_size[0] } else { display_size[1] }) * section_scale
                    - ONE_EM * line_max_scale;
                if offset > 0.0 && offset > line_offset {
                    line_offset = offset;
                }
            } else {
                let lookup_key = arabic_context_key(line, i, cluster)
                    .map(Cow::Owned)
                    .unwrap_or(Cow::Borrowed(cluster));
                let resolved = resolve_glyph(section.font_stack_hash, &lookup_key, glyph_map, glyph_positions)
                    .or_else(|| {
                        if lookup_key.as_ref() != cluster {
                            resolve_glyph(section.font_stack_hash, cluster, glyph_map, glyph_positions)
                        } else {
                            None
                        }
                    });
                let Some((glyph_rect, glyph_metrics)) = resolved else {
                    continue;
                };
                rect = glyph_rect;
                metrics = glyph_metrics;
                advance = metrics.advance;
                vertical_advance = ONE_EM;

                // We don't know the baseline, but since we're laying out
                // at 24 points, we can calculate how much it will move
                // when we scale up or down.
                baseline_offset =
                    section.vertical_align.factor() * (line_max_scale - section_scale) * ONE_EM;
            }

            positioned_glyphs.push(PositionedGlyph {
                glyph: cluster.to_string(),
                x,
                y: y + baseline_offset,
                vertical,
                font: section.font_stack_hash,
                scale: section_scale,
                rect,
                metrics,
                image_id: section.image_id.clone(),
                section_index,
            });

            if vertical {
                x += vertical_advance * section_scale + spacing;
                shaping.verticalizable = true;
            } else {
                x += advance * section_scale + spacing;
            }
        }

        // Only justify when at least one glyph was placed.
        if !positioned_glyphs.is_empty() {
            let line_length = x - spacing; // don't count trailing spacing
            max_line_length = line_length.max(max_line_length);
            justify_line(&mut positioned_glyphs, justify, line_offset);
        }

        let current_line_height = line_height * line_max_scale + line_offset;
        x = 0.0;
        y += current_line_height;
        max_line_height = current_line_height.max(max_line_height);

        shaping.positioned_lines.push(PositionedLine {
            positioned_glyphs,
            line_offset: line_offset.max(max_line_offset),
        });
    }

    let anchor_align = AnchorAlignment::for_anchor(text_anchor);
    let height = y - Shaping::Y_OFFSET;
    align(
        shaping,
        justify,
        anchor_align.horizontal_align,
        anchor_align.vertical_align,
        max_line_length,
        max_line_height,
        line_height,
        height,
        line_count,
    );

    // Anchor-relative bounding box.
    shaping.top += -anchor_align.vertical_align * height;
    shaping.bottom = shaping.top + height;
    shaping.left += -anchor_align.horizontal_align * max_line_length;
    shaping.right = shaping.left + max_line_length;
}

/// Shifts a line so its content sits at the requested justification, and
/// applies the extra vertical room an oversized image demanded.
///
/// The shift is computed from the line's current span, so justifying an
/// already justified line with the same factor is a no-op.
fn justify_line(positioned_glyphs: &mut [PositionedGlyph], justify: f64, line_offset: f64) {
    if justify == 0.0 && line_offset == 0.0 {
        return;
    }
    let Some(last_glyph) = positioned_glyphs.last() else {
        return;
    };
    let first_x = positioned_glyphs.first().map(|glyph| glyph.x).unwrap_or(0.0);
    let last_advance = last_glyph.metrics.advance * last_glyph.scale;
    let line_indent = first_x + (last_glyph.x + last_advance - first_x) * justify;

    for positioned_glyph in positioned_glyphs {
        positioned_glyph.x -= line_indent;
        positioned_glyph.y += line_offset;
    }
}

#[allow(clippy::too_many_arguments)]
fn align(
    shaping: &mut Shaping,
    justify: f64,
    horizontal_align: f64,
    vertical_align: f64,
    max_line_length: f64,
    max_line_height: f64,
    line_height: f64,
    block_height: f64,
    line_count: usize,
) {
    let shift_x = (justify - horizontal_align) * max_line_length;
    let shift_y = if max_line_height != line_height {
        // Some line is taller than the nominal line height (an inline
        // image): center against the true block height.
        -block_height * vertical_align - Shaping::Y_OFFSET
    } else {
        (-vertical_align * line_count as f64 + 0.5) * line_height
    };

    for line in &mut shaping.positioned_lines {
        for positioned_glyph in &mut line.positioned_glyphs {
            positioned_glyph.x += shift_x;
            positioned_glyph.y += shift_y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::{font_stack_hash, FontStack, GlyphPosition, Glyphs};
    use crate::tagged_string::{SectionOptions, VerticalAlign};

    const LAYOUT_TEXT_SIZE: f64 = 16.0;

    fn stack() -> FontStack {
        vec!["Test Font".to_string()]
    }

    fn cjk_metrics() -> GlyphMetrics {
        GlyphMetrics {
            width: 18.0,
            height: 18.0,
            left: 2.0,
            top: -8.0,
            advance: 21.0,
        }
    }

    fn glyph_tables(clusters: &[&str], metrics: GlyphMetrics) -> (GlyphMap, GlyphPositions) {
        let hash = font_stack_hash(&stack());
        let mut glyphs = Glyphs::default();
        let mut positions = crate::glyph::GlyphPositionMap::default();
        for cluster in clusters {
            glyphs.insert(cluster.to_string(), Some(metrics));
            positions.insert(
                cluster.to_string(),
                GlyphPosition {
                    rect: AtlasRect { x: 0, y: 0, w: 24, h: 24 },
                    metrics,
                },
            );
        }
        let mut glyph_map = GlyphMap::default();
        glyph_map.insert(hash, glyphs);
        let mut glyph_positions = GlyphPositions::default();
        glyph_positions.insert(hash, positions);
        (glyph_map, glyph_positions)
    }

    fn shape(
        text: &str,
        clusters: &[&str],
        max_width_in_ems: f64,
        writing_mode: WritingMode,
        allow_vertical_placement: bool,
    ) -> Option<Shaping> {
        let tagged = TaggedString::from_raw(
            text,
            SectionOptions::new(1.0, VerticalAlign::default(), stack()),
        );
        let (glyph_map, glyph_positions) = glyph_tables(clusters, cjk_metrics());
        get_shaping(
            &tagged,
            max_width_in_ems * ONE_EM,
            ONE_EM,
            Anchor::Center,
            TextJustify::Center,
            0.0,
            [0.0, 0.0],
            writing_mode,
            Some(&crate::bidi::UnicodeBidiEngine),
            &glyph_map,
            &glyph_positions,
            &ImagePositions::default(),
            LAYOUT_TEXT_SIZE,
            allow_vertical_placement,
        )
    }

    // =========================================================================
    // Suggested-break shaping (three canonical cases)
    // =========================================================================

    #[test]
    fn test_zwsp_three_lines() {
        let shaping = shape(
            "中中\u{200b}中中\u{200b}中中\u{200b}中中中中中中\u{200b}中中",
            &["中"],
            5.0,
            WritingMode::Horizontal,
            false,
        )
        .expect("shaping");
        assert_eq!(shaping.positioned_lines.len(), 3);
        assert_eq!(shaping.top, -36.0);
        assert_eq!(shaping.bottom, 36.0);
        assert_eq!(shaping.left, -63.0);
        assert_eq!(shaping.right, 63.0);
        assert_eq!(shaping.writing_mode, WritingMode::Horizontal);
    }

    #[test]
    fn test_zwsp_two_lines() {
        let shaping = shape("中中\u{200b}中", &["中"], 1.0, WritingMode::Horizontal, false)
            .expect("shaping");
        assert_eq!(shaping.positioned_lines.len(), 2);
        assert_eq!(shaping.top, -24.0);
        assert_eq!(shaping.bottom, 24.0);
        assert_eq!(shaping.left, -21.0);
        assert_eq!(shaping.right, 21.0);
    }

    #[test]
    fn test_zwsp_single_line() {
        let shaping = shape("中中\u{200b}", &["中"], 2.0, WritingMode::Horizontal, false)
            .expect("shaping");
        assert_eq!(shaping.positioned_lines.len(), 1);
        assert_eq!(shaping.top, -12.0);
        assert_eq!(shaping.bottom, 12.0);
        assert_eq!(shaping.left, -21.0);
        assert_eq!(shaping.right, 21.0);
    }

    #[test]
    fn test_zwsp_only_text_shapes_nothing() {
        // Every cluster is a suggested break with no glyph: lines feed
        // but nothing renders.
        let shaping = shape(
            "\u{200b}\u{200b}\u{200b}\u{200b}\u{200b}",
            &["中"],
            1.0,
            WritingMode::Horizontal,
            false,
        );
        assert!(shaping.is_none());
    }

    #[test]
    fn test_empty_lines_still_feed() {
        // Same input, probed below the public API: five empty lines'
        // worth of height, no glyphs.
        let tagged = TaggedString::from_raw(
            "\u{200b}\u{200b}\u{200b}\u{200b}\u{200b}",
            SectionOptions::new(1.0, VerticalAlign::default(), stack()),
        );
        let (glyph_map, glyph_positions) = glyph_tables(&["中"], cjk_metrics());
        let breakpoints = determine_line_breaks(
            &tagged,
            0.0,
            ONE_EM,
            &glyph_map,
            &ImagePositions::default(),
            LAYOUT_TEXT_SIZE,
        );
        let lines = reorder_into_lines(&tagged, &breakpoints, None);
        let mut shaping = Shaping::new(0.0, 0.0, WritingMode::Horizontal);
        shape_lines(
            &mut shaping,
            lines,
            0.0,
            ONE_EM,
            Anchor::Center,
            TextJustify::Center,
            WritingMode::Horizontal,
            &glyph_map,
            &glyph_positions,
            &ImagePositions::default(),
            LAYOUT_TEXT_SIZE,
            false,
        );
        assert_eq!(shaping.positioned_lines.len(), 5);
        assert!(!shaping.has_glyphs());
        assert_eq!(shaping.top, -60.0);
        assert_eq!(shaping.bottom, 60.0);
        assert_eq!(shaping.left, 0.0);
        assert_eq!(shaping.right, 0.0);
    }

    // =========================================================================
    // Verticality
    // =========================================================================

    #[test]
    fn test_horizontal_mode_never_verticalizes() {
        let shaping = shape("中中", &["中"], 5.0, WritingMode::Horizontal, true).expect("shaping");
        assert!(!shaping.verticalizable);
        assert!(shaping.positioned_lines[0]
            .positioned_glyphs
            .iter()
            .all(|g| !g.vertical));
    }

    #[test]
    fn test_vertical_mode_uprights_cjk() {
        let shaping = shape("中中", &["中"], 5.0, WritingMode::Vertical, true).expect("shaping");
        assert!(shaping.verticalizable);
        assert!(shaping.positioned_lines[0]
            .positioned_glyphs
            .iter()
            .all(|g| g.vertical));
    }

    #[test]
    fn test_vertical_mode_keeps_whitespace_horizontal() {
        let shaping = shape("中 中", &["中", " "], 5.0, WritingMode::Vertical, true).expect("shaping");
        let glyphs = &shaping.positioned_lines[0].positioned_glyphs;
        assert!(glyphs[0].vertical);
        assert!(!glyphs[1].vertical, "whitespace must stay horizontal in vertical lines");
        assert!(glyphs[2].vertical);
    }

    #[test]
    fn test_vertical_mode_keeps_arabic_horizontal() {
        let shaping =
            shape("ام", &["ا", "م"], 5.0, WritingMode::Vertical, true).expect("shaping");
        assert!(shaping.positioned_lines[0]
            .positioned_glyphs
            .iter()
            .all(|g| !g.vertical));
    }

    #[test]
    fn test_latin_rotates_when_vertical_placement_enabled() {
        // With vertical placement on, rotated scripts verticalize (they
        // rotate with the line); the flag reflects placement.
        let shaping = shape("ab", &["a", "b"], 5.0, WritingMode::Vertical, true).expect("shaping");
        assert!(shaping.positioned_lines[0]
            .positioned_glyphs
            .iter()
            .all(|g| g.vertical));
    }

    #[test]
    fn test_vertical_placement_disabled_keeps_latin_horizontal() {
        let shaping = shape("ab", &["a", "b"], 5.0, WritingMode::Vertical, false).expect("shaping");
        assert!(shaping.positioned_lines[0]
            .positioned_glyphs
            .iter()
            .all(|g| !g.vertical));
    }

    // =========================================================================
    // Arabic joining context
    // =========================================================================

    #[test]
    fn test_arabic_contextual_lookup_key() {
        let tagged = TaggedString::from_raw(
            "ام",
            SectionOptions::new(1.0, VerticalAlign::default(), stack()),
        );
        assert_eq!(
            arabic_context_key(&tagged, 0, tagged.cluster(0)),
            Some("ا\u{0640}".to_string())
        );
        assert_eq!(
            arabic_context_key(&tagged, 1, tagged.cluster(1)),
            Some("\u{0640}م".to_string())
        );
    }

    #[test]
    fn test_arabic_contextual_metrics_used_but_identity_kept() {
        let hash = font_stack_hash(&stack());
        let contextual = GlyphMetrics {
            advance: 9.0,
            ..cjk_metrics()
        };
        let (mut glyph_map, glyph_positions) = glyph_tables(&[], cjk_metrics());
        glyph_map
            .entry(hash)
            .or_default()
            .insert("ا\u{0640}".to_string(), Some(contextual));
        glyph_map
            .entry(hash)
            .or_default()
            .insert("\u{0640}م".to_string(), Some(contextual));

        let tagged = TaggedString::from_raw(
            "ام",
            SectionOptions::new(1.0, VerticalAlign::default(), stack()),
        );
        let shaping = get_shaping(
            &tagged,
            10.0 * ONE_EM,
            ONE_EM,
            Anchor::Center,
            TextJustify::Left,
            0.0,
            [0.0, 0.0],
            WritingMode::Horizontal,
            None,
            &glyph_map,
            &glyph_positions,
            &ImagePositions::default(),
            LAYOUT_TEXT_SIZE,
            false,
        )
        .expect("shaping");
        let glyphs = &shaping.positioned_lines[0].positioned_glyphs;
        assert_eq!(glyphs.len(), 2);
        assert_eq!(glyphs[0].glyph, "ا", "emitted identity must be the bare cluster");
        assert_eq!(glyphs[0].metrics.advance, 9.0, "metrics must come from the joined variant");
    }

    #[test]
    fn test_isolated_arabic_has_no_context_key() {
        let tagged = TaggedString::from_raw(
            "ا",
            SectionOptions::new(1.0, VerticalAlign::default(), stack()),
        );
        assert_eq!(arabic_context_key(&tagged, 0, tagged.cluster(0)), None);
    }

    // =========================================================================
    // Baselines, justification, alignment
    // =========================================================================

    #[test]
    fn test_mixed_scales_share_a_baseline() {
        let mut tagged = TaggedString::default();
        tagged.add_text_section("a", 1.0, VerticalAlign::default(), stack());
        tagged.add_text_section("b", 2.0, VerticalAlign::default(), stack());
        let (glyph_map, glyph_positions) = glyph_tables(&["a", "b"], cjk_metrics());
        let shaping = get_shaping(
            &tagged,
            100.0 * ONE_EM,
            ONE_EM,
            Anchor::Center,
            TextJustify::Left,
            0.0,
            [0.0, 0.0],
            WritingMode::Horizontal,
            None,
            &glyph_map,
            &glyph_positions,
            &ImagePositions::default(),
            LAYOUT_TEXT_SIZE,
            false,
        )
        .expect("shaping");
        let glyphs = &shaping.positioned_lines[0].positioned_glyphs;
        // The small glyph is pushed down by the scale difference.
        assert_eq!(glyphs[0].y - glyphs[1].y, (2.0 - 1.0) * ONE_EM);
    }

    #[test]
    fn test_justify_line_is_idempotent() {
        let make = |x: f64| PositionedGlyph {
            glyph: "a".to_string(),
            x,
            y: 0.0,
            vertical: false,
            font: 0,
            scale: 1.0,
            rect: None,
            metrics: GlyphMetrics {
                advance: 10.0,
                ..GlyphMetrics::default()
            },
            image_id: None,
            section_index: 0,
        };
        let mut glyphs = vec![make(0.0), make(10.0), make(20.0)];
        justify_line(&mut glyphs, 0.5, 0.0);
        let once: Vec<f64> = glyphs.iter().map(|g| g.x).collect();
        justify_line(&mut glyphs, 0.5, 0.0);
        let twice: Vec<f64> = glyphs.iter().map(|g| g.x).collect();
        assert_eq!(once, twice);
        assert_eq!(once, vec![-15.0, -5.0, 5.0]);
    }

    #[test]
    fn test_anchor_moves_bounding_box() {
        let top_left = {
            let tagged = TaggedString::from_raw(
                "中中",
                SectionOptions::new(1.0, VerticalAlign::default(), stack()),
            );
            let (glyph_map, glyph_positions) = glyph_tables(&["中"], cjk_metrics());
            get_shaping(
                &tagged,
                5.0 * ONE_EM,
                ONE_EM,
                Anchor::TopLeft,
                TextJustify::Left,
                0.0,
                [0.0, 0.0],
                WritingMode::Horizontal,
                None,
                &glyph_map,
                &glyph_positions,
                &ImagePositions::default(),
                LAYOUT_TEXT_SIZE,
                false,
            )
            .expect("shaping")
        };
        assert_eq!(top_left.left, 0.0);
        assert_eq!(top_left.right, 42.0);
        assert_eq!(top_left.top, 0.0);
        assert_eq!(top_left.bottom, 24.0);
    }

    // =========================================================================
    // Inline images
    // =========================================================================

    fn test_image(width_px: u16, height_px: u16) -> ImagePosition {
        ImagePosition {
            padded_rect: AtlasRect {
                x: 0,
                y: 0,
                w: width_px + 2,
                h: height_px + 2,
            },
            pixel_ratio: 1.0,
            content: None,
            text_fit_width: None,
            text_fit_height: None,
        }
    }

    #[test]
    fn test_inline_image_is_positioned_and_flagged() {
        let mut tagged = TaggedString::default();
        tagged.add_text_section("中", 1.0, VerticalAlign::default(), stack());
        tagged.add_image_section("shield", 1.0, VerticalAlign::default());
        let (glyph_map, glyph_positions) = glyph_tables(&["中"], cjk_metrics());
        let mut images = ImagePositions::default();
        images.insert("shield".to_string(), test_image(12, 10));

        let shaping = get_shaping(
            &tagged,
            10.0 * ONE_EM,
            ONE_EM,
            Anchor::Center,
            TextJustify::Left,
            0.0,
            [0.0, 0.0],
            WritingMode::Horizontal,
            None,
            &glyph_map,
            &glyph_positions,
            &images,
            LAYOUT_TEXT_SIZE,
            false,
        )
        .expect("shaping");
        assert!(shaping.icons_in_text);
        let glyphs = &shaping.positioned_lines[0].positioned_glyphs;
        assert_eq!(glyphs.len(), 2);
        let image_glyph = &glyphs[1];
        assert_eq!(image_glyph.image_id.as_deref(), Some("shield"));
        // Image scale is re-expressed relative to the layout text size.
        assert_eq!(image_glyph.scale, ONE_EM / LAYOUT_TEXT_SIZE);
        assert_eq!(image_glyph.metrics.advance, 12.0);
    }

    #[test]
    fn test_missing_image_is_skipped() {
        let mut tagged = TaggedString::default();
        tagged.add_text_section("中", 1.0, VerticalAlign::default(), stack());
        tagged.add_image_section("unknown", 1.0, VerticalAlign::default());
        let (glyph_map, glyph_positions) = glyph_tables(&["中"], cjk_metrics());

        let shaping = get_shaping(
            &tagged,
            10.0 * ONE_EM,
            ONE_EM,
            Anchor::Center,
            TextJustify::Left,
            0.0,
            [0.0, 0.0],
            WritingMode::Horizontal,
            None,
            &glyph_map,
            &glyph_positions,
            &ImagePositions::default(),
            LAYOUT_TEXT_SIZE,
            false,
        )
        .expect("shaping");
        assert!(!shaping.icons_in_text);
        assert_eq!(shaping.positioned_lines[0].positioned_glyphs.len(), 1);
    }

    #[test]
    fn test_oversized_image_grows_line() {
        let mut tagged = TaggedString::default();
        tagged.add_text_section("中", 1.0, VerticalAlign::default(), stack());
        tagged.add_image_section("tall", 1.0, VerticalAlign::default());
        let (glyph_map, glyph_positions) = glyph_tables(&["中"], cjk_metrics());
        let mut images = ImagePositions::default();
        // 20px tall at scale 24/16 = 30 units, over one em by 6.
        images.insert("tall".to_string(), test_image(10, 20));

        let shaping = get_shaping(
            &tagged,
            10.0 * ONE_EM,
            ONE_EM,
            Anchor::Center,
            TextJustify::Left,
            0.0,
            [0.0, 0.0],
            WritingMode::Horizontal,
            None,
            &glyph_map,
            &glyph_positions,
            &images,
            LAYOUT_TEXT_SIZE,
            false,
        )
        .expect("shaping");
        let line = &shaping.positioned_lines[0];
        assert!(line.line_offset > 0.0, "oversized image must reserve extra line room");
        assert_eq!(line.line_offset, 20.0 * (ONE_EM / LAYOUT_TEXT_SIZE) - ONE_EM);
    }

    // =========================================================================
    // Degenerate inputs
    // =========================================================================

    #[test]
    fn test_unresolvable_label_reports_no_shape() {
        let shaping = shape("abc", &[], 5.0, WritingMode::Horizontal, false);
        assert!(shaping.is_none());
    }

    #[test]
    fn test_empty_label_reports_no_shape() {
        let shaping = shape("", &["中"], 5.0, WritingMode::Horizontal, false);
        assert!(shaping.is_none());
    }
}
