//! Shapes a sample label against synthetic glyph metrics and prints the
//! positioned output.
//!
//! Run with: `cargo run --example shape_label`

use labelshaper::{
    font_stack_hash, get_shaping, Anchor, FontStack, GlyphMap, GlyphMetrics, GlyphPositions,
    ImagePositions, SectionOptions, TaggedString, TextJustify, UnicodeBidiEngine, VerticalAlign,
    WritingMode, ONE_EM,
};

fn main() {
    let font_stack: FontStack = vec!["Noto Sans Regular".to_string()];
    let label = "Hauptbahnhof Nord\nCentral Station";

    // Stand-in metrics: a real renderer resolves these from its glyph
    // cache before shaping.
    let metrics = GlyphMetrics {
        width: 10.0,
        height: 14.0,
        left: 1.0,
        top: -3.0,
        advance: 12.0,
    };
    let mut glyphs = labelshaper::Glyphs::default();
    for ch in label.chars() {
        glyphs.insert(ch.to_string(), Some(metrics));
    }
    let mut glyph_map = GlyphMap::default();
    glyph_map.insert(font_stack_hash(&font_stack), glyphs);

    let tagged = TaggedString::from_raw(
        label,
        SectionOptions::new(1.0, VerticalAlign::default(), font_stack),
    );

    let shaping = get_shaping(
        &tagged,
        9.0 * ONE_EM,
        ONE_EM * 1.2,
        Anchor::Center,
        TextJustify::Center,
        0.0,
        [0.0, 0.0],
        WritingMode::Horizontal,
        Some(&UnicodeBidiEngine),
        &glyph_map,
        &GlyphPositions::default(),
        &ImagePositions::default(),
        16.0,
        false,
    );

    let Some(shaping) = shaping else {
        println!("nothing to render");
        return;
    };

    println!(
        "label box: left {:.1} right {:.1} top {:.1} bottom {:.1}",
        shaping.left, shaping.right, shaping.top, shaping.bottom
    );
    for (number, line) in shaping.positioned_lines.iter().enumerate() {
        println!("line {number} ({} glyphs):", line.positioned_glyphs.len());
        for glyph in &line.positioned_glyphs {
            println!(
                "  {:>3} at ({:7.2}, {:7.2}) scale {:.2}",
                glyph.glyph, glyph.x, glyph.y, glyph.scale
            );
        }
    }
}
