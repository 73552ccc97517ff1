//! Script classification for label layout
//!
//! Pure, stateless predicates over a single Unicode scalar value. Every
//! property a label layout decision depends on — breakability, shaping
//! complexity, writing direction, vertical orientation — is answered here
//! from static sorted range tables compiled into the binary, so the rest of
//! the pipeline never consults a runtime locale service.
//!
//! A code point outside every implemented table classifies to the neutral
//! answer (`false` / [`VerticalOrientation::Neutral`]); there is no error
//! path.
//!
//! # Tables
//!
//! Range tables follow the Unicode 15.0 character database. The
//! right-to-left and complex-shaping predicates are scoped to the script
//! families the renderer actually shapes (Arabic family, Hebrew, Thaana,
//! and the other historically RTL blocks); anything else is "not RTL /
//! not complex" by design of the classification, not by omission.
//!
//! # References
//!
//! - Unicode Standard Annex #24: <https://www.unicode.org/reports/tr24/>
//! - Unicode Vertical Text Layout (UAX #50): <https://www.unicode.org/reports/tr50/>

/// Vertical orientation class of a code point
///
/// Decides how a glyph behaves when a label is laid out in vertical
/// writing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalOrientation {
    /// Remains upright in vertical text (CJK ideographs, kana, Hangul)
    Upright,
    /// Rotates 90° clockwise in vertical text (Latin, Cyrillic, ...)
    Rotated,
    /// Follows its neighbors (shared punctuation and symbols)
    Neutral,
}

#[inline]
fn in_ranges(cp: u32, ranges: &[(u32, u32)]) -> bool {
    ranges
        .binary_search_by(|&(lo, hi)| {
            if cp < lo {
                std::cmp::Ordering::Greater
            } else if cp > hi {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

/// Whitespace code points recognized by the layout engine.
///
/// Deliberately narrower than `char::is_whitespace`: only the characters
/// the line breaker and trimmer treat as collapsible separators.
pub fn is_whitespace(c: char) -> bool {
    matches!(c, '\u{09}' | '\u{0a}' | '\u{0b}' | '\u{0c}' | '\u{0d}' | '\u{20}')
}

// Arabic-family blocks. Shared by the RTL and complex-shaping predicates so
// the two classifications cannot drift apart between Unicode updates.
const ARABIC_RANGES: &[(u32, u32)] = &[
    (0x0600, 0x06FF), // Arabic
    (0x0750, 0x077F), // Arabic Supplement
    (0x08A0, 0x08FF), // Arabic Extended-A
    (0xFB50, 0xFDFF), // Arabic Presentation Forms-A
    (0xFE70, 0xFEFF), // Arabic Presentation Forms-B
];

/// Does this code point belong to a right-to-left script?
///
/// Covers Hebrew, the Arabic family, Syriac, Thaana, NKo, Samaritan, and
/// Mandaic, plus the Hebrew and Arabic presentation-form blocks.
pub fn char_in_rtl_script(c: char) -> bool {
    const RTL_RANGES: &[(u32, u32)] = &[
        (0x0590, 0x05FF), // Hebrew
        (0x0600, 0x06FF), // Arabic
        (0x0700, 0x074F), // Syriac
        (0x0750, 0x077F), // Arabic Supplement
        (0x0780, 0x07BF), // Thaana
        (0x07C0, 0x07FF), // NKo
        (0x0800, 0x083F), // Samaritan
        (0x0840, 0x085F), // Mandaic
        (0x08A0, 0x08FF), // Arabic Extended-A
        (0xFB1D, 0xFB4F), // Hebrew presentation forms
        (0xFB50, 0xFDFF), // Arabic Presentation Forms-A
        (0xFE70, 0xFEFF), // Arabic Presentation Forms-B
    ];
    in_ranges(c as u32, RTL_RANGES)
}

/// Does this code point require complex (contextual) shaping?
///
/// True for the Arabic family, whose glyphs take initial/medial/final
/// forms depending on their neighbors.
pub fn char_in_complex_shaping_script(c: char) -> bool {
    in_ranges(c as u32, ARABIC_RANGES)
}

/// Is this code point in an Arabic-script block?
///
/// Same table as [`char_in_complex_shaping_script`]; exists so call sites
/// that care about joining context read as what they are.
#[inline]
pub fn char_in_arabic_script(c: char) -> bool {
    in_ranges(c as u32, ARABIC_RANGES)
}

/// Can a line break after this code point without surrounding spaces?
///
/// True for ideographic scripts (CJK, kana, Yi) where any character
/// boundary is a legal break.
pub fn allows_ideographic_breaking(c: char) -> bool {
    const IDEOGRAPHIC_RANGES: &[(u32, u32)] = &[
        (0x2E80, 0x2EFF), // CJK Radicals Supplement
        (0x2F00, 0x2FDF), // Kangxi Radicals
        (0x2FF0, 0x2FFF), // Ideographic Description Characters
        (0x3000, 0x303F), // CJK Symbols and Punctuation
        (0x3040, 0x309F), // Hiragana
        (0x30A0, 0x30FF), // Katakana
        (0x31C0, 0x31EF), // CJK Strokes
        (0x31F0, 0x31FF), // Katakana Phonetic Extensions
        (0x3200, 0x32FF), // Enclosed CJK Letters and Months
        (0x3300, 0x33FF), // CJK Compatibility
        (0x3400, 0x4DBF), // CJK Unified Ideographs Extension A
        (0x4E00, 0x9FFF), // CJK Unified Ideographs
        (0xA000, 0xA48F), // Yi Syllables
        (0xA490, 0xA4CF), // Yi Radicals
        (0xFE10, 0xFE1F), // Vertical Forms
        (0xFE30, 0xFE4F), // CJK Compatibility Forms
        (0xFF00, 0xFFEF), // Halfwidth and Fullwidth Forms
    ];
    let cp = c as u32;
    if cp < 0x2E80 {
        return false;
    }
    in_ranges(cp, IDEOGRAPHIC_RANGES)
}

/// Word-breaking characters that often appear without surrounding spaces.
pub fn allows_word_breaking(c: char) -> bool {
    matches!(
        c,
        '\u{0a}'    // newline
        | '\u{20}'  // space
        | '\u{26}'  // ampersand
        | '\u{28}'  // open parenthesis
        | '\u{29}'  // close parenthesis
        | '\u{2b}'  // plus sign
        | '\u{2d}'  // hyphen-minus
        | '\u{2f}'  // solidus
        | '\u{ad}'  // soft hyphen
        | '\u{b7}'  // middle dot
        | '\u{200b}' // zero-width space
        | '\u{2010}' // hyphen
        | '\u{2013}' // en dash
        | '\u{2027}' // hyphenation point
    )
}

/// May letter-spacing be inserted after this code point?
///
/// Arabic-family text must not be letter-spaced: spreading joined glyphs
/// apart breaks the cursive connection.
pub fn char_allows_letter_spacing(c: char) -> bool {
    !in_ranges(c as u32, ARABIC_RANGES)
}

/// May letter-spacing be applied to this string at all?
pub fn allows_letter_spacing(text: &str) -> bool {
    text.chars().all(char_allows_letter_spacing)
}

/// Does this code point stay upright in vertical writing mode?
pub fn char_has_upright_vertical_orientation(c: char) -> bool {
    let cp = c as u32;
    if cp == 0x02EA || cp == 0x02EB {
        // Modifier tone letters used with Bopomofo
        return true;
    }
    // Nothing below U+1100 remains upright in vertical layouts.
    if cp < 0x1100 {
        return false;
    }

    const UPRIGHT_RANGES: &[(u32, u32)] = &[
        (0x1100, 0x11FF), // Hangul Jamo
        (0x1400, 0x167F), // Unified Canadian Aboriginal Syllabics
        (0x18B0, 0x18FF), // UCAS Extended
        (0x2E80, 0x2EFF), // CJK Radicals Supplement
        (0x2F00, 0x2FDF), // Kangxi Radicals
        (0x2FF0, 0x2FFF), // Ideographic Description Characters
        (0x3040, 0x309F), // Hiragana
        (0x3100, 0x312F), // Bopomofo
        (0x3130, 0x318F), // Hangul Compatibility Jamo
        (0x3190, 0x319F), // Kanbun
        (0x31A0, 0x31BF), // Bopomofo Extended
        (0x31C0, 0x31EF), // CJK Strokes
        (0x31F0, 0x31FF), // Katakana Phonetic Extensions
        (0x3200, 0x32FF), // Enclosed CJK Letters and Months
        (0x3300, 0x33FF), // CJK Compatibility
        (0x3400, 0x4DBF), // CJK Unified Ideographs Extension A
        (0x4DC0, 0x4DFF), // Yijing Hexagram Symbols
        (0x4E00, 0x9FFF), // CJK Unified Ideographs
        (0xA000, 0xA48F), // Yi Syllables
        (0xA490, 0xA4CF), // Yi Radicals
        (0xA960, 0xA97F), // Hangul Jamo Extended-A
        (0xAC00, 0xD7AF), // Hangul Syllables
        (0xD7B0, 0xD7FF), // Hangul Jamo Extended-B
        (0xF900, 0xFAFF), // CJK Compatibility Ideographs
        (0xFE10, 0xFE1F), // Vertical Forms
    ];
    if in_ranges(cp, UPRIGHT_RANGES) {
        return true;
    }

    // Blocks that are upright apart from a handful of rotated members.
    match cp {
        // CJK Symbols and Punctuation, minus brackets and the wave dash
        0x3000..=0x303F => !((0x3008..=0x3011).contains(&cp) || (0x3014..=0x301F).contains(&cp) || cp == 0x3030),
        // Katakana, minus the prolonged sound mark
        0x30A0..=0x30FF => cp != 0x30FC,
        // CJK Compatibility Forms, minus the vertical-only fillers
        0xFE30..=0xFE4F => !(0xFE49..=0xFE4F).contains(&cp),
        // Small Form Variants, minus dashes and brackets
        0xFE50..=0xFE6F => !((0xFE58..=0xFE5E).contains(&cp) || (0xFE63..=0xFE66).contains(&cp)),
        // Halfwidth and Fullwidth Forms, minus rotated punctuation and
        // the halfwidth kana/Hangul tail
        0xFF00..=0xFFEF => {
            !(cp == 0xFF08
                || cp == 0xFF09
                || cp == 0xFF0D
                || (0xFF1A..=0xFF1E).contains(&cp)
                || cp == 0xFF3B
                || cp == 0xFF3D
                || cp == 0xFF3F
                || (0xFF5B..=0xFFDF).contains(&cp)
                || cp == 0xFFE3
                || (0xFFE8..=0xFFEF).contains(&cp))
        }
        _ => false,
    }
}

/// Does this code point read acceptably in either orientation?
pub fn char_has_neutral_vertical_orientation(c: char) -> bool {
    let cp = c as u32;
    match cp {
        // Latin-1 signs that are orientation-agnostic
        0x00A7 | 0x00A9 | 0x00AE | 0x00B1 | 0x00BC | 0x00BD | 0x00BE | 0x00D7 | 0x00F7 => true,
        // General Punctuation: daggers, per-mille, reference marks, ...
        0x2016 | 0x2020 | 0x2021 | 0x2030 | 0x2031 | 0x203B | 0x203C | 0x2042 | 0x2047
        | 0x2048 | 0x2049 | 0x2051 | 0x2064 => true,
        // Letterlike symbols and number forms
        0x2100..=0x2138 | 0x2153..=0x217F => true,
        // Enclosed alphanumerics and geometric shapes
        0x2460..=0x24FF | 0x25A0..=0x25FF => true,
        // Dingbats and miscellaneous symbols
        0x2600..=0x27BF => true,
        _ => false,
    }
}

/// Does this code point rotate with the line in vertical writing mode?
#[inline]
pub fn char_has_rotated_vertical_orientation(c: char) -> bool {
    !(char_has_upright_vertical_orientation(c) || char_has_neutral_vertical_orientation(c))
}

/// Classifies a code point's behavior in vertical writing mode.
pub fn vertical_orientation(c: char) -> VerticalOrientation {
    if char_has_upright_vertical_orientation(c) {
        VerticalOrientation::Upright
    } else if char_has_neutral_vertical_orientation(c) {
        VerticalOrientation::Neutral
    } else {
        VerticalOrientation::Rotated
    }
}

/// Does any character in this string take an upright vertical form?
///
/// Labels whose text never goes upright skip the vertical shaping pass
/// entirely.
pub fn allows_vertical_writing_mode(text: &str) -> bool {
    text.chars().any(char_has_upright_vertical_orientation)
}

/// Is this string in a script the bidi reordering pass must handle?
pub fn has_rtl_text(text: &str) -> bool {
    text.chars().any(char_in_rtl_script)
}

/// Spacing combining marks (general category Mc), BMP coverage.
///
/// Sorted range table over the Indic and Southeast Asian script blocks
/// where Mc marks occur; Unicode 15.0. A spacing mark never starts a
/// grapheme cluster of its own — the segmenter fuses it into the cluster
/// before it.
pub fn is_spacing_combining_mark(c: char) -> bool {
    const MC_RANGES: &[(u32, u32)] = &[
        (0x0903, 0x0903),
        (0x093B, 0x093B),
        (0x093E, 0x0940),
        (0x0949, 0x094C),
        (0x094E, 0x094F),
        (0x0982, 0x0983),
        (0x09BE, 0x09C0),
        (0x09C7, 0x09C8),
        (0x09CB, 0x09CC),
        (0x09D7, 0x09D7),
        (0x0A03, 0x0A03),
        (0x0A3E, 0x0A40),
        (0x0A83, 0x0A83),
        (0x0ABE, 0x0AC0),
        (0x0AC9, 0x0AC9),
        (0x0ACB, 0x0ACC),
        (0x0B02, 0x0B03),
        (0x0B3E, 0x0B3E),
        (0x0B40, 0x0B40),
        (0x0B47, 0x0B48),
        (0x0B4B, 0x0B4C),
        (0x0B57, 0x0B57),
        (0x0BBE, 0x0BBF),
        (0x0BC1, 0x0BC2),
        (0x0BC6, 0x0BC8),
        (0x0BCA, 0x0BCC),
        (0x0BD7, 0x0BD7),
        (0x0C01, 0x0C03),
        (0x0C41, 0x0C44),
        (0x0C82, 0x0C83),
        (0x0CBE, 0x0CBE),
        (0x0CC0, 0x0CC4),
        (0x0CC7, 0x0CC8),
        (0x0CCA, 0x0CCB),
        (0x0CD5, 0x0CD6),
        (0x0D02, 0x0D03),
        (0x0D3E, 0x0D40),
        (0x0D46, 0x0D48),
        (0x0D4A, 0x0D4C),
        (0x0D57, 0x0D57),
        (0x0D82, 0x0D83),
        (0x0DCF, 0x0DD1),
        (0x0DD8, 0x0DDF),
        (0x0DF2, 0x0DF3),
        (0x0F3E, 0x0F3F),
        (0x0F7F, 0x0F7F),
        (0x102B, 0x102C),
        (0x1031, 0x1031),
        (0x1038, 0x1038),
        (0x103B, 0x103C),
        (0x1056, 0x1057),
        (0x1062, 0x1064),
        (0x1067, 0x106D),
        (0x1083, 0x1084),
        (0x1087, 0x108C),
        (0x108F, 0x108F),
        (0x109A, 0x109C),
        (0x17B6, 0x17B6),
        (0x17BE, 0x17C5),
        (0x17C7, 0x17C8),
        (0x1923, 0x1926),
        (0x1929, 0x192B),
        (0x1930, 0x1931),
        (0x1933, 0x1938),
        (0x1A19, 0x1A1A),
        (0x1A55, 0x1A55),
        (0x1A57, 0x1A57),
        (0x1A61, 0x1A61),
        (0x1A63, 0x1A64),
        (0x1A6D, 0x1A72),
        (0x1B04, 0x1B04),
        (0x1B35, 0x1B35),
        (0x1B3B, 0x1B3B),
        (0x1B3D, 0x1B41),
        (0x1B43, 0x1B44),
        (0x1B82, 0x1B82),
        (0x1BA1, 0x1BA1),
        (0x1BA6, 0x1BA7),
        (0x1BAA, 0x1BAA),
        (0x1BE7, 0x1BE7),
        (0x1BEA, 0x1BEC),
        (0x1BEE, 0x1BEE),
        (0x1BF2, 0x1BF3),
        (0x1C24, 0x1C2B),
        (0x1C34, 0x1C35),
        (0x1CE1, 0x1CE1),
        (0x1CF7, 0x1CF7),
        (0x302E, 0x302F),
        (0xA823, 0xA824),
        (0xA827, 0xA827),
        (0xA880, 0xA881),
        (0xA8B4, 0xA8C3),
        (0xA952, 0xA953),
        (0xA983, 0xA983),
        (0xA9B4, 0xA9B5),
        (0xA9BA, 0xA9BB),
        (0xA9BE, 0xA9C0),
        (0xAA2F, 0xAA30),
        (0xAA33, 0xAA34),
        (0xAA4D, 0xAA4D),
        (0xAA7B, 0xAA7B),
        (0xAA7D, 0xAA7D),
        (0xAAEB, 0xAAEB),
        (0xAAEE, 0xAAEF),
        (0xAAF5, 0xAAF5),
        (0xABE3, 0xABE4),
        (0xABE6, 0xABE7),
        (0xABE9, 0xABEA),
        (0xABEC, 0xABEC),
    ];
    in_ranges(c as u32, MC_RANGES)
}

/// Invisible stackers: conjoining virama-like marks that join the
/// following consonant into the current cluster. Unicode 15.0
/// `InSC=Invisible_Stacker` set.
pub fn is_invisible_stacker(c: char) -> bool {
    matches!(
        c as u32,
        0x1039   // Myanmar virama
        | 0x17D2  // Khmer coeng
        | 0x1A60  // Tai Tham sakot
        | 0x1BAB  // Sundanese virama
        | 0xAAF6  // Meetei Mayek virama
        | 0x10A3F // Kharoshthi virama
        | 0x11133 // Chakma virama
        | 0x1193E // Dives Akuru virama
        | 0x11A47 // Zanabazar Square subjoiner
        | 0x11A99 // Soyombo subjoiner
        | 0x11D45 // Masaram Gondi virama
        | 0x11D97 // Gunjala Gondi virama
    )
}

/// Combining marks used by the RTL scripts (general categories Mn/Mc
/// inside the RTL blocks). Used when preparing text for bidi reordering:
/// a mark that trails its base must be swapped ahead of it so run
/// reversal keeps the pair adjacent.
pub fn is_rtl_combining_mark(c: char) -> bool {
    const RTL_MARK_RANGES: &[(u32, u32)] = &[
        (0x0591, 0x05BD), // Hebrew accents and points
        (0x05BF, 0x05BF),
        (0x05C1, 0x05C2),
        (0x05C4, 0x05C5),
        (0x05C7, 0x05C7),
        (0x0610, 0x061A), // Arabic signs
        (0x064B, 0x065F), // Arabic harakat
        (0x0670, 0x0670),
        (0x06D6, 0x06DC),
        (0x06DF, 0x06E4),
        (0x06E7, 0x06E8),
        (0x06EA, 0x06ED),
        (0x0711, 0x0711), // Syriac superscript alaph
        (0x0730, 0x074A), // Syriac points
        (0x07A6, 0x07B0), // Thaana vowels
        (0x07EB, 0x07F3), // NKo marks
        (0x0816, 0x0819), // Samaritan marks
        (0x081B, 0x0823),
        (0x0825, 0x0827),
        (0x0829, 0x082D),
        (0x08D4, 0x08E1), // Arabic Extended-A marks
        (0x08E3, 0x08FF),
    ];
    in_ranges(c as u32, RTL_MARK_RANGES)
}

/// Vertical presentation form for a punctuation code point, if one exists.
///
/// Used by punctuation verticalization: narrow and fullwidth punctuation
/// swap to their vertical forms so they do not lie on their side inside a
/// column of upright CJK text.
pub fn verticalized_form(c: char) -> Option<char> {
    let v = match c {
        '!' => '︕',
        '#' => '＃',
        '$' => '＄',
        '%' => '％',
        '&' => '＆',
        '(' => '︵',
        ')' => '︶',
        '*' => '＊',
        '+' => '＋',
        ',' => '︐',
        '-' => '︲',
        '.' => '・',
        '/' => '／',
        ':' => '︓',
        ';' => '︔',
        '<' => '︿',
        '=' => '＝',
        '>' => '﹀',
        '?' => '︖',
        '@' => '＠',
        '[' => '﹇',
        '\\' => '＼',
        ']' => '﹈',
        '^' => '＾',
        '_' => '︳',
        '`' => '｀',
        '{' => '︷',
        '|' => '―',
        '}' => '︸',
        '~' => '～',
        '¢' => '￠',
        '£' => '￡',
        '¥' => '￥',
        '¦' => '￤',
        '¬' => '￢',
        '¯' => '￣',
        '–' => '︲',
        '—' => '︱',
        '‘' => '﹃',
        '’' => '﹄',
        '“' => '﹁',
        '”' => '﹂',
        '…' => '︙',
        '‧' => '・',
        '₩' => '￦',
        '、' => '︑',
        '。' => '︒',
        '〈' => '︿',
        '〉' => '﹀',
        '《' => '︽',
        '》' => '︾',
        '「' => '﹁',
        '」' => '﹂',
        '『' => '﹃',
        '』' => '﹄',
        '【' => '︻',
        '】' => '︼',
        '〔' => '︹',
        '〕' => '︺',
        '〖' => '︗',
        '〗' => '︘',
        '！' => '︕',
        '（' => '︵',
        '）' => '︶',
        '，' => '︐',
        '－' => '︲',
        '．' => '・',
        '：' => '︓',
        '；' => '︔',
        '＜' => '︿',
        '＞' => '﹀',
        '？' => '︖',
        '［' => '﹇',
        '］' => '﹈',
        '＿' => '︳',
        '｛' => '︷',
        '｜' => '―',
        '｝' => '︸',
        '｟' => '︵',
        '｠' => '︶',
        '｡' => '︒',
        '｢' => '﹁',
        '｣' => '﹂',
        _ => return None,
    };
    Some(v)
}

/// Does this code point have a vertical presentation form?
#[inline]
pub fn can_verticalize_punctuation(c: char) -> bool {
    verticalized_form(c).is_some()
}
