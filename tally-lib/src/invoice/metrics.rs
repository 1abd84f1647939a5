//! Glyph widths of the standard PDF Helvetica-Bold font, in 1/1000 em.

const FALLBACK_WIDTH: u16 = 556;

/// Widths for the printable ASCII range, starting at the space character.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' - '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0' - '?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@' - 'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P' - '_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`' - 'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,      // 'p' - '~'
];

fn glyph_width(c: char) -> u16 {
    match c {
        // En and em dash live outside ASCII but show up in titles
        '\u{2013}' => 556,
        '\u{2014}' => 1000,
        ' '..='~' => u32::from(c)
            .checked_sub(u32::from(' '))
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| HELVETICA_BOLD.get(i).copied())
            .unwrap_or(FALLBACK_WIDTH),
        _ => FALLBACK_WIDTH,
    }
}

/// Width of `text` set in Helvetica-Bold at `size` points.
pub fn bold_text_width(text: &str, size: f32) -> f32 {
    let units: f32 = text.chars().map(|c| f32::from(glyph_width(c))).sum();
    units * size / 1000.0
}
