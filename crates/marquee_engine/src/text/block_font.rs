//! Built-in 5×7 block typeface
//!
//! Every glyph is a 5 wide, 7 tall bitmap. Rows are listed top to bottom and
//! the most significant of the five bits is the leftmost column. Lit cells
//! become square outlines, so the typeface works without any font file.

use super::outline::{Glyph, PathCommand};
use super::typeface::GlyphSource;
use crate::foundation::math::Vec2;
use std::collections::HashMap;

/// Bitmap columns per glyph
pub const GLYPH_COLUMNS: usize = 5;

/// Bitmap rows per glyph
pub const GLYPH_ROWS: usize = 7;

const RESOLUTION: f32 = 1000.0;
const CELL: f32 = 100.0;
const ADVANCE: f32 = 600.0;
const LINE_HEIGHT: f32 = 1000.0;

#[rustfmt::skip]
const BITMAPS: &[(char, [u8; GLYPH_ROWS])] = &[
    ('A', [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
    ('B', [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110]),
    ('C', [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110]),
    ('D', [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110]),
    ('E', [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111]),
    ('F', [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('G', [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111]),
    ('H', [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
    ('I', [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('J', [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100]),
    ('K', [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001]),
    ('L', [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111]),
    ('M', [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001]),
    ('N', [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001]),
    ('O', [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('P', [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('Q', [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101]),
    ('R', [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001]),
    ('S', [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110]),
    ('T', [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
    ('U', [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('V', [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100]),
    ('W', [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010]),
    ('X', [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001]),
    ('Y', [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100]),
    ('Z', [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111]),
    ('0', [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
    ('1', [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('2', [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
    ('3', [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110]),
    ('4', [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
    ('5', [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
    ('6', [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
    ('7', [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
    ('8', [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
    ('9', [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
    (' ', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000]),
    ('!', [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100]),
    ('?', [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100]),
    ('.', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100]),
    (',', [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000]),
    ('-', [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000]),
    ('\'', [0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000]),
    (':', [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000]),
    (';', [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b00100, 0b01000]),
    ('(', [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010]),
    (')', [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000]),
    ('/', [0b00001, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b10000]),
    ('+', [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000]),
    ('=', [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000]),
    ('_', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111]),
    ('&', [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101]),
    ('#', [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010]),
    ('*', [0b00000, 0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0b00000]),
    ('<', [0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010]),
    ('>', [0b01000, 0b00100, 0b00010, 0b00001, 0b00010, 0b00100, 0b01000]),
];

/// Bitmap for a character; lowercase letters share the uppercase shapes
pub fn bitmap(ch: char) -> Option<&'static [u8; GLYPH_ROWS]> {
    let ch = ch.to_ascii_uppercase();
    BITMAPS.iter().find(|(c, _)| *c == ch).map(|(_, rows)| rows)
}

/// True when the pixel at `(column, row)` of a bitmap is set; row 0 is the top
pub fn pixel_set(rows: &[u8; GLYPH_ROWS], column: usize, row: usize) -> bool {
    column < GLYPH_COLUMNS && row < GLYPH_ROWS && rows[row] & (1 << (GLYPH_COLUMNS - 1 - column)) != 0
}

/// The always-available block letter typeface
#[derive(Debug, Clone)]
pub struct BlockTypeface {
    glyphs: HashMap<char, Glyph>,
}

impl BlockTypeface {
    /// Build outlines for every bitmap glyph
    pub fn new() -> Self {
        let glyphs = BITMAPS
            .iter()
            .map(|(ch, rows)| (*ch, outline_from_bitmap(rows)))
            .collect();
        Self { glyphs }
    }
}

impl Default for BlockTypeface {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphSource for BlockTypeface {
    fn family_name(&self) -> &str {
        "Block"
    }

    fn resolution(&self) -> f32 {
        RESOLUTION
    }

    fn line_height(&self) -> f32 {
        LINE_HEIGHT
    }

    fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch.to_ascii_uppercase())
    }
}

/// Turn a bitmap into rectangle contours
///
/// Horizontal runs that repeat on consecutive rows are merged into one taller
/// rectangle. Rectangles wind clockwise like TrueType outer contours.
fn outline_from_bitmap(rows: &[u8; GLYPH_ROWS]) -> Glyph {
    // (first column, last column, top row, bottom row)
    let mut open: Vec<(usize, usize, usize, usize)> = Vec::new();
    let mut closed = Vec::new();

    for (row, bits) in rows.iter().enumerate() {
        let runs = runs_in_row(*bits);
        let (continuing, finished): (Vec<_>, Vec<_>) = open
            .drain(..)
            .partition(|&(start, end, _, _)| runs.contains(&(start, end)));
        closed.extend(finished);
        open = continuing
            .into_iter()
            .map(|(start, end, top, _)| (start, end, top, row))
            .collect();
        for run in runs {
            if !open.iter().any(|&(start, end, _, _)| (start, end) == run) {
                open.push((run.0, run.1, row, row));
            }
        }
    }
    closed.extend(open);

    let mut commands = Vec::with_capacity(closed.len() * 5);
    for (start, end, top, bottom) in closed {
        let x0 = start as f32 * CELL;
        let x1 = (end + 1) as f32 * CELL;
        let y_top = (GLYPH_ROWS - top) as f32 * CELL;
        let y_bottom = (GLYPH_ROWS - 1 - bottom) as f32 * CELL;
        commands.push(PathCommand::MoveTo(Vec2::new(x0, y_bottom)));
        commands.push(PathCommand::LineTo(Vec2::new(x0, y_top)));
        commands.push(PathCommand::LineTo(Vec2::new(x1, y_top)));
        commands.push(PathCommand::LineTo(Vec2::new(x1, y_bottom)));
        commands.push(PathCommand::LineTo(Vec2::new(x0, y_bottom)));
    }

    Glyph { advance: ADVANCE, commands }
}

/// Inclusive column ranges of set bits
fn runs_in_row(bits: u8) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for column in 0..GLYPH_COLUMNS {
        let set = bits & (1 << (GLYPH_COLUMNS - 1 - column)) != 0;
        match (set, start) {
            (true, None) => start = Some(column),
            (false, Some(s)) => {
                runs.push((s, column - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, GLYPH_COLUMNS - 1));
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::outline::{flatten, signed_area};
    use approx::assert_relative_eq;

    fn filled_area(rows: &[u8; GLYPH_ROWS]) -> f32 {
        let cells: u32 = rows.iter().map(|r| r.count_ones()).sum();
        cells as f32 * CELL * CELL
    }

    #[test]
    fn test_runs() {
        assert_eq!(runs_in_row(0b10001), vec![(0, 0), (4, 4)]);
        assert_eq!(runs_in_row(0b01110), vec![(1, 3)]);
        assert_eq!(runs_in_row(0b11111), vec![(0, 4)]);
        assert!(runs_in_row(0).is_empty());
    }

    #[test]
    fn test_outline_area_matches_bitmap() {
        let face = BlockTypeface::new();
        for ch in ['A', 'I', 'T', '8', '#', '?'] {
            let glyph = face.glyph(ch).unwrap();
            let area: f32 = flatten(&glyph.commands, 1.0, Vec2::zeros(), 1)
                .iter()
                .map(|c| signed_area(c).abs())
                .sum();
            assert_relative_eq!(area, filled_area(bitmap(ch).unwrap()), epsilon = 1e-2);
        }
    }

    #[test]
    fn test_vertical_runs_merge() {
        // 'T' is one bar plus one stem
        let face = BlockTypeface::new();
        let contours = flatten(&face.glyph('T').unwrap().commands, 1.0, Vec2::zeros(), 1);
        assert_eq!(contours.len(), 2);
    }

    #[test]
    fn test_contours_wind_clockwise() {
        let face = BlockTypeface::new();
        let contours = flatten(&face.glyph('H').unwrap().commands, 1.0, Vec2::zeros(), 1);
        assert!(contours.iter().all(|c| signed_area(c) < 0.0));
    }

    #[test]
    fn test_lowercase_and_unknown() {
        let face = BlockTypeface::new();
        assert_eq!(face.glyph('a'), face.glyph('A'));
        assert!(face.glyph('€').is_none());
        assert!(face.glyph(' ').unwrap().commands.is_empty());
        assert!(pixel_set(bitmap('L').unwrap(), 0, 0));
        assert!(!pixel_set(bitmap('L').unwrap(), 4, 0));
    }
}
