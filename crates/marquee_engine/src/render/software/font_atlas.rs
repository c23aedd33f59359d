//! Glyph cache for overlay text
//!
//! Panel text is drawn with the bundled DejaVu Sans Mono face. Glyphs are
//! rasterized with `fontdue` the first time a character is needed at a given
//! pixel size and kept as coverage bitmaps afterwards.

use fontdue::{Font, FontSettings, Metrics};
use std::collections::HashMap;
use thiserror::Error;

/// Bundled monospace face used for panel text
pub const UI_FONT: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSansMono.ttf");

/// Horizontal advance of every glyph in the bundled face, in ems
pub const UI_FONT_ADVANCE_EM: f32 = 1233.0 / 2048.0;

/// Ascent of the bundled face, in ems
pub const UI_FONT_ASCENT_EM: f32 = 1901.0 / 2048.0;

/// Result type for font operations
pub type FontResult<T> = Result<T, FontError>;

/// Errors that can occur during font operations
#[derive(Debug, Error)]
pub enum FontError {
    /// Failed to parse the font data
    #[error("Failed to load font: {0}")]
    LoadError(String),
}

/// One rasterized glyph
#[derive(Debug, Clone)]
pub struct RasterGlyph {
    /// Placement relative to the pen position on the baseline
    pub metrics: Metrics,
    /// Row-major coverage, `metrics.width` by `metrics.height`, top row first
    pub coverage: Vec<u8>,
}

/// Font plus the glyphs rasterized from it so far
pub struct FontAtlas {
    font: Font,
    glyph_cache: HashMap<(char, u32), RasterGlyph>,
}

impl std::fmt::Debug for FontAtlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontAtlas")
            .field("cached_glyphs", &self.glyph_cache.len())
            .finish()
    }
}

impl FontAtlas {
    /// Load a TrueType/OpenType font from raw bytes
    pub fn new(font_data: &[u8]) -> FontResult<Self> {
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| FontError::LoadError(format!("fontdue error: {}", e)))?;
        log::debug!("Loaded UI font ({} glyphs)", font.glyph_count());
        Ok(Self {
            font,
            glyph_cache: HashMap::new(),
        })
    }

    /// The bundled panel font
    pub fn bundled() -> FontResult<Self> {
        Self::new(UI_FONT)
    }

    /// Distance from the top of a line box to its baseline at `px` pixels per em
    pub fn ascent(&self, px: f32) -> f32 {
        self.font
            .horizontal_line_metrics(px)
            .map_or(px * UI_FONT_ASCENT_EM, |metrics| metrics.ascent)
    }

    /// Glyph for `ch` at `px` pixels per em, rasterized on first request
    pub fn glyph(&mut self, ch: char, px: f32) -> &RasterGlyph {
        let font = &self.font;
        self.glyph_cache.entry((ch, px.to_bits())).or_insert_with(|| {
            let (metrics, coverage) = font.rasterize(ch, px);
            RasterGlyph { metrics, coverage }
        })
    }

    /// Number of glyphs rasterized so far
    pub fn cached_glyphs(&self) -> usize {
        self.glyph_cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bundled_font_is_monospace() {
        let mut atlas = FontAtlas::bundled().unwrap();
        for ch in ['I', 'W', '#', ' '] {
            assert_relative_eq!(atlas.glyph(ch, 14.0).metrics.advance_width, 14.0 * UI_FONT_ADVANCE_EM, epsilon = 0.01);
        }
        assert_relative_eq!(atlas.ascent(14.0), 14.0 * UI_FONT_ASCENT_EM, epsilon = 0.05);
    }

    #[test]
    fn test_glyphs_are_cached_per_size() {
        let mut atlas = FontAtlas::bundled().unwrap();
        let coverage = atlas.glyph('A', 14.0).coverage.clone();
        assert!(coverage.iter().any(|&c| c > 0));
        atlas.glyph('A', 14.0);
        assert_eq!(atlas.cached_glyphs(), 1);
        atlas.glyph('A', 20.0);
        assert_eq!(atlas.cached_glyphs(), 2);
    }

    #[test]
    fn test_space_has_no_coverage() {
        let mut atlas = FontAtlas::bundled().unwrap();
        assert!(atlas.glyph(' ', 14.0).coverage.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_invalid_font_data() {
        assert!(matches!(FontAtlas::new(&[0, 1, 2, 3]), Err(FontError::LoadError(_))));
    }
}
