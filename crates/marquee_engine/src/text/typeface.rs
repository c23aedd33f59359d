//! Typeface sources
//!
//! A [`GlyphSource`] maps characters to outline glyphs in font units. The
//! JSON typeface format handled here stores, per glyph, an advance (`ha`) and
//! an outline string made of `m x y`, `l x y`, `q x y cx cy` (end point
//! before control point) and `b x y c1x c1y c2x c2y` commands.

use super::outline::{Glyph, PathCommand};
use crate::foundation::math::Vec2;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a typeface
#[derive(Error, Debug)]
pub enum TypefaceError {
    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document is not valid typeface JSON
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A glyph outline string is malformed
    #[error("Malformed outline for glyph '{glyph}': {reason}")]
    MalformedOutline {
        /// Glyph whose outline failed
        glyph: char,
        /// What went wrong
        reason: String,
    },

    /// Resolution must be positive
    #[error("Invalid typeface resolution: {0}")]
    InvalidResolution(f32),
}

/// Source of glyph outlines
pub trait GlyphSource {
    /// Human readable family name
    fn family_name(&self) -> &str;

    /// Font units per em; geometry is scaled by `size / resolution`
    fn resolution(&self) -> f32;

    /// Distance between baselines in font units
    fn line_height(&self) -> f32;

    /// Outline for a character, if the typeface has one
    fn glyph(&self, ch: char) -> Option<&Glyph>;
}

#[derive(Debug, Deserialize)]
struct RawTypeface {
    glyphs: HashMap<String, RawGlyph>,
    #[serde(rename = "familyName", default)]
    family_name: String,
    resolution: f32,
    #[serde(rename = "boundingBox")]
    bounding_box: RawBoundingBox,
    #[serde(rename = "underlineThickness", default)]
    underline_thickness: f32,
}

#[derive(Debug, Deserialize)]
struct RawGlyph {
    ha: f32,
    #[serde(default)]
    o: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBoundingBox {
    #[serde(rename = "yMin")]
    y_min: f32,
    #[serde(rename = "yMax")]
    y_max: f32,
}

/// Typeface loaded from the JSON outline format
#[derive(Debug, Clone)]
pub struct JsonTypeface {
    family_name: String,
    resolution: f32,
    line_height: f32,
    glyphs: HashMap<char, Glyph>,
}

impl JsonTypeface {
    /// Load a typeface JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TypefaceError> {
        let path = path.as_ref();
        log::info!("Loading typeface from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a typeface JSON document
    pub fn from_json(json: &str) -> Result<Self, TypefaceError> {
        let raw: RawTypeface = serde_json::from_str(json)?;
        if raw.resolution <= 0.0 || !raw.resolution.is_finite() {
            return Err(TypefaceError::InvalidResolution(raw.resolution));
        }

        let mut glyphs = HashMap::with_capacity(raw.glyphs.len());
        for (key, raw_glyph) in raw.glyphs {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                log::debug!("Skipping multi-character glyph key {:?}", key);
                continue;
            };
            let commands = match &raw_glyph.o {
                Some(outline) => parse_outline(ch, outline)?,
                None => Vec::new(),
            };
            glyphs.insert(ch, Glyph { advance: raw_glyph.ha, commands });
        }

        let line_height = raw.bounding_box.y_max - raw.bounding_box.y_min + raw.underline_thickness;
        log::debug!(
            "Typeface '{}' loaded: {} glyphs, resolution {}",
            raw.family_name,
            glyphs.len(),
            raw.resolution
        );

        Ok(Self {
            family_name: raw.family_name,
            resolution: raw.resolution,
            line_height,
            glyphs,
        })
    }

    /// Number of glyphs in the typeface
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }
}

impl GlyphSource for JsonTypeface {
    fn family_name(&self) -> &str {
        &self.family_name
    }

    fn resolution(&self) -> f32 {
        self.resolution
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }
}

/// Parse an outline command string
fn parse_outline(glyph: char, outline: &str) -> Result<Vec<PathCommand>, TypefaceError> {
    let malformed = |reason: String| TypefaceError::MalformedOutline { glyph, reason };

    let mut tokens = outline.split_whitespace();
    let mut next_point = |cmd: &str, tokens: &mut std::str::SplitWhitespace<'_>| -> Result<Vec2, TypefaceError> {
        let mut coord = || {
            let token = tokens
                .next()
                .ok_or_else(|| malformed(format!("'{cmd}' is missing coordinates")))?;
            token
                .parse::<f32>()
                .map_err(|_| malformed(format!("invalid number '{token}'")))
        };
        let x = coord()?;
        let y = coord()?;
        Ok(Vec2::new(x, y))
    };

    let mut commands = Vec::new();
    while let Some(cmd) = tokens.next() {
        let command = match cmd {
            "m" => PathCommand::MoveTo(next_point(cmd, &mut tokens)?),
            "l" => PathCommand::LineTo(next_point(cmd, &mut tokens)?),
            "q" => {
                let to = next_point(cmd, &mut tokens)?;
                let ctrl = next_point(cmd, &mut tokens)?;
                PathCommand::QuadTo { ctrl, to }
            }
            "b" => {
                let to = next_point(cmd, &mut tokens)?;
                let ctrl1 = next_point(cmd, &mut tokens)?;
                let ctrl2 = next_point(cmd, &mut tokens)?;
                PathCommand::CubicTo { ctrl1, ctrl2, to }
            }
            "z" => continue,
            other => return Err(malformed(format!("unknown command '{other}'"))),
        };
        commands.push(command);
    }
    Ok(commands)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two-glyph typeface: a square "O" with a square counter, and a plain bar "I"
    pub(crate) const TINY_TYPEFACE: &str = r#"{
        "familyName": "Tiny",
        "resolution": 1000,
        "underlineThickness": 50,
        "boundingBox": { "yMin": -200, "yMax": 800, "xMin": 0, "xMax": 700 },
        "glyphs": {
            "O": { "ha": 700, "x_min": 0, "x_max": 600,
                   "o": "m 0 0 l 0 700 l 600 700 l 600 0 l 0 0 m 150 150 l 450 150 l 450 550 l 150 550 l 150 150" },
            "I": { "ha": 300, "x_min": 0, "x_max": 200,
                   "o": "m 0 0 l 0 700 l 200 700 l 200 0 l 0 0" },
            "?": { "ha": 500, "o": "m 0 0 l 0 100 l 100 100 z" },
            " ": { "ha": 250 }
        }
    }"#;

    #[test]
    fn test_parse_tiny_typeface() {
        let face = JsonTypeface::from_json(TINY_TYPEFACE).unwrap();
        assert_eq!(face.family_name(), "Tiny");
        assert_eq!(face.glyph_count(), 4);
        assert_eq!(face.line_height(), 1050.0);
        assert_eq!(face.glyph('O').unwrap().commands.len(), 10);
        assert!(face.glyph(' ').unwrap().commands.is_empty());
        assert!(face.glyph('Z').is_none());
    }

    #[test]
    fn test_quadratic_end_point_comes_first() {
        let commands = parse_outline('x', "m 0 0 q 10 0 5 5").unwrap();
        assert_eq!(
            commands[1],
            PathCommand::QuadTo { ctrl: Vec2::new(5.0, 5.0), to: Vec2::new(10.0, 0.0) }
        );
    }

    #[test]
    fn test_cubic_order() {
        let commands = parse_outline('x', "m 0 0 b 9 0 3 3 6 3").unwrap();
        assert_eq!(
            commands[1],
            PathCommand::CubicTo {
                ctrl1: Vec2::new(3.0, 3.0),
                ctrl2: Vec2::new(6.0, 3.0),
                to: Vec2::new(9.0, 0.0),
            }
        );
    }

    #[test]
    fn test_malformed_outline() {
        assert!(matches!(
            parse_outline('x', "m 0"),
            Err(TypefaceError::MalformedOutline { glyph: 'x', .. })
        ));
        assert!(matches!(
            parse_outline('x', "k 1 2"),
            Err(TypefaceError::MalformedOutline { .. })
        ));
    }

    #[test]
    fn test_invalid_resolution() {
        let json = TINY_TYPEFACE.replace("\"resolution\": 1000", "\"resolution\": 0");
        assert!(matches!(JsonTypeface::from_json(&json), Err(TypefaceError::InvalidResolution(_))));
    }
}
