//! Backend-agnostic UI rendering data

use crate::foundation::math::{Vec2, Vec4};
use crate::render::software::font_atlas::UI_FONT_ADVANCE_EM;

/// Horizontal advance of one panel-font glyph at `size` pixels per em
pub fn glyph_advance(size: f32) -> f32 {
    size * UI_FONT_ADVANCE_EM
}

/// Distance between baselines of consecutive lines at `size` pixels per em
pub fn line_advance(size: f32) -> f32 {
    size * 1.25
}

/// Pixel extent of a (possibly multi-line) text run
pub fn measure_text(text: &str, size: f32) -> Vec2 {
    let columns = text.split('\n').map(|line| line.chars().count()).max().unwrap_or(0);
    let lines = text.split('\n').count();
    Vec2::new(
        columns as f32 * glyph_advance(size),
        (lines.saturating_sub(1)) as f32 * line_advance(size) + size,
    )
}

/// Everything the overlay pass draws this frame
///
/// The control panel exports this structure; the renderer consumes it
/// without knowing anything about widgets or focus.
#[derive(Debug, Clone, Default)]
pub struct UIRenderData {
    /// Filled rectangles
    pub quads: Vec<RenderQuad>,

    /// Text runs
    pub texts: Vec<RenderText>,
}

impl UIRenderData {
    /// Create empty UI render data with no elements
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty() && self.texts.is_empty()
    }
}

/// Filled rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct RenderQuad {
    /// Screen position (pixels from top-left)
    pub position: Vec2,

    /// Size (width, height in pixels)
    pub size: Vec2,

    /// Color (RGBA, straight alpha)
    pub color: Vec4,

    /// Z-order for layering (higher = front)
    pub depth: f32,
}

/// Run of panel-font text
#[derive(Debug, Clone, PartialEq)]
pub struct RenderText {
    /// Top-left of the first line box (pixels from top-left)
    pub position: Vec2,

    /// Text content; `\n` starts a new line
    pub text: String,

    /// Text color (RGBA)
    pub color: Vec4,

    /// Font size in pixels per em
    pub size: f32,

    /// Z-order for layering (higher = front)
    pub depth: f32,
}
