//! Text geometry
//!
//! Typeface sources, outline flattening, cap tessellation and extrusion.

pub mod block_font;
pub mod extrude;
pub mod outline;
pub mod tessellate;
pub mod typeface;

pub use block_font::BlockTypeface;
pub use extrude::{build_text_geometry, TextGeometryOptions};
pub use outline::{Glyph, PathCommand};
pub use typeface::{GlyphSource, JsonTypeface, TypefaceError};

use std::path::Path;

/// Load the JSON typeface at `font_path`, or the built-in block typeface when no path is given
pub fn load_typeface(font_path: Option<&Path>) -> Result<Box<dyn GlyphSource>, TypefaceError> {
    match font_path {
        Some(path) => Ok(Box::new(JsonTypeface::load(path)?)),
        None => {
            log::info!("Using built-in block typeface");
            Ok(Box::new(BlockTypeface::new()))
        }
    }
}
