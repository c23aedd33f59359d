//! Multi-line text layout
//!
//! Splits a block of text into lines, extrudes one mesh per line and stacks
//! the lines vertically. The first written line ends up on top because lines
//! are indexed bottom-up.
//!
//! Placement of line `i` is the translation
//! `(-center.x, i * (center.y + size.y / 2), -center.z)` of its geometry's
//! current bounding box. The translation is applied to the geometry itself,
//! so re-placing a line whose index changed builds on its previous placement.

use crate::foundation::color::Color;
use crate::foundation::math::Vec3;
use crate::render::primitives::{BoundingBox, GeometryError, Mesh};
use crate::text::{build_text_geometry, GlyphSource, TextGeometryOptions};
use bitflags::bitflags;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by layout operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Geometry, or data derived from it, is missing
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

bitflags! {
    /// What a [`TextLayout::sync`] call changed
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LayoutChanges: u8 {
        /// At least one line got fresh geometry
        const GEOMETRY = 1 << 0;
        /// At least one existing line moved to a new index
        const PLACEMENT = 1 << 1;
        /// At least one line disappeared
        const REMOVED = 1 << 2;
        /// The shared text colour changed
        const COLOR = 1 << 3;
    }
}

/// Lines of a text block in stacking order, plus their shared colour
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    lines: Vec<String>,
    color: Color,
}

impl TextBlock {
    /// Split `text` on `\n` and reverse, so index 0 is the last written line
    pub fn new(text: &str, color: Color) -> Self {
        let lines = text.split('\n').rev().map(str::to_string).collect();
        Self { lines, color }
    }

    /// Lines with their stacking index
    pub fn lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines.iter().map(String::as_str).enumerate()
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when the block has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Shared colour
    pub fn color(&self) -> Color {
        self.color
    }
}

/// One line of extruded text
#[derive(Debug, Clone)]
pub struct LineMesh {
    text: String,
    index: usize,
    geometry: Option<Mesh>,
}

impl LineMesh {
    /// A line without geometry yet
    pub fn new(text: impl Into<String>, index: usize) -> Self {
        Self {
            text: text.into(),
            index,
            geometry: None,
        }
    }

    /// Source text of the line, as typed
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text that is actually extruded
    pub fn display_text(&self) -> String {
        self.text.to_uppercase()
    }

    /// Stacking index; 0 is the bottom line
    pub fn index(&self) -> usize {
        self.index
    }

    /// Geometry, once built
    pub fn geometry(&self) -> Result<&Mesh, GeometryError> {
        self.geometry.as_ref().ok_or(GeometryError::NotReady("line geometry not built"))
    }

    /// Bounding box of the placed geometry
    pub fn bounding_box(&self) -> Result<BoundingBox, GeometryError> {
        self.geometry()?.bounding_box()
    }

    /// Extrude the uppercased line text, replacing any previous geometry
    pub fn build(&mut self, source: &dyn GlyphSource, options: &TextGeometryOptions) {
        log::debug!("Building geometry for line {} ({:?})", self.index, self.text);
        self.geometry = Some(build_text_geometry(source, &self.display_text(), options));
    }

    /// Compute normals and bounds, then translate into this line's slot
    ///
    /// Returns the translation applied.
    pub fn normalize(&mut self) -> Result<Vec3, LayoutError> {
        let mesh = self
            .geometry
            .as_mut()
            .ok_or(GeometryError::NotReady("line geometry not built"))?;
        mesh.compute_vertex_normals();
        mesh.compute_bounding_box();
        let bounds = mesh.bounding_box()?;

        let center = bounds.center();
        let size = bounds.size();
        let offset = Vec3::new(
            -center.x,
            self.index as f32 * (center.y + size.y / 2.0),
            -center.z,
        );
        mesh.translate(offset);
        log::trace!("Line {} translated by {:?}", self.index, offset);
        Ok(offset)
    }
}

/// Keyed collection of line meshes kept in step with a text block
#[derive(Debug, Clone)]
pub struct TextLayout {
    lines: Vec<LineMesh>,
    color: Color,
    options: TextGeometryOptions,
}

impl TextLayout {
    /// Empty layout using the given extrusion parameters
    pub fn new(options: TextGeometryOptions) -> Self {
        Self {
            lines: Vec::new(),
            color: Color::WHITE,
            options,
        }
    }

    /// Lines in stacking order
    pub fn lines(&self) -> &[LineMesh] {
        &self.lines
    }

    /// Shared text colour
    pub fn color(&self) -> Color {
        self.color
    }

    /// Extrusion parameters
    pub fn options(&self) -> &TextGeometryOptions {
        &self.options
    }

    /// Reconcile the layout with `text` and `color`
    ///
    /// Lines are keyed by their text (and occurrence, for repeated lines).
    /// New keys get fresh geometry; existing keys whose index changed are
    /// normalized again; vanished keys are dropped. A colour change never
    /// touches geometry.
    pub fn sync(&mut self, source: &dyn GlyphSource, text: &str, color: Color) -> Result<LayoutChanges, LayoutError> {
        let block = TextBlock::new(text, color);
        let mut changes = LayoutChanges::empty();

        if self.color != block.color() {
            self.color = block.color();
            changes |= LayoutChanges::COLOR;
        }

        let mut previous: HashMap<(String, usize), LineMesh> = HashMap::with_capacity(self.lines.len());
        let mut seen: HashMap<String, usize> = HashMap::new();
        for line in self.lines.drain(..) {
            let occurrence = next_occurrence(&mut seen, &line.text);
            previous.insert((line.text.clone(), occurrence), line);
        }

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut lines = Vec::with_capacity(block.len());
        for (index, text) in block.lines() {
            let occurrence = next_occurrence(&mut seen, text);
            let line = match previous.remove(&(text.to_string(), occurrence)) {
                Some(mut line) => {
                    if line.index != index {
                        line.index = index;
                        line.normalize()?;
                        changes |= LayoutChanges::PLACEMENT;
                    }
                    line
                }
                None => {
                    let mut line = LineMesh::new(text, index);
                    line.build(source, &self.options);
                    line.normalize()?;
                    changes |= LayoutChanges::GEOMETRY;
                    line
                }
            };
            lines.push(line);
        }

        if !previous.is_empty() {
            log::debug!("Dropping {} stale line(s)", previous.len());
            changes |= LayoutChanges::REMOVED;
        }

        self.lines = lines;
        if !changes.is_empty() {
            log::debug!("Text layout synced: {} line(s), changes {:?}", self.lines.len(), changes);
        }
        Ok(changes)
    }
}

impl Default for TextLayout {
    fn default() -> Self {
        Self::new(TextGeometryOptions::default())
    }
}

fn next_occurrence(seen: &mut HashMap<String, usize>, text: &str) -> usize {
    let count = seen.entry(text.to_string()).or_insert(0);
    let occurrence = *count;
    *count += 1;
    occurrence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::BlockTypeface;
    use approx::assert_relative_eq;

    fn synced(text: &str) -> TextLayout {
        let mut layout = TextLayout::default();
        layout.sync(&BlockTypeface::new(), text, Color::WHITE).unwrap();
        layout
    }

    #[test]
    fn test_one_mesh_per_line() {
        for text in ["A", "A\nB", "BIG TEXT\nIS FUNNY", "ONE\nTWO\nTHREE\nFOUR"] {
            let layout = synced(text);
            assert_eq!(layout.lines().len(), text.split('\n').count());
        }
    }

    #[test]
    fn test_first_line_gets_highest_index() {
        let layout = synced("a\nb");
        assert_eq!(layout.lines().len(), 2);
        assert_eq!(layout.lines()[0].text(), "b");
        assert_eq!(layout.lines()[0].index(), 0);
        assert_eq!(layout.lines()[0].display_text(), "B");
        assert_eq!(layout.lines()[1].display_text(), "A");
        assert_eq!(layout.lines()[1].index(), 1);
    }

    #[test]
    fn test_lines_are_centered() {
        let layout = synced("BIG TEXT\nIS FUNNY");
        for line in layout.lines() {
            let center = line.bounding_box().unwrap().center();
            assert_relative_eq!(center.x, 0.0, epsilon = 1e-4);
            assert_relative_eq!(center.z, 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_stacking_offset_uses_own_geometry() {
        let source = BlockTypeface::new();
        let options = TextGeometryOptions::default();
        for index in 0..3 {
            let mut reference = build_text_geometry(&source, "IS FUNNY", &options);
            reference.compute_bounding_box();
            let before = reference.bounding_box().unwrap();

            let mut line = LineMesh::new("is funny", index);
            line.build(&source, &options);
            let offset = line.normalize().unwrap();

            let expected = index as f32 * (before.center().y + before.size().y / 2.0);
            assert_relative_eq!(offset.y, expected, epsilon = 1e-5);
            assert_relative_eq!(line.bounding_box().unwrap().min.y, before.min.y + expected, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_bounds_not_ready_without_geometry() {
        let mut line = LineMesh::new("A", 0);
        assert_eq!(line.bounding_box(), Err(GeometryError::NotReady("line geometry not built")));
        assert!(matches!(line.normalize(), Err(LayoutError::Geometry(GeometryError::NotReady(_)))));
    }

    #[test]
    fn test_sync_keeps_unchanged_lines() {
        let source = BlockTypeface::new();
        let mut layout = TextLayout::default();
        assert_eq!(layout.sync(&source, "A\nB", Color::WHITE).unwrap(), LayoutChanges::GEOMETRY);
        assert_eq!(layout.sync(&source, "A\nB", Color::WHITE).unwrap(), LayoutChanges::empty());

        let red = Color::from_hex("#ff0000").unwrap();
        assert_eq!(layout.sync(&source, "A\nB", red).unwrap(), LayoutChanges::COLOR);
        assert_eq!(layout.color(), red);
    }

    #[test]
    fn test_index_change_replaces_cumulatively() {
        let source = BlockTypeface::new();
        let mut layout = TextLayout::default();
        layout.sync(&source, "B", Color::WHITE).unwrap();
        let at_zero = layout.lines()[0].bounding_box().unwrap();

        // "B" moves from index 0 to index 1 and keeps its geometry
        let changes = layout.sync(&source, "B\nC", Color::WHITE).unwrap();
        assert!(changes.contains(LayoutChanges::PLACEMENT | LayoutChanges::GEOMETRY));
        let line = &layout.lines()[1];
        assert_eq!(line.text(), "B");
        let moved = line.bounding_box().unwrap();
        let expected = at_zero.center().y + at_zero.size().y / 2.0;
        assert_relative_eq!(moved.min.y, at_zero.min.y + expected, epsilon = 1e-5);
    }

    #[test]
    fn test_removed_lines_are_dropped() {
        let source = BlockTypeface::new();
        let mut layout = TextLayout::default();
        layout.sync(&source, "A\nB\nC", Color::WHITE).unwrap();
        let changes = layout.sync(&source, "C", Color::WHITE).unwrap();
        assert!(changes.contains(LayoutChanges::REMOVED));
        assert_eq!(layout.lines().len(), 1);
        assert_eq!(layout.lines()[0].text(), "C");
    }

    #[test]
    fn test_repeated_lines_are_distinct() {
        let layout = synced("HI\nHI");
        assert_eq!(layout.lines().len(), 2);
        let low = layout.lines()[0].bounding_box().unwrap();
        let high = layout.lines()[1].bounding_box().unwrap();
        assert!(high.min.y > low.min.y);
    }

    #[test]
    fn test_empty_line_has_no_triangles() {
        let layout = synced("A\n\nB");
        assert_eq!(layout.lines().len(), 3);
        assert_eq!(layout.lines()[1].geometry().unwrap().triangle_count(), 0);
    }
}
