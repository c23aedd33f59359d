//! Extruded text geometry
//!
//! Glyph outlines are flattened, capped by filling them with `lyon` and
//! joined with side walls. The result is an unindexed triangle soup in scene
//! units: X to the right along the baseline, Y up, the back cap at `z = 0`
//! and the front cap at `z = depth`.

use super::outline::{flatten, Contour};
use super::tessellate::{tessellate_caps, CapMesh};
use super::typeface::GlyphSource;
use crate::foundation::math::{Vec2, Vec3};
use crate::render::primitives::{Mesh, Vertex};
use std::collections::HashSet;

/// Extrusion parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextGeometryOptions {
    /// Em size in scene units
    pub size: f32,
    /// Extrusion depth along +Z
    pub depth: f32,
    /// Straight segments per curve
    pub curve_segments: u32,
}

impl Default for TextGeometryOptions {
    fn default() -> Self {
        Self {
            size: 1.0,
            depth: 2.0,
            curve_segments: 25,
        }
    }
}

/// Build extruded geometry for `text`
///
/// Normals are left zeroed; callers run [`Mesh::compute_vertex_normals`].
/// Characters the typeface lacks are drawn with its `?` glyph, or skipped when
/// it has none, with one warning per character.
pub fn build_text_geometry(source: &dyn GlyphSource, text: &str, options: &TextGeometryOptions) -> Mesh {
    let scale = options.size / source.resolution();
    let mut offset = Vec2::zeros();
    let mut vertices = Vec::new();
    let mut warned = HashSet::new();

    for ch in text.chars() {
        if ch == '\n' {
            offset.x = 0.0;
            offset.y -= source.line_height() * scale;
            continue;
        }

        let glyph = match source.glyph(ch) {
            Some(glyph) => glyph,
            None => {
                if warned.insert(ch) {
                    log::warn!("Character {:?} does not exist in typeface '{}'", ch, source.family_name());
                }
                match source.glyph('?') {
                    Some(glyph) => glyph,
                    None => continue,
                }
            }
        };

        let contours = flatten(&glyph.commands, scale, offset, options.curve_segments);
        match tessellate_caps(&contours) {
            Ok(cap) => {
                push_caps(&mut vertices, &cap, options.depth);
                for contour in &contours {
                    push_walls(&mut vertices, contour, cap.fills_left_of(contour), options.depth);
                }
            }
            Err(err) => log::warn!("Glyph {:?} could not be tessellated: {:?}", ch, err),
        }

        offset.x += glyph.advance * scale;
    }

    log::trace!("Extruded {:?} into {} triangles", text, vertices.len() / 3);
    Mesh::from_triangle_soup(vertices)
}

fn at(p: Vec2, z: f32) -> Vertex {
    Vertex::at(Vec3::new(p.x, p.y, z))
}

/// Front cap keeps the counter-clockwise order, the back cap reverses it
fn push_caps(vertices: &mut Vec<Vertex>, cap: &CapMesh, depth: f32) {
    let points = &cap.points;
    for &[a, b, c] in &cap.triangles {
        vertices.extend([at(points[c], 0.0), at(points[b], 0.0), at(points[a], 0.0)]);
    }
    for &[a, b, c] in &cap.triangles {
        vertices.extend([at(points[a], depth), at(points[b], depth), at(points[c], depth)]);
    }
}

/// Quads between consecutive contour points, facing away from the filled side
fn push_walls(vertices: &mut Vec<Vertex>, contour: &Contour, fill_on_left: bool, depth: f32) {
    let n = contour.len();
    for i in 0..n {
        let (mut p, mut q) = (contour[i], contour[(i + 1) % n]);
        if !fill_on_left {
            std::mem::swap(&mut p, &mut q);
        }
        let (a, b, c, d) = (at(p, 0.0), at(q, 0.0), at(q, depth), at(p, depth));
        vertices.extend([a, b, c, a, c, d]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::block_font::BlockTypeface;
    use crate::text::typeface::{tests::TINY_TYPEFACE, JsonTypeface};
    use approx::assert_relative_eq;

    fn built(source: &dyn GlyphSource, text: &str) -> Mesh {
        let mut mesh = build_text_geometry(source, text, &TextGeometryOptions::default());
        mesh.compute_vertex_normals();
        mesh.compute_bounding_box();
        mesh
    }

    #[test]
    fn test_depth_and_cap_orientation() {
        let mesh = built(&BlockTypeface::new(), "I");
        let bounds = mesh.bounding_box().unwrap();
        assert_relative_eq!(bounds.min.z, 0.0);
        assert_relative_eq!(bounds.max.z, 2.0);

        for v in &mesh.vertices {
            let n = v.norm();
            if v.pos().z == 0.0 && n.z.abs() > 0.5 {
                assert_relative_eq!(n, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
            }
            if v.pos().z == 2.0 && n.z.abs() > 0.5 {
                assert_relative_eq!(n, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_walls_face_outwards() {
        // Tiny 'I' is a single 0.2 x 0.7 bar
        let face = JsonTypeface::from_json(TINY_TYPEFACE).unwrap();
        let mesh = built(&face, "I");
        let mut walls = 0;
        for tri in mesh.triangles() {
            let n = tri[0].norm();
            if n.z.abs() > 0.5 {
                continue;
            }
            walls += 1;
            let p = tri[0].pos();
            if n.x < -0.5 {
                assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
            } else if n.x > 0.5 {
                assert_relative_eq!(p.x, 0.2, epsilon = 1e-6);
            } else if n.y < -0.5 {
                assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
            } else {
                assert!(n.y > 0.5);
                assert_relative_eq!(p.y, 0.7, epsilon = 1e-6);
            }
        }
        assert_eq!(walls, 8);
    }

    #[test]
    fn test_holes_are_not_filled() {
        let face = JsonTypeface::from_json(TINY_TYPEFACE).unwrap();
        let mesh = built(&face, "O");
        // The counter spans x, y in [0.15, 0.45] x [0.15, 0.55]; no cap triangle covers its middle
        let middle = Vec2::new(0.3, 0.35);
        for tri in mesh.triangles() {
            if tri[0].norm().z.abs() < 0.5 {
                continue;
            }
            let [a, b, c] = tri.map(|v| v.pos().xy());
            let s1 = (b - a).perp(&(middle - a));
            let s2 = (c - b).perp(&(middle - b));
            let s3 = (a - c).perp(&(middle - c));
            let inside = (s1 > 1e-6 && s2 > 1e-6 && s3 > 1e-6) || (s1 < -1e-6 && s2 < -1e-6 && s3 < -1e-6);
            assert!(!inside);
        }
    }

    #[test]
    fn test_advance_and_scale() {
        let face = BlockTypeface::new();
        let mesh = built(&face, "II");
        let bounds = mesh.bounding_box().unwrap();
        // Second 'I' starts one advance (0.6) to the right; the bar spans columns 1..4
        assert_relative_eq!(bounds.min.x, 0.1, epsilon = 1e-5);
        assert_relative_eq!(bounds.max.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(bounds.max.y, 0.7, epsilon = 1e-5);
    }

    #[test]
    fn test_unknown_character_is_drawn_as_question_mark() {
        let face = BlockTypeface::new();
        let with_unknown = built(&face, "€I");
        let with_question = built(&face, "?I");
        assert!(!with_unknown.vertices.is_empty());
        assert_eq!(with_unknown.vertices.len(), with_question.vertices.len());
        assert_eq!(with_unknown.bounding_box(), with_question.bounding_box());
    }

    #[test]
    fn test_unknown_character_without_fallback_is_skipped() {
        let face = JsonTypeface::from_json(&TINY_TYPEFACE.replace(r#""?": { "ha": 500, "o": "m 0 0 l 0 100 l 100 100 z" },"#, "")).unwrap();
        assert!(face.glyph('?').is_none());
        assert_eq!(built(&face, "€I").vertices.len(), built(&face, "I").vertices.len());
    }

    /// Outline of a circle made of four cubic quarter arcs, in the JSON `b` order
    fn circle_outline(cx: f32, cy: f32, r: f32, counter_clockwise: bool) -> String {
        let k = 0.552_284_8 * r;
        let s = if counter_clockwise { 1.0 } else { -1.0 };
        let at = |a: f32| (cx + r * a.cos(), cy + r * a.sin());
        let tangent = |a: f32| (-a.sin() * s, a.cos() * s);
        let (x0, y0) = at(0.0);
        let mut outline = format!("m {x0} {y0}");
        for quarter in 0..4 {
            let a0 = s * quarter as f32 * std::f32::consts::FRAC_PI_2;
            let a1 = a0 + s * std::f32::consts::FRAC_PI_2;
            let (p0, p3) = (at(a0), at(a1));
            let (t0, t3) = (tangent(a0), tangent(a1));
            let c1 = (p0.0 + k * t0.0, p0.1 + k * t0.1);
            let c2 = (p3.0 - k * t3.0, p3.1 - k * t3.1);
            outline.push_str(&format!(" b {} {} {} {} {} {}", p3.0, p3.1, c1.0, c1.1, c2.0, c2.1));
        }
        outline
    }

    #[test]
    fn test_curved_ring_glyph() {
        let ring = format!("{} {}", circle_outline(500.0, 500.0, 400.0, false), circle_outline(500.0, 500.0, 200.0, true));
        let json = format!(
            r#"{{ "familyName": "Ring", "resolution": 1000,
                  "boundingBox": {{ "yMin": -200, "yMax": 1000, "xMin": 0, "xMax": 1000 }}, "glyphs": {{ "o": {{ "ha": 1000, "o": "{ring}" }} }} }}"#
        );
        let face = JsonTypeface::from_json(&json).unwrap();
        let options = TextGeometryOptions::default();
        let mesh = built(&face, "o");
        let center = Vec2::new(0.5, 0.5);

        let mut front_area = 0.0;
        let mut wall_triangles = 0;
        for tri in mesh.triangles() {
            let n = tri[0].norm();
            let [a, b, c] = tri.map(|v| v.pos().xy());
            if n.z > 0.5 {
                front_area += (b - a).perp(&(c - a)) * 0.5;
                continue;
            }
            if n.z < -0.5 {
                continue;
            }
            wall_triangles += 1;
            let radial = (a + b + c) / 3.0 - center;
            let outward = Vec2::new(n.x, n.y).dot(&radial) > 0.0;
            // Outer walls face away from the center, the counter's walls face into it
            assert_eq!(outward, radial.norm() > 0.3);
        }

        let expected = std::f32::consts::PI * (0.4 * 0.4 - 0.2 * 0.2);
        assert_relative_eq!(front_area, expected, max_relative = 5e-3);
        // Eight curves, each split into curve_segments quads of two triangles
        assert_eq!(wall_triangles, 8 * 2 * options.curve_segments as usize);
        assert!(!mesh.triangles().any(|tri| {
            tri[0].norm().z.abs() > 0.5 && tri.iter().all(|v| (v.pos().xy() - center).norm() < 0.19)
        }));
    }

    #[test]
    fn test_empty_text() {
        let mesh = build_text_geometry(&BlockTypeface::new(), "", &TextGeometryOptions::default());
        assert!(mesh.vertices.is_empty());
    }
}
