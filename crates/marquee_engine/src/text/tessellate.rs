//! Cap tessellation
//!
//! Flattened glyph contours are filled with `lyon`'s fill tessellator under
//! the non-zero rule, so counters and overlapping strokes come out of the
//! winding of the contours themselves.

use super::outline::{signed_area, Contour};
use crate::foundation::math::Vec2;
use lyon_path::math::Point;
use lyon_path::Path;
use lyon_tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, TessellationError, VertexBuffers};

/// Filled area of a glyph
#[derive(Debug, Clone, Default)]
pub struct CapMesh {
    /// Tessellator output vertices
    pub points: Vec<Vec2>,
    /// Counter-clockwise triangles indexing into `points`
    pub triangles: Vec<[usize; 3]>,
}

impl CapMesh {
    /// Total area covered by the triangles
    pub fn area(&self) -> f32 {
        self.triangles.iter().map(|&tri| triangle_area(self.corners(tri))).sum()
    }

    /// Whether `point` lies inside (or on the edge of) any triangle
    pub fn covers(&self, point: Vec2) -> bool {
        self.triangles.iter().any(|&tri| {
            let [a, b, c] = self.corners(tri);
            let s1 = (b - a).perp(&(point - a));
            let s2 = (c - b).perp(&(point - b));
            let s3 = (a - c).perp(&(point - c));
            s1 >= 0.0 && s2 >= 0.0 && s3 >= 0.0
        })
    }

    /// Whether the filled region lies to the left of the contour
    ///
    /// Samples both sides of the longest edge's midpoint. An edge with fill on
    /// both sides or neither (shared with another contour) falls back to the
    /// contour's own winding.
    pub fn fills_left_of(&self, contour: &Contour) -> bool {
        let n = contour.len();
        let counter_clockwise = signed_area(contour) > 0.0;
        let Some((p, q)) = (0..n)
            .map(|i| (contour[i], contour[(i + 1) % n]))
            .max_by(|a, b| (a.1 - a.0).norm_squared().total_cmp(&(b.1 - b.0).norm_squared()))
        else {
            return counter_clockwise;
        };
        let edge = q - p;
        let normal = Vec2::new(-edge.y, edge.x) * 1e-3;
        let middle = (p + q) * 0.5;
        match (self.covers(middle + normal), self.covers(middle - normal)) {
            (left, right) if left != right => left,
            _ => counter_clockwise,
        }
    }

    fn corners(&self, [a, b, c]: [usize; 3]) -> [Vec2; 3] {
        [self.points[a], self.points[b], self.points[c]]
    }
}

fn triangle_area([a, b, c]: [Vec2; 3]) -> f32 {
    (b - a).perp(&(c - a)) * 0.5
}

/// Fill the region enclosed by `contours`
///
/// Triangles come back counter-clockwise whatever the winding of the input;
/// zero-area triangles are dropped.
pub fn tessellate_caps(contours: &[Contour]) -> Result<CapMesh, TessellationError> {
    let mut builder = Path::builder();
    for contour in contours {
        let Some((first, rest)) = contour.split_first() else {
            continue;
        };
        builder.begin(Point::new(first.x, first.y));
        for p in rest {
            builder.line_to(Point::new(p.x, p.y));
        }
        builder.end(true);
    }
    let path = builder.build();

    let mut geometry: VertexBuffers<Vec2, u32> = VertexBuffers::new();
    FillTessellator::new().tessellate_path(
        &path,
        &FillOptions::non_zero(),
        &mut BuffersBuilder::new(&mut geometry, |vertex: FillVertex| {
            Vec2::new(vertex.position().x, vertex.position().y)
        }),
    )?;

    let mut cap = CapMesh {
        points: geometry.vertices,
        triangles: Vec::with_capacity(geometry.indices.len() / 3),
    };
    for tri in geometry.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let area = triangle_area(cap.corners([a, b, c]));
        if area > 0.0 {
            cap.triangles.push([a, b, c]);
        } else if area < 0.0 {
            cap.triangles.push([a, c, b]);
        }
    }
    Ok(cap)
}
