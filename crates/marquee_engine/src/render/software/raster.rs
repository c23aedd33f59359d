//! Triangle rasterization
//!
//! Triangles arrive in Vulkan clip space. They are clipped against the near
//! and far planes, mapped to pixels (row 0 at the top) and scanned with edge
//! functions. World position and normal are interpolated perspective
//! correctly.

use super::framebuffer::DepthBuffer;
use crate::foundation::math::{Vec3, Vec4};

/// A vertex after the vertex stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterVertex {
    /// Clip-space position
    pub clip: Vec4,
    /// World-space position
    pub world: Vec3,
    /// World-space normal
    pub normal: Vec3,
}

impl RasterVertex {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            clip: self.clip.lerp(&other.clip, t),
            world: self.world.lerp(&other.world, t),
            normal: self.normal.lerp(&other.normal, t),
        }
    }
}

/// Which faces to skip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// Draw everything
    None,
    /// Skip faces pointing away from the viewer
    Back,
    /// Skip faces that are front facing
    Front,
}

/// A covered pixel that passed the depth test
#[derive(Debug, Clone, Copy)]
pub struct Fragment {
    /// Linear pixel index
    pub index: usize,
    /// Pixel column
    pub x: u32,
    /// Pixel row, 0 at the top
    pub y: u32,
    /// Depth in `[0, 1]`
    pub depth: f32,
    /// Interpolated world position
    pub world: Vec3,
    /// Interpolated world normal, not normalized
    pub normal: Vec3,
}

/// Rasterize one triangle into `depth`
///
/// `shade` runs for every fragment that passes the depth test; returning
/// `false` discards the fragment and leaves the depth buffer untouched.
pub fn draw_triangle<F>(depth: &mut DepthBuffer, triangle: [RasterVertex; 3], cull: CullMode, shade: &mut F)
where
    F: FnMut(&Fragment) -> bool,
{
    let polygon = clip_polygon(&triangle);
    if polygon.len() < 3 {
        return;
    }
    for i in 1..polygon.len() - 1 {
        scan_triangle(depth, [polygon[0], polygon[i], polygon[i + 1]], cull, shade);
    }
}

/// Sutherland-Hodgman against `z >= 0` and `z <= w`
fn clip_polygon(triangle: &[RasterVertex; 3]) -> Vec<RasterVertex> {
    let near = |v: &RasterVertex| v.clip.z;
    let far = |v: &RasterVertex| v.clip.w - v.clip.z;

    let planes: [&dyn Fn(&RasterVertex) -> f32; 2] = [&near, &far];

    let mut polygon: Vec<RasterVertex> = triangle.to_vec();
    for plane in planes {
        if polygon.is_empty() {
            break;
        }
        let mut clipped = Vec::with_capacity(polygon.len() + 1);
        for i in 0..polygon.len() {
            let current = polygon[i];
            let next = polygon[(i + 1) % polygon.len()];
            let (dc, dn) = (plane(&current), plane(&next));
            if dc >= 0.0 {
                clipped.push(current);
            }
            if (dc >= 0.0) != (dn >= 0.0) {
                clipped.push(current.lerp(&next, dc / (dc - dn)));
            }
        }
        polygon = clipped;
    }
    polygon
}

fn edge(a: (f32, f32), b: (f32, f32), p: (f32, f32)) -> f32 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

fn scan_triangle<F>(depth: &mut DepthBuffer, tri: [RasterVertex; 3], cull: CullMode, shade: &mut F)
where
    F: FnMut(&Fragment) -> bool,
{
    let (width, height) = (depth.width() as f32, depth.height() as f32);
    if tri.iter().any(|v| v.clip.w <= f32::EPSILON) {
        return;
    }

    let inv_w = tri.map(|v| 1.0 / v.clip.w);
    let screen = [0, 1, 2].map(|i| {
        let ndc_x = tri[i].clip.x * inv_w[i];
        let ndc_y = tri[i].clip.y * inv_w[i];
        ((ndc_x * 0.5 + 0.5) * width, (ndc_y * 0.5 + 0.5) * height)
    });
    let z = [0, 1, 2].map(|i| tri[i].clip.z * inv_w[i]);

    let area = edge(screen[0], screen[1], screen[2]);
    if area.abs() <= f32::EPSILON {
        return;
    }
    // Counter-clockwise world faces come out with negative area once Y points down
    let front_facing = area < 0.0;
    match cull {
        CullMode::Back if !front_facing => return,
        CullMode::Front if front_facing => return,
        _ => {}
    }

    let min_x = screen.iter().map(|p| p.0).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
    let max_x = screen.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max).ceil().min(width) as u32;
    let min_y = screen.iter().map(|p| p.1).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
    let max_y = screen.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max).ceil().min(height) as u32;

    let row_stride = depth.width() as usize;
    for py in min_y..max_y {
        for px in min_x..max_x {
            let p = (px as f32 + 0.5, py as f32 + 0.5);
            let b0 = edge(screen[1], screen[2], p) / area;
            let b1 = edge(screen[2], screen[0], p) / area;
            let b2 = edge(screen[0], screen[1], p) / area;
            if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
                continue;
            }

            let frag_depth = b0 * z[0] + b1 * z[1] + b2 * z[2];
            let index = py as usize * row_stride + px as usize;
            if !(0.0..=1.0).contains(&frag_depth) || frag_depth >= depth.get(index) {
                continue;
            }

            // Perspective-correct weights
            let (w0, w1, w2) = (b0 * inv_w[0], b1 * inv_w[1], b2 * inv_w[2]);
            let sum = w0 + w1 + w2;
            let (w0, w1, w2) = (w0 / sum, w1 / sum, w2 / sum);

            let fragment = Fragment {
                index,
                x: px,
                y: py,
                depth: frag_depth,
                world: tri[0].world * w0 + tri[1].world * w1 + tri[2].world * w2,
                normal: tri[0].normal * w0 + tri[1].normal * w1 + tri[2].normal * w2,
            };
            if shade(&fragment) {
                depth.set(index, frag_depth);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32, y: f32, z: f32) -> RasterVertex {
        RasterVertex {
            clip: Vec4::new(x, y, z, 1.0),
            world: Vec3::new(x, y, z),
            normal: Vec3::z(),
        }
    }

    fn count(depth: &mut DepthBuffer, tri: [RasterVertex; 3], cull: CullMode) -> usize {
        let mut covered = 0;
        draw_triangle(depth, tri, cull, &mut |_| {
            covered += 1;
            true
        });
        covered
    }

    // Clockwise in NDC with Y down, which is how a front face lands on screen
    fn front_facing_quad_half(z: f32) -> [RasterVertex; 3] {
        [vertex(-1.0, -1.0, z), vertex(-1.0, 1.0, z), vertex(1.0, 1.0, z)]
    }

    #[test]
    fn test_half_screen_coverage() {
        let mut depth = DepthBuffer::new(8, 8);
        // Pixels on the diagonal fall inside through the inclusive edge test
        let covered = count(&mut depth, front_facing_quad_half(0.5), CullMode::None);
        assert!((32..=40).contains(&covered));
    }

    #[test]
    fn test_depth_test_rejects_farther_triangle() {
        let mut depth = DepthBuffer::new(8, 8);
        let near = count(&mut depth, front_facing_quad_half(0.2), CullMode::None);
        let far = count(&mut depth, front_facing_quad_half(0.6), CullMode::None);
        assert!(near > 0);
        assert_eq!(far, 0);
    }

    #[test]
    fn test_culling() {
        let mut depth = DepthBuffer::new(8, 8);
        assert!(count(&mut depth, front_facing_quad_half(0.5), CullMode::Back) > 0);
        let mut depth = DepthBuffer::new(8, 8);
        assert_eq!(count(&mut depth, front_facing_quad_half(0.5), CullMode::Front), 0);
    }

    #[test]
    fn test_near_plane_clipping() {
        let mut depth = DepthBuffer::new(8, 8);
        let tri = [vertex(-1.0, -1.0, -0.5), vertex(-1.0, 1.0, 0.5), vertex(1.0, 1.0, 0.5)];
        let mut min_depth = f32::INFINITY;
        draw_triangle(&mut depth, tri, CullMode::None, &mut |f| {
            min_depth = min_depth.min(f.depth);
            true
        });
        assert!(min_depth >= 0.0);
    }

    #[test]
    fn test_discarded_fragment_keeps_depth() {
        let mut depth = DepthBuffer::new(4, 4);
        draw_triangle(&mut depth, front_facing_quad_half(0.5), CullMode::None, &mut |_| false);
        assert!((0..16).all(|i| depth.get(i) == 1.0));
    }
}
