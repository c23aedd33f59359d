//! Directional shadow maps
//!
//! Casters are drawn depth-only from the light's orthographic camera. Like
//! most real-time renderers, back faces go into the map, which keeps lit
//! front faces clear of self-shadowing acne.

use super::framebuffer::DepthBuffer;
use super::raster::{draw_triangle, CullMode, RasterVertex};
use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::lighting::DirectionalLight;
use crate::render::primitives::Mesh;

/// Depth map rendered from one light
#[derive(Debug, Clone)]
pub struct ShadowMap {
    view_projection: Mat4,
    depth: DepthBuffer,
    bias: f32,
}

impl ShadowMap {
    /// Empty map sized for `light`
    pub fn new(light: &DirectionalLight) -> Self {
        let size = light.shadow.map_size.max(1);
        Self {
            view_projection: light.shadow_view_projection(),
            depth: DepthBuffer::new(size, size),
            bias: light.shadow.bias,
        }
    }

    /// Map resolution
    pub fn size(&self) -> u32 {
        self.depth.width()
    }

    /// Clear and draw every caster
    pub fn render<'a>(&mut self, casters: impl IntoIterator<Item = &'a Mesh>) {
        self.depth.clear();
        let mut triangles = 0usize;
        for mesh in casters {
            for tri in mesh.triangles() {
                let verts = tri.map(|v| {
                    let world = v.pos();
                    RasterVertex {
                        clip: self.view_projection * world.push(1.0),
                        world,
                        normal: v.norm(),
                    }
                });
                draw_triangle(&mut self.depth, verts, CullMode::Front, &mut |_| true);
                triangles += 1;
            }
        }
        log::trace!("Shadow map ({}²) rendered {} triangles", self.size(), triangles);
    }

    /// Fraction of light reaching `world`, 3×3 percentage-closer filtered
    ///
    /// Points outside the light's frustum are fully lit.
    pub fn visibility(&self, world: Vec3) -> f32 {
        let clip: Vec4 = self.view_projection * world.push(1.0);
        let ndc = clip.xyz() / clip.w;
        if !(-1.0..=1.0).contains(&ndc.x) || !(-1.0..=1.0).contains(&ndc.y) || !(0.0..=1.0).contains(&ndc.z) {
            return 1.0;
        }

        let size = self.size() as f32;
        let tx = ((ndc.x * 0.5 + 0.5) * size).floor() as i64;
        let ty = ((ndc.y * 0.5 + 0.5) * size).floor() as i64;
        let reference = ndc.z - self.bias;

        let mut lit = 0.0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if reference <= self.depth.sample_clamped(tx + dx, ty + dy) {
                    lit += 1.0;
                }
            }
        }
        lit / 9.0
    }
}
