//! Planar reflection for the floor
//!
//! Reflected geometry is drawn mirrored through `y = 0` with the main camera,
//! so a floor pixel finds its reflection at the same normalized screen
//! position. The sharp image is then Kawase blurred; texel offsets come from
//! the blur size and are independent of the target's pixel size.

use super::framebuffer::DepthBuffer;
use super::raster::{draw_triangle, CullMode, Fragment, RasterVertex};
use crate::foundation::math::{utils::smoothstep, Mat4, Mat4Ext, Vec3};
use crate::render::primitives::Mesh;
use crate::scene::ReflectorSettings;

/// Offsets of the successive blur passes, in texels
const KAWASE_KERNEL: [f32; 5] = [0.0, 1.0, 2.0, 2.0, 3.0];

/// Blurred share added to the depth factor before weighting the blurred image
const DEPTH_TO_BLUR_RATIO_BIAS: f32 = 0.25;

/// Offscreen reflection target
#[derive(Debug, Clone)]
pub struct ReflectionTarget {
    width: u32,
    height: u32,
    sharp: Vec<Vec3>,
    blurred: Vec<Vec3>,
    scratch: Vec<Vec3>,
    depth: DepthBuffer,
}

impl ReflectionTarget {
    /// Target sized for a frame, no wider or taller than `resolution`
    pub fn new(frame_width: u32, frame_height: u32, resolution: u32) -> Self {
        let (width, height) = Self::size_for(frame_width, frame_height, resolution);
        let texels = (width as usize) * (height as usize);
        Self {
            width,
            height,
            sharp: vec![Vec3::zeros(); texels],
            blurred: vec![Vec3::zeros(); texels],
            scratch: vec![Vec3::zeros(); texels],
            depth: DepthBuffer::new(width, height),
        }
    }

    /// Frame size scaled down so the longer side fits `resolution`
    pub fn size_for(frame_width: u32, frame_height: u32, resolution: u32) -> (u32, u32) {
        let longest = frame_width.max(frame_height).max(1);
        let scale = (resolution as f32 / longest as f32).min(1.0);
        let w = ((frame_width as f32 * scale).round() as u32).max(1);
        let h = ((frame_height as f32 * scale).round() as u32).max(1);
        (w, h)
    }

    /// Target width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Target height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Draw `items` mirrored through the floor plane
    ///
    /// `shade` receives the item index and a fragment whose world position
    /// and normal are those of the unmirrored surface. Anything below the
    /// floor is clipped away.
    pub fn render<'a, F>(&mut self, view_projection: &Mat4, items: impl IntoIterator<Item = (usize, &'a Mesh)>, shade: &mut F)
    where
        F: FnMut(usize, &Fragment) -> Vec3,
    {
        self.sharp.fill(Vec3::zeros());
        self.depth.clear();

        let mirrored = view_projection * Mat4::reflect_y();
        for (item, mesh) in items {
            let sharp = &mut self.sharp;
            let mut write = |fragment: &Fragment| {
                if fragment.world.y < 0.0 {
                    return false;
                }
                sharp[fragment.index] = shade(item, fragment);
                true
            };
            for tri in mesh.triangles() {
                let verts = tri.map(|v| {
                    let world = v.pos();
                    RasterVertex {
                        clip: mirrored * world.push(1.0),
                        world,
                        normal: v.norm(),
                    }
                });
                // Mirroring flips winding, so the visible faces now read as back faces
                draw_triangle(&mut self.depth, verts, CullMode::Front, &mut write);
            }
        }
    }

    /// Blur the sharp image with blur size `[horizontal, vertical]`
    pub fn blur(&mut self, blur: [u32; 2]) {
        if blur[0] == 0 || blur[1] == 0 {
            self.blurred.copy_from_slice(&self.sharp);
            return;
        }
        let texel = (1.0 / blur[0] as f32, 1.0 / blur[1] as f32);

        self.blurred.copy_from_slice(&self.sharp);
        for k in KAWASE_KERNEL {
            let offset = (texel.0 * (k + 0.5), texel.1 * (k + 0.5));
            for y in 0..self.height {
                for x in 0..self.width {
                    let u = (x as f32 + 0.5) / self.width as f32;
                    let v = (y as f32 + 0.5) / self.height as f32;
                    let sum = bilinear(&self.blurred, self.width, self.height, u - offset.0, v + offset.1)
                        + bilinear(&self.blurred, self.width, self.height, u + offset.0, v + offset.1)
                        + bilinear(&self.blurred, self.width, self.height, u + offset.0, v - offset.1)
                        + bilinear(&self.blurred, self.width, self.height, u - offset.0, v - offset.1);
                    self.scratch[(y * self.width + x) as usize] = sum * 0.25;
                }
            }
            std::mem::swap(&mut self.blurred, &mut self.scratch);
        }
    }

    /// Sharp colour, blurred colour and depth at normalized screen position `(u, v)`
    pub fn sample(&self, u: f32, v: f32) -> (Vec3, Vec3, f32) {
        let sharp = bilinear(&self.sharp, self.width, self.height, u, v);
        let blurred = bilinear(&self.blurred, self.width, self.height, u, v);
        let depth = self.depth.sample_clamped(
            (u * self.width as f32).floor() as i64,
            (v * self.height as f32).floor() as i64,
        );
        (sharp, blurred, depth)
    }
}

/// Bilinear fetch with clamp-to-edge, texel centers at half-integer coordinates
fn bilinear(data: &[Vec3], width: u32, height: u32, u: f32, v: f32) -> Vec3 {
    let fx = (u * width as f32 - 0.5).clamp(0.0, (width - 1) as f32);
    let fy = (v * height as f32 - 0.5).clamp(0.0, (height - 1) as f32);
    let (x0, y0) = (fx.floor() as u32, fy.floor() as u32);
    let (x1, y1) = ((x0 + 1).min(width - 1), (y0 + 1).min(height - 1));
    let (tx, ty) = (fx - x0 as f32, fy - y0 as f32);
    let at = |x: u32, y: u32| data[(y * width + x) as usize];
    let top = at(x0, y0).lerp(&at(x1, y0), tx);
    let bottom = at(x0, y1).lerp(&at(x1, y1), tx);
    top.lerp(&bottom, ty)
}

/// Reflection term the floor's albedo is boosted by
///
/// The floor's albedo becomes `albedo * (1 + mix_reflection(..) * mix_strength)`.
pub fn mix_reflection(settings: &ReflectorSettings, sharp: Vec3, blurred: Vec3, depth: f32) -> Vec3 {
    let depth_factor = (smoothstep(settings.min_depth_threshold, 1.0, 1.0 - depth) * settings.depth_scale)
        .clamp(0.0001, 1.0);
    let blurred = blurred * (depth_factor + DEPTH_TO_BLUR_RATIO_BIAS).min(1.0);
    let sharp = sharp * (depth_factor + 0.5).min(1.0);
    let blur_factor = (settings.mix_blur * settings.roughness).min(1.0);
    sharp.lerp(&blurred, blur_factor)
}
