//! CPU render backend
//!
//! Rasterizes the scene into a retained RGBA8 colour target. A frame runs
//! these passes in order:
//! 1. shadow maps, redrawn only when casters or lights changed
//! 2. the mirrored scene into the floor's reflection target, then its blur
//! 3. the floor and the text, shaded with the standard surface model
//! 4. the UI overlay, drawn over a copy of the scene that goes to the window
//!
//! Screenshots read the scene target, so they never contain the panel.

pub mod font_atlas;
pub mod framebuffer;
pub mod overlay;
pub mod raster;
pub mod reflector;
pub mod shading;
pub mod shadow_map;

pub use font_atlas::{FontAtlas, FontError};
pub use framebuffer::{BufferState, DepthBuffer, Framebuffer};
pub use reflector::ReflectionTarget;
pub use shadow_map::ShadowMap;

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::api::{BackendConfig, BackendResult, DrawItem, FloorItem, MeshHandle, RenderBackend, RenderFrameData};
use crate::render::lighting::{DirectionalLight, LightingEnvironment};
use crate::render::primitives::{Mesh, Vertex};
use crate::render::RenderError;
use raster::{draw_triangle, CullMode, Fragment, RasterVertex};
use reflector::mix_reflection;
use shading::{color_to_linear, encode_pixel, shade_standard, LightSample, Surface};
use slotmap::SlotMap;

/// Shadow maps together with what they were drawn from
#[derive(Debug, Default)]
struct ShadowCache {
    maps: Vec<Option<ShadowMap>>,
    lights: Vec<DirectionalLight>,
    casters: Vec<MeshHandle>,
    dirty: bool,
}

/// Lights resolved for one frame
struct LightRig<'a> {
    lights: &'a [DirectionalLight],
    maps: &'a [Option<ShadowMap>],
    ambient: Vec3,
}

impl LightRig<'_> {
    fn samples(&self, world: Vec3, receive_shadow: bool) -> Vec<LightSample> {
        self.lights
            .iter()
            .zip(self.maps)
            .map(|(light, map)| LightSample {
                to_light: light.to_light(),
                radiance: color_to_linear(light.color) * light.intensity,
                visibility: match map {
                    Some(map) if receive_shadow => map.visibility(world),
                    _ => 1.0,
                },
            })
            .collect()
    }

    fn shade(&self, item: &DrawItem<'_>, fragment: &Fragment, eye: Vec3) -> Vec3 {
        let normal = fragment.normal.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::z);
        let to_eye = (eye - fragment.world).try_normalize(f32::EPSILON).unwrap_or(normal);
        let surface = Surface {
            albedo: color_to_linear(item.material.color),
            metalness: item.material.metalness,
            roughness: item.material.roughness,
            normal,
            to_eye,
        };
        shade_standard(&surface, self.ambient, &self.samples(fragment.world, item.receive_shadow))
    }
}

/// Software rasterizer implementing [`RenderBackend`]
#[derive(Debug)]
pub struct SoftwareRenderer {
    config: BackendConfig,
    framebuffer: Framebuffer,
    presentation: Framebuffer,
    depth: DepthBuffer,
    fonts: FontAtlas,
    meshes: SlotMap<MeshHandle, Mesh>,
    shadows: ShadowCache,
    reflection: Option<ReflectionTarget>,
    frame_count: u64,
}

impl SoftwareRenderer {
    /// Backend with a colour target of the given size
    pub fn new(config: BackendConfig, width: u32, height: u32) -> BackendResult<Self> {
        let (width, height) = (width.max(1), height.max(1));
        log::info!(
            "Software renderer {}x{} (preserve drawing buffer: {})",
            width,
            height,
            config.preserve_drawing_buffer
        );
        let fonts = FontAtlas::bundled().map_err(|e| RenderError::InitializationFailed(e.to_string()))?;
        Ok(Self {
            framebuffer: Framebuffer::new(width, height, config.preserve_drawing_buffer),
            presentation: Framebuffer::new(width, height, true),
            depth: DepthBuffer::new(width, height),
            fonts,
            meshes: SlotMap::with_key(),
            shadows: ShadowCache { dirty: true, ..ShadowCache::default() },
            reflection: None,
            frame_count: 0,
            config,
        })
    }

    /// Renderer configuration
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Frames rendered so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Mesh behind a handle
    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle)
    }

    fn update_shadows(&mut self, lighting: &LightingEnvironment, items: &[DrawItem<'_>]) -> BackendResult<()> {
        let casters: Vec<MeshHandle> = items.iter().filter(|i| i.cast_shadow).map(|i| i.mesh).collect();
        let cache = &mut self.shadows;
        if !cache.dirty && cache.lights == lighting.directional && cache.casters == casters {
            return Ok(());
        }

        let mut caster_meshes = Vec::with_capacity(casters.len());
        for &handle in &casters {
            caster_meshes.push(lookup(&self.meshes, handle)?);
        }

        cache.maps = lighting
            .directional
            .iter()
            .map(|light| {
                light.cast_shadow.then(|| {
                    let mut map = ShadowMap::new(light);
                    map.render(caster_meshes.iter().copied());
                    map
                })
            })
            .collect();
        cache.lights = lighting.directional.clone();
        cache.casters = casters;
        cache.dirty = false;
        log::debug!("Shadow maps redrawn for {} lights", cache.maps.len());
        Ok(())
    }

    fn render_reflection(&mut self, frame: &RenderFrameData<'_>, floor: &FloorItem<'_>) -> BackendResult<()> {
        let settings = &floor.config.reflector;
        let (width, height) = (self.framebuffer.width(), self.framebuffer.height());
        let size = ReflectionTarget::size_for(width, height, settings.resolution);
        if self.reflection.as_ref().map(|t| (t.width(), t.height())) != Some(size) {
            log::debug!("Reflection target resized to {}x{}", size.0, size.1);
            self.reflection = None;
        }
        let target = self
            .reflection
            .get_or_insert_with(|| ReflectionTarget::new(width, height, settings.resolution));

        let mut items = Vec::with_capacity(frame.items.len());
        for (index, item) in frame.items.iter().enumerate() {
            items.push((index, lookup(&self.meshes, item.mesh)?));
        }

        let rig = LightRig {
            lights: &frame.lighting.directional,
            maps: &self.shadows.maps,
            ambient: frame.lighting.ambient(),
        };
        let eye = frame.camera.position;
        let mirrored_eye = Vec3::new(eye.x, -eye.y, eye.z);
        let view_projection = frame.camera.get_view_projection_matrix();
        target.render(&view_projection, items, &mut |index, fragment| {
            rig.shade(&frame.items[index], fragment, mirrored_eye)
        });
        target.blur(settings.blur);
        Ok(())
    }

    fn draw_floor(&mut self, frame: &RenderFrameData<'_>, floor: &FloorItem<'_>) -> BackendResult<()> {
        let mesh = lookup(&self.meshes, floor.mesh)?;
        let Some(reflection) = self.reflection.as_ref() else {
            return Err(RenderError::RenderingFailed("reflection target missing".to_string()));
        };
        let settings = &floor.config.reflector;
        let base = color_to_linear(floor.config.color);
        let ambient = frame.lighting.ambient();
        let eye = frame.camera.position;
        let (width, height) = (self.framebuffer.width() as f32, self.framebuffer.height() as f32);
        let view_projection = frame.camera.get_view_projection_matrix();
        let lights: Vec<LightSample> = frame
            .lighting
            .directional
            .iter()
            .map(|light| LightSample {
                to_light: light.to_light(),
                radiance: color_to_linear(light.color) * light.intensity,
                visibility: 1.0,
            })
            .collect();

        let pixels = self.framebuffer.pixels_mut();
        let mut write = |fragment: &Fragment| {
            let (u, v) = ((fragment.x as f32 + 0.5) / width, (fragment.y as f32 + 0.5) / height);
            let (sharp, blurred, depth) = reflection.sample(u, v);
            let reflected = mix_reflection(settings, sharp, blurred, depth);
            let normal = fragment.normal.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::y);
            let surface = Surface {
                albedo: base.component_mul(&(Vec3::repeat(1.0) + reflected * settings.mix_strength)),
                metalness: settings.metalness,
                roughness: settings.roughness,
                normal,
                to_eye: (eye - fragment.world).try_normalize(f32::EPSILON).unwrap_or(normal),
            };
            pixels[fragment.index] = encode_pixel(shade_standard(&surface, ambient, &lights));
            true
        };
        for tri in mesh.triangles() {
            draw_triangle(&mut self.depth, vertices(&view_projection, tri), CullMode::Back, &mut write);
        }
        Ok(())
    }

    fn draw_items(&mut self, frame: &RenderFrameData<'_>) -> BackendResult<()> {
        let view_projection = frame.camera.get_view_projection_matrix();
        let eye = frame.camera.position;
        let rig = LightRig {
            lights: &frame.lighting.directional,
            maps: &self.shadows.maps,
            ambient: frame.lighting.ambient(),
        };
        let pixels = self.framebuffer.pixels_mut();
        for item in frame.items {
            let mesh = lookup(&self.meshes, item.mesh)?;
            let mut write = |fragment: &Fragment| {
                pixels[fragment.index] = encode_pixel(rig.shade(item, fragment, eye));
                true
            };
            for tri in mesh.triangles() {
                draw_triangle(&mut self.depth, vertices(&view_projection, tri), CullMode::Back, &mut write);
            }
        }
        Ok(())
    }
}

fn lookup(meshes: &SlotMap<MeshHandle, Mesh>, handle: MeshHandle) -> BackendResult<&Mesh> {
    meshes
        .get(handle)
        .ok_or_else(|| RenderError::RenderingFailed(format!("unknown mesh handle {:?}", handle)))
}

fn vertices(view_projection: &Mat4, tri: [&Vertex; 3]) -> [RasterVertex; 3] {
    tri.map(|v| {
        let world = v.pos();
        RasterVertex {
            clip: view_projection * Vec4::new(world.x, world.y, world.z, 1.0),
            world,
            normal: v.norm(),
        }
    })
}

impl RenderBackend for SoftwareRenderer {
    fn get_extent(&self) -> (u32, u32) {
        (self.framebuffer.width(), self.framebuffer.height())
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        self.framebuffer.resize(width, height);
        self.presentation.resize(width, height);
        self.depth.resize(width, height);
    }

    fn create_mesh_resource(&mut self, mesh: &Mesh) -> BackendResult<MeshHandle> {
        if mesh.vertices.is_empty() && !mesh.indices.is_empty() {
            return Err(RenderError::ResourceCreationFailed("indices without vertices".to_string()));
        }
        let handle = self.meshes.insert(mesh.clone());
        self.shadows.dirty = true;
        log::debug!("Mesh {:?} created ({} triangles)", handle, mesh.triangle_count());
        Ok(handle)
    }

    fn update_mesh_resource(&mut self, handle: MeshHandle, mesh: &Mesh) -> BackendResult<()> {
        let Some(slot) = self.meshes.get_mut(handle) else {
            return Err(RenderError::RenderingFailed(format!("unknown mesh handle {:?}", handle)));
        };
        *slot = mesh.clone();
        self.shadows.dirty = true;
        log::debug!("Mesh {:?} updated ({} triangles)", handle, mesh.triangle_count());
        Ok(())
    }

    fn destroy_mesh_resource(&mut self, handle: MeshHandle) -> BackendResult<()> {
        self.meshes
            .remove(handle)
            .ok_or_else(|| RenderError::RenderingFailed(format!("unknown mesh handle {:?}", handle)))?;
        self.shadows.dirty = true;
        log::debug!("Mesh {:?} destroyed", handle);
        Ok(())
    }

    fn render_frame(&mut self, frame: &RenderFrameData<'_>) -> BackendResult<()> {
        self.framebuffer.clear(frame.background.to_rgba8());
        self.depth.clear();

        self.update_shadows(frame.lighting, frame.items)?;
        if let Some(floor) = &frame.floor {
            self.render_reflection(frame, floor)?;
            self.draw_floor(frame, floor)?;
        }
        self.draw_items(frame)?;
        self.presentation.copy_from(&self.framebuffer);
        overlay::draw(&mut self.presentation, frame.ui, &mut self.fonts);

        self.frame_count += 1;
        log::trace!("Frame {} rendered ({} items)", self.frame_count, frame.items.len());
        Ok(())
    }

    fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    fn presentation(&self) -> &Framebuffer {
        &self.presentation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::color::Color;
    use crate::render::material::StandardMaterial;
    use crate::render::primitives::Camera;
    use crate::scene::{FloorConfig, ReflectiveFloor};
    use crate::ui::UIRenderData;

    fn renderer() -> SoftwareRenderer {
        SoftwareRenderer::new(BackendConfig::default(), 96, 54).unwrap()
    }

    #[test]
    fn test_empty_scene_is_background() {
        let mut renderer = renderer();
        let camera = Camera::default();
        let lighting = LightingEnvironment::stage();
        let ui = UIRenderData::empty();
        let frame = RenderFrameData {
            camera: &camera,
            lighting: &lighting,
            background: Color::from_rgb8(10, 20, 30),
            items: &[],
            floor: None,
            ui: &ui,
        };
        renderer.render_frame(&frame).unwrap();
        assert_eq!(renderer.framebuffer().pixel(0, 0), Some([10, 20, 30, 255]));
        assert_eq!(renderer.frame_count(), 1);
    }

    #[test]
    fn test_floor_and_text_draw_over_background() {
        let mut renderer = renderer();
        let camera = Camera::default();
        let lighting = LightingEnvironment::stage();
        let ui = UIRenderData::empty();

        let floor = ReflectiveFloor::new(FloorConfig::with_color(Color::from_hex("#808080").unwrap()));
        let floor_handle = renderer.create_mesh_resource(floor.mesh()).unwrap();

        let mut block = Mesh::plane(2.0, 2.0);
        block.translate(Vec3::new(0.0, 2.0, 0.0));
        let handle = renderer.create_mesh_resource(&block).unwrap();
        let material = StandardMaterial::new();
        let items = [DrawItem { mesh: handle, material: &material, cast_shadow: true, receive_shadow: true }];

        let frame = RenderFrameData {
            camera: &camera,
            lighting: &lighting,
            background: Color::BLACK,
            items: &items,
            floor: Some(FloorItem { mesh: floor_handle, config: floor.config() }),
            ui: &ui,
        };
        renderer.render_frame(&frame).unwrap();

        let fb = renderer.framebuffer();
        // Bottom rows see the floor, the image center sees the block
        let bottom = fb.pixel(48, 53).unwrap();
        assert!(bottom[0] > 0);
        let center = fb.pixel(48, 27).unwrap();
        assert_ne!(center, [0, 0, 0, 255]);
    }

    #[test]
    fn test_unknown_handle_is_an_error() {
        let mut renderer = renderer();
        let handle = renderer.create_mesh_resource(&Mesh::plane(1.0, 1.0)).unwrap();
        renderer.destroy_mesh_resource(handle).unwrap();
        assert!(renderer.destroy_mesh_resource(handle).is_err());
        assert!(renderer.update_mesh_resource(handle, &Mesh::plane(1.0, 1.0)).is_err());
    }

    #[test]
    fn test_shadow_maps_are_cached_until_meshes_change() {
        let mut renderer = renderer();
        let lighting = LightingEnvironment::stage();
        let handle = renderer.create_mesh_resource(&Mesh::plane(1.0, 1.0)).unwrap();
        let material = StandardMaterial::new();
        let items = [DrawItem { mesh: handle, material: &material, cast_shadow: true, receive_shadow: true }];

        renderer.update_shadows(&lighting, &items).unwrap();
        assert!(!renderer.shadows.dirty);
        assert_eq!(renderer.shadows.maps.len(), 2);

        renderer.update_mesh_resource(handle, &Mesh::plane(2.0, 2.0)).unwrap();
        assert!(renderer.shadows.dirty);
        renderer.update_shadows(&lighting, &items).unwrap();
        assert!(!renderer.shadows.dirty);
    }

    #[test]
    fn test_resize() {
        let mut renderer = renderer();
        renderer.resize(32, 16);
        assert_eq!(renderer.get_extent(), (32, 16));
        assert_eq!(renderer.framebuffer().state(), BufferState::Empty);
    }

    #[test]
    fn test_overlay_only_reaches_the_presentation_copy() {
        let mut renderer = renderer();
        let camera = Camera::default();
        let lighting = LightingEnvironment::stage();
        let ui = UIRenderData {
            quads: vec![crate::ui::RenderQuad {
                position: crate::foundation::math::Vec2::new(0.0, 0.0),
                size: crate::foundation::math::Vec2::new(10.0, 10.0),
                color: Vec4::new(1.0, 0.0, 0.0, 1.0),
                depth: 0.0,
            }],
            texts: Vec::new(),
        };
        let frame = RenderFrameData {
            camera: &camera,
            lighting: &lighting,
            background: Color::BLACK,
            items: &[],
            floor: None,
            ui: &ui,
        };
        renderer.render_frame(&frame).unwrap();
        assert_eq!(renderer.presentation().pixel(5, 5), Some([255, 0, 0, 255]));
        assert_eq!(renderer.framebuffer().pixel(5, 5), Some([0, 0, 0, 255]));
        assert_eq!(renderer.presentation().pixel(50, 30), renderer.framebuffer().pixel(50, 30));
    }
}
