//! Frame rendering data structures
//!
//! The host assembles this once per frame; the backend handles the complete
//! frame (shadows, reflection, shading, overlay) internally.

use super::render_backend::MeshHandle;
use crate::foundation::color::Color;
use crate::render::lighting::LightingEnvironment;
use crate::render::material::StandardMaterial;
use crate::render::primitives::Camera;
use crate::scene::FloorConfig;
use crate::ui::UIRenderData;

/// One opaque mesh to draw
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    /// Mesh resource, already in world space
    pub mesh: MeshHandle,
    /// Surface material
    pub material: &'a StandardMaterial,
    /// Whether the mesh is drawn into shadow maps
    pub cast_shadow: bool,
    /// Whether shadow maps darken the mesh
    pub receive_shadow: bool,
}

/// The reflective floor
#[derive(Debug, Clone, Copy)]
pub struct FloorItem<'a> {
    /// Floor mesh resource
    pub mesh: MeshHandle,
    /// Colour and reflector parameters
    pub config: &'a FloorConfig,
}

/// Complete frame rendering data
#[derive(Debug, Clone, Copy)]
pub struct RenderFrameData<'a> {
    /// Camera parameters (view/projection matrices)
    pub camera: &'a Camera,

    /// Lighting environment (all lights in scene)
    pub lighting: &'a LightingEnvironment,

    /// Clear colour, written without lighting or tone mapping
    pub background: Color,

    /// Meshes shown above the floor and in its reflection
    pub items: &'a [DrawItem<'a>],

    /// Reflective floor, if any
    pub floor: Option<FloorItem<'a>>,

    /// UI overlay data (quads, text)
    pub ui: &'a UIRenderData,
}
