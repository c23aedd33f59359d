//! Backend abstraction traits for the rendering system
//!
//! A backend owns mesh resources behind opaque handles and turns one
//! [`RenderFrameData`] into the pixels of its colour target.

use super::frame_data::RenderFrameData;
use crate::render::primitives::Mesh;
use crate::render::software::Framebuffer;
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

slotmap::new_key_type! {
    /// Handle to a mesh resource stored in the backend
    pub struct MeshHandle;
}

/// Main rendering backend trait
pub trait RenderBackend {
    /// Size of the colour target (width, height)
    fn get_extent(&self) -> (u32, u32);

    /// Resize the colour target; its contents are lost
    fn resize(&mut self, width: u32, height: u32);

    /// Store a mesh and return an opaque handle
    fn create_mesh_resource(&mut self, mesh: &Mesh) -> BackendResult<MeshHandle>;

    /// Replace the geometry behind a handle
    fn update_mesh_resource(&mut self, handle: MeshHandle, mesh: &Mesh) -> BackendResult<()>;

    /// Release a mesh
    fn destroy_mesh_resource(&mut self, handle: MeshHandle) -> BackendResult<()>;

    /// Draw a complete frame into the colour target
    fn render_frame(&mut self, frame: &RenderFrameData<'_>) -> BackendResult<()>;

    /// The colour target holding the scene alone; screenshots read this
    fn framebuffer(&self) -> &Framebuffer;

    /// The colour target, for presentation bookkeeping
    fn framebuffer_mut(&mut self) -> &mut Framebuffer;

    /// The scene with the UI overlay on top, as shown in the window
    fn presentation(&self) -> &Framebuffer;
}
