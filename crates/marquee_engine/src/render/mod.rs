//! Rendering system
//!
//! - `primitives`: camera, mesh and bounds
//! - `lighting` / `material`: scene lights and surface parameters
//! - `api`: the backend trait and per-frame data
//! - `software`: the CPU rasterizer that produces every frame
//! - `window` / `vulkan`: the GLFW window and the swapchain presenter

pub mod api;
pub mod lighting;
pub mod material;
pub mod primitives;
pub mod software;
pub mod vulkan;
pub mod window;

pub use api::{BackendConfig, BackendResult, DrawItem, FloorItem, MeshHandle, RenderBackend, RenderFrameData};
pub use lighting::{DirectionalLight, LightingEnvironment, ShadowConfig};
pub use material::StandardMaterial;
pub use primitives::{BoundingBox, Camera, GeometryError, Mesh, Vertex};
pub use software::{BufferState, Framebuffer, SoftwareRenderer};

use thiserror::Error;

/// Rendering system errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Renderer initialization failed during setup
    ///
    /// Occurs when the presentation path cannot be brought up, typically
    /// because of missing graphics drivers or an unsupported surface.
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// A rendering operation failed during execution
    ///
    /// Raised for frames that reference mesh handles the backend does not
    /// know about.
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// Resource creation or management failed
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Backend-specific error occurred
    ///
    /// Wraps presenter errors (Vulkan) in a generic form.
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
