//! Public rendering API
//!
//! The backend trait, its configuration and the per-frame data the host hands
//! to it.

pub mod frame_data;
pub mod render_backend;
pub mod renderer_config;

pub use frame_data::{DrawItem, FloorItem, RenderFrameData};
pub use render_backend::{BackendResult, MeshHandle, RenderBackend};
pub use renderer_config::BackendConfig;
