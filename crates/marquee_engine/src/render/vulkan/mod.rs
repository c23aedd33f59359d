//! Vulkan presentation
//!
//! The CPU colour target is uploaded into a host-visible staging buffer and
//! copied into the acquired swapchain image with transfer commands; no
//! pipelines or render passes are involved.

pub mod buffer;
pub mod commands;
pub mod context;
pub mod presenter;
pub mod swapchain;
pub mod sync;

pub use buffer::{find_memory_type, StagingBuffer};
pub use commands::{CommandPool, UploadRegion};
pub use context::{PhysicalDeviceInfo, VulkanContext};
pub use presenter::{PresentOutcome, Presenter};
pub use swapchain::Swapchain;
pub use sync::{Fence, FrameSync, Semaphore};

use ash::vk;
use thiserror::Error;

/// Vulkan-specific error types
#[derive(Error, Debug)]
pub enum VulkanError {
    /// Vulkan API call failed with a result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// Context or swapchain setup failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// No memory type satisfies the requested properties
    #[error("No suitable memory type found")]
    NoSuitableMemoryType,
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;

impl From<VulkanError> for crate::render::RenderError {
    fn from(err: VulkanError) -> Self {
        crate::render::RenderError::BackendError(err.to_string())
    }
}
