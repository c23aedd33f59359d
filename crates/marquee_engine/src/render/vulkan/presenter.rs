//! Swapchain presenter
//!
//! Shows a [`Framebuffer`] in the window: upload to the staging buffer,
//! record a clear and a buffer-to-image copy, submit and present. One frame
//! is in flight at a time.

use super::buffer::StagingBuffer;
use super::commands::{record_upload, CommandPool, UploadRegion};
use super::context::VulkanContext;
use super::swapchain::Swapchain;
use super::sync::FrameSync;
use super::{VulkanError, VulkanResult};
use crate::render::api::BackendConfig;
use crate::render::software::Framebuffer;
use crate::render::window::Window;
use ash::vk;

/// Result of a presentation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// The frame reached the window
    Presented,
    /// Nothing was shown (minimized window or swapchain being rebuilt)
    Skipped,
}

/// Copies finished frames into the window's swapchain
///
/// Fields drop in declaration order after [`Drop::drop`] waited for the device.
pub struct Presenter {
    sync: FrameSync,
    staging: Option<StagingBuffer>,
    command_buffer: vk::CommandBuffer,
    command_pool: CommandPool,
    swapchain: Option<Swapchain>,
    needs_recreate: bool,
    context: VulkanContext,
}

impl Presenter {
    /// Bring up Vulkan for `window`
    pub fn new(window: &mut Window, config: &BackendConfig) -> VulkanResult<Self> {
        let context = VulkanContext::new(window, config)?;
        let device = context.raw_device();

        let command_pool = CommandPool::new(device.clone(), context.physical_device.graphics_family)?;
        let command_buffer = command_pool.allocate()?;
        let sync = FrameSync::new(device)?;

        let mut presenter = Self {
            sync,
            staging: None,
            command_buffer,
            command_pool,
            swapchain: None,
            needs_recreate: true,
            context,
        };
        presenter.recreate_swapchain(window.get_framebuffer_size())?;
        Ok(presenter)
    }

    /// Current swapchain extent, if a swapchain exists
    pub fn extent(&self) -> Option<(u32, u32)> {
        self.swapchain.as_ref().map(|s| (s.extent().width, s.extent().height))
    }

    /// Rebuild the swapchain before the next frame
    pub fn request_recreate(&mut self) {
        self.needs_recreate = true;
    }

    /// Show `frame`, rebuilding the swapchain first if the window changed
    pub fn present(&mut self, frame: &Framebuffer, window_size: (u32, u32)) -> VulkanResult<PresentOutcome> {
        if self.needs_recreate && !self.recreate_swapchain(window_size)? {
            return Ok(PresentOutcome::Skipped);
        }
        let Some(swapchain) = self.swapchain.as_ref() else {
            return Ok(PresentOutcome::Skipped);
        };

        self.sync.in_flight.wait(u64::MAX)?;

        let acquired = unsafe {
            swapchain.loader().acquire_next_image(
                swapchain.handle(),
                u64::MAX,
                self.sync.image_available.handle(),
                vk::Fence::null(),
            )
        };
        let image_index = match acquired {
            Ok((index, suboptimal)) => {
                self.needs_recreate |= suboptimal;
                index
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                log::debug!("Swapchain out of date on acquire");
                self.needs_recreate = true;
                return Ok(PresentOutcome::Skipped);
            }
            Err(err) => return Err(VulkanError::Api(err)),
        };
        let image = swapchain
            .images()
            .get(image_index as usize)
            .copied()
            .ok_or(VulkanError::Api(vk::Result::ERROR_UNKNOWN))?;

        let bytes = frame.as_bytes();
        let needed = bytes.len() as vk::DeviceSize;
        if self.staging.as_ref().map_or(true, |s| s.size() != needed) && needed > 0 {
            self.staging = None;
            self.staging = Some(StagingBuffer::new(
                self.context.raw_device(),
                self.context.instance(),
                self.context.physical_device.device,
                needed,
            )?);
        }

        let extent = swapchain.extent();
        let mut region = UploadRegion {
            image,
            buffer: vk::Buffer::null(),
            row_length: frame.width(),
            extent: vk::Extent2D {
                width: frame.width().min(extent.width),
                height: frame.height().min(extent.height),
            },
        };
        match self.staging.as_ref() {
            Some(staging) if needed > 0 => {
                staging.upload(bytes, swapchain.is_bgra())?;
                region.buffer = staging.handle();
            }
            _ => region.extent = vk::Extent2D::default(),
        }

        let device = self.context.device();
        self.sync.in_flight.reset()?;
        record_upload(device, self.command_buffer, &region)?;

        let wait_semaphores = [self.sync.image_available.handle()];
        let wait_stages = [vk::PipelineStageFlags::TRANSFER];
        let signal_semaphores = [self.sync.transfer_finished.handle()];
        let command_buffers = [self.command_buffer];
        let submit = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores)
            .build();
        unsafe {
            device.queue_submit(self.context.graphics_queue, &[submit], self.sync.in_flight.handle())
                .map_err(VulkanError::Api)?;
        }

        let swapchains = [swapchain.handle()];
        let indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&indices);
        let presented = unsafe { swapchain.loader().queue_present(self.context.present_queue, &present_info) };
        match presented {
            Ok(suboptimal) => self.needs_recreate |= suboptimal,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                log::debug!("Swapchain out of date on present");
                self.needs_recreate = true;
            }
            Err(err) => return Err(VulkanError::Api(err)),
        }

        log::trace!("Presented image {} ({}x{})", image_index, region.extent.width, region.extent.height);
        Ok(PresentOutcome::Presented)
    }

    /// Returns false while the window has no area
    fn recreate_swapchain(&mut self, window_size: (u32, u32)) -> VulkanResult<bool> {
        if window_size.0 == 0 || window_size.1 == 0 {
            return Ok(false);
        }
        self.context.wait_idle()?;

        let old = self.swapchain.as_ref().map_or(vk::SwapchainKHR::null(), Swapchain::handle);
        let window_extent = vk::Extent2D { width: window_size.0, height: window_size.1 };
        let swapchain = Swapchain::new(&self.context, window_extent, old)?;
        self.swapchain = Some(swapchain);
        self.needs_recreate = false;
        Ok(true)
    }
}

impl Drop for Presenter {
    fn drop(&mut self) {
        if let Err(err) = self.context.wait_idle() {
            log::warn!("Device wait failed during shutdown: {}", err);
        }
    }
}
