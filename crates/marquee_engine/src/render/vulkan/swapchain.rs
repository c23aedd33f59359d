//! Vulkan swapchain management
//!
//! Images are written by transfer commands only, so the swapchain is created
//! with `TRANSFER_DST` usage and a UNORM format when one is offered (the
//! uploaded pixels are already display-encoded).

use super::context::{PhysicalDeviceInfo, VulkanContext};
use super::{VulkanError, VulkanResult};
use ash::extensions::khr::{Surface, Swapchain as SwapchainLoader};
use ash::vk;

/// Swapchain wrapper with RAII cleanup
pub struct Swapchain {
    loader: SwapchainLoader,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    format: vk::SurfaceFormatKHR,
    extent: vk::Extent2D,
}

impl Swapchain {
    /// Create a swapchain, retiring `old_swapchain` if it is not null
    pub fn new(
        context: &VulkanContext,
        window_extent: vk::Extent2D,
        old_swapchain: vk::SwapchainKHR,
    ) -> VulkanResult<Self> {
        let physical = &context.physical_device;
        let surface = context.surface;
        let loader = SwapchainLoader::new(context.instance(), context.device());

        let caps = unsafe {
            context.surface_loader
                .get_physical_device_surface_capabilities(physical.device, surface)
                .map_err(VulkanError::Api)?
        };
        if !caps.supported_usage_flags.contains(vk::ImageUsageFlags::TRANSFER_DST) {
            return Err(VulkanError::InitializationFailed(
                "Surface images cannot be transfer destinations".to_string()
            ));
        }

        let format = choose_format(&context.surface_loader, physical, surface)?;
        let present_mode = choose_present_mode(&context.surface_loader, physical, surface)?;
        let extent = choose_extent(&caps, window_extent);

        let image_count = if caps.max_image_count > 0 {
            (caps.min_image_count + 1).min(caps.max_image_count)
        } else {
            caps.min_image_count + 1
        };

        let families = [physical.graphics_family, physical.present_family];
        let create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(surface)
            .min_image_count(image_count)
            .image_format(format.format)
            .image_color_space(format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::TRANSFER_DST)
            .pre_transform(caps.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);
        let create_info = if physical.graphics_family == physical.present_family {
            create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        } else {
            create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&families)
        };

        let swapchain = unsafe {
            loader.create_swapchain(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        let images = match unsafe { loader.get_swapchain_images(swapchain) } {
            Ok(images) => images,
            Err(err) => {
                unsafe { loader.destroy_swapchain(swapchain, None) };
                return Err(VulkanError::Api(err));
            }
        };

        log::info!(
            "Swapchain created: {}x{}, {:?}, {:?}, {} images",
            extent.width, extent.height, format.format, present_mode, images.len()
        );
        Ok(Self {
            loader,
            swapchain,
            images,
            format,
            extent,
        })
    }

    /// Get swapchain extent
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Get surface format
    pub fn format(&self) -> vk::SurfaceFormatKHR {
        self.format
    }

    /// Whether images store blue first
    pub fn is_bgra(&self) -> bool {
        matches!(self.format.format, vk::Format::B8G8R8A8_UNORM | vk::Format::B8G8R8A8_SRGB)
    }

    /// Swapchain images
    pub fn images(&self) -> &[vk::Image] {
        &self.images
    }

    /// Get swapchain handle
    pub fn handle(&self) -> vk::SwapchainKHR {
        self.swapchain
    }

    /// Get swapchain loader
    pub fn loader(&self) -> &SwapchainLoader {
        &self.loader
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_swapchain(self.swapchain, None);
        }
    }
}

fn choose_format(
    surface_loader: &Surface,
    physical: &PhysicalDeviceInfo,
    surface: vk::SurfaceKHR,
) -> VulkanResult<vk::SurfaceFormatKHR> {
    let formats = unsafe {
        surface_loader
            .get_physical_device_surface_formats(physical.device, surface)
            .map_err(VulkanError::Api)?
    };

    [vk::Format::B8G8R8A8_UNORM, vk::Format::R8G8B8A8_UNORM]
        .iter()
        .find_map(|&wanted| formats.iter().find(|sf| sf.format == wanted).copied())
        .or_else(|| formats.first().copied())
        .ok_or_else(|| VulkanError::InitializationFailed("Surface reports no formats".to_string()))
}

fn choose_present_mode(
    surface_loader: &Surface,
    physical: &PhysicalDeviceInfo,
    surface: vk::SurfaceKHR,
) -> VulkanResult<vk::PresentModeKHR> {
    let modes = unsafe {
        surface_loader
            .get_physical_device_surface_present_modes(physical.device, surface)
            .map_err(VulkanError::Api)?
    };

    Ok(modes
        .iter()
        .copied()
        .find(|&mode| mode == vk::PresentModeKHR::MAILBOX)
        .unwrap_or(vk::PresentModeKHR::FIFO))
}

fn choose_extent(caps: &vk::SurfaceCapabilitiesKHR, window_extent: vk::Extent2D) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        return caps.current_extent;
    }
    vk::Extent2D {
        width: window_extent.width.clamp(caps.min_image_extent.width, caps.max_image_extent.width),
        height: window_extent.height.clamp(caps.min_image_extent.height, caps.max_image_extent.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_follows_surface_when_fixed() {
        let caps = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D { width: 800, height: 600 },
            ..Default::default()
        };
        let extent = choose_extent(&caps, vk::Extent2D { width: 1, height: 1 });
        assert_eq!((extent.width, extent.height), (800, 600));
    }

    #[test]
    fn test_extent_clamps_window_size() {
        let caps = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D { width: u32::MAX, height: u32::MAX },
            min_image_extent: vk::Extent2D { width: 16, height: 16 },
            max_image_extent: vk::Extent2D { width: 1024, height: 1024 },
            ..Default::default()
        };
        let extent = choose_extent(&caps, vk::Extent2D { width: 4000, height: 8 });
        assert_eq!((extent.width, extent.height), (1024, 16));
    }
}
