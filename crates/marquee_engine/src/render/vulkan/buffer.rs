//! Host-visible staging buffer for frame uploads

use super::{VulkanError, VulkanResult};
use ash::{vk, Device, Instance};

/// Transfer-source buffer in host-visible, coherent memory
pub struct StagingBuffer {
    device: Device,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    size: vk::DeviceSize,
}

impl StagingBuffer {
    /// Allocate a buffer of `size` bytes
    pub fn new(
        device: Device,
        instance: &Instance,
        physical_device: vk::PhysicalDevice,
        size: vk::DeviceSize,
    ) -> VulkanResult<Self> {
        let buffer_info = vk::BufferCreateInfo::builder()
            .size(size)
            .usage(vk::BufferUsageFlags::TRANSFER_SRC)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe {
            device.create_buffer(&buffer_info, None)
                .map_err(VulkanError::Api)?
        };

        let requirements = unsafe { device.get_buffer_memory_requirements(buffer) };
        let memory_type_index = match find_memory_type(
            instance,
            physical_device,
            requirements.memory_type_bits,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        ) {
            Ok(index) => index,
            Err(err) => {
                unsafe { device.destroy_buffer(buffer, None) };
                return Err(err);
            }
        };

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type_index);

        let memory = match unsafe { device.allocate_memory(&alloc_info, None) } {
            Ok(memory) => memory,
            Err(err) => {
                unsafe { device.destroy_buffer(buffer, None) };
                return Err(VulkanError::Api(err));
            }
        };

        let staging = Self { device, buffer, memory, size };
        unsafe {
            staging.device.bind_buffer_memory(buffer, memory, 0)
                .map_err(VulkanError::Api)?;
        }
        log::debug!("Allocated {} byte staging buffer", size);
        Ok(staging)
    }

    /// Copy RGBA8 pixels in, swapping red and blue for BGRA targets
    pub fn upload(&self, rgba: &[u8], swizzle_bgra: bool) -> VulkanResult<()> {
        let len = rgba.len().min(self.size as usize);
        unsafe {
            let ptr = self.device
                .map_memory(self.memory, 0, self.size, vk::MemoryMapFlags::empty())
                .map_err(VulkanError::Api)?;
            let mapped = std::slice::from_raw_parts_mut(ptr.cast::<u8>(), len);
            write_pixels(mapped, &rgba[..len], swizzle_bgra);
            self.device.unmap_memory(self.memory);
        }
        Ok(())
    }

    /// Get buffer handle
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    /// Size in bytes
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }
}

impl Drop for StagingBuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_buffer(self.buffer, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

/// Copy RGBA8 bytes into `dst`, optionally as BGRA8
pub fn write_pixels(dst: &mut [u8], rgba: &[u8], swizzle_bgra: bool) {
    if !swizzle_bgra {
        dst.copy_from_slice(rgba);
        return;
    }
    for (out, src) in dst.chunks_exact_mut(4).zip(rgba.chunks_exact(4)) {
        out.copy_from_slice(&[src[2], src[1], src[0], src[3]]);
    }
}

/// Find memory type with required properties
pub fn find_memory_type(
    instance: &Instance,
    physical_device: vk::PhysicalDevice,
    type_filter: u32,
    properties: vk::MemoryPropertyFlags,
) -> VulkanResult<u32> {
    let mem_properties = unsafe {
        instance.get_physical_device_memory_properties(physical_device)
    };

    (0..mem_properties.memory_type_count)
        .find(|&i| {
            (type_filter & (1 << i)) != 0
                && mem_properties.memory_types[i as usize].property_flags.contains(properties)
        })
        .ok_or(VulkanError::NoSuitableMemoryType)
}
