//! Vulkan objects needed to put a CPU frame on screen
//!
//! One instance, the window surface, a device that can present to it and the
//! two queues the presenter submits to. Nothing here knows about pipelines.

use super::{VulkanError, VulkanResult};
use crate::render::api::BackendConfig;
use crate::render::window::Window;
use ash::extensions::khr::{Surface, Swapchain as SwapchainLoader};
use ash::{vk, Device, Entry, Instance};
use std::ffi::{CStr, CString};

const VALIDATION_LAYER: &CStr = unsafe { CStr::from_bytes_with_nul_unchecked(b"VK_LAYER_KHRONOS_validation\0") };

fn c_string(value: &str) -> VulkanResult<CString> {
    CString::new(value).map_err(|e| VulkanError::InitializationFailed(format!("Invalid name {:?}: {}", value, e)))
}

/// Device that can present to the window, with its queue families
#[derive(Debug, Clone, Copy)]
pub struct PhysicalDeviceInfo {
    /// Vulkan physical device handle
    pub device: vk::PhysicalDevice,
    /// Family the upload commands are submitted to
    pub graphics_family: u32,
    /// Family that presents to the surface
    pub present_family: u32,
}

/// Everything the presenter borrows from Vulkan for one window
pub struct VulkanContext {
    _entry: Entry,
    instance: Instance,
    /// Surface extension loader
    pub surface_loader: Surface,
    /// Window surface
    pub surface: vk::SurfaceKHR,
    /// Selected device
    pub physical_device: PhysicalDeviceInfo,
    device: Device,
    /// Queue the upload commands go to
    pub graphics_queue: vk::Queue,
    /// Queue presentation goes to
    pub present_queue: vk::Queue,
}

impl VulkanContext {
    /// Bring up Vulkan for `window`
    pub fn new(window: &mut Window, config: &BackendConfig) -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }
            .map_err(|e| VulkanError::InitializationFailed(format!("Failed to load Vulkan: {:?}", e)))?;
        let instance = create_instance(&entry, window, config)?;

        let surface_loader = Surface::new(&entry, &instance);
        let surface = match window.create_vulkan_surface(instance.handle()) {
            Ok(surface) => surface,
            Err(e) => {
                unsafe { instance.destroy_instance(None) };
                return Err(VulkanError::InitializationFailed(format!("Surface creation: {}", e)));
            }
        };

        let device = select_device(&instance, surface, &surface_loader)
            .and_then(|physical| create_device(&instance, &physical).map(|device| (physical, device)));
        let (physical_device, device) = match device {
            Ok(pair) => pair,
            Err(err) => {
                unsafe {
                    surface_loader.destroy_surface(surface, None);
                    instance.destroy_instance(None);
                }
                return Err(err);
            }
        };

        let graphics_queue = unsafe { device.get_device_queue(physical_device.graphics_family, 0) };
        let present_queue = unsafe { device.get_device_queue(physical_device.present_family, 0) };

        Ok(Self {
            _entry: entry,
            instance,
            surface_loader,
            surface,
            physical_device,
            device,
            graphics_queue,
            present_queue,
        })
    }

    /// The Vulkan instance
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// The logical device
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// A clone of the device handle for objects that destroy themselves
    pub fn raw_device(&self) -> Device {
        self.device.clone()
    }

    /// Block until the device is idle
    pub fn wait_idle(&self) -> VulkanResult<()> {
        unsafe { self.device.device_wait_idle().map_err(VulkanError::Api) }
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);
            self.instance.destroy_instance(None);
        }
    }
}

/// Instance with the window's surface extensions; the validation layer is
/// added when requested and installed, and reports through its own output
fn create_instance(entry: &Entry, window: &Window, config: &BackendConfig) -> VulkanResult<Instance> {
    let app_name = c_string(&config.application_name)?;
    let engine_name = c_string("Marquee")?;
    let (major, minor, patch) = config.application_version;
    let app_info = vk::ApplicationInfo::builder()
        .application_name(&app_name)
        .application_version(vk::make_api_version(0, major, minor, patch))
        .engine_name(&engine_name)
        .engine_version(vk::make_api_version(0, 0, 1, 0))
        .api_version(vk::API_VERSION_1_0);

    let extension_names = window
        .get_required_instance_extensions()
        .map_err(|e| VulkanError::InitializationFailed(e.to_string()))?
        .iter()
        .map(|name| c_string(name))
        .collect::<VulkanResult<Vec<_>>>()?;
    let extensions: Vec<_> = extension_names.iter().map(|name| name.as_ptr()).collect();

    let installed = entry
        .enumerate_instance_layer_properties()
        .map(|layers| {
            layers
                .iter()
                .any(|layer| unsafe { CStr::from_ptr(layer.layer_name.as_ptr()) } == VALIDATION_LAYER)
        })
        .unwrap_or(false);
    let validation = config.validation_enabled() && installed;
    if config.validation_enabled() && !installed {
        log::warn!("{:?} requested but not installed; continuing without it", VALIDATION_LAYER);
    }
    let layers = if validation { vec![VALIDATION_LAYER.as_ptr()] } else { Vec::new() };

    let create_info = vk::InstanceCreateInfo::builder()
        .application_info(&app_info)
        .enabled_extension_names(&extensions)
        .enabled_layer_names(&layers);
    let instance = unsafe { entry.create_instance(&create_info, None) }.map_err(VulkanError::Api)?;

    log::info!("Vulkan instance created (validation: {})", validation);
    Ok(instance)
}

/// First device with a graphics family, a family that presents to `surface`
/// and the swapchain extension
fn select_device(instance: &Instance, surface: vk::SurfaceKHR, surface_loader: &Surface) -> VulkanResult<PhysicalDeviceInfo> {
    let devices = unsafe { instance.enumerate_physical_devices() }.map_err(VulkanError::Api)?;

    for device in devices {
        let families = unsafe { instance.get_physical_device_queue_family_properties(device) };
        let graphics_family = families
            .iter()
            .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
            .map(|index| index as u32);
        let present_family = (0..families.len() as u32).find(|&index| unsafe {
            surface_loader
                .get_physical_device_surface_support(device, index, surface)
                .unwrap_or(false)
        });

        let extensions = unsafe { instance.enumerate_device_extension_properties(device) }.map_err(VulkanError::Api)?;
        let has_swapchain = extensions
            .iter()
            .any(|ext| unsafe { CStr::from_ptr(ext.extension_name.as_ptr()) } == SwapchainLoader::name());

        let properties = unsafe { instance.get_physical_device_properties(device) };
        let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }.to_string_lossy();
        match (graphics_family, present_family, has_swapchain) {
            (Some(graphics_family), Some(present_family), true) => {
                log::info!("Selected GPU: {}", name);
                return Ok(PhysicalDeviceInfo {
                    device,
                    graphics_family,
                    present_family,
                });
            }
            _ => log::debug!("Skipping GPU {}: cannot present to the window", name),
        }
    }

    Err(VulkanError::InitializationFailed("No suitable GPU found".to_string()))
}

/// Logical device with one queue per distinct family
fn create_device(instance: &Instance, physical: &PhysicalDeviceInfo) -> VulkanResult<Device> {
    let mut families = vec![physical.graphics_family];
    if physical.present_family != physical.graphics_family {
        families.push(physical.present_family);
    }
    let priorities = [1.0];
    let queue_infos: Vec<_> = families
        .iter()
        .map(|&family| {
            vk::DeviceQueueCreateInfo::builder()
                .queue_family_index(family)
                .queue_priorities(&priorities)
                .build()
        })
        .collect();

    let extensions = [SwapchainLoader::name().as_ptr()];
    let create_info = vk::DeviceCreateInfo::builder()
        .queue_create_infos(&queue_infos)
        .enabled_extension_names(&extensions);

    unsafe { instance.create_device(physical.device, &create_info, None) }.map_err(VulkanError::Api)
}
