/// VulkanGraphicsDevice - Vulkan implementation of the GraphicsDevice trait

use ash::vk;
use galaxy_3d_surface::galaxy3d::render::{Config, GraphicsDevice, NativeSurface, WindowHandle};
use galaxy_3d_surface::galaxy3d::{Error, Result};
use galaxy_3d_surface::{engine_err, engine_error, engine_info, engine_warn};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::{c_char, CString};
use std::sync::Arc;

use crate::vulkan_context::VulkanContext;
use crate::vulkan_surface::VulkanSurface;

const LOG_SOURCE: &str = "galaxy3d::vulkan";

type DebugMessenger = (ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT);

/// Physical device and queue families picked for a window
struct DeviceSelection {
    physical_device: vk::PhysicalDevice,
    graphics_family: u32,
    present_family: u32,
    name: String,
}

/// Vulkan device implementation
///
/// Owns the instance and logical device (through the shared `VulkanContext`)
/// and creates one `VulkanSurface` per window.
pub struct VulkanGraphicsDevice {
    context: Arc<VulkanContext>,
    name: String,
}

impl VulkanGraphicsDevice {
    /// Create a Vulkan device able to present to `window`
    ///
    /// Loads Vulkan, creates an instance with the window-system extensions,
    /// picks a GPU with a graphics queue and a queue that can present to the
    /// window, and creates the logical device with VK_KHR_swapchain.
    ///
    /// # Errors
    ///
    /// `Construction` if any of these steps fails.
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(window: &W, config: Config) -> Result<Self> {
        let window_handle = WindowHandle::from_window(window)?;

        // Create Vulkan Entry
        let entry = unsafe { ash::Entry::load() }.map_err(|e| {
            engine_error!(LOG_SOURCE, "Failed to load Vulkan library: {:?}", e);
            Error::Construction(format!("Failed to load Vulkan library: {:?}", e))
        })?;

        let app_name = CString::new(config.app_name.clone()).map_err(|e| {
            engine_error!(LOG_SOURCE, "Invalid application name: {}", e);
            Error::Construction(format!("Invalid application name: {}", e))
        })?;
        let (major, minor, patch) = config.app_version;
        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, major, minor, patch))
            .engine_name(c"Galaxy3D")
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_1);

        // Get required extensions
        #[cfg_attr(not(feature = "vulkan-validation"), allow(unused_mut))]
        let mut extension_names: Vec<*const c_char> =
            ash_window::enumerate_required_extensions(window_handle.raw_display_handle())
                .map_err(|e| {
                    engine_error!(LOG_SOURCE, "Failed to get required extensions: {:?}", e);
                    Error::Construction(format!("Failed to get required extensions: {:?}", e))
                })?
                .to_vec();

        let validation = config.enable_validation && cfg!(feature = "vulkan-validation");
        if config.enable_validation && !validation {
            engine_warn!(
                LOG_SOURCE,
                "Validation requested but the backend was built without the vulkan-validation feature"
            );
        }

        #[cfg_attr(not(feature = "vulkan-validation"), allow(unused_mut))]
        let mut layer_names: Vec<*const c_char> = Vec::new();
        #[cfg(feature = "vulkan-validation")]
        if validation {
            extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            layer_names.push(crate::debug::VALIDATION_LAYER.as_ptr());
        }

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layer_names)
            .enabled_extension_names(&extension_names);

        let instance = unsafe { entry.create_instance(&create_info, None) }.map_err(|e| {
            engine_error!(LOG_SOURCE, "Failed to create Vulkan instance: {:?}", e);
            Error::Construction(format!("Failed to create instance: {:?}", e))
        })?;

        // Setup debug messenger if validation is enabled
        #[cfg(feature = "vulkan-validation")]
        let debug = if validation {
            match crate::debug::create_debug_messenger(&entry, &instance, &config) {
                Ok((loader, messenger)) => Some((loader, messenger)),
                Err(e) => {
                    unsafe { instance.destroy_instance(None) };
                    return Err(e);
                }
            }
        } else {
            None
        };
        #[cfg(not(feature = "vulkan-validation"))]
        let debug: Option<DebugMessenger> = None;

        let destroy_instance = |debug: &Option<DebugMessenger>| unsafe {
            #[cfg(feature = "vulkan-validation")]
            crate::debug::cleanup_debug_config();
            if let Some((loader, messenger)) = debug {
                loader.destroy_debug_utils_messenger(*messenger, None);
            }
            instance.destroy_instance(None);
        };

        // Pick the GPU against a temporary surface for this window
        let selection = Self::select_device(&entry, &instance, &window_handle);
        let selection = match selection {
            Ok(selection) => selection,
            Err(e) => {
                destroy_instance(&debug);
                return Err(e);
            }
        };

        // Create Logical Device
        let queue_priorities = [1.0];
        let mut queue_create_infos = vec![vk::DeviceQueueCreateInfo::default()
            .queue_family_index(selection.graphics_family)
            .queue_priorities(&queue_priorities)];
        if selection.present_family != selection.graphics_family {
            queue_create_infos.push(
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(selection.present_family)
                    .queue_priorities(&queue_priorities),
            );
        }

        let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];
        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&device_extension_names);

        let device = match unsafe {
            instance.create_device(selection.physical_device, &device_create_info, None)
        } {
            Ok(device) => device,
            Err(e) => {
                engine_error!(LOG_SOURCE, "Failed to create logical device: {:?}", e);
                destroy_instance(&debug);
                return Err(Error::Construction(format!("Failed to create device: {:?}", e)));
            }
        };

        let (debug_utils_loader, debug_messenger) = match debug {
            Some((loader, messenger)) => (Some(loader), Some(messenger)),
            None => (None, None),
        };

        engine_info!(
            LOG_SOURCE,
            "Vulkan device '{}' created (graphics family {}, present family {}, validation {})",
            selection.name,
            selection.graphics_family,
            selection.present_family,
            validation
        );

        let context = VulkanContext::new(
            entry,
            instance,
            selection.physical_device,
            device,
            selection.graphics_family,
            selection.present_family,
            debug_utils_loader,
            debug_messenger,
        );

        Ok(Self {
            context: Arc::new(context),
            name: selection.name,
        })
    }

    /// Share the device between surfaces
    pub fn into_shared(self) -> Arc<dyn GraphicsDevice> {
        Arc::new(self)
    }

    /// Find a GPU that can render and present to the window
    ///
    /// Discrete GPUs are preferred over the others.
    fn select_device(
        entry: &ash::Entry,
        instance: &ash::Instance,
        window: &WindowHandle,
    ) -> Result<DeviceSelection> {
        let surface_loader = ash::khr::surface::Instance::new(entry, instance);
        let surface = unsafe {
            ash_window::create_surface(
                entry,
                instance,
                window.raw_display_handle(),
                window.raw_window_handle(),
                None,
            )
        }
        .map_err(|e| {
            engine_error!(LOG_SOURCE, "Failed to create surface: {:?}", e);
            Error::Construction(format!("Failed to create surface: {:?}", e))
        })?;

        let result = Self::select_device_for_surface(instance, &surface_loader, surface);

        // Destroy temporary surface
        unsafe { surface_loader.destroy_surface(surface, None) };
        result
    }

    fn select_device_for_surface(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
    ) -> Result<DeviceSelection> {
        let physical_devices = unsafe { instance.enumerate_physical_devices() }.map_err(|e| {
            engine_error!(LOG_SOURCE, "Failed to enumerate physical devices: {:?}", e);
            Error::Construction(format!("Failed to enumerate physical devices: {:?}", e))
        })?;

        let mut candidates: Vec<(DeviceSelection, bool)> = Vec::new();
        for physical_device in physical_devices {
            let properties = unsafe { instance.get_physical_device_properties(physical_device) };
            let queue_families =
                unsafe { instance.get_physical_device_queue_family_properties(physical_device) };

            let Some(graphics_family) = queue_families
                .iter()
                .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                .map(|i| i as u32)
            else {
                continue;
            };

            let can_present = |family: u32| unsafe {
                surface_loader
                    .get_physical_device_surface_support(physical_device, family, surface)
                    .unwrap_or(false)
            };
            // Same family as graphics when possible
            let present_family = if can_present(graphics_family) {
                Some(graphics_family)
            } else {
                (0..queue_families.len() as u32).find(|&i| can_present(i))
            };
            let Some(present_family) = present_family else {
                continue;
            };

            let name = properties
                .device_name_as_c_str()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "Unknown GPU".to_string());
            let discrete = properties.device_type == vk::PhysicalDeviceType::DISCRETE_GPU;

            candidates.push((
                DeviceSelection {
                    physical_device,
                    graphics_family,
                    present_family,
                    name,
                },
                discrete,
            ));
        }

        if candidates.is_empty() {
            engine_error!(LOG_SOURCE, "No Vulkan GPU can present to this window");
            return Err(Error::Construction(
                "No Vulkan GPU can present to this window".to_string(),
            ));
        }
        let index = candidates
            .iter()
            .position(|(_, discrete)| *discrete)
            .unwrap_or(0);
        Ok(candidates.swap_remove(index).0)
    }
}

impl GraphicsDevice for VulkanGraphicsDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_native_surface(&self, window: &WindowHandle) -> Result<Box<dyn NativeSurface>> {
        let ctx = &self.context;

        let surface = unsafe {
            ash_window::create_surface(
                &ctx.entry,
                &ctx.instance,
                window.raw_display_handle(),
                window.raw_window_handle(),
                None,
            )
        }
        .map_err(|e| {
            engine_error!(LOG_SOURCE, "Failed to create surface: {:?}", e);
            Error::UnsupportedSurface(format!("Failed to create surface: {:?}", e))
        })?;

        let supported = unsafe {
            ctx.surface_loader.get_physical_device_surface_support(
                ctx.physical_device,
                ctx.present_queue_family,
                surface,
            )
        }
        .unwrap_or(false);

        if !supported {
            unsafe { ctx.surface_loader.destroy_surface(surface, None) };
            engine_error!(LOG_SOURCE, "'{}' cannot present to this window", self.name);
            return Err(Error::UnsupportedSurface(format!(
                "'{}' cannot present to this window",
                self.name
            )));
        }

        Ok(Box::new(VulkanSurface::new(Arc::clone(ctx), surface)))
    }

    fn wait_idle(&self) -> Result<()> {
        let _queues = self.context.lock_queues();
        unsafe {
            self.context
                .device
                .device_wait_idle()
                .map_err(|e| engine_err!(LOG_SOURCE, "Failed to wait idle: {:?}", e))
        }
    }
}
