/// VulkanContext - Shared Vulkan objects for the device and its surfaces
///
/// Contains everything a surface needs to build and drive a swapchain:
/// - Entry and instance (surface creation)
/// - Physical and logical device
/// - Graphics and present queues
/// - Surface and swapchain extension loaders

use ash::vk;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Shared Vulkan context.
///
/// Shared (via `Arc`) by the device and every surface created from it, so the
/// logical device and instance outlive all swapchains. Destroys the device and
/// instance when the last reference goes away.
pub struct VulkanContext {
    /// Vulkan loader entry
    pub entry: ash::Entry,

    /// Vulkan instance
    pub instance: ash::Instance,

    /// Selected physical device
    pub physical_device: vk::PhysicalDevice,

    /// Vulkan logical device
    pub device: ash::Device,

    /// Graphics queue (layout transitions)
    pub graphics_queue: vk::Queue,

    /// Graphics queue family index
    pub graphics_queue_family: u32,

    /// Present queue (may be same as graphics)
    pub present_queue: vk::Queue,

    /// Present queue family index
    pub present_queue_family: u32,

    /// VK_KHR_surface functions
    pub surface_loader: ash::khr::surface::Instance,

    /// VK_KHR_swapchain functions
    pub swapchain_loader: ash::khr::swapchain::Device,

    /// Queues need external synchronization across surfaces
    queue_lock: Mutex<()>,

    /// Debug utils loader (for validation layers)
    pub(crate) debug_utils_loader: Option<ash::ext::debug_utils::Instance>,

    /// Debug messenger handle
    pub(crate) debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl VulkanContext {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        entry: ash::Entry,
        instance: ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
        graphics_queue_family: u32,
        present_queue_family: u32,
        debug_utils_loader: Option<ash::ext::debug_utils::Instance>,
        debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
    ) -> Self {
        let (graphics_queue, present_queue) = unsafe {
            (
                device.get_device_queue(graphics_queue_family, 0),
                device.get_device_queue(present_queue_family, 0),
            )
        };
        let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);
        let swapchain_loader = ash::khr::swapchain::Device::new(&instance, &device);

        Self {
            entry,
            instance,
            physical_device,
            device,
            graphics_queue,
            graphics_queue_family,
            present_queue,
            present_queue_family,
            surface_loader,
            swapchain_loader,
            queue_lock: Mutex::new(()),
            debug_utils_loader,
            debug_messenger,
        }
    }

    /// Lock held around every queue submit / present / wait idle
    pub(crate) fn lock_queues(&self) -> MutexGuard<'_, ()> {
        self.queue_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True when graphics and present run on different queue families
    pub(crate) fn separate_present_family(&self) -> bool {
        self.graphics_queue_family != self.present_queue_family
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        unsafe {
            {
                let _queues = self.lock_queues();
                self.device.device_wait_idle().ok();
            }

            self.device.destroy_device(None);

            #[cfg(feature = "vulkan-validation")]
            crate::debug::cleanup_debug_config();

            // Messenger goes before the instance
            if let (Some(debug_utils), Some(messenger)) =
                (&self.debug_utils_loader, self.debug_messenger)
            {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}
