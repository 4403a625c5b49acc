/// VulkanSurface - Vulkan implementation of the NativeSurface trait

use ash::vk;
use galaxy_3d_surface::galaxy3d::render::{NativeSurface, SwapchainDesc, Texture};
use galaxy_3d_surface::galaxy3d::{Error, Result, SurfaceInfo};
use galaxy_3d_surface::{engine_debug, engine_error};
use std::sync::Arc;

use crate::vulkan_context::VulkanContext;
use crate::vulkan_format::surface_info_from;
use crate::vulkan_swapchain::Swapchain;

const LOG_SOURCE: &str = "galaxy3d::vulkan";

/// Window surface (VkSurfaceKHR) and its current swapchain
///
/// Created by `VulkanGraphicsDevice::create_native_surface()`.
pub struct VulkanSurface {
    context: Arc<VulkanContext>,
    surface: vk::SurfaceKHR,
    swapchain: Option<Swapchain>,
}

impl VulkanSurface {
    pub(crate) fn new(context: Arc<VulkanContext>, surface: vk::SurfaceKHR) -> Self {
        Self {
            context,
            surface,
            swapchain: None,
        }
    }

    fn swapchain_mut(&mut self) -> Result<&mut Swapchain> {
        self.swapchain.as_mut().ok_or(Error::NotConfigured)
    }
}

impl NativeSurface for VulkanSurface {
    fn query_info(&self) -> Result<SurfaceInfo> {
        let ctx = &self.context;
        let unsupported = |call: &str, e: vk::Result| {
            engine_error!(LOG_SOURCE, "{} failed: {:?}", call, e);
            Error::UnsupportedSurface(format!("{} failed: {:?}", call, e))
        };

        unsafe {
            let caps = ctx
                .surface_loader
                .get_physical_device_surface_capabilities(ctx.physical_device, self.surface)
                .map_err(|e| unsupported("vkGetPhysicalDeviceSurfaceCapabilitiesKHR", e))?;
            let formats = ctx
                .surface_loader
                .get_physical_device_surface_formats(ctx.physical_device, self.surface)
                .map_err(|e| unsupported("vkGetPhysicalDeviceSurfaceFormatsKHR", e))?;

            Ok(surface_info_from(&formats, caps.supported_usage_flags))
        }
    }

    fn configure(&mut self, desc: &SwapchainDesc) -> Result<()> {
        let old = self
            .swapchain
            .as_ref()
            .map_or(vk::SwapchainKHR::null(), Swapchain::handle);

        let swapchain = Swapchain::new(&self.context, self.surface, desc, old)?;

        // Replacing drops (and destroys) the retired swapchain
        self.swapchain = Some(swapchain);
        Ok(())
    }

    fn unconfigure(&mut self) {
        if self.swapchain.take().is_some() {
            engine_debug!(LOG_SOURCE, "Swapchain destroyed");
        }
    }

    fn images(&self) -> Vec<Arc<dyn Texture>> {
        self.swapchain
            .as_ref()
            .map(Swapchain::textures)
            .unwrap_or_default()
    }

    fn acquire_next_image(&mut self) -> Result<u32> {
        self.swapchain_mut()?.acquire()
    }

    fn present(&mut self, image_index: u32) -> Result<()> {
        self.swapchain_mut()?.present(image_index)
    }
}

impl Drop for VulkanSurface {
    fn drop(&mut self) {
        // Swapchain before the surface it was created from
        self.swapchain = None;
        unsafe {
            self.context.surface_loader.destroy_surface(self.surface, None);
        }
    }
}
