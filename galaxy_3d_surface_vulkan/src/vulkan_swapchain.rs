/// Swapchain - Vulkan swapchain with its images and presentation sync objects

use ash::vk;
use galaxy_3d_surface::galaxy3d::render::{SwapchainDesc, Texture, TextureInfo};
use galaxy_3d_surface::galaxy3d::{Error, Result};
use galaxy_3d_surface::{engine_bail, engine_debug, engine_error, engine_trace, engine_warn};
use std::sync::Arc;

use crate::vulkan_context::VulkanContext;
use crate::vulkan_format::{
    choose_color_space, choose_composite_alpha, choose_extent, choose_image_count,
    choose_present_mode, format_to_vk, map_vk_error, usage_to_vk,
};
use crate::vulkan_texture::SwapchainTexture;

const LOG_SOURCE: &str = "galaxy3d::vulkan";

/// Image layout change recorded once per swapchain image
struct Transition {
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
    src_stage: vk::PipelineStageFlags,
    dst_stage: vk::PipelineStageFlags,
    src_access: vk::AccessFlags,
    dst_access: vk::AccessFlags,
}

impl Transition {
    /// Freshly acquired image → usable by any command
    fn to_general() -> Self {
        Self {
            old_layout: vk::ImageLayout::UNDEFINED,
            new_layout: vk::ImageLayout::GENERAL,
            src_stage: vk::PipelineStageFlags::TOP_OF_PIPE,
            dst_stage: vk::PipelineStageFlags::ALL_COMMANDS,
            src_access: vk::AccessFlags::empty(),
            dst_access: vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE,
        }
    }

    /// Rendered image → presentable
    fn to_present() -> Self {
        Self {
            old_layout: vk::ImageLayout::GENERAL,
            new_layout: vk::ImageLayout::PRESENT_SRC_KHR,
            src_stage: vk::PipelineStageFlags::ALL_COMMANDS,
            dst_stage: vk::PipelineStageFlags::BOTTOM_OF_PIPE,
            src_access: vk::AccessFlags::MEMORY_WRITE,
            dst_access: vk::AccessFlags::empty(),
        }
    }
}

/// Vulkan swapchain
///
/// Owns the VkSwapchainKHR, one view per image and the objects that
/// synchronize acquire and present:
/// - `acquire_fence`: acquire blocks on it until the image is really free
/// - `general_fences` / `present_fences`: guard reuse of the per-image
///   pre-recorded transition command buffers
/// - `present_semaphores`: transition to PRESENT_SRC → vkQueuePresentKHR
///
/// `held` mirrors the image the application owns. `stale` is set when an
/// acquired image could not be prepared or a present failed after the image
/// was handed over; every later acquire then reports `OutOfDateSurface` until
/// the swapchain is recreated.
///
/// Everything is released on drop, including a partially built swapchain.
pub(crate) struct Swapchain {
    context: Arc<VulkanContext>,
    handle: vk::SwapchainKHR,
    extent: vk::Extent2D,
    textures: Vec<Arc<SwapchainTexture>>,
    command_pool: vk::CommandPool,
    to_general: Vec<vk::CommandBuffer>,
    to_present: Vec<vk::CommandBuffer>,
    acquire_fence: vk::Fence,
    general_fences: Vec<vk::Fence>,
    present_fences: Vec<vk::Fence>,
    present_semaphores: Vec<vk::Semaphore>,
    held: Option<u32>,
    stale: bool,
}

impl Swapchain {
    /// Create a swapchain for `surface`
    ///
    /// `old` (may be null) is handed to the driver as the swapchain being
    /// replaced. The caller destroys it after this returns successfully.
    pub(crate) fn new(
        context: &Arc<VulkanContext>,
        surface: vk::SurfaceKHR,
        desc: &SwapchainDesc,
        old: vk::SwapchainKHR,
    ) -> Result<Self> {
        let ctx = context.as_ref();

        let (caps, surface_formats, present_modes) = unsafe {
            let caps = ctx
                .surface_loader
                .get_physical_device_surface_capabilities(ctx.physical_device, surface)
                .map_err(|e| map_vk_error("vkGetPhysicalDeviceSurfaceCapabilitiesKHR", e))?;
            let formats = ctx
                .surface_loader
                .get_physical_device_surface_formats(ctx.physical_device, surface)
                .map_err(|e| map_vk_error("vkGetPhysicalDeviceSurfaceFormatsKHR", e))?;
            let modes = ctx
                .surface_loader
                .get_physical_device_surface_present_modes(ctx.physical_device, surface)
                .map_err(|e| map_vk_error("vkGetPhysicalDeviceSurfacePresentModesKHR", e))?;
            (caps, formats, modes)
        };

        let format = format_to_vk(desc.format);
        let Some(color_space) = choose_color_space(&surface_formats, format) else {
            engine_bail!(LOG_SOURCE, "Surface does not offer format {:?}", desc.format);
        };

        let extent = choose_extent(&caps, desc.width, desc.height);
        if extent.width == 0 || extent.height == 0 {
            // Minimized window: nothing to create until it gets an area again
            engine_warn!(LOG_SOURCE, "Surface has a zero extent, cannot create a swapchain");
            return Err(Error::OutOfDateSurface);
        }
        let image_count = choose_image_count(&caps, desc.desired_image_count);
        let present_mode = choose_present_mode(desc.vsync, &present_modes);

        let queue_families = [ctx.graphics_queue_family, ctx.present_queue_family];
        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface)
            .min_image_count(image_count)
            .image_format(format)
            .image_color_space(color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(usage_to_vk(desc.usage))
            .pre_transform(caps.current_transform)
            .composite_alpha(choose_composite_alpha(&caps))
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old);
        let create_info = if ctx.separate_present_family() {
            create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&queue_families)
        } else {
            create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        };

        let handle = unsafe { ctx.swapchain_loader.create_swapchain(&create_info, None) }
            .map_err(|e| map_vk_error("vkCreateSwapchainKHR", e))?;

        // From here on, Drop releases whatever has been created
        let mut swapchain = Self {
            context: Arc::clone(context),
            handle,
            extent,
            textures: Vec::new(),
            command_pool: vk::CommandPool::null(),
            to_general: Vec::new(),
            to_present: Vec::new(),
            acquire_fence: vk::Fence::null(),
            general_fences: Vec::new(),
            present_fences: Vec::new(),
            present_semaphores: Vec::new(),
            held: None,
            stale: false,
        };

        swapchain.create_textures(format, desc)?;
        if swapchain.textures.is_empty() {
            engine_bail!(LOG_SOURCE, "vkGetSwapchainImagesKHR returned no images");
        }
        swapchain.create_sync_objects()?;
        swapchain.record_transitions()?;

        engine_debug!(
            LOG_SOURCE,
            "Swapchain created: {}x{} {:?} {:?} {:?}, {} images (hint {})",
            extent.width,
            extent.height,
            format,
            color_space,
            present_mode,
            swapchain.textures.len(),
            desc.desired_image_count
        );

        Ok(swapchain)
    }

    pub(crate) fn handle(&self) -> vk::SwapchainKHR {
        self.handle
    }

    /// Swapchain images as engine textures, in native index order
    pub(crate) fn textures(&self) -> Vec<Arc<dyn Texture>> {
        self.textures
            .iter()
            .map(|texture| Arc::clone(texture) as Arc<dyn Texture>)
            .collect()
    }

    /// Acquire the next image and move it to GENERAL layout
    pub(crate) fn acquire(&mut self) -> Result<u32> {
        if self.stale {
            engine_warn!(LOG_SOURCE, "Swapchain must be recreated before the next acquire");
            return Err(Error::OutOfDateSurface);
        }

        let (index, suboptimal) = unsafe {
            self.context.swapchain_loader.acquire_next_image(
                self.handle,
                u64::MAX,
                vk::Semaphore::null(),
                self.acquire_fence,
            )
        }
        .map_err(|e| map_vk_error("vkAcquireNextImageKHR", e))?;

        if suboptimal {
            engine_trace!(LOG_SOURCE, "Swapchain suboptimal on acquire (image {})", index);
        }

        // The image is owned by the application from here on
        if let Err(e) = self.prepare_acquired(index) {
            self.stale = true;
            return Err(e);
        }
        self.held = Some(index);
        Ok(index)
    }

    /// Wait for the acquired image and submit its transition to GENERAL
    fn prepare_acquired(&mut self, index: u32) -> Result<()> {
        let device = &self.context.device;
        unsafe {
            device
                .wait_for_fences(&[self.acquire_fence], true, u64::MAX)
                .map_err(|e| map_vk_error("vkWaitForFences", e))?;
            device
                .reset_fences(&[self.acquire_fence])
                .map_err(|e| map_vk_error("vkResetFences", e))?;
        }

        let i = index as usize;
        if i >= self.textures.len() {
            engine_bail!(
                LOG_SOURCE,
                "vkAcquireNextImageKHR returned image {} of {}",
                index,
                self.textures.len()
            );
        }

        submit(&self.context, self.to_general[i], &mut self.general_fences[i], None)
    }

    /// Move the image to PRESENT_SRC layout and queue it for presentation
    ///
    /// A failure before vkQueuePresentKHR leaves the image acquired, so the
    /// call can be retried. Once the image reached vkQueuePresentKHR it is
    /// released whatever the outcome, and any error other than out-of-date
    /// retires the swapchain and is reported as `OutOfDateSurface`.
    pub(crate) fn present(&mut self, image_index: u32) -> Result<()> {
        if self.held != Some(image_index) {
            engine_bail!(
                LOG_SOURCE,
                "present: image {} is not acquired (held: {:?})",
                image_index,
                self.held
            );
        }

        let i = image_index as usize;
        let semaphore = self.present_semaphores[i];
        submit(&self.context, self.to_present[i], &mut self.present_fences[i], Some(semaphore))?;

        let wait_semaphores = [semaphore];
        let swapchains = [self.handle];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = {
            let _queues = self.context.lock_queues();
            unsafe {
                self.context
                    .swapchain_loader
                    .queue_present(self.context.present_queue, &present_info)
            }
        };
        self.held = None;

        match result {
            Ok(false) => Ok(()),
            Ok(true) => {
                engine_trace!(LOG_SOURCE, "Swapchain suboptimal on present (image {})", image_index);
                Ok(())
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Err(Error::OutOfDateSurface),
            Err(e) => {
                self.stale = true;
                engine_error!(
                    LOG_SOURCE,
                    "vkQueuePresentKHR failed: {:?}, swapchain must be recreated",
                    e
                );
                Err(Error::OutOfDateSurface)
            }
        }
    }

    fn create_textures(&mut self, format: vk::Format, desc: &SwapchainDesc) -> Result<()> {
        let ctx = Arc::clone(&self.context);
        let images = unsafe { ctx.swapchain_loader.get_swapchain_images(self.handle) }
            .map_err(|e| map_vk_error("vkGetSwapchainImagesKHR", e))?;

        for image in images {
            let create_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .components(vk::ComponentMapping {
                    r: vk::ComponentSwizzle::IDENTITY,
                    g: vk::ComponentSwizzle::IDENTITY,
                    b: vk::ComponentSwizzle::IDENTITY,
                    a: vk::ComponentSwizzle::IDENTITY,
                })
                .subresource_range(color_subresource_range());

            let view = unsafe { ctx.device.create_image_view(&create_info, None) }
                .map_err(|e| map_vk_error("vkCreateImageView", e))?;

            self.textures.push(Arc::new(SwapchainTexture {
                image,
                view,
                info: TextureInfo {
                    width: self.extent.width,
                    height: self.extent.height,
                    format: desc.format,
                    usage: desc.usage,
                    array_layers: 1,
                },
            }));
        }
        Ok(())
    }

    fn create_sync_objects(&mut self) -> Result<()> {
        let ctx = Arc::clone(&self.context);
        let device = &ctx.device;
        let signaled = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);
        let semaphore_info = vk::SemaphoreCreateInfo::default();

        unsafe {
            self.acquire_fence = device
                .create_fence(&vk::FenceCreateInfo::default(), None)
                .map_err(|e| map_vk_error("vkCreateFence", e))?;

            for _ in 0..self.textures.len() {
                self.general_fences.push(
                    device
                        .create_fence(&signaled, None)
                        .map_err(|e| map_vk_error("vkCreateFence", e))?,
                );
                self.present_fences.push(
                    device
                        .create_fence(&signaled, None)
                        .map_err(|e| map_vk_error("vkCreateFence", e))?,
                );
                self.present_semaphores.push(
                    device
                        .create_semaphore(&semaphore_info, None)
                        .map_err(|e| map_vk_error("vkCreateSemaphore", e))?,
                );
            }
        }
        Ok(())
    }

    fn record_transitions(&mut self) -> Result<()> {
        let ctx = Arc::clone(&self.context);
        let device = &ctx.device;

        unsafe {
            let pool_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(ctx.graphics_queue_family);
            self.command_pool = device
                .create_command_pool(&pool_info, None)
                .map_err(|e| map_vk_error("vkCreateCommandPool", e))?;

            let alloc_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(self.command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(self.textures.len() as u32);
            self.to_general = device
                .allocate_command_buffers(&alloc_info)
                .map_err(|e| map_vk_error("vkAllocateCommandBuffers", e))?;
            self.to_present = device
                .allocate_command_buffers(&alloc_info)
                .map_err(|e| map_vk_error("vkAllocateCommandBuffers", e))?;

            for (i, texture) in self.textures.iter().enumerate() {
                record_transition(device, self.to_general[i], texture.image, &Transition::to_general())
                    .map_err(|e| map_vk_error("vkEndCommandBuffer", e))?;
                record_transition(device, self.to_present[i], texture.image, &Transition::to_present())
                    .map_err(|e| map_vk_error("vkEndCommandBuffer", e))?;
            }
        }
        Ok(())
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        let device = &self.context.device;
        unsafe {
            {
                let _queues = self.context.lock_queues();
                device.device_wait_idle().ok();
            }

            device.destroy_fence(self.acquire_fence, None);
            for &fence in self.general_fences.iter().chain(&self.present_fences) {
                device.destroy_fence(fence, None);
            }
            for &semaphore in &self.present_semaphores {
                device.destroy_semaphore(semaphore, None);
            }

            // Frees the transition command buffers
            device.destroy_command_pool(self.command_pool, None);

            for texture in &self.textures {
                device.destroy_image_view(texture.view, None);
            }

            self.context.swapchain_loader.destroy_swapchain(self.handle, None);
        }
    }
}

/// Submit a pre-recorded transition on the graphics queue
///
/// Waits for the previous submission of the same command buffer first. A
/// failed submission leaves the fence unsignaled for good, so it is destroyed
/// and a fresh one is created by the next call.
fn submit(
    context: &VulkanContext,
    command_buffer: vk::CommandBuffer,
    fence: &mut vk::Fence,
    signal: Option<vk::Semaphore>,
) -> Result<()> {
    let device = &context.device;
    let command_buffers = [command_buffer];
    let signal_semaphores: Vec<vk::Semaphore> = signal.into_iter().collect();
    let submit_info = vk::SubmitInfo::default()
        .command_buffers(&command_buffers)
        .signal_semaphores(&signal_semaphores);

    unsafe {
        if *fence == vk::Fence::null() {
            *fence = device
                .create_fence(&vk::FenceCreateInfo::default(), None)
                .map_err(|e| map_vk_error("vkCreateFence", e))?;
        } else {
            device
                .wait_for_fences(&[*fence], true, u64::MAX)
                .map_err(|e| map_vk_error("vkWaitForFences", e))?;
            device
                .reset_fences(&[*fence])
                .map_err(|e| map_vk_error("vkResetFences", e))?;
        }

        let result = {
            let _queues = context.lock_queues();
            device.queue_submit(context.graphics_queue, &[submit_info], *fence)
        };
        if let Err(e) = result {
            device.destroy_fence(*fence, None);
            *fence = vk::Fence::null();
            return Err(map_vk_error("vkQueueSubmit", e));
        }
    }
    Ok(())
}

fn color_subresource_range() -> vk::ImageSubresourceRange {
    vk::ImageSubresourceRange {
        aspect_mask: vk::ImageAspectFlags::COLOR,
        base_mip_level: 0,
        level_count: 1,
        base_array_layer: 0,
        layer_count: 1,
    }
}

/// Record a single layout barrier into a one-purpose command buffer
unsafe fn record_transition(
    device: &ash::Device,
    command_buffer: vk::CommandBuffer,
    image: vk::Image,
    transition: &Transition,
) -> std::result::Result<(), vk::Result> {
    device.begin_command_buffer(command_buffer, &vk::CommandBufferBeginInfo::default())?;

    let barrier = vk::ImageMemoryBarrier::default()
        .old_layout(transition.old_layout)
        .new_layout(transition.new_layout)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(color_subresource_range())
        .src_access_mask(transition.src_access)
        .dst_access_mask(transition.dst_access);

    device.cmd_pipeline_barrier(
        command_buffer,
        transition.src_stage,
        transition.dst_stage,
        vk::DependencyFlags::empty(),
        &[],
        &[],
        &[barrier],
    );

    device.end_command_buffer(command_buffer)
}
