/// SwapchainTexture - Vulkan swapchain image exposed through the Texture trait

use ash::vk;
use galaxy_3d_surface::galaxy3d::render::{Texture, TextureInfo};

/// One image of a Vulkan swapchain
///
/// Owned by the presentation engine: the image and view are destroyed with
/// the swapchain, never by this wrapper. Between acquire and present the
/// image is in `vk::ImageLayout::GENERAL`.
pub struct SwapchainTexture {
    /// Swapchain image (not owned)
    pub(crate) image: vk::Image,
    /// Color view over the whole image (destroyed by the swapchain)
    pub(crate) view: vk::ImageView,
    /// Read-only texture properties
    pub(crate) info: TextureInfo,
}

impl Texture for SwapchainTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}
