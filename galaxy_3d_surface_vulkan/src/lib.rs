/*!
# Galaxy 3D Surface - Vulkan Backend

Vulkan implementation of the Galaxy 3D presentation layer.

This crate provides a Vulkan backend that implements the galaxy_3d_surface
`GraphicsDevice` and `NativeSurface` traits using the Ash library for Vulkan
bindings and ash-window for platform surface creation.

# Example

```no_run
use galaxy_3d_surface::galaxy3d::render::Config;
use galaxy_3d_surface::galaxy3d::{Surface, SurfaceConfig};
use galaxy_3d_surface_vulkan::galaxy3d::VulkanGraphicsDevice;
# fn run(window: &winit::window::Window) -> galaxy_3d_surface::galaxy3d::Result<()> {

let device = VulkanGraphicsDevice::new(window, Config::default())?.into_shared();
let mut surface = Surface::from_window(window, device)?;
surface.configure(SurfaceConfig::new(800, 600))?;

let image = surface.acquire_next_image()?;
// ... render into image ...
surface.present()?;
# Ok(())
# }
```
*/

// Vulkan implementation modules
mod vulkan;
mod vulkan_context;
mod vulkan_format;
mod vulkan_surface;
mod vulkan_swapchain;
mod vulkan_texture;
#[cfg(feature = "vulkan-validation")]
mod debug;

pub use vulkan::VulkanGraphicsDevice;
pub use vulkan_surface::VulkanSurface;
pub use vulkan_texture::SwapchainTexture;

/// Main galaxy3d namespace module
pub mod galaxy3d {
    pub use crate::vulkan::VulkanGraphicsDevice;
    pub use crate::vulkan_surface::VulkanSurface;
    pub use crate::vulkan_texture::SwapchainTexture;
}
