/// NativeSurface trait - the backend side of window presentation

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{Format, SurfaceInfo, Texture, TextureUsage};

/// Presentation pacing derived from `SurfaceConfig::vsync`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentMode {
    /// Wait for vertical blank (vsync on)
    Fifo,
    /// Replace the queued image, never tear (vsync off, preferred)
    Mailbox,
    /// Present immediately, may tear (vsync off, fallback)
    Immediate,
}

impl PresentMode {
    /// Pick the mode for a vsync policy among the modes a backend supports
    ///
    /// vsync → FIFO. No vsync → mailbox, then immediate, then FIFO
    /// (FIFO is always available).
    pub fn select(vsync: bool, supported: &[PresentMode]) -> PresentMode {
        if vsync {
            return PresentMode::Fifo;
        }
        [PresentMode::Mailbox, PresentMode::Immediate]
            .into_iter()
            .find(|mode| supported.contains(mode))
            .unwrap_or(PresentMode::Fifo)
    }
}

/// Validated, fully resolved swapchain request
///
/// Built by `SurfaceConfig::validate()`. The format is never `Undefined`
/// and the usage is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapchainDesc {
    /// Image format (member of `SurfaceInfo::formats`)
    pub format: Format,
    /// Image usage (subset of `SurfaceInfo::supported_usage`)
    pub usage: TextureUsage,
    /// Requested width in pixels (non-zero)
    pub width: u32,
    /// Requested height in pixels (non-zero)
    pub height: u32,
    /// Image count hint; the backend clamps it to its supported range
    pub desired_image_count: u32,
    /// Vsync policy
    pub vsync: bool,
}

/// Native presentation object bound to one window
///
/// Owned exclusively by a `Surface`. Implementations release every native
/// resource on drop, including an image that was acquired but never presented.
pub trait NativeSurface: Send {
    /// Query formats and usages the window supports. Pure read.
    fn query_info(&self) -> Result<SurfaceInfo>;

    /// Create (or recreate) the native swapchain
    ///
    /// Fails when the native layer creates a swapchain without images. On
    /// failure the previous swapchain, if any, must stay usable.
    fn configure(&mut self, desc: &SwapchainDesc) -> Result<()>;

    /// Release the native swapchain. Safe to call when not configured.
    fn unconfigure(&mut self);

    /// Images of the current swapchain, in native index order
    ///
    /// Empty when not configured.
    fn images(&self) -> Vec<Arc<dyn Texture>>;

    /// Block until the next image is available and return its index
    ///
    /// # Errors
    ///
    /// `OutOfDateSurface` when the window changed and the swapchain must be
    /// reconfigured.
    fn acquire_next_image(&mut self) -> Result<u32>;

    /// Queue the image for presentation
    ///
    /// The image is handed back to the presentation engine on success and
    /// when this returns `OutOfDateSurface`. Any other error means the image
    /// is still acquired and the call may be retried.
    fn present(&mut self, image_index: u32) -> Result<()>;
}
