/// Surface - binds a window to a device and drives the swapchain lifecycle
///
/// The surface is a two-level state machine:
/// - *Unconfigured* / *Configured(config)* for the swapchain itself
/// - *Idle* / *Acquired(image)* layered on top of *Configured*
///
/// Acquire and present must alternate strictly. Out-of-order calls fail with
/// `AlreadyAcquired` / `NotAcquired` and leave the state untouched.

use std::sync::Arc;
use winit::window::Window;

use crate::error::{Error, Result};
use crate::graphics_device::{
    Format, GraphicsDevice, NativeSurface, SwapchainDesc, Texture, TextureInfo, TextureUsage,
    WindowHandle,
};
use crate::{engine_debug, engine_error, engine_info, engine_trace, engine_warn};

const LOG_SOURCE: &str = "galaxy3d::Surface";

// ============================================================================
// SurfaceInfo / SurfaceConfig
// ============================================================================

/// Snapshot of what the window supports for presentation
///
/// Valid until the next configure/unconfigure, since capabilities may depend
/// on the active configuration on some platforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceInfo {
    /// Preferred format for the surface
    pub preferred_format: Format,
    /// Supported texture usages
    pub supported_usage: TextureUsage,
    /// Supported texture formats, in backend preference order
    pub formats: Vec<Format>,
}

/// Requested surface configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceConfig {
    /// Surface texture format (`Undefined` = preferred format)
    pub format: Format,
    /// Surface texture usage (`NONE` = render target + present)
    pub usage: TextureUsage,
    /// Surface texture width
    pub width: u32,
    /// Surface texture height
    pub height: u32,
    /// Desired number of images. A hint: the realized count is reported by
    /// `Surface::image_count()`.
    pub desired_image_count: u32,
    /// Enable/disable vertical synchronization
    pub vsync: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            format: Format::Undefined,
            usage: TextureUsage::NONE,
            width: 0,
            height: 0,
            desired_image_count: 3,
            vsync: true,
        }
    }
}

impl SurfaceConfig {
    /// Default configuration with the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_usage(mut self, usage: TextureUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_image_count(mut self, desired_image_count: u32) -> Self {
        self.desired_image_count = desired_image_count;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Check this configuration against a capability snapshot
    ///
    /// Resolves `Format::Undefined` to the preferred format and an empty usage
    /// to `RENDER_TARGET | PRESENT` (restricted to what is supported).
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the size is zero, the image count is zero, the
    /// format is not supported, or the usage is not a subset of the
    /// supported usage.
    pub fn validate(&self, info: &SurfaceInfo) -> Result<SwapchainDesc> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "cannot configure a zero-area surface ({}x{})",
                self.width, self.height
            )));
        }
        if self.desired_image_count == 0 {
            return Err(Error::InvalidConfig(
                "desired_image_count must be at least 1".to_string(),
            ));
        }

        let format = match self.format {
            Format::Undefined => info.preferred_format,
            format => format,
        };
        if !info.formats.contains(&format) {
            return Err(Error::InvalidConfig(format!(
                "format {:?} is not supported by the surface (supported: {:?})",
                format, info.formats
            )));
        }

        if !info.supported_usage.contains(self.usage) {
            return Err(Error::InvalidConfig(format!(
                "usage {:?} is not supported by the surface (unsupported bits: {:?})",
                self.usage,
                self.usage.difference(info.supported_usage)
            )));
        }
        let usage = if self.usage.is_empty() {
            (TextureUsage::RENDER_TARGET | TextureUsage::PRESENT) & info.supported_usage
        } else {
            self.usage
        };
        if usage.is_empty() {
            return Err(Error::InvalidConfig(
                "surface supports neither render target nor present usage".to_string(),
            ));
        }

        Ok(SwapchainDesc {
            format,
            usage,
            width: self.width,
            height: self.height,
            desired_image_count: self.desired_image_count,
            vsync: self.vsync,
        })
    }
}

// ============================================================================
// Image pool and per-frame handle
// ============================================================================

/// Images of one swapchain generation
struct ImagePool {
    images: Vec<Arc<dyn Texture>>,
    generation: u64,
}

enum SurfaceState {
    Unconfigured,
    Configured {
        config: SurfaceConfig,
        pool: ImagePool,
        /// Index of the image held between acquire and present
        acquired: Option<u32>,
        /// The pool no longer matches the native swapchain; acquisition
        /// reports `OutOfDateSurface` until the next configure
        stale: bool,
    },
}

/// Borrowed handle to the image acquired for the current frame
///
/// Borrows the surface, so it cannot outlive a reconfigure or the surface
/// itself. Present it with `Surface::present()`.
#[derive(Clone, Copy)]
pub struct SurfaceImage<'a> {
    texture: &'a dyn Texture,
    index: u32,
    generation: u64,
}

impl<'a> SurfaceImage<'a> {
    /// Native index of the image in the swapchain
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Pool generation this image belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The image as a texture resource
    pub fn texture(&self) -> &'a dyn Texture {
        self.texture
    }

    pub fn info(&self) -> &'a TextureInfo {
        self.texture.info()
    }

    pub fn width(&self) -> u32 {
        self.texture.info().width
    }

    pub fn height(&self) -> u32 {
        self.texture.info().height
    }
}

impl std::fmt::Debug for SurfaceImage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceImage")
            .field("index", &self.index)
            .field("generation", &self.generation)
            .field("info", self.texture.info())
            .finish()
    }
}

// ============================================================================
// Surface
// ============================================================================

/// Window surface with its swapchain
///
/// Not internally synchronized: drive each surface from a single thread.
pub struct Surface {
    /// Device the swapchain is realized on (shared with the application)
    device: Arc<dyn GraphicsDevice>,
    /// Native presentation object (exclusively owned)
    native: Box<dyn NativeSurface>,
    /// Capability snapshot
    info: SurfaceInfo,
    state: SurfaceState,
    /// Last successful config, kept across a zero-size `resize()`
    last_config: Option<SurfaceConfig>,
    /// Incremented on every successful configure
    generation: u64,
}

impl Surface {
    /// Create a surface for a platform window on a device
    ///
    /// # Errors
    ///
    /// `Construction` if the device cannot present to the window or the
    /// window reports no presentable format.
    pub fn new(window_handle: WindowHandle, device: Arc<dyn GraphicsDevice>) -> Result<Self> {
        let native = device.create_native_surface(&window_handle).map_err(|e| {
            engine_error!(LOG_SOURCE, "Failed to create surface on '{}': {}", device.name(), e);
            construction_error(e)
        })?;

        let info = native.query_info().map_err(|e| {
            engine_error!(LOG_SOURCE, "Failed to query surface capabilities: {}", e);
            construction_error(e)
        })?;

        if info.formats.is_empty() {
            engine_error!(LOG_SOURCE, "Surface reports no presentable formats");
            return Err(Error::Construction(
                "surface reports no presentable formats".to_string(),
            ));
        }

        engine_info!(
            LOG_SOURCE,
            "Surface created on '{}' (preferred format {:?}, {} formats)",
            device.name(),
            info.preferred_format,
            info.formats.len()
        );

        Ok(Self {
            device,
            native,
            info,
            state: SurfaceState::Unconfigured,
            last_config: None,
            generation: 0,
        })
    }

    /// Create a surface for a winit window on a device
    pub fn from_window(window: &Window, device: Arc<dyn GraphicsDevice>) -> Result<Self> {
        let handle = WindowHandle::from_window(window)?;
        Self::new(handle, device)
    }

    /// Returns the surface info
    pub fn info(&self) -> &SurfaceInfo {
        &self.info
    }

    /// Re-query the capabilities from the native surface
    ///
    /// # Errors
    ///
    /// `UnsupportedSurface` if the window is gone or no longer presentable.
    /// The cached snapshot is left unchanged on error.
    pub fn refresh_info(&mut self) -> Result<&SurfaceInfo> {
        self.info = self.native.query_info()?;
        Ok(&self.info)
    }

    /// Returns the surface config (`None` while unconfigured)
    pub fn config(&self) -> Option<&SurfaceConfig> {
        match &self.state {
            SurfaceState::Unconfigured => None,
            SurfaceState::Configured { config, .. } => Some(config),
        }
    }

    /// Device this surface presents through
    pub fn device(&self) -> &Arc<dyn GraphicsDevice> {
        &self.device
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.state, SurfaceState::Configured { .. })
    }

    /// True between `acquire_next_image()` and `present()`
    pub fn is_acquired(&self) -> bool {
        matches!(self.state, SurfaceState::Configured { acquired: Some(_), .. })
    }

    /// Realized number of swapchain images (0 while unconfigured)
    pub fn image_count(&self) -> usize {
        match &self.state {
            SurfaceState::Unconfigured => 0,
            SurfaceState::Configured { pool, .. } => pool.images.len(),
        }
    }

    /// Current image pool generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Configure the surface
    ///
    /// Valid from any state. Replaces the whole image pool; an image held from
    /// the previous configuration is dropped without being presented.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the config does not fit `info()`. Backend errors are
    /// propagated. On error the previous state is kept.
    ///
    /// `info()` is re-queried afterwards. If that query fails the configure
    /// still succeeds, the failure is logged at Warn and `info()` keeps the
    /// previous snapshot; call `refresh_info()` to observe the error.
    pub fn configure(&mut self, config: SurfaceConfig) -> Result<()> {
        let desc = config.validate(&self.info).map_err(|e| {
            engine_error!(LOG_SOURCE, "Rejected surface config: {}", e);
            e
        })?;

        if self.is_acquired() {
            engine_debug!(LOG_SOURCE, "Reconfigure drops the held image without presenting it");
        }

        self.native.configure(&desc)?;
        self.generation += 1;
        let pool = self.get_images();

        let stale = pool.images.is_empty();
        if stale {
            engine_error!(
                LOG_SOURCE,
                "Native swapchain configured without images, acquisition will report out of date"
            );
        }

        if pool.images.len() != desc.desired_image_count as usize {
            engine_debug!(
                LOG_SOURCE,
                "Requested {} images, backend realized {}",
                desc.desired_image_count,
                pool.images.len()
            );
        }

        engine_info!(
            LOG_SOURCE,
            "Configured {}x{} {:?} usage={:?} images={} vsync={}",
            desc.width,
            desc.height,
            desc.format,
            desc.usage,
            pool.images.len(),
            desc.vsync
        );

        self.state = SurfaceState::Configured {
            config: config.clone(),
            pool,
            acquired: None,
            stale,
        };
        self.last_config = Some(config);
        self.refresh_info_after_transition();
        Ok(())
    }

    /// Unconfigure the surface
    ///
    /// Releases the image pool and the native swapchain. No-op while
    /// unconfigured. `info()` is re-queried like after `configure()`.
    pub fn unconfigure(&mut self) {
        if let SurfaceState::Unconfigured = self.state {
            return;
        }
        if self.is_acquired() {
            engine_debug!(LOG_SOURCE, "Unconfigure drops the held image without presenting it");
        }
        self.state = SurfaceState::Unconfigured;
        self.native.unconfigure();
        self.refresh_info_after_transition();
        engine_info!(LOG_SOURCE, "Surface unconfigured");
    }

    /// Follow a window resize
    ///
    /// A zero width or height (minimized window) unconfigures the surface.
    /// Otherwise the surface is reconfigured with the current (or last) config
    /// at the new size.
    ///
    /// # Errors
    ///
    /// `NotConfigured` if the surface was never configured.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            self.unconfigure();
            return Ok(());
        }
        let base = self
            .config()
            .or(self.last_config.as_ref())
            .cloned()
            .ok_or(Error::NotConfigured)?;
        self.configure(base.with_size(width, height))
    }

    /// Acquire the next surface image
    ///
    /// May block until a previously presented image is released by the
    /// presentation engine.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` while unconfigured
    /// - `AlreadyAcquired` if the previous image was not presented yet
    /// - `OutOfDateSurface` if the window changed, or if the native layer
    ///   handed out an image this pool does not have; reconfigure and retry
    ///
    /// Any other native error leaves the surface *Idle*.
    pub fn acquire_next_image(&mut self) -> Result<SurfaceImage<'_>> {
        let SurfaceState::Configured { pool, acquired, stale, .. } = &mut self.state else {
            engine_error!(LOG_SOURCE, "acquire_next_image() on an unconfigured surface");
            return Err(Error::NotConfigured);
        };
        if let Some(held) = *acquired {
            engine_error!(LOG_SOURCE, "acquire_next_image() while image {} is still held", held);
            return Err(Error::AlreadyAcquired);
        }
        if *stale {
            engine_warn!(LOG_SOURCE, "Image pool is stale, reconfigure required");
            return Err(Error::OutOfDateSurface);
        }

        let index = match self.native.acquire_next_image() {
            Ok(index) => index,
            Err(Error::OutOfDateSurface) => {
                engine_warn!(LOG_SOURCE, "Surface out of date on acquire, reconfigure required");
                return Err(Error::OutOfDateSurface);
            }
            Err(e) => {
                engine_error!(LOG_SOURCE, "Acquire failed: {}", e);
                return Err(e);
            }
        };

        let Some(texture) = pool.images.get(index as usize) else {
            // The native image stays acquired until the swapchain is replaced
            *stale = true;
            engine_error!(
                LOG_SOURCE,
                "Backend acquired image {} but the pool has {} images, reconfigure required",
                index,
                pool.images.len()
            );
            return Err(Error::OutOfDateSurface);
        };

        *acquired = Some(index);
        engine_trace!(LOG_SOURCE, "Acquired image {} (generation {})", index, pool.generation);

        Ok(SurfaceImage {
            texture: texture.as_ref(),
            index,
            generation: pool.generation,
        })
    }

    /// The image currently held, if any
    pub fn current_image(&self) -> Option<SurfaceImage<'_>> {
        let SurfaceState::Configured { pool, acquired: Some(index), .. } = &self.state else {
            return None;
        };
        pool.images.get(*index as usize).map(|texture| SurfaceImage {
            texture: texture.as_ref(),
            index: *index,
            generation: pool.generation,
        })
    }

    /// Present the previously acquired image
    ///
    /// The surface returns to *Idle* once the native layer took the image,
    /// including when it reports `OutOfDateSurface`.
    ///
    /// # Errors
    ///
    /// - `NotAcquired` if no image is held (nothing is submitted)
    /// - `OutOfDateSurface` if the window changed; the image is consumed
    /// - any other native error keeps the image held, `present()` can be retried
    pub fn present(&mut self) -> Result<()> {
        let SurfaceState::Configured { acquired: Some(index), .. } = self.state else {
            engine_error!(LOG_SOURCE, "present() without an acquired image");
            return Err(Error::NotAcquired);
        };

        let result = self.native.present(index);
        if let Ok(()) | Err(Error::OutOfDateSurface) = result {
            if let SurfaceState::Configured { acquired, .. } = &mut self.state {
                *acquired = None;
            }
        }

        match result {
            Ok(()) => {
                engine_trace!(LOG_SOURCE, "Presented image {}", index);
                Ok(())
            }
            Err(Error::OutOfDateSurface) => {
                engine_warn!(LOG_SOURCE, "Surface out of date on present, reconfigure required");
                Err(Error::OutOfDateSurface)
            }
            Err(e) => {
                engine_error!(LOG_SOURCE, "Present of image {} failed, image still held: {}", index, e);
                Err(e)
            }
        }
    }

    /// Wrap the native images of the freshly configured swapchain
    fn get_images(&self) -> ImagePool {
        ImagePool {
            images: self.native.images(),
            generation: self.generation,
        }
    }

    fn refresh_info_after_transition(&mut self) {
        match self.native.query_info() {
            Ok(info) => self.info = info,
            Err(e) => engine_warn!(LOG_SOURCE, "Keeping previous surface info: {}", e),
        }
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        if self.is_acquired() {
            engine_debug!(LOG_SOURCE, "Surface dropped while an image is held, releasing it unpresented");
        }
        // Pool first: the textures reference native images
        self.state = SurfaceState::Unconfigured;
        self.native.unconfigure();
    }
}

fn construction_error(error: Error) -> Error {
    match error {
        Error::Construction(msg) => Error::Construction(msg),
        other => Error::Construction(other.to_string()),
    }
}

#[cfg(test)]
#[path = "surface_tests.rs"]
mod tests;
