/// Mock graphics device for unit tests (no GPU required)
///
/// The mock native surface behaves like a small round-robin swapchain and
/// records every call in a shared `MockSurfaceLog`, so tests can inspect what
/// the `Surface` state machine asked of the native layer. Failures are
/// injected through the same log.

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::graphics_device::{
    Format, GraphicsDevice, NativeSurface, SurfaceInfo, SwapchainDesc, Texture, TextureInfo,
    TextureUsage, WindowHandle,
};

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
    pub index: u32,
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

// ============================================================================
// Shared call log / failure injection
// ============================================================================

#[derive(Debug, Default)]
pub struct MockSurfaceLog {
    pub configure_calls: u32,
    pub unconfigure_calls: u32,
    pub acquired: Vec<u32>,
    pub presented: Vec<u32>,
    pub current_desc: Option<SwapchainDesc>,
    /// Image index held by the native layer (acquired, not yet presented)
    pub outstanding: Option<u32>,
    pub dropped: bool,

    pub fail_query: bool,
    pub fail_next_configure: bool,
    pub out_of_date_on_acquire: bool,
    pub out_of_date_on_present: bool,
    /// Configure creates a swapchain without images (and fails, per contract)
    pub empty_swapchain: bool,
    /// One-shot error returned by the next acquire, no image is taken
    pub fail_acquire: Option<Error>,
    /// One-shot error returned by the next present, the image stays outstanding
    pub fail_present: Option<Error>,
    /// One-shot index handed out by the next acquire instead of the round-robin one
    pub stray_acquire_index: Option<u32>,
}

pub type SharedLog = Arc<Mutex<MockSurfaceLog>>;

pub fn mock_surface_info() -> SurfaceInfo {
    SurfaceInfo {
        preferred_format: Format::B8G8R8A8_SRGB,
        supported_usage: TextureUsage::RENDER_TARGET
            | TextureUsage::COPY_SOURCE
            | TextureUsage::COPY_DESTINATION
            | TextureUsage::PRESENT,
        formats: vec![
            Format::B8G8R8A8_SRGB,
            Format::B8G8R8A8_UNORM,
            Format::R8G8B8A8_UNORM,
        ],
    }
}

// ============================================================================
// Mock NativeSurface
// ============================================================================

pub struct MockNativeSurface {
    info: SurfaceInfo,
    log: SharedLog,
    images: Vec<Arc<dyn Texture>>,
    next_image: u32,
    min_images: u32,
    max_images: u32,
}

impl MockNativeSurface {
    pub fn new(info: SurfaceInfo, log: SharedLog) -> Self {
        Self {
            info,
            log,
            images: Vec::new(),
            next_image: 0,
            min_images: 2,
            max_images: 4,
        }
    }
}

impl NativeSurface for MockNativeSurface {
    fn query_info(&self) -> Result<SurfaceInfo> {
        if self.log.lock().unwrap().fail_query {
            return Err(Error::UnsupportedSurface("mock window is gone".to_string()));
        }
        Ok(self.info.clone())
    }

    fn configure(&mut self, desc: &SwapchainDesc) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        log.configure_calls += 1;
        if log.fail_next_configure {
            log.fail_next_configure = false;
            return Err(Error::BackendError("mock configure failure".to_string()));
        }
        if log.empty_swapchain {
            return Err(Error::BackendError("mock swapchain has no images".to_string()));
        }

        let count = desc.desired_image_count.clamp(self.min_images, self.max_images);
        self.images = (0..count)
            .map(|index| {
                Arc::new(MockTexture {
                    info: TextureInfo {
                        width: desc.width,
                        height: desc.height,
                        format: desc.format,
                        usage: desc.usage,
                        array_layers: 1,
                    },
                    index,
                }) as Arc<dyn Texture>
            })
            .collect();
        self.next_image = 0;
        log.outstanding = None;
        log.current_desc = Some(desc.clone());
        Ok(())
    }

    fn unconfigure(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.unconfigure_calls += 1;
        log.outstanding = None;
        log.current_desc = None;
        self.images.clear();
    }

    fn images(&self) -> Vec<Arc<dyn Texture>> {
        self.images.clone()
    }

    fn acquire_next_image(&mut self) -> Result<u32> {
        let mut log = self.log.lock().unwrap();
        if self.images.is_empty() {
            return Err(Error::BackendError("mock acquire without swapchain".to_string()));
        }
        if log.outstanding.is_some() {
            return Err(Error::BackendError("mock image already outstanding".to_string()));
        }
        if log.out_of_date_on_acquire {
            return Err(Error::OutOfDateSurface);
        }
        if let Some(error) = log.fail_acquire.take() {
            return Err(error);
        }
        if let Some(index) = log.stray_acquire_index.take() {
            log.outstanding = Some(index);
            log.acquired.push(index);
            return Ok(index);
        }
        let index = self.next_image;
        self.next_image = (self.next_image + 1) % self.images.len() as u32;
        log.outstanding = Some(index);
        log.acquired.push(index);
        Ok(index)
    }

    fn present(&mut self, image_index: u32) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        if log.outstanding != Some(image_index) {
            return Err(Error::BackendError(format!(
                "mock present of image {} which is not outstanding",
                image_index
            )));
        }
        if let Some(error) = log.fail_present.take() {
            return Err(error);
        }
        log.outstanding = None;
        log.presented.push(image_index);
        if log.out_of_date_on_present {
            return Err(Error::OutOfDateSurface);
        }
        Ok(())
    }
}

impl Drop for MockNativeSurface {
    fn drop(&mut self) {
        self.log.lock().unwrap().dropped = true;
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

pub struct MockGraphicsDevice {
    pub info: SurfaceInfo,
    pub log: SharedLog,
    /// When false, `create_native_surface` fails like a device without
    /// presentation support for the window
    pub can_present: bool,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            info: mock_surface_info(),
            log: Arc::new(Mutex::new(MockSurfaceLog::default())),
            can_present: true,
        }
    }

    pub fn with_info(info: SurfaceInfo) -> Self {
        Self {
            info,
            ..Self::new()
        }
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn name(&self) -> &str {
        "Mock Device"
    }

    fn create_native_surface(&self, _window: &WindowHandle) -> Result<Box<dyn NativeSurface>> {
        if !self.can_present {
            return Err(Error::UnsupportedSurface(
                "mock device cannot present".to_string(),
            ));
        }
        Ok(Box::new(MockNativeSurface::new(self.info.clone(), Arc::clone(&self.log))))
    }

    fn wait_idle(&self) -> Result<()> {
        Ok(())
    }
}

/// A window handle for tests; the mock never dereferences it
pub fn mock_window_handle() -> WindowHandle {
    use raw_window_handle::{
        RawDisplayHandle, RawWindowHandle, WebDisplayHandle, WebWindowHandle,
    };
    WindowHandle::new(
        RawDisplayHandle::Web(WebDisplayHandle::new()),
        RawWindowHandle::Web(WebWindowHandle::new(1)),
    )
}
