/// GraphicsDevice trait - the device collaborator a surface presents through

use raw_window_handle::{
    HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle,
};

use crate::error::{Error, Result};
use crate::graphics_device::NativeSurface;

// ============================================================================
// Configuration
// ============================================================================

/// Which validation messages are forwarded to the engine logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    ErrorsOnly,
    ErrorsAndWarnings,
    All,
}

/// Graphics device configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Enable validation/debug layers (only honored when the backend is
    /// built with validation support)
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Validation message filter
    pub debug_severity: DebugSeverity,
    /// Abort the process on the first validation error
    pub break_on_validation_error: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Galaxy3D Application".to_string(),
            app_version: (1, 0, 0),
            debug_severity: DebugSeverity::ErrorsAndWarnings,
            break_on_validation_error: false,
        }
    }
}

// ============================================================================
// Window handle
// ============================================================================

/// Opaque platform window handle
///
/// Pairs the raw display and window handles of a platform window. The surface
/// layer never interprets them; only the backend does when it creates the
/// native presentation object.
#[derive(Debug, Clone, Copy)]
pub struct WindowHandle {
    display: RawDisplayHandle,
    window: RawWindowHandle,
}

impl WindowHandle {
    /// Build a handle from raw platform handles
    pub fn new(display: RawDisplayHandle, window: RawWindowHandle) -> Self {
        Self { display, window }
    }

    /// Extract the handles from any window type (e.g. `winit::window::Window`)
    pub fn from_window<W: HasWindowHandle + HasDisplayHandle + ?Sized>(window: &W) -> Result<Self> {
        let display = window
            .display_handle()
            .map_err(|e| Error::Construction(format!("Failed to get display handle: {}", e)))?;
        let handle = window
            .window_handle()
            .map_err(|e| Error::Construction(format!("Failed to get window handle: {}", e)))?;
        Ok(Self::new(display.as_raw(), handle.as_raw()))
    }

    /// Raw display handle
    pub fn raw_display_handle(&self) -> RawDisplayHandle {
        self.display
    }

    /// Raw window handle
    pub fn raw_window_handle(&self) -> RawWindowHandle {
        self.window
    }
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Graphics device trait
///
/// Implemented by backend-specific devices (e.g., VulkanGraphicsDevice).
/// Surfaces hold the device as `Arc<dyn GraphicsDevice>`, so the device lives
/// at least as long as every surface created from it.
pub trait GraphicsDevice: Send + Sync {
    /// Adapter name (for logs)
    fn name(&self) -> &str;

    /// Bind a platform window to this device's presentation support
    ///
    /// # Errors
    ///
    /// `UnsupportedSurface` if the device cannot present to the window.
    fn create_native_surface(&self, window: &WindowHandle) -> Result<Box<dyn NativeSurface>>;

    /// Wait for all submitted GPU work to complete
    fn wait_idle(&self) -> Result<()>;
}
