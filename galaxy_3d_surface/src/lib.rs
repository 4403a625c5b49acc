/*!
# Galaxy 3D Surface

Core traits and types for window presentation in the Galaxy 3D engine.

This crate provides the platform-agnostic surface/swapchain layer using
trait-based dynamic polymorphism. Backend implementations (Vulkan, etc.)
provide the device and the native presentation object.

## Architecture

- **GraphicsDevice**: Device trait, creates native surfaces for windows
- **NativeSurface**: Backend swapchain trait (query, configure, acquire, present)
- **Surface**: Configuration and acquire/present state machine over a NativeSurface
- **Texture**: Resource trait through which surface images are exposed

Backend implementations provide concrete types that implement these traits.
*/

// Internal modules
mod error;
pub mod log;
pub mod graphics_device;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Surface and device
    pub use crate::graphics_device::{GraphicsDevice, Surface, SurfaceConfig, SurfaceInfo};

    // Logging sub-module (types and logger control, NOT macros)
    pub mod log {
        pub use crate::log::{
            format_entry, min_severity, reset_logger, set_logger, set_min_severity,
            DefaultLogger, LogEntry, LogSeverity, Logger,
        };
    }

    // Render sub-module with all device/surface types
    pub mod render {
        pub use crate::graphics_device::*;
    }
}
