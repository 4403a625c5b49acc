/// Graphics device module - surface, presentation and device types and traits

// Module declarations
pub mod graphics_device;
pub mod texture;
pub mod native_surface;
pub mod surface;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use texture::*;
pub use native_surface::*;
pub use surface::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod mock_graphics_device_tests;
