//! Tests for VulkanGraphicsDevice and the Surface lifecycle on Vulkan
//!
//! These tests drive a real swapchain on a hidden window.
//! All tests require a GPU and a display and are marked with #[ignore].
//!
//! Run with: cargo test --test vulkan_surface_tests -- --ignored

use galaxy_3d_surface::galaxy3d::render::{Config, Format, GraphicsDevice, TextureUsage};
use galaxy_3d_surface::galaxy3d::{Error, Surface, SurfaceConfig};
use galaxy_3d_surface_vulkan::galaxy3d::VulkanGraphicsDevice;
use std::sync::Arc;
use winit::event_loop::EventLoop;
use winit::window::Window;

/// Helper to create a test window for Vulkan
#[allow(deprecated)]
fn create_test_window() -> (Window, EventLoop<()>) {
    let event_loop = EventLoop::new().unwrap();
    let window_attrs = Window::default_attributes()
        .with_title("Vulkan Surface Test")
        .with_inner_size(winit::dpi::PhysicalSize::new(800, 600))
        .with_visible(false); // Hidden window for tests
    let window = event_loop.create_window(window_attrs).unwrap();
    (window, event_loop)
}

fn create_device(window: &Window) -> Arc<dyn GraphicsDevice> {
    let config = Config {
        enable_validation: false,
        ..Config::default()
    };
    VulkanGraphicsDevice::new(window, config).unwrap().into_shared()
}

// ============================================================================
// DEVICE TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_device_creation() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);

    assert!(!device.name().is_empty());
    device.wait_idle().unwrap();
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_surface_info() {
    let (window, _event_loop) = create_test_window();
    let surface = Surface::from_window(&window, create_device(&window)).unwrap();
    let info = surface.info();

    assert!(!info.formats.is_empty());
    assert!(info.formats.contains(&info.preferred_format));
    assert!(info.supported_usage.contains(TextureUsage::PRESENT));
    assert!(info.supported_usage.contains(TextureUsage::RENDER_TARGET));
    assert!(!surface.is_configured());
}

// ============================================================================
// SWAPCHAIN TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_configure_and_present() {
    let (window, _event_loop) = create_test_window();
    let mut surface = Surface::from_window(&window, create_device(&window)).unwrap();

    surface.configure(SurfaceConfig::new(800, 600)).unwrap();
    let preferred = surface.info().preferred_format;
    let image_count = surface.image_count() as u32;
    assert!(image_count >= 1);

    for _ in 0..5 {
        let image = match surface.acquire_next_image() {
            Ok(image) => image,
            Err(Error::OutOfDateSurface) => {
                surface.resize(800, 600).unwrap();
                continue;
            }
            Err(e) => panic!("acquire failed: {}", e),
        };
        assert_eq!(image.info().format, preferred);
        assert!(image.index() < image_count);
        match surface.present() {
            Ok(()) | Err(Error::OutOfDateSurface) => {}
            Err(e) => panic!("present failed: {}", e),
        }
    }
    assert!(!surface.is_acquired());
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_reconfigure_with_new_settings() {
    let (window, _event_loop) = create_test_window();
    let mut surface = Surface::from_window(&window, create_device(&window)).unwrap();

    surface
        .configure(SurfaceConfig::new(800, 600).with_vsync(true))
        .unwrap();
    let first_generation = surface.generation();

    let unorm = surface
        .info()
        .formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .unwrap_or(Format::Undefined);
    surface
        .configure(
            SurfaceConfig::new(800, 600)
                .with_format(unorm)
                .with_vsync(false)
                .with_image_count(2),
        )
        .unwrap();

    assert_eq!(surface.generation(), first_generation + 1);
    assert!(surface.image_count() >= 1);
    assert!(!surface.config().unwrap().vsync);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_unconfigure_while_acquired() {
    let (window, _event_loop) = create_test_window();
    let mut surface = Surface::from_window(&window, create_device(&window)).unwrap();

    surface.configure(SurfaceConfig::new(800, 600)).unwrap();
    if surface.acquire_next_image().is_ok() {
        assert!(surface.is_acquired());
    }
    surface.unconfigure();

    assert!(!surface.is_configured());
    assert_eq!(surface.image_count(), 0);
    assert_eq!(surface.present(), Err(Error::NotAcquired));
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_rejects_unsupported_usage() {
    let (window, _event_loop) = create_test_window();
    let mut surface = Surface::from_window(&window, create_device(&window)).unwrap();

    let unsupported = TextureUsage::all().difference(surface.info().supported_usage);
    if unsupported.is_empty() {
        return;
    }
    let result = surface.configure(SurfaceConfig::new(800, 600).with_usage(unsupported));
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
    assert!(!surface.is_configured());
}
