/// Unit tests for MockGraphicsDevice and MockNativeSurface.
///
/// The surface tests rely on the mock behaving like a real swapchain
/// (round-robin images, one outstanding image, clamped image count),
/// so that behavior is pinned down here.

use crate::error::Error;
use crate::graphics_device::mock_graphics_device::*;
use crate::graphics_device::{Format, GraphicsDevice, SwapchainDesc, Texture, TextureUsage};

fn desc(count: u32) -> SwapchainDesc {
    SwapchainDesc {
        format: Format::B8G8R8A8_SRGB,
        usage: TextureUsage::RENDER_TARGET | TextureUsage::PRESENT,
        width: 640,
        height: 480,
        desired_image_count: count,
        vsync: true,
    }
}

#[test]
fn test_mock_device_creates_native_surface() {
    let device = MockGraphicsDevice::new();
    assert_eq!(device.name(), "Mock Device");
    assert!(device.wait_idle().is_ok());

    let native = device.create_native_surface(&mock_window_handle()).unwrap();
    assert_eq!(native.query_info().unwrap(), mock_surface_info());
    assert!(native.images().is_empty());
}

#[test]
fn test_mock_device_without_present_support() {
    let mut device = MockGraphicsDevice::new();
    device.can_present = false;
    let result = device.create_native_surface(&mock_window_handle());
    assert!(matches!(result, Err(Error::UnsupportedSurface(_))));
}

#[test]
fn test_mock_image_count_is_clamped() {
    let device = MockGraphicsDevice::new();
    let mut native = device.create_native_surface(&mock_window_handle()).unwrap();

    native.configure(&desc(1)).unwrap();
    assert_eq!(native.images().len(), 2);

    native.configure(&desc(3)).unwrap();
    assert_eq!(native.images().len(), 3);

    native.configure(&desc(8)).unwrap();
    assert_eq!(native.images().len(), 4);

    let info = native.images()[0].info().clone();
    assert_eq!(info.width, 640);
    assert_eq!(info.height, 480);
    assert_eq!(info.format, Format::B8G8R8A8_SRGB);
}

#[test]
fn test_mock_round_robin_acquire_present() {
    let device = MockGraphicsDevice::new();
    let mut native = device.create_native_surface(&mock_window_handle()).unwrap();
    native.configure(&desc(2)).unwrap();

    let mut order = Vec::new();
    for _ in 0..4 {
        let index = native.acquire_next_image().unwrap();
        native.present(index).unwrap();
        order.push(index);
    }
    assert_eq!(order, vec![0, 1, 0, 1]);

    let log = device.log.lock().unwrap();
    assert_eq!(log.acquired, vec![0, 1, 0, 1]);
    assert_eq!(log.presented, vec![0, 1, 0, 1]);
    assert_eq!(log.outstanding, None);
}

#[test]
fn test_mock_rejects_second_outstanding_image() {
    let device = MockGraphicsDevice::new();
    let mut native = device.create_native_surface(&mock_window_handle()).unwrap();
    native.configure(&desc(2)).unwrap();

    native.acquire_next_image().unwrap();
    assert!(matches!(native.acquire_next_image(), Err(Error::BackendError(_))));
}

#[test]
fn test_mock_failed_present_keeps_image_outstanding() {
    let device = MockGraphicsDevice::new();
    let mut native = device.create_native_surface(&mock_window_handle()).unwrap();
    native.configure(&desc(2)).unwrap();

    let index = native.acquire_next_image().unwrap();
    device.log.lock().unwrap().fail_present = Some(Error::OutOfMemory);
    assert_eq!(native.present(index), Err(Error::OutOfMemory));
    assert_eq!(device.log.lock().unwrap().outstanding, Some(index));

    native.present(index).unwrap();
    assert_eq!(device.log.lock().unwrap().outstanding, None);
}

#[test]
fn test_mock_empty_swapchain_fails_configure_and_keeps_images() {
    let device = MockGraphicsDevice::new();
    let mut native = device.create_native_surface(&mock_window_handle()).unwrap();
    native.configure(&desc(3)).unwrap();

    device.log.lock().unwrap().empty_swapchain = true;
    assert!(matches!(native.configure(&desc(2)), Err(Error::BackendError(_))));
    assert_eq!(native.images().len(), 3);
}

#[test]
fn test_mock_unconfigure_and_drop_are_recorded() {
    let device = MockGraphicsDevice::new();
    let mut native = device.create_native_surface(&mock_window_handle()).unwrap();
    native.configure(&desc(2)).unwrap();
    native.unconfigure();
    assert!(native.images().is_empty());
    drop(native);

    let log = device.log.lock().unwrap();
    assert_eq!(log.configure_calls, 1);
    assert_eq!(log.unconfigure_calls, 1);
    assert!(log.current_desc.is_none());
    assert!(log.dropped);
}
