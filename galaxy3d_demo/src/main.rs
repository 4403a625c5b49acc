//! Galaxy3D demo - presents to a window through the Vulkan backend
//!
//! Opens a window, configures its surface and runs the acquire/present loop.
//! Resizing reconfigures the swapchain, minimizing unconfigures it.

use galaxy_3d_surface::galaxy3d::render::Config;
use galaxy_3d_surface::galaxy3d::{Error, Surface, SurfaceConfig};
use galaxy_3d_surface::{engine_error, engine_info, engine_trace, engine_warn};
use galaxy_3d_surface_vulkan::galaxy3d::VulkanGraphicsDevice;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const LOG_SOURCE: &str = "galaxy3d::demo";

/// Window and its surface. Field order matters: the surface is dropped first.
struct DemoWindow {
    surface: Surface,
    window: Window,
}

#[derive(Default)]
struct App {
    state: Option<DemoWindow>,
    frames: u64,
}

impl App {
    fn create_window(event_loop: &ActiveEventLoop) -> galaxy_3d_surface::galaxy3d::Result<DemoWindow> {
        let attributes = Window::default_attributes()
            .with_title("Galaxy3D - Surface Demo")
            .with_inner_size(PhysicalSize::new(1280, 720));
        let window = event_loop
            .create_window(attributes)
            .map_err(|e| Error::Construction(format!("Failed to create window: {}", e)))?;

        let config = Config {
            app_name: "Galaxy3D Surface Demo".to_string(),
            ..Config::default()
        };
        let device = VulkanGraphicsDevice::new(&window, config)?.into_shared();
        let mut surface = Surface::from_window(&window, device)?;

        let size = window.inner_size();
        if size.width > 0 && size.height > 0 {
            surface.configure(SurfaceConfig::new(size.width, size.height).with_vsync(true))?;
        }

        Ok(DemoWindow { surface, window })
    }

    fn resize(state: &mut DemoWindow, size: PhysicalSize<u32>) {
        let result = match state.surface.resize(size.width, size.height) {
            Err(Error::NotConfigured) => state
                .surface
                .configure(SurfaceConfig::new(size.width, size.height)),
            other => other,
        };
        if let Err(e) = result {
            engine_warn!(LOG_SOURCE, "Resize to {}x{} failed: {}", size.width, size.height, e);
        }
    }

    fn render_frame(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if !state.surface.is_configured() {
            return;
        }

        let acquired = state
            .surface
            .acquire_next_image()
            .map(|image| (image.index(), image.width(), image.height()));
        match acquired {
            Ok((index, width, height)) => {
                engine_trace!(LOG_SOURCE, "Frame {}: image {} ({}x{})", self.frames, index, width, height);
            }
            Err(Error::OutOfDateSurface) => {
                let size = state.window.inner_size();
                Self::resize(state, size);
                return;
            }
            Err(e) => {
                engine_error!(LOG_SOURCE, "Acquire failed: {}", e);
                return;
            }
        }

        state.window.pre_present_notify();
        match state.surface.present() {
            Ok(()) => self.frames += 1,
            Err(Error::OutOfDateSurface) => {
                let size = state.window.inner_size();
                Self::resize(state, size);
            }
            Err(e) => engine_error!(LOG_SOURCE, "Present failed: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match Self::create_window(event_loop) {
            Ok(state) => {
                engine_info!(LOG_SOURCE, "Presenting on '{}'", state.surface.device().name());
                self.state = Some(state);
            }
            Err(e) => {
                engine_error!(LOG_SOURCE, "Startup failed: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                engine_info!(LOG_SOURCE, "Closing after {} frames", self.frames);
                // Surface before window
                self.state = None;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(state) = self.state.as_mut() {
                    Self::resize(state, size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render_frame();
                if let Some(state) = &self.state {
                    state.window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::default();
    event_loop.run_app(&mut app)?;
    Ok(())
}
