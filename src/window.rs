//! Interactive preview window.
//!
//! Owns the one [`Scene`] of the run and hands it to the renderer on every
//! redraw. Dragging with the left mouse button orbits the camera, the wheel
//! zooms, and a resize only reconfigures the surface.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::camera::OrbitCamera;
use crate::clock::{Clock, SystemClock};
use crate::config::SketchConfig;
use crate::display_list::DisplayList;
use crate::gpu::renderer::Renderer;
use crate::scene::{FrameInfo, Scene};

/// Scroll units per pixel of touchpad scroll.
const PIXELS_PER_SCROLL_LINE: f32 = 100.0;

#[derive(Debug, Default)]
struct DragState {
    pressed: bool,
    last: Option<PhysicalPosition<f64>>,
}

impl DragState {
    fn handle_button(&mut self, state: ElementState) {
        self.pressed = state == ElementState::Pressed;
    }

    /// Returns the drag delta since the previous cursor event, if dragging.
    fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) -> Option<(f32, f32)> {
        let delta = match (self.pressed, self.last) {
            (true, Some(last)) => Some(((position.x - last.x) as f32, (position.y - last.y) as f32)),
            _ => None,
        };
        self.last = Some(position);
        delta
    }
}

struct WindowState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: Renderer,
    camera: OrbitCamera,
    display_list: DisplayList,
    drag: DragState,
}

impl WindowState {
    async fn new(window: Arc<Window>, config: &SketchConfig) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .map_err(|err| anyhow!("failed to create surface: {err}"))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::None,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("no suitable GPU adapter found"))?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no supported formats"))?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let renderer = Renderer::new(device, queue, format, surface_config.width, surface_config.height);

        Ok(Self {
            window,
            surface,
            surface_config,
            renderer,
            camera: OrbitCamera::from_settings(&config.camera),
            display_list: DisplayList::new(),
            drag: DragState::default(),
        })
    }

    fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.surface_config.width, self.surface_config.height)
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(self.renderer.device(), &self.surface_config);
        self.renderer.resize(size.width, size.height);
        log::debug!("surface resized to {}x{}", size.width, size.height);
    }

    fn render_frame(&mut self, scene: &mut Scene, now_ms: f64) -> Result<FrameInfo, wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.display_list.clear();
        let info = scene.render(&mut self.display_list, now_ms);
        self.renderer.render(&view, &self.display_list, &self.camera);

        frame.present();
        Ok(info)
    }
}

pub fn run(config: SketchConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let window = WindowBuilder::new()
        .with_title("platescape")
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let mut state = pollster::block_on(WindowState::new(window, &config))?;
    let mut scene = config.build_scene();
    let clock = SystemClock::new();
    let mut last_cycle = scene.cycle_count();

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                elwt.exit();
            }
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => {
                state.drag.handle_button(button_state);
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some((dx, dy)) = state.drag.handle_cursor_moved(position) {
                    state.camera.orbit(dx, dy);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_SCROLL_LINE,
                };
                state.camera.zoom(lines);
            }
            WindowEvent::Resized(new_size) => {
                state.resize(new_size);
            }
            WindowEvent::RedrawRequested => match state.render_frame(&mut scene, clock.now_millis()) {
                Ok(info) => {
                    if info.cycle_count != last_cycle {
                        log::info!("reveal cycle {} reached at phase {:.0}ms", info.cycle_count, info.phase);
                        last_cycle = info.cycle_count;
                    }
                }
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    state.resize(state.size());
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("surface out of memory; exiting");
                    elwt.exit();
                }
                Err(err) => {
                    log::warn!("surface error: {err:?}; retrying next frame");
                }
            },
            _ => {}
        },
        Event::AboutToWait => {
            state.window.request_redraw();
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_reports_delta_only_while_pressed() {
        let mut drag = DragState::default();
        assert_eq!(drag.handle_cursor_moved(PhysicalPosition::new(10.0, 10.0)), None);

        drag.handle_button(ElementState::Pressed);
        assert_eq!(
            drag.handle_cursor_moved(PhysicalPosition::new(15.0, 7.0)),
            Some((5.0, -3.0))
        );

        drag.handle_button(ElementState::Released);
        assert_eq!(drag.handle_cursor_moved(PhysicalPosition::new(30.0, 30.0)), None);
    }
}
