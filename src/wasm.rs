use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::camera::OrbitCamera;
use crate::config::SketchConfig;
use crate::display_list::DisplayList;
use crate::gpu::renderer::Renderer;
use crate::scene::Scene;

#[wasm_bindgen]
pub struct WasmSketch {
    inner: Rc<RefCell<SketchContext>>,
}

struct SketchContext {
    renderer: Renderer,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    scene: Scene,
    camera: OrbitCamera,
    display_list: DisplayList,
}

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

#[wasm_bindgen]
impl WasmSketch {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmSketch, JsValue> {
        Err(JsValue::from_str("Use create_sketch async constructor"))
    }

    /// Draw one frame for the page clock `now_ms` (e.g. `performance.now()`).
    /// Returns the current reveal cycle count.
    pub fn render(&self, now_ms: f64) -> Result<u8, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let ctx = &mut *inner;

        let frame = match ctx.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                ctx.surface.configure(ctx.renderer.device(), &ctx.config);
                return Ok(ctx.scene.cycle_count());
            }
            Err(e) => return Err(JsValue::from_str(&format!("Surface error: {:?}", e))),
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        ctx.display_list.clear();
        let info = ctx.scene.render(&mut ctx.display_list, now_ms);
        ctx.renderer.render(&view, &ctx.display_list, &ctx.camera);
        frame.present();

        Ok(info.cycle_count)
    }

    /// Resize the drawing surface. The scene is left untouched.
    pub fn resize(&self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let mut inner = self.inner.borrow_mut();
        let ctx = &mut *inner;
        ctx.config.width = width;
        ctx.config.height = height;
        ctx.surface.configure(ctx.renderer.device(), &ctx.config);
        ctx.renderer.resize(width, height);
    }

    /// Orbit the camera by a pointer drag in pixels.
    pub fn orbit(&self, dx: f32, dy: f32) {
        self.inner.borrow_mut().camera.orbit(dx, dy);
    }

    /// Zoom the camera; positive values move closer.
    pub fn zoom(&self, delta: f32) {
        self.inner.borrow_mut().camera.zoom(delta);
    }

    pub fn cycle_count(&self) -> u8 {
        self.inner.borrow().scene.cycle_count()
    }
}

/// Create a sketch drawing into `canvas`. `config_json` may be empty; any
/// field it omits falls back to the defaults.
#[wasm_bindgen]
pub async fn create_sketch(canvas: HtmlCanvasElement, config_json: String) -> Result<WasmSketch, JsValue> {
    init_panic_hook();

    let sketch_config = if config_json.trim().is_empty() {
        SketchConfig::default()
    } else {
        SketchConfig::from_json(&config_json).map_err(|e| JsValue::from_str(&format!("{:#}", e)))?
    };

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        dx12_shader_compiler: Default::default(),
        flags: wgpu::InstanceFlags::default(),
        gles_minor_version: wgpu::Gles3MinorVersion::Automatic,
    });

    let width = canvas.width();
    let height = canvas.height();
    let target = wgpu::SurfaceTarget::Canvas(canvas);
    let surface = instance.create_surface(target)
        .map_err(|e| JsValue::from_str(&format!("Failed to create surface: {}", e)))?;

    let adapter = instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::None,
        compatible_surface: Some(&surface),
        force_fallback_adapter: false,
    }).await.ok_or_else(|| JsValue::from_str("Failed to find an appropriate adapter"))?;

    let (device, queue) = adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
            memory_hints: Default::default(),
        },
        None,
    ).await.map_err(|e| JsValue::from_str(&format!("Failed to create device: {}", e)))?;

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps.formats.iter()
        .copied()
        .find(|f: &wgpu::TextureFormat| f.is_srgb())
        .or_else(|| surface_caps.formats.first().copied())
        .ok_or_else(|| JsValue::from_str("Surface reports no supported formats"))?;

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: width.max(1),
        height: height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: surface_caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &config);

    let renderer = Renderer::new(device, queue, config.format, config.width, config.height);

    Ok(WasmSketch {
        inner: Rc::new(RefCell::new(SketchContext {
            renderer,
            surface,
            config,
            scene: sketch_config.build_scene(),
            camera: OrbitCamera::from_settings(&sketch_config.camera),
            display_list: DisplayList::new(),
        })),
    })
}
