use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::camera::OrbitCamera;
use crate::clock::{Clock, FixedStepClock};
use crate::config::SketchConfig;
use crate::cycle::CyclePolicy;
use crate::display_list::DisplayList;
use crate::gpu::renderer::Renderer;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command; flags win over the config file.
#[derive(Args, Debug, Clone)]
struct SketchArgs {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the scattered boxes (random layout when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of scattered boxes
    #[arg(long)]
    boxes: Option<usize>,

    /// How a new period is detected: "window" or "wraparound"
    #[arg(long, value_parser = parse_cycle_policy)]
    cycle_policy: Option<CyclePolicy>,

    /// Output width
    #[arg(long)]
    width: Option<u32>,

    /// Output height
    #[arg(long)]
    height: Option<u32>,
}

impl SketchArgs {
    fn resolve(&self) -> Result<SketchConfig> {
        let mut config = match &self.config {
            Some(path) => SketchConfig::load(path)?,
            None => SketchConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(boxes) = self.boxes {
            config.box_count = boxes;
        }
        if let Some(policy) = self.cycle_policy {
            config.cycle_policy = policy;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        Ok(config)
    }
}

fn parse_cycle_policy(value: &str) -> Result<CyclePolicy, String> {
    match value.to_ascii_lowercase().as_str() {
        "window" => Ok(CyclePolicy::Window),
        "wraparound" => Ok(CyclePolicy::Wraparound),
        other => Err(format!("unknown cycle policy '{other}' (expected window or wraparound)")),
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Open an interactive window (drag to orbit, scroll to zoom)
    Window {
        #[command(flatten)]
        sketch: SketchArgs,
    },
    /// Render frames to disk
    Render {
        #[command(flatten)]
        sketch: SketchArgs,

        /// Output directory for frames
        #[arg(long)]
        out: PathBuf,

        /// Frames per second (defaults to the config value)
        #[arg(long)]
        fps: Option<f32>,

        /// Number of frames to render (overrides --duration)
        #[arg(long, conflicts_with = "duration")]
        frames: Option<usize>,

        /// Duration in seconds
        #[arg(long, default_value_t = 27.0)]
        duration: f32,

        /// Clock value of the first frame, in milliseconds
        #[arg(long, default_value_t = 0.0)]
        start_ms: f64,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Window { sketch } => {
            let config = sketch.resolve()?;
            crate::window::run(config)?;
        }
        Commands::Render { sketch, out, fps, frames, duration, start_ms } => {
            let mut config = sketch.resolve()?;
            if let Some(fps) = fps {
                config.fps = fps;
            }
            if config.fps <= 0.0 {
                return Err(anyhow!("fps must be positive, got {}", config.fps));
            }
            let total_frames = frames.unwrap_or_else(|| frame_count(duration, config.fps));
            pollster::block_on(render_offline(&config, out, total_frames, start_ms))?;
        }
    }
    Ok(())
}

/// Frames needed to cover `duration` seconds at `fps`.
fn frame_count(duration: f32, fps: f32) -> usize {
    (duration.max(0.0) * fps).ceil() as usize
}

async fn render_offline(config: &SketchConfig, out_dir: PathBuf, total_frames: usize, start_ms: f64) -> Result<()> {
    let (width, height) = (config.width, config.height);

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None, // Headless
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| anyhow!("No adapter found"))?;

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor::default(), None)
        .await?;

    let texture_desc = wgpu::TextureDescriptor {
        label: Some("Target Texture"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    };

    let texture = device.create_texture(&texture_desc);
    let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    // Rows of the readback buffer must be 256-byte aligned
    let u32_size = std::mem::size_of::<u32>() as u32;
    let unpadded_bytes_per_row = u32_size * width;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded_bytes_per_row_padding = (align - unpadded_bytes_per_row % align) % align;
    let padded_bytes_per_row = unpadded_bytes_per_row + padded_bytes_per_row_padding;

    let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Output Buffer"),
        size: (padded_bytes_per_row * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut renderer = Renderer::new(device, queue, texture_desc.format, width, height);
    let mut scene = config.build_scene();
    let camera = OrbitCamera::from_settings(&config.camera);
    let mut list = DisplayList::new();
    let mut clock = FixedStepClock::new(config.fps as f64, start_ms);

    log::info!("Rendering {} frames ({}x{} @ {} fps) to {:?}", total_frames, width, height, config.fps, out_dir);

    for i in 0..total_frames {
        list.clear();
        let info = scene.render(&mut list, clock.now_millis());
        renderer.render(&texture_view, &list, &camera);

        let mut encoder = renderer
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &output_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            texture_desc.size,
        );
        renderer.queue().submit(Some(encoder.finish()));

        let buffer_slice = output_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |v| {
            let _ = tx.send(v);
        });
        renderer.device().poll(wgpu::Maintain::Wait);
        rx.recv()??;

        let data = buffer_slice.get_mapped_range();
        let mut unpadded_data = Vec::with_capacity((width * height * 4) as usize);
        for row in 0..height {
            let start = (row * padded_bytes_per_row) as usize;
            let end = start + unpadded_bytes_per_row as usize;
            unpadded_data.extend_from_slice(&data[start..end]);
        }

        let frame_path = out_dir.join(format!("frame_{:05}.png", i));
        image::save_buffer(&frame_path, &unpadded_data, width, height, image::ColorType::Rgba8)
            .with_context(|| format!("failed to write {}", frame_path.display()))?;

        drop(data);
        output_buffer.unmap();

        if i % 60 == 0 {
            log::info!("frame {}/{} (phase {:.0}ms, cycle {})", i, total_frames, info.phase, info.cycle_count);
        }
        clock.advance();
    }
    log::info!("Done.");

    Ok(())
}
