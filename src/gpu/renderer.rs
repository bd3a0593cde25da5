//! GPU renderer for recorded box draws.
//!
//! Takes the [`DisplayList`] a scene produced for one frame and rasterizes
//! it: one unit cube mesh, one dynamic uniform slot per box.

use wgpu::util::DeviceExt;

use crate::camera::OrbitCamera;
use crate::color::Rgb;
use crate::display_list::DisplayList;
use crate::gpu::mesh;
use crate::gpu::pipeline::{self, DEPTH_FORMAT};
use bytemuck::{Pod, Zeroable};
use std::iter;

/// Maximum number of boxes that can be rendered per frame.
/// Each box needs its own uniform slot in the dynamic uniform buffer.
const MAX_BOXES_PER_FRAME: usize = 256;

/// Uniform buffer alignment (WebGPU minUniformBufferOffsetAlignment is typically 256 bytes)
const UNIFORM_ALIGNMENT: usize = 256;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color: [f32; 4],
    // 144 bytes of data padded up to one 256-byte slot
    _padding: [f32; 28],
}

impl Uniforms {
    fn new() -> Self {
        Self {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            model: glam::Mat4::IDENTITY.to_cols_array_2d(),
            color: [1.0, 1.0, 1.0, 1.0],
            _padding: [0.0; 28],
        }
    }
}

/// sRGB-encoded channel to linear, for sRGB render targets.
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_rgb(unit: [f32; 3], format: wgpu::TextureFormat) -> [f32; 3] {
    if format.is_srgb() {
        unit.map(srgb_to_linear)
    } else {
        unit
    }
}

fn clear_color(background: Rgb, format: wgpu::TextureFormat) -> wgpu::Color {
    let [r, g, b] = linear_rgb(background.to_unit(), format);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

struct MeshGeometry {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
}

fn create_depth_view(device: &wgpu::Device, size: wgpu::Extent3d) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    size: wgpu::Extent3d,
    format: wgpu::TextureFormat,

    box_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    box_bind_group: wgpu::BindGroup,
    uniforms: Uniforms,

    cube_geometry: MeshGeometry,
    depth_view: wgpu::TextureView,
}

impl Renderer {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };

        // Create a large uniform buffer for dynamic uniform binding (one slot per box)
        let uniform_buffer_size = (UNIFORM_ALIGNMENT * MAX_BOXES_PER_FRAME) as u64;
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Box Uniform Buffer (Dynamic)"),
            size: uniform_buffer_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let box_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Uniforms>() as u64),
                },
                count: None,
            }],
            label: Some("box_bind_group_layout"),
        });

        let box_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &box_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<Uniforms>() as u64),
                }),
            }],
            label: Some("box_bind_group"),
        });

        let box_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Box Pipeline Layout"),
            bind_group_layouts: &[&box_bind_group_layout],
            push_constant_ranges: &[],
        });

        let box_pipeline = pipeline::create_box_pipeline(&device, &box_pipeline_layout, format);

        let (cube_vertices, cube_indices) = mesh::create_cube_geometry();
        let cube_geometry = MeshGeometry {
            vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cube Vertex Buffer"),
                contents: bytemuck::cast_slice(&cube_vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cube Index Buffer"),
                contents: bytemuck::cast_slice(&cube_indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            num_indices: cube_indices.len() as u32,
        };

        let depth_view = create_depth_view(&device, size);

        Self {
            device,
            queue,
            size,
            format,
            box_pipeline,
            uniform_buffer,
            box_bind_group,
            uniforms: Uniforms::new(),
            cube_geometry,
            depth_view,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn aspect(&self) -> f32 {
        self.size.width as f32 / self.size.height as f32
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
            self.depth_view = create_depth_view(&self.device, self.size);
        }
    }

    pub fn render(&mut self, view: &wgpu::TextureView, list: &DisplayList, camera: &OrbitCamera) {
        self.uniforms.view_proj = camera.view_projection_matrix(self.aspect()).to_cols_array_2d();

        let boxes = list.boxes();
        if boxes.len() > MAX_BOXES_PER_FRAME {
            log::warn!("Too many boxes ({} > {}), some will not be rendered", boxes.len(), MAX_BOXES_PER_FRAME);
        }
        let boxes = &boxes[..boxes.len().min(MAX_BOXES_PER_FRAME)];

        // Pre-write all box uniforms before the render pass: write_buffer is
        // applied at submit time, not recorded in pass order.
        for (idx, drawn) in boxes.iter().enumerate() {
            let [r, g, b, a] = drawn.color.to_unit();
            let [r, g, b] = linear_rgb([r, g, b], self.format);
            self.uniforms.model = drawn.scaled_model().to_cols_array_2d();
            self.uniforms.color = [r, g, b, a];

            let offset = (idx * UNIFORM_ALIGNMENT) as u64;
            self.queue.write_buffer(&self.uniform_buffer, offset, bytemuck::cast_slice(&[self.uniforms]));
        }

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(list.background(), self.format)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.box_pipeline);
            render_pass.set_vertex_buffer(0, self.cube_geometry.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.cube_geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

            for idx in 0..boxes.len() {
                let dynamic_offset = (idx * UNIFORM_ALIGNMENT) as u32;
                render_pass.set_bind_group(0, &self.box_bind_group, &[dynamic_offset]);
                render_pass.draw_indexed(0..self.cube_geometry.num_indices, 0, 0..1);
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_slot_size() {
        assert_eq!(std::mem::size_of::<Uniforms>(), UNIFORM_ALIGNMENT);
    }

    #[test]
    fn test_srgb_to_linear_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!(srgb_to_linear(0.5) < 0.5);
    }

    #[test]
    fn test_clear_color_passthrough_for_linear_targets() {
        let color = clear_color(Rgb::new(255, 0, 0), wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!((color.r, color.g, color.b, color.a), (1.0, 0.0, 0.0, 1.0));
    }
}
