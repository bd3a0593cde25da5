use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    const fn new(position: [f32; 3]) -> Self {
        Self { position }
    }

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

/// Unit cube centred at the origin. Every box is this mesh scaled by its
/// extents in the model matrix.
pub fn create_cube_geometry() -> (Vec<Vertex>, Vec<u16>) {
    let vertices = vec![
        // Front face (Z+)
        Vertex::new([-0.5, -0.5, 0.5]),
        Vertex::new([0.5, -0.5, 0.5]),
        Vertex::new([0.5, 0.5, 0.5]),
        Vertex::new([-0.5, 0.5, 0.5]),
        // Back face (Z-)
        Vertex::new([-0.5, -0.5, -0.5]),
        Vertex::new([-0.5, 0.5, -0.5]),
        Vertex::new([0.5, 0.5, -0.5]),
        Vertex::new([0.5, -0.5, -0.5]),
        // Top face (Y+)
        Vertex::new([-0.5, 0.5, -0.5]),
        Vertex::new([-0.5, 0.5, 0.5]),
        Vertex::new([0.5, 0.5, 0.5]),
        Vertex::new([0.5, 0.5, -0.5]),
        // Bottom face (Y-)
        Vertex::new([-0.5, -0.5, -0.5]),
        Vertex::new([0.5, -0.5, -0.5]),
        Vertex::new([0.5, -0.5, 0.5]),
        Vertex::new([-0.5, -0.5, 0.5]),
        // Right face (X+)
        Vertex::new([0.5, -0.5, -0.5]),
        Vertex::new([0.5, 0.5, -0.5]),
        Vertex::new([0.5, 0.5, 0.5]),
        Vertex::new([0.5, -0.5, 0.5]),
        // Left face (X-)
        Vertex::new([-0.5, -0.5, -0.5]),
        Vertex::new([-0.5, -0.5, 0.5]),
        Vertex::new([-0.5, 0.5, 0.5]),
        Vertex::new([-0.5, 0.5, -0.5]),
    ];

    let indices = vec![
        0, 1, 2, 2, 3, 0, // Front
        4, 5, 6, 6, 7, 4, // Back
        8, 9, 10, 10, 11, 8, // Top
        12, 13, 14, 14, 15, 12, // Bottom
        16, 17, 18, 18, 19, 16, // Right
        20, 21, 22, 22, 23, 20, // Left
    ];

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_indices_in_range() {
        let (vertices, indices) = create_cube_geometry();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn test_cube_is_unit_sized() {
        let (vertices, _) = create_cube_geometry();
        for v in vertices {
            assert!(v.position.iter().all(|c| c.abs() == 0.5));
        }
    }
}
