//! Vertex formats and meshes shared by the bundled demos

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::backend::{
    BindGroupHandle, BufferHandle, GraphicsBackend, IndexFormat, VertexBufferLayout, VertexFormat,
};

/// Two triangles over a quad wound 0-1-2, 2-3-0
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PositionVertex {
    pub position: [f32; 3],
}

impl PositionVertex {
    pub fn layout() -> VertexBufferLayout {
        VertexBufferLayout::packed(0, &[VertexFormat::Float32x3])
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl ColorVertex {
    pub fn layout() -> VertexBufferLayout {
        VertexBufferLayout::packed(0, &[VertexFormat::Float32x3, VertexFormat::Float32x4])
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl TexturedVertex {
    pub fn layout() -> VertexBufferLayout {
        VertexBufferLayout::packed(0, &[VertexFormat::Float32x3, VertexFormat::Float32x2])
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct NormalVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl NormalVertex {
    pub fn layout() -> VertexBufferLayout {
        VertexBufferLayout::packed(0, &[VertexFormat::Float32x3, VertexFormat::Float32x3])
    }
}

/// Single mat4 uniform
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TransformUniform {
    pub matrix: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn new(matrix: Mat4) -> Self {
        Self {
            matrix: matrix.to_cols_array_2d(),
        }
    }
}

impl Default for TransformUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

/// Textured unit quad centred on the origin, indexed with [`QUAD_INDICES`]
pub fn textured_quad(half: f32) -> [TexturedVertex; 4] {
    [
        TexturedVertex { position: [-half, -half, 0.0], uv: [0.0, 1.0] },
        TexturedVertex { position: [half, -half, 0.0], uv: [1.0, 1.0] },
        TexturedVertex { position: [half, half, 0.0], uv: [1.0, 0.0] },
        TexturedVertex { position: [-half, half, 0.0], uv: [0.0, 0.0] },
    ]
}

const CUBE_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    // normal, u axis, v axis (u x v = normal, so corners wind counter-clockwise)
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
];

/// Unit cube as 36 non-indexed vertices with face normals
pub fn cube_with_normals() -> Vec<NormalVertex> {
    let mut vertices = Vec::with_capacity(36);
    for (normal, u, v) in CUBE_FACES {
        let corner = |su: f32, sv: f32| -> [f32; 3] {
            std::array::from_fn(|i| 0.5 * (normal[i] + su * u[i] + sv * v[i]))
        };
        let quad = [corner(-1.0, -1.0), corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0)];
        for index in QUAD_INDICES {
            vertices.push(NormalVertex {
                position: quad[index as usize],
                normal,
            });
        }
    }
    vertices
}

/// Unit cube as 36 non-indexed vertices with one colour per face
pub fn colored_cube() -> Vec<ColorVertex> {
    const FACE_COLORS: [[f32; 4]; 6] = [
        [0.9, 0.3, 0.3, 1.0],
        [0.3, 0.9, 0.3, 1.0],
        [0.3, 0.3, 0.9, 1.0],
        [0.9, 0.9, 0.3, 1.0],
        [0.3, 0.9, 0.9, 1.0],
        [0.9, 0.3, 0.9, 1.0],
    ];

    cube_with_normals()
        .chunks(6)
        .zip(FACE_COLORS)
        .flat_map(|(face, color)| {
            face.iter().map(move |v| ColorVertex {
                position: v.position,
                color,
            })
        })
        .collect()
}

/// Bind `bind_groups` from group 0 upwards and draw an indexed u16 mesh
pub fn draw_indexed_mesh(
    gpu: &mut dyn GraphicsBackend,
    vertices: BufferHandle,
    indices: BufferHandle,
    index_count: u32,
    bind_groups: &[BindGroupHandle],
) {
    for (index, group) in bind_groups.iter().enumerate() {
        gpu.set_bind_group(index as u32, *group);
    }
    gpu.set_vertex_buffer(0, vertices, 0);
    gpu.set_index_buffer(indices, 0, IndexFormat::Uint16);
    gpu.draw_indexed(0..index_count, 0, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_cube_has_outward_ccw_faces() {
        let cube = cube_with_normals();
        assert_eq!(cube.len(), 36);
        for tri in cube.chunks(3) {
            let a = Vec3::from(tri[0].position);
            let b = Vec3::from(tri[1].position);
            let c = Vec3::from(tri[2].position);
            let face_normal = (b - a).cross(c - a).normalize();
            assert!(face_normal.dot(Vec3::from(tri[0].normal)) > 0.99);
        }
    }

    #[test]
    fn test_colored_cube_matches_geometry() {
        let colored = colored_cube();
        let plain = cube_with_normals();
        assert_eq!(colored.len(), plain.len());
        assert_eq!(colored[6].position, plain[6].position);
        assert_ne!(colored[0].color, colored[6].color);
    }

    #[test]
    fn test_vertex_layout_strides() {
        assert_eq!(ColorVertex::layout().array_stride, std::mem::size_of::<ColorVertex>() as u64);
        assert_eq!(TexturedVertex::layout().array_stride, std::mem::size_of::<TexturedVertex>() as u64);
        assert_eq!(NormalVertex::layout().array_stride, std::mem::size_of::<NormalVertex>() as u64);
    }
}
