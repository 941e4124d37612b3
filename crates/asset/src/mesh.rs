//! CPU-side mesh representation used by loaders.

use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};

/// Interleaved vertex: position/normal/uv/color. Values are in object space.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

/// What a vertex attribute means to the shader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexSemantic {
    Position,
    Normal,
    TexCoord,
    Color,
}

/// One `f32` attribute inside [`Vertex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub semantic: VertexSemantic,
    pub components: u32,
    pub offset: usize,
}

impl Vertex {
    /// OBJ carries no vertex colors.
    pub const DEFAULT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    pub const STRIDE: usize = size_of::<Vertex>();

    /// Fixed layout in field order; shader locations follow array order.
    pub const LAYOUT: [VertexAttribute; 4] = [
        VertexAttribute {
            semantic: VertexSemantic::Position,
            components: 3,
            offset: offset_of!(Vertex, position),
        },
        VertexAttribute {
            semantic: VertexSemantic::Normal,
            components: 3,
            offset: offset_of!(Vertex, normal),
        },
        VertexAttribute {
            semantic: VertexSemantic::TexCoord,
            components: 2,
            offset: offset_of!(Vertex, uv),
        },
        VertexAttribute {
            semantic: VertexSemantic::Color,
            components: 4,
            offset: offset_of!(Vertex, color),
        },
    ];

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            color: Self::DEFAULT_COLOR,
        }
    }
}

/// Non-indexed triangle list; every three vertices form one triangle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Returns `true` if there is at least one whole triangle.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty() && self.vertices.len() % 3 == 0
    }

    /// Contiguous byte view for buffer uploads.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_tightly_packed_in_field_order() {
        assert_eq!(Vertex::STRIDE, 48);
        let offsets: Vec<usize> = Vertex::LAYOUT.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24, 32]);

        let floats: u32 = Vertex::LAYOUT.iter().map(|a| a.components).sum();
        assert_eq!(floats as usize * size_of::<f32>(), Vertex::STRIDE);
    }

    #[test]
    fn new_vertex_is_opaque_white() {
        let v = Vertex::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.5, 0.5]);
        assert_eq!(v.color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn mesh_data_validity() {
        assert!(!MeshData::default().is_valid());
        assert!(!MeshData::new(vec![Vertex::default(); 2]).is_valid());

        let data = MeshData::new(vec![Vertex::default(); 6]);
        assert!(data.is_valid());
        assert_eq!(data.triangle_count(), 2);
        assert_eq!(data.as_bytes().len(), 6 * Vertex::STRIDE);
    }
}
