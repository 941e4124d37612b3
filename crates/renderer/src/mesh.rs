//! GPU-side meshes: one vertex buffer plus the fixed interleaved layout.

use anyhow::{Result, ensure};
use asset::{MeshData, MeshUploader, Vertex, VertexSemantic};
use wgpu::{
    Buffer, BufferUsages, Device, RenderPass, VertexAttribute, VertexBufferLayout, VertexFormat,
    VertexStepMode,
    util::{BufferInitDescriptor, DeviceExt},
};

static ATTRIBUTES: [VertexAttribute; 4] = [
    attribute(0),
    attribute(1),
    attribute(2),
    attribute(3),
];

/// Maps `Vertex::LAYOUT[location]` onto a shader input.
const fn attribute(location: usize) -> VertexAttribute {
    let attr = Vertex::LAYOUT[location];
    VertexAttribute {
        format: match attr.semantic {
            VertexSemantic::Position | VertexSemantic::Normal => VertexFormat::Float32x3,
            VertexSemantic::TexCoord => VertexFormat::Float32x2,
            VertexSemantic::Color => VertexFormat::Float32x4,
        },
        offset: attr.offset as u64,
        shader_location: location as u32,
    }
}

/// Layout for pipelines drawing [`GpuMesh`]es:
/// location 0 position, 1 normal, 2 uv, 3 color.
pub fn vertex_buffer_layout() -> VertexBufferLayout<'static> {
    VertexBufferLayout {
        array_stride: Vertex::STRIDE as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

/// Non-indexed triangle list living in GPU memory.
pub struct GpuMesh {
    buffer: Buffer,
    vertex_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &Device, label: &str, mesh: &MeshData) -> Result<Self> {
        ensure!(mesh.is_valid(), "Mesh '{}' has no complete triangles", label);
        let vertex_count = u32::try_from(mesh.vertex_count())
            .map_err(|_| anyhow::anyhow!("Too many vertices in mesh '{}' (>{})", label, u32::MAX))?;

        let buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some(label),
            contents: mesh.as_bytes(),
            usage: BufferUsages::VERTEX,
        });
        log::info!(
            "Uploaded mesh '{}': {} vertices, {} bytes",
            label,
            vertex_count,
            mesh.as_bytes().len()
        );

        Ok(Self {
            buffer,
            vertex_count,
        })
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Bind to slot 0 and draw. The pipeline must use [`vertex_buffer_layout`].
    pub fn draw(&self, pass: &mut RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

/// [`MeshUploader`] backed by a wgpu device.
pub struct GpuUploader<'a> {
    device: &'a Device,
}

impl<'a> GpuUploader<'a> {
    pub fn new(device: &'a Device) -> Self {
        Self { device }
    }
}

impl MeshUploader for GpuUploader<'_> {
    type Handle = GpuMesh;

    fn upload(&mut self, label: &str, mesh: &MeshData) -> Result<GpuMesh> {
        GpuMesh::upload(self.device, label, mesh)
    }
}
