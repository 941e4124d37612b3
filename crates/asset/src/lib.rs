//! Asset loading/parsers (meshes).
//! OBJ mesh loader producing flat, GPU-ready vertex data.

pub mod mesh;
pub mod meta;
pub mod obj;

use std::path::Path;

use anyhow::{Context, Result};

pub use mesh::{MeshData, Vertex, VertexAttribute, VertexSemantic};
pub use meta::ObjMeta;
pub use obj::{ErrorCategory, ObjError, ParseOptions};

/// Receives assembled vertex data and turns it into a caller-owned handle
/// (a GPU vertex buffer, or anything else that consumes [`MeshData`]).
pub trait MeshUploader {
    type Handle;

    fn upload(&mut self, label: &str, mesh: &MeshData) -> Result<Self::Handle>;
}

/// Load an OBJ file using its import meta and hand the result to `uploader`.
pub fn load_mesh<U: MeshUploader>(
    path: impl AsRef<Path>,
    uploader: &mut U,
) -> Result<U::Handle> {
    let path = path.as_ref();
    let meta = ObjMeta::resolve(path)?;
    load_mesh_with(path, meta.parse_options(), uploader)
}

/// Same as [`load_mesh`] but with explicit options, ignoring any meta files.
pub fn load_mesh_with<U: MeshUploader>(
    path: impl AsRef<Path>,
    options: ParseOptions,
    uploader: &mut U,
) -> Result<U::Handle> {
    let path = path.as_ref();
    let mesh = obj::load_obj_from_path_with(path, options)?;
    let label = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    uploader
        .upload(&label, &mesh)
        .with_context(|| format!("Failed to upload mesh '{}'", path.display()))
}
