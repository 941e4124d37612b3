//! OBJ loader for triangulated meshes with positions, texture coordinates and normals.
//!
//! Loading happens in two steps: [`parser`] reads the whole stream into raw
//! attribute arrays and face records, then [`assembler`] expands every face
//! corner into an interleaved [`Vertex`](crate::mesh::Vertex).

pub mod assembler;
pub mod parser;

use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader},
    num::{ParseFloatError, ParseIntError},
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::mesh::MeshData;

pub use assembler::assemble;
pub use parser::{FaceVertexRef, ObjData, ObjFace, parse_obj};

/// Knobs for a single load. The defaults reproduce the plain OBJ grammar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Treat unknown commands (`o`, `g`, `usemtl`, ...) as format errors.
    pub reject_unknown_commands: bool,
    /// Store texture coordinates as `(u, 1 - v)`.
    pub flip_v: bool,
}

/// Which attribute sequence a face index points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    Position,
    TexCoord,
    Normal,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Attribute::Position => "position",
            Attribute::TexCoord => "texture coordinate",
            Attribute::Normal => "normal",
        })
    }
}

/// Why a single line was rejected.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("missing {what}")]
    MissingComponent { what: &'static str },
    #[error("expected {expected} values after '{command}', found more")]
    TooManyComponents {
        command: &'static str,
        expected: usize,
    },
    #[error("invalid {what} '{token}': {source}")]
    InvalidFloat {
        what: &'static str,
        token: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("{what} '{token}' is not a finite number")]
    NonFiniteFloat { what: &'static str, token: String },
    #[error("face must have exactly 3 vertices, found {found} (triangulate before export)")]
    FaceVertexCount { found: usize },
    #[error("face vertex '{token}' is not of the form index/index/index")]
    MalformedFaceVertex { token: String },
    #[error("invalid index '{token}': {source}")]
    InvalidIndex {
        token: String,
        #[source]
        source: ParseIntError,
    },
    #[error("unknown command '{command}'")]
    UnknownCommand { command: String },
}

/// Coarse classification of [`ObjError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Format,
    DataIntegrity,
}

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("Failed to open OBJ file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },
    #[error("Malformed OBJ line {line} '{content}': {kind}")]
    Format {
        line: usize,
        content: String,
        #[source]
        kind: FormatError,
    },
    #[error("Face on line {line} references {attribute} {index}, but only {len} are declared")]
    IndexOutOfRange {
        line: usize,
        attribute: Attribute,
        /// Index as written in the file (1-based).
        index: i64,
        len: usize,
    },
}

impl ObjError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ObjError::Open { .. } | ObjError::Read { .. } => ErrorCategory::Io,
            ObjError::Format { .. } => ErrorCategory::Format,
            ObjError::IndexOutOfRange { .. } => ErrorCategory::DataIntegrity,
        }
    }

    /// 1-based source line, when the error is tied to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ObjError::Open { .. } => None,
            ObjError::Read { line, .. }
            | ObjError::Format { line, .. }
            | ObjError::IndexOutOfRange { line, .. } => Some(*line),
        }
    }
}

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<MeshData, ObjError> {
    load_obj_from_path_with(path, ParseOptions::default())
}

pub fn load_obj_from_path_with(
    path: impl AsRef<Path>,
    options: ParseOptions,
) -> Result<MeshData, ObjError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ObjError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Loading OBJ mesh from {}", path.display());
    load_obj_from_reader_with(BufReader::new(file), options)
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> Result<MeshData, ObjError> {
    load_obj_from_reader_with(reader, ParseOptions::default())
}

pub fn load_obj_from_reader_with<R: BufRead>(
    reader: R,
    options: ParseOptions,
) -> Result<MeshData, ObjError> {
    let data = parse_obj(reader, &options)?;
    let mesh = assemble(&data, &options)?;
    log::info!(
        "OBJ parsed: {} positions, {} uvs, {} normals, {} faces -> {} vertices",
        data.positions.len(),
        data.tex_coords.len(),
        data.normals.len(),
        data.faces.len(),
        mesh.vertex_count()
    );
    Ok(mesh)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<MeshData, ObjError> {
    load_obj_from_reader(io::Cursor::new(contents))
}

pub fn load_obj_from_str_with(
    contents: &str,
    options: ParseOptions,
) -> Result<MeshData, ObjError> {
    load_obj_from_reader_with(io::Cursor::new(contents), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Vertex;

    const TRIANGLE: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
";

    #[test]
    fn parse_simple_triangle() {
        let mesh = load_obj_from_str(TRIANGLE).expect("parse triangle");
        assert_eq!(
            mesh.vertices,
            vec![
                Vertex {
                    position: [0.0, 0.0, 0.0],
                    normal: [0.0, 0.0, 1.0],
                    uv: [0.0, 0.0],
                    color: [1.0, 1.0, 1.0, 1.0],
                },
                Vertex {
                    position: [1.0, 0.0, 0.0],
                    normal: [0.0, 0.0, 1.0],
                    uv: [1.0, 0.0],
                    color: [1.0, 1.0, 1.0, 1.0],
                },
                Vertex {
                    position: [0.0, 1.0, 0.0],
                    normal: [0.0, 0.0, 1.0],
                    uv: [0.0, 1.0],
                    color: [1.0, 1.0, 1.0, 1.0],
                },
            ]
        );
    }

    #[test]
    fn vertex_count_is_three_per_face() {
        let src = format!("{TRIANGLE}f 3/3/1 2/2/1 1/1/1\nf 1/1/1 1/1/1 1/1/1\n");
        let mesh = load_obj_from_str(&src).unwrap();
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.triangle_count(), 3);
    }

    #[test]
    fn every_position_comes_from_the_file() {
        let src = "\
v 0.25 -1.5 3
v 7 8 9
v -0.125 0 1e-3
vt 0.5 0.5
vn 1 0 0
f 3/1/1 1/1/1 2/1/1
f 2/1/1 2/1/1 3/1/1
";
        let declared = [[0.25, -1.5, 3.0], [7.0, 8.0, 9.0], [-0.125, 0.0, 1e-3]];
        let mesh = load_obj_from_str(src).unwrap();
        assert!(mesh.vertices.iter().all(|v| declared.contains(&v.position)));
    }

    #[test]
    fn loading_is_deterministic() {
        let a = load_obj_from_str(TRIANGLE).unwrap();
        let b = load_obj_from_str(TRIANGLE).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn missing_face_component_is_a_format_error() {
        let src = format!("{TRIANGLE}f 1/1 2/2/2 3/3/3\n");
        let err = load_obj_from_str(&src).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Format);
        assert_eq!(err.line(), Some(9));
    }

    #[test]
    fn out_of_range_position_is_a_data_integrity_error() {
        let src = "v 0 0 0\nv 1 0 0\nvt 0 0\nvn 0 0 1\nf 99/1/1 1/1/1 2/1/1\n";
        let err = load_obj_from_str(src).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::DataIntegrity);
        match err {
            ObjError::IndexOutOfRange {
                line,
                attribute,
                index,
                len,
            } => {
                assert_eq!(line, 5);
                assert_eq!(attribute, Attribute::Position);
                assert_eq!(index, 99);
                assert_eq!(len, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unopenable_path_is_an_io_error() {
        let err = load_obj_from_path("/no/such/dir/mesh.obj").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Io);
        assert_eq!(err.line(), None);
        assert!(err.to_string().contains("/no/such/dir/mesh.obj"));
    }

    #[test]
    fn loads_from_file_on_disk() {
        let path = std::env::temp_dir().join(format!("obj-load-{}.obj", std::process::id()));
        std::fs::write(&path, TRIANGLE).unwrap();

        let from_file = load_obj_from_path(&path).unwrap();
        let from_str = load_obj_from_str(TRIANGLE).unwrap();
        assert_eq!(from_file, from_str);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn load_types_can_move_between_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<MeshData>();
        assert_send::<ObjData>();
        assert_send::<ObjError>();
        assert_send::<ParseOptions>();

        let handle = std::thread::spawn(|| load_obj_from_str(TRIANGLE));
        let mesh = handle.join().unwrap().unwrap();
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn error_message_names_line_and_content() {
        let err = load_obj_from_str("v 0 zero 0\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 1"), "{msg}");
        assert!(msg.contains("v 0 zero 0"), "{msg}");
    }
}
