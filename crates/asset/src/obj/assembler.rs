//! Expands parsed faces into a flat vertex list.
//!
//! Every face corner becomes its own [`Vertex`]: there is no welding, so a
//! position shared by several triangles is stored once per triangle. Memory
//! grows with triangle count, which is fine for small hand-authored meshes.

use super::{Attribute, ObjError, ParseOptions, parser::ObjData};
use crate::mesh::{MeshData, Vertex};

pub fn assemble(data: &ObjData, options: &ParseOptions) -> Result<MeshData, ObjError> {
    let mut vertices = Vec::with_capacity(data.faces.len() * 3);

    for face in &data.faces {
        let at = |attribute| (attribute, face.line);
        for corner in &face.corners {
            let position = *lookup(&data.positions, corner.position, at(Attribute::Position))?;
            let normal = *lookup(&data.normals, corner.normal, at(Attribute::Normal))?;
            let [u, v] = *lookup(&data.tex_coords, corner.tex_coord, at(Attribute::TexCoord))?;
            let uv = if options.flip_v { [u, 1.0 - v] } else { [u, v] };

            vertices.push(Vertex::new(position, normal, uv));
        }
    }

    Ok(MeshData::new(vertices))
}

fn lookup<T>(
    items: &[T],
    index: i64,
    (attribute, line): (Attribute, usize),
) -> Result<&T, ObjError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .ok_or(ObjError::IndexOutOfRange {
            line,
            attribute,
            index: index.saturating_add(1),
            len: items.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::{ErrorCategory, FaceVertexRef, ObjFace};

    fn corner(position: i64, tex_coord: i64, normal: i64) -> FaceVertexRef {
        FaceVertexRef {
            position,
            tex_coord,
            normal,
        }
    }

    fn quad_data() -> ObjData {
        ObjData {
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            tex_coords: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            normals: vec![[0.0, 0.0, 1.0], [0.0, 0.0, -1.0]],
            faces: vec![
                ObjFace {
                    line: 11,
                    corners: [corner(0, 0, 0), corner(1, 1, 0), corner(2, 2, 0)],
                },
                ObjFace {
                    line: 12,
                    corners: [corner(0, 0, 1), corner(2, 2, 1), corner(3, 3, 1)],
                },
            ],
        }
    }

    #[test]
    fn shared_corners_are_duplicated() {
        let mesh = assemble(&quad_data(), &ParseOptions::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.vertices[0].position, mesh.vertices[3].position);
        assert_eq!(mesh.vertices[2].position, mesh.vertices[4].position);
        assert_eq!(mesh.vertices[3].normal, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn attributes_are_resolved_independently() {
        let mut data = quad_data();
        data.faces.truncate(1);
        data.faces[0].corners[0] = corner(3, 1, 1);

        let mesh = assemble(&data, &ParseOptions::default()).unwrap();
        let first = mesh.vertices[0];
        assert_eq!(first.position, [0.0, 1.0, 0.0]);
        assert_eq!(first.uv, [1.0, 0.0]);
        assert_eq!(first.normal, [0.0, 0.0, -1.0]);
        assert_eq!(first.color, Vertex::DEFAULT_COLOR);
    }

    #[test]
    fn assembly_does_not_touch_the_source() {
        let data = quad_data();
        let before = data.clone();
        assemble(&data, &ParseOptions::default()).unwrap();
        assert_eq!(data, before);
    }

    #[test]
    fn flip_v_mirrors_texture_coordinates() {
        let options = ParseOptions {
            flip_v: true,
            ..ParseOptions::default()
        };
        let mesh = assemble(&quad_data(), &options).unwrap();
        assert_eq!(mesh.vertices[0].uv, [0.0, 1.0]);
        assert_eq!(mesh.vertices[2].uv, [1.0, 0.0]);
    }

    #[test]
    fn empty_input_gives_empty_mesh() {
        let mesh = assemble(&ObjData::default(), &ParseOptions::default()).unwrap();
        assert!(mesh.vertices.is_empty());
        assert!(!mesh.is_valid());
    }

    #[test]
    fn out_of_range_normal_names_the_face_line() {
        let mut data = quad_data();
        data.faces[1].corners[2] = corner(3, 3, 2);

        let err = assemble(&data, &ParseOptions::default()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::DataIntegrity);
        match err {
            ObjError::IndexOutOfRange {
                line,
                attribute,
                index,
                len,
            } => {
                assert_eq!(line, 12);
                assert_eq!(attribute, Attribute::Normal);
                assert_eq!(index, 3);
                assert_eq!(len, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_or_negative_references_are_out_of_range() {
        let mut data = quad_data();
        data.faces[0].corners[1] = corner(1, -1, 0);

        let err = assemble(&data, &ParseOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ObjError::IndexOutOfRange {
                attribute: Attribute::TexCoord,
                index: 0,
                ..
            }
        ));
    }

    #[test]
    fn missing_normals_are_an_integrity_error() {
        let mut data = quad_data();
        data.normals.clear();

        let err = assemble(&data, &ParseOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ObjError::IndexOutOfRange {
                attribute: Attribute::Normal,
                len: 0,
                line: 11,
                ..
            }
        ));
    }
}
