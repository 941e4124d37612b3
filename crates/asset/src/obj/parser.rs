//! Line-oriented OBJ reader: raw attribute arrays plus face records.

use std::io::BufRead;

use super::{FormatError, ObjError, ParseOptions};

/// One face corner. Indices are already shifted to 0-based and are not
/// bounds-checked yet; a bad file can make them negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaceVertexRef {
    pub position: i64,
    pub tex_coord: i64,
    pub normal: i64,
}

/// A triangle as written on an `f` line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjFace {
    /// 1-based source line, kept for diagnostics.
    pub line: usize,
    pub corners: [FaceVertexRef; 3],
}

/// Everything read from an OBJ stream, in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjData {
    pub positions: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<ObjFace>,
}

/// Read the whole stream. Fails on the first malformed line.
pub fn parse_obj<R: BufRead>(reader: R, options: &ParseOptions) -> Result<ObjData, ObjError> {
    let mut data = ObjData::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.map_err(|source| ObjError::Read {
            line: line_no,
            source,
        })?;

        parse_line(&line, line_no, options, &mut data).map_err(|kind| ObjError::Format {
            line: line_no,
            content: line.trim().to_owned(),
            kind,
        })?;
    }

    Ok(data)
}

fn parse_line(
    line: &str,
    line_no: usize,
    options: &ParseOptions,
    data: &mut ObjData,
) -> Result<(), FormatError> {
    // A '#' token starts a comment that runs to the end of the line.
    let mut parts = line.split_whitespace().take_while(|token| !token.starts_with('#'));
    let Some(command) = parts.next() else {
        return Ok(());
    };

    match command {
        "v" => {
            let position = parse_floats(
                &mut parts,
                "v",
                ["x coordinate", "y coordinate", "z coordinate"],
            )?;
            data.positions.push(position);
        }
        "vt" => {
            let uv = parse_floats(&mut parts, "vt", ["u coordinate", "v coordinate"])?;
            data.tex_coords.push(uv);
        }
        "vn" => {
            let normal = parse_floats(
                &mut parts,
                "vn",
                ["nx coordinate", "ny coordinate", "nz coordinate"],
            )?;
            data.normals.push(normal);
        }
        "f" => {
            let corners = parse_face(parts)?;
            data.faces.push(ObjFace {
                line: line_no,
                corners,
            });
        }
        _ if options.reject_unknown_commands => {
            return Err(FormatError::UnknownCommand {
                command: command.to_owned(),
            });
        }
        _ => log::debug!("Ignoring OBJ command '{}' on line {}", command, line_no),
    }

    Ok(())
}

fn parse_floats<'a, const N: usize>(
    parts: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    names: [&'static str; N],
) -> Result<[f32; N], FormatError> {
    let mut values = [0.0; N];

    for (value, what) in values.iter_mut().zip(names) {
        let token = parts.next().ok_or(FormatError::MissingComponent { what })?;
        let parsed = token
            .parse::<f32>()
            .map_err(|source| FormatError::InvalidFloat {
                what,
                token: token.to_owned(),
                source,
            })?;
        // `f32::from_str` also takes "nan" and "inf"
        if !parsed.is_finite() {
            return Err(FormatError::NonFiniteFloat {
                what,
                token: token.to_owned(),
            });
        }
        *value = parsed;
    }

    if parts.next().is_some() {
        return Err(FormatError::TooManyComponents {
            command,
            expected: N,
        });
    }

    Ok(values)
}

fn parse_face<'a>(
    parts: impl Iterator<Item = &'a str>,
) -> Result<[FaceVertexRef; 3], FormatError> {
    let groups: Vec<&str> = parts.collect();
    let &[a, b, c] = groups.as_slice() else {
        return Err(FormatError::FaceVertexCount {
            found: groups.len(),
        });
    };

    Ok([
        parse_face_vertex(a)?,
        parse_face_vertex(b)?,
        parse_face_vertex(c)?,
    ])
}

/// Parse `int SEP int SEP int`, where `SEP` is any single non-digit character.
/// A sign after a separator belongs to the next index, so `1--2-3` is `(1, -2, 3)`.
fn parse_face_vertex(token: &str) -> Result<FaceVertexRef, FormatError> {
    let malformed = || FormatError::MalformedFaceVertex {
        token: token.to_owned(),
    };

    let mut indices = [0_i64; 3];
    let mut rest = token;

    for (i, index) in indices.iter_mut().enumerate() {
        if i > 0 {
            let mut chars = rest.chars();
            match chars.next() {
                Some(sep) if !sep.is_ascii_digit() => rest = chars.as_str(),
                _ => return Err(malformed()),
            }
        }

        let end = rest
            .char_indices()
            .find(|&(pos, c)| !(c.is_ascii_digit() || (pos == 0 && (c == '-' || c == '+'))))
            .map_or(rest.len(), |(pos, _)| pos);
        let (number, tail) = rest.split_at(end);
        if number.is_empty() {
            return Err(malformed());
        }

        let raw = number
            .parse::<i64>()
            .map_err(|source| FormatError::InvalidIndex {
                token: number.to_owned(),
                source,
            })?;
        // OBJ indices are 1-based
        *index = raw.saturating_sub(1);
        rest = tail;
    }

    if !rest.is_empty() {
        return Err(malformed());
    }

    Ok(FaceVertexRef {
        position: indices[0],
        tex_coord: indices[1],
        normal: indices[2],
    })
}
