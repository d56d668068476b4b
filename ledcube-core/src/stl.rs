/// STL file parser for binary and ASCII formats
use std::fs;
use std::path::Path;

use nom::{
    bytes::complete::{tag, take, take_till},
    character::complete::{multispace0, multispace1},
    multi::{count, many0},
    number::complete::{float, le_f32, le_u16, le_u32},
    sequence::preceded,
    IResult,
};

use crate::error::{FormatError, Result};
use crate::geometry::{Mesh, Triangle};
use crate::transform::{direction, point};

const HEADER_LEN: usize = 80;
const RECORD_LEN: u64 = 50;

/// Which normal a loaded triangle carries for culling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalMode {
    /// Ignore the file's facet normals and derive them from the winding
    #[default]
    Recompute,
    /// Keep the file's facet normals
    Trust,
}

type Vec3 = [f32; 3];

struct Facet {
    normal: Vec3,
    vertices: [Vec3; 3],
}

fn vector3(input: &[u8]) -> IResult<&[u8], Vec3> {
    let (input, x) = le_f32(input)?;
    let (input, y) = le_f32(input)?;
    let (input, z) = le_f32(input)?;
    Ok((input, [x, y, z]))
}

fn facet(input: &[u8]) -> IResult<&[u8], Facet> {
    let (input, normal) = vector3(input)?;
    let (input, a) = vector3(input)?;
    let (input, b) = vector3(input)?;
    let (input, c) = vector3(input)?;
    // Attribute byte count, unused
    let (input, _) = le_u16(input)?;
    Ok((
        input,
        Facet {
            normal,
            vertices: [a, b, c],
        },
    ))
}

fn facet_to_triangle(facet: &Facet, mode: NormalMode) -> Triangle {
    let [a, b, c] = facet.vertices;
    let triangle = Triangle::new(
        point(a[0], a[1], a[2]),
        point(b[0], b[1], b[2]),
        point(c[0], c[1], c[2]),
    );
    match mode {
        NormalMode::Recompute => triangle,
        NormalMode::Trust => {
            let [nx, ny, nz] = facet.normal;
            triangle.with_facet_normal(direction(nx, ny, nz))
        }
    }
}

/// Parse a binary STL file
///
/// The file must be exactly `84 + 50 * N` bytes long and every vertex
/// component must be finite.
pub fn parse_binary_stl(data: &[u8], mode: NormalMode) -> std::result::Result<Mesh, FormatError> {
    let too_short = || FormatError::TooShort { len: data.len() };
    if data.len() < HEADER_LEN + 4 {
        return Err(too_short());
    }

    let parsed: IResult<&[u8], u32> =
        preceded(take(HEADER_LEN), le_u32)(data);
    let (body, declared) = parsed.map_err(|_| too_short())?;

    let expected_len = (HEADER_LEN as u64 + 4) + RECORD_LEN * declared as u64;
    if expected_len != data.len() as u64 {
        return Err(FormatError::CountMismatch {
            declared,
            expected_len,
            actual_len: data.len(),
        });
    }

    let parsed: IResult<&[u8], Vec<Facet>> = count(facet, declared as usize)(body);
    let (_, facets) = parsed.map_err(|_| too_short())?;

    let mut mesh = Mesh::with_capacity(facets.len());
    for (index, facet) in facets.iter().enumerate() {
        if !facet.vertices.iter().flatten().all(|c| c.is_finite()) {
            return Err(FormatError::NonFinite { facet: index });
        }
        mesh.add_triangle(facet_to_triangle(facet, mode));
    }

    log::debug!("parsed binary STL with {} triangles", mesh.len());
    Ok(mesh)
}

/// Encode a mesh as binary STL with a blank header.
///
/// Facet normals are written from the vertex winding.
pub fn write_binary_stl(mesh: &Mesh) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + 4 + mesh.len() * RECORD_LEN as usize);
    out.extend_from_slice(&[0u8; HEADER_LEN]);
    out.extend_from_slice(&(mesh.len() as u32).to_le_bytes());

    for triangle in &mesh.triangles {
        let n = triangle.winding_normal();
        for c in [n.x, n.y, n.z] {
            out.extend_from_slice(&c.to_le_bytes());
        }
        for v in &triangle.vertices {
            for c in [v.x, v.y, v.z] {
                out.extend_from_slice(&c.to_le_bytes());
            }
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }
    out
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str, mode: NormalMode) -> std::result::Result<Mesh, FormatError> {
    match parse_ascii_stl_impl(input) {
        Ok((_, facets)) => {
            let mut mesh = Mesh::with_capacity(facets.len());
            for (index, facet) in facets.iter().enumerate() {
                if !facet.vertices.iter().flatten().all(|c| c.is_finite()) {
                    return Err(FormatError::NonFinite { facet: index });
                }
                mesh.add_triangle(facet_to_triangle(facet, mode));
            }
            Ok(mesh)
        }
        Err(e) => Err(FormatError::Ascii(format!("{:?}", e))),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Vec<Facet>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    // Optional solid name, up to the end of the line
    let (input, _) = take_till(|c: char| c == '\n')(input)?;
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    Ok((input, facets))
}

fn parse_facet(input: &str) -> IResult<&str, Facet> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((
        input,
        Facet {
            normal,
            vertices: [v1, v2, v3],
        },
    ))
}

fn parse_vertex(input: &str) -> IResult<&str, Vec3> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    parse_vector3(input)
}

fn parse_vector3(input: &str) -> IResult<&str, Vec3> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, [x, y, z]))
}

/// Detect and parse STL data (binary or ASCII)
///
/// Binary files whose header happens to start with `solid` are common, so a
/// failed text parse falls back to binary, unless the size rules out a
/// binary file and the text error is the one worth reporting.
pub fn parse_stl(data: &[u8], mode: NormalMode) -> std::result::Result<Mesh, FormatError> {
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            match parse_ascii_stl(text, mode) {
                Ok(mesh) => return Ok(mesh),
                Err(e) if !has_binary_size(data) => return Err(e),
                Err(e) => log::debug!("not ASCII STL ({}), trying binary", e),
            }
        }
    }

    parse_binary_stl(data, mode)
}

/// Whether `data` is as long as its triangle count says a binary file is
fn has_binary_size(data: &[u8]) -> bool {
    let Some(raw) = data.get(HEADER_LEN..HEADER_LEN + 4) else {
        return false;
    };
    let declared = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
    (HEADER_LEN as u64 + 4) + RECORD_LEN * declared as u64 == data.len() as u64
}

/// Read and parse an STL file from disk.
pub fn load_stl<P: AsRef<Path>>(path: P, mode: NormalMode) -> Result<Mesh> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let mesh = parse_stl(&data, mode)?;
    log::info!("loaded {} triangles from {}", mesh.len(), path.display());
    Ok(mesh)
}
