//! Mesh decoders for the exchanged asset formats.
//!
//! Decoders turn a fetched payload into [`DecodedMesh`]es. They only
//! recover what the scene layer needs (positions, indices, per-vertex
//! normals and colours, morph frames, a material hint); texture
//! coordinates and per-face materials are skipped.

use glam::Vec3;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use super::metadata::FileFormat;
use crate::error::MorphviewError;
use crate::scene::mesh::MorphGeometry;
use crate::util::colour::rgb_from_hex;

/// Material values carried by a mesh file.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaterialHint {
    /// Diffuse colour.
    pub colour: Option<Vec3>,
    /// Opacity in 0..1.
    pub opacity: Option<f32>,
    /// Whether the material asks for vertex colours.
    pub vertex_colours: bool,
}

/// One mesh recovered from an asset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedMesh {
    /// Object or group name inside the file, if any.
    pub name: Option<String>,
    /// Geometry with any morph frames.
    pub geometry: MorphGeometry,
    /// Material values.
    pub material: MaterialHint,
}

/// Decode `bytes` in `format`. Only OBJ may produce more than one mesh.
pub fn decode(
    format: FileFormat,
    url: &str,
    bytes: &[u8],
) -> Result<Vec<DecodedMesh>, MorphviewError> {
    match format {
        FileFormat::Json => decode_json_mesh(url, bytes).map(|m| vec![m]),
        FileFormat::Stl => decode_stl(url, bytes).map(|m| vec![m]),
        FileFormat::Obj => decode_obj(url, bytes),
    }
}

// ---------------------------------------------------------------------------
// Legacy JSON
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyMesh {
    scale: Option<f32>,
    #[serde(default)]
    vertices: Vec<f32>,
    #[serde(default)]
    faces: Vec<u32>,
    #[serde(default)]
    normals: Vec<f32>,
    #[serde(default)]
    colors: Vec<u32>,
    #[serde(default)]
    uvs: Vec<Vec<f32>>,
    #[serde(default)]
    morph_targets: Vec<LegacyMorphTarget>,
    #[serde(default)]
    morph_colors: Vec<LegacyMorphColors>,
    #[serde(default)]
    materials: Vec<LegacyMaterial>,
}

#[derive(Deserialize)]
struct LegacyMorphTarget {
    vertices: Vec<f32>,
}

#[derive(Deserialize)]
struct LegacyMorphColors {
    colors: Vec<f32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyMaterial {
    color_diffuse: Option<[f32; 3]>,
    opacity: Option<f32>,
    #[serde(default)]
    vertex_colors: serde_json::Value,
}

impl LegacyMaterial {
    fn hint(&self) -> MaterialHint {
        let vertex_colours = match &self.vertex_colors {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::String(s) => !s.is_empty() && s != "none",
            serde_json::Value::Number(n) => n.as_u64().is_some_and(|n| n > 0),
            _ => false,
        };
        MaterialHint {
            colour: self.color_diffuse.map(Vec3::from),
            opacity: self.opacity,
            vertex_colours,
        }
    }
}

const FACE_QUAD: u32 = 1;
const FACE_MATERIAL: u32 = 1 << 1;
const FACE_VERTEX_UV: u32 = 1 << 3;
const FACE_NORMAL: u32 = 1 << 4;
const FACE_VERTEX_NORMAL: u32 = 1 << 5;
const FACE_COLOUR: u32 = 1 << 6;
const FACE_VERTEX_COLOUR: u32 = 1 << 7;

fn triples(values: &[f32], scale: f32) -> Vec<Vec3> {
    values
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]) * scale)
        .collect()
}

struct FaceReader<'a> {
    url: &'a str,
    faces: &'a [u32],
    offset: usize,
}

impl FaceReader<'_> {
    fn read_one(&mut self) -> Result<u32, MorphviewError> {
        let value = self.faces.get(self.offset).copied().ok_or_else(|| {
            MorphviewError::decode(self.url, "face array ends mid-face")
        })?;
        self.offset += 1;
        Ok(value)
    }

    fn take(&mut self, n: usize) -> Result<Vec<u32>, MorphviewError> {
        (0..n).map(|_| self.read_one()).collect()
    }
}

fn vec3_from(values: &[f32], index: u32) -> Option<Vec3> {
    let i = index as usize * 3;
    values.get(i..i + 3).map(Vec3::from_slice)
}

/// Decode a legacy JSON mesh. Vertices are divided by the file's `scale`
/// (1 when absent); quads split into two triangles.
pub fn decode_json_mesh(
    url: &str,
    bytes: &[u8],
) -> Result<DecodedMesh, MorphviewError> {
    let json: LegacyMesh = serde_json::from_slice(bytes)
        .map_err(|e| MorphviewError::decode(url, e.to_string()))?;
    let scale = match json.scale {
        Some(s) if s != 0.0 => 1.0 / s,
        _ => 1.0,
    };
    let positions = triples(&json.vertices, scale);
    let vertex_count = positions.len();
    let uv_layers = json.uvs.iter().filter(|l| !l.is_empty()).count();

    let mut indices = Vec::new();
    let mut normals = vec![Vec3::ZERO; vertex_count];
    let mut colors = vec![Vec3::ONE; vertex_count];
    let mut has_normals = false;
    let mut has_colours = false;
    let mut reader = FaceReader {
        url,
        faces: &json.faces,
        offset: 0,
    };
    while reader.offset < json.faces.len() {
        let kind = reader.read_one()?;
        let n = if kind & FACE_QUAD == 0 { 3 } else { 4 };
        let corners = reader.take(n)?;
        if corners.iter().any(|&c| c as usize >= vertex_count) {
            return Err(MorphviewError::decode(url, "face index out of range"));
        }
        if kind & FACE_MATERIAL != 0 {
            let _ = reader.read_one()?;
        }
        if kind & FACE_VERTEX_UV != 0 {
            let _ = reader.take(n * uv_layers)?;
        }
        if kind & FACE_NORMAL != 0 {
            let normal = vec3_from(&json.normals, reader.read_one()?);
            for &c in &corners {
                normals[c as usize] = normal.unwrap_or(Vec3::ZERO);
            }
            has_normals = true;
        }
        if kind & FACE_VERTEX_NORMAL != 0 {
            for (&c, n) in corners.iter().zip(reader.take(n)?) {
                normals[c as usize] =
                    vec3_from(&json.normals, n).unwrap_or(Vec3::ZERO);
            }
            has_normals = true;
        }
        if kind & FACE_COLOUR != 0 {
            let hex = json.colors.get(reader.read_one()? as usize).copied();
            for &c in &corners {
                colors[c as usize] = rgb_from_hex(hex.unwrap_or(0xff_ffff));
            }
            has_colours = true;
        }
        if kind & FACE_VERTEX_COLOUR != 0 {
            for (&c, i) in corners.iter().zip(reader.take(n)?) {
                let hex = json.colors.get(i as usize).copied();
                colors[c as usize] = rgb_from_hex(hex.unwrap_or(0xff_ffff));
            }
            has_colours = true;
        }
        if let [a, b, c, d] = corners[..] {
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        } else {
            indices.extend_from_slice(&corners);
        }
    }

    let morph_targets: Vec<Vec<Vec3>> = json
        .morph_targets
        .iter()
        .map(|t| triples(&t.vertices, scale))
        .collect();
    if morph_targets.iter().any(|t| t.len() != vertex_count) {
        return Err(MorphviewError::decode(
            url,
            "morph target vertex count differs from base",
        ));
    }
    let morph_colors: Vec<Vec<Vec3>> = json
        .morph_colors
        .iter()
        .map(|c| triples(&c.colors, 1.0))
        .filter(|c| c.len() == vertex_count)
        .collect();

    Ok(DecodedMesh {
        name: None,
        geometry: MorphGeometry {
            positions,
            indices,
            normals: if has_normals { normals } else { Vec::new() },
            colors: if has_colours { colors } else { Vec::new() },
            morph_targets,
            morph_colors,
        },
        material: json
            .materials
            .first()
            .map(LegacyMaterial::hint)
            .unwrap_or_default(),
    })
}

// ---------------------------------------------------------------------------
// STL
// ---------------------------------------------------------------------------

const STL_HEADER: usize = 80;
const STL_TRIANGLE: usize = 50;

fn read_vec3(bytes: &[u8]) -> Vec3 {
    let f = |i: usize| {
        f32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
    };
    Vec3::new(f(0), f(4), f(8))
}

fn is_binary_stl(bytes: &[u8]) -> bool {
    let Some(count) = bytes.get(STL_HEADER..STL_HEADER + 4) else {
        return false;
    };
    let count = u32::from_le_bytes([count[0], count[1], count[2], count[3]]);
    STL_HEADER + 4 + count as usize * STL_TRIANGLE == bytes.len()
}

/// Decode binary or ASCII STL into a non-indexed triangle soup with face
/// normals on every corner.
pub fn decode_stl(url: &str, bytes: &[u8]) -> Result<DecodedMesh, MorphviewError> {
    let (positions, normals) = if is_binary_stl(bytes) {
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        for tri in bytes[STL_HEADER + 4..].chunks_exact(STL_TRIANGLE) {
            let normal = read_vec3(&tri[0..12]);
            for corner in 0..3 {
                let at = 12 + corner * 12;
                positions.push(read_vec3(&tri[at..at + 12]));
                normals.push(normal);
            }
        }
        (positions, normals)
    } else {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| MorphviewError::decode(url, "neither binary nor ASCII STL"))?;
        parse_ascii_stl(url, text)?
    };
    if positions.is_empty() {
        return Err(MorphviewError::decode(url, "STL contains no triangles"));
    }
    let indices = (0..positions.len() as u32).collect();
    Ok(DecodedMesh {
        name: None,
        geometry: MorphGeometry {
            normals,
            ..MorphGeometry::from_triangles(positions, indices)
        },
        material: MaterialHint::default(),
    })
}

fn parse_floats(url: &str, parts: &[&str]) -> Result<Vec3, MorphviewError> {
    let mut v = [0.0_f32; 3];
    for (slot, part) in v.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| MorphviewError::decode(url, format!("bad number {part:?}")))?;
    }
    if parts.len() < 3 {
        return Err(MorphviewError::decode(url, "truncated vector"));
    }
    Ok(Vec3::from(v))
}

fn parse_ascii_stl(
    url: &str,
    text: &str,
) -> Result<(Vec<Vec3>, Vec<Vec3>), MorphviewError> {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut normal = Vec3::ZERO;
    for line in text.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            ["facet", "normal", rest @ ..] => normal = parse_floats(url, rest)?,
            ["vertex", rest @ ..] => {
                positions.push(parse_floats(url, rest)?);
                normals.push(normal);
            }
            _ => {}
        }
    }
    if positions.len() % 3 != 0 {
        return Err(MorphviewError::decode(url, "facet with missing vertices"));
    }
    Ok((positions, normals))
}

// ---------------------------------------------------------------------------
// OBJ
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ObjGroup {
    name: Option<String>,
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    remap: FxHashMap<usize, u32>,
}

impl ObjGroup {
    fn named(name: Option<String>) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    fn local(&mut self, global: usize, vertices: &[Vec3]) -> u32 {
        if let Some(&local) = self.remap.get(&global) {
            return local;
        }
        let local = self.positions.len() as u32;
        self.positions.push(vertices[global]);
        let _ = self.remap.insert(global, local);
        local
    }

    fn finish(self) -> Option<DecodedMesh> {
        if self.indices.is_empty() {
            return None;
        }
        Some(DecodedMesh {
            name: self.name,
            geometry: MorphGeometry::from_triangles(self.positions, self.indices),
            material: MaterialHint::default(),
        })
    }
}

fn obj_index(url: &str, token: &str, count: usize) -> Result<usize, MorphviewError> {
    let head = token.split('/').next().unwrap_or_default();
    let raw: i64 = head
        .parse()
        .map_err(|_| MorphviewError::decode(url, format!("bad face index {token:?}")))?;
    let index = if raw < 0 { count as i64 + raw } else { raw - 1 };
    usize::try_from(index)
        .ok()
        .filter(|&i| i < count)
        .ok_or_else(|| MorphviewError::decode(url, format!("face index {raw} out of range")))
}

/// Decode OBJ positions and faces. Every non-empty `o`/`g` group becomes
/// its own mesh; polygons are fan-triangulated.
pub fn decode_obj(url: &str, bytes: &[u8]) -> Result<Vec<DecodedMesh>, MorphviewError> {
    let text = String::from_utf8_lossy(bytes);
    let mut vertices = Vec::new();
    let mut meshes = Vec::new();
    let mut group = ObjGroup::default();
    for line in text.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            ["v", rest @ ..] => vertices.push(parse_floats(url, rest)?),
            ["o" | "g", name @ ..] => {
                let next = ObjGroup::named(Some(name.join(" ")).filter(|n| !n.is_empty()));
                meshes.extend(std::mem::replace(&mut group, next).finish());
            }
            ["f", corners @ ..] if corners.len() >= 3 => {
                let locals = corners
                    .iter()
                    .map(|c| {
                        obj_index(url, c, vertices.len()).map(|g| group.local(g, &vertices))
                    })
                    .collect::<Result<Vec<u32>, _>>()?;
                for pair in locals[1..].windows(2) {
                    group.indices.extend_from_slice(&[locals[0], pair[0], pair[1]]);
                }
            }
            _ => {}
        }
    }
    meshes.extend(group.finish());
    if meshes.is_empty() {
        return Err(MorphviewError::decode(url, "OBJ contains no faces"));
    }
    Ok(meshes)
}
