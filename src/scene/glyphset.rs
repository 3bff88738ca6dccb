use std::collections::BTreeMap;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::bounds::BoundingBox;
use super::mesh::{frame_weights, MorphGeometry};
use crate::util::colour::rgb_from_hex;

/// How each glyph is replicated around its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepeatMode {
    /// One glyph per point.
    #[default]
    None,
    /// Glyph plus its mirror image.
    Mirror,
    /// One glyph per axis in the plane of axes 1 and 2.
    #[serde(rename = "AXES_2D")]
    Axes2d,
    /// One glyph per axis.
    #[serde(rename = "AXES_3D")]
    Axes3d,
}

/// Per-glyphset settings carried alongside the per-frame arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphsetMetadata {
    /// Number of sampled time steps in every per-frame array.
    #[serde(default)]
    pub number_of_time_steps: usize,
    /// Whether glyph colours change between frames.
    #[serde(rename = "MorphColours", default)]
    pub morph_colours: bool,
    /// Whether glyph positions, axes and scales change between frames.
    #[serde(rename = "MorphVertices", default)]
    pub morph_vertices: bool,
    /// Replication mode.
    #[serde(default)]
    pub repeat_mode: RepeatMode,
    /// Number of glyph anchors.
    pub number_of_vertices: usize,
    /// Constant part of each axis length.
    #[serde(default)]
    pub base_size: [f32; 3],
    /// Glyph origin offset in scaled-axis units.
    #[serde(default)]
    pub offset: [f32; 3],
    /// Multiplier applied to the per-glyph scale.
    #[serde(default = "unit_scale_factors")]
    pub scale_factors: [f32; 3],
}

fn unit_scale_factors() -> [f32; 3] {
    [1.0; 3]
}

/// Glyphset description: flat xyz arrays keyed by time-step index
/// (`"0"`, `"1"`, ...) plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphsetData {
    /// Anchor positions per time step.
    pub positions: BTreeMap<String, Vec<f32>>,
    /// First glyph axis per time step.
    pub axis1: BTreeMap<String, Vec<f32>>,
    /// Second glyph axis per time step.
    pub axis2: BTreeMap<String, Vec<f32>>,
    /// Third glyph axis per time step.
    pub axis3: BTreeMap<String, Vec<f32>>,
    /// Per-axis scale per time step.
    pub scale: BTreeMap<String, Vec<f32>>,
    /// Packed `0xRRGGBB` colour per glyph per time step.
    #[serde(default)]
    pub colors: Option<BTreeMap<String, Vec<u32>>>,
    /// Optional per-glyph labels.
    #[serde(rename = "label", default)]
    pub labels: Option<Vec<String>>,
    /// Shared settings.
    pub metadata: GlyphsetMetadata,
}

/// One placed glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphInstance {
    /// Glyph-to-region transform whose columns are the scaled axes and the
    /// resolved origin.
    pub transform: Mat4,
    /// Colour, when the glyphset carries colours.
    pub colour: Option<Vec3>,
    /// Label, when the glyphset carries labels.
    pub label: Option<String>,
}

/// A set of oriented, scaled copies of one glyph geometry.
///
/// The glyphset is `ready` once the glyph geometry has been supplied;
/// until then it has no bounds and draws nothing.
#[derive(Debug, Clone)]
pub struct Glyphset {
    data: GlyphsetData,
    glyph: Option<MorphGeometry>,
    instances: Vec<GlyphInstance>,
}

fn frame<'a, T>(map: &'a BTreeMap<String, Vec<T>>, index: usize) -> &'a [T] {
    map.get(&index.to_string())
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn lerp_frames(
    map: &BTreeMap<String, Vec<f32>>,
    weights: &[(usize, f32)],
) -> Vec<f32> {
    match weights {
        [(bottom, p), (top, q)] => frame(map, *bottom)
            .iter()
            .zip(frame(map, *top))
            .map(|(a, b)| a * p + b * q)
            .collect(),
        [(only, _)] => frame(map, *only).to_vec(),
        [] => frame(map, 0).to_vec(),
        _ => Vec::new(),
    }
}

fn vec3_at(values: &[f32], i: usize) -> Vec3 {
    values
        .get(3 * i..3 * i + 3)
        .map_or(Vec3::ZERO, Vec3::from_slice)
}

impl Glyphset {
    /// Glyphset from decoded data. Replication modes other than
    /// [`RepeatMode::None`] are drawn as single glyphs.
    #[must_use]
    pub fn new(data: GlyphsetData) -> Self {
        if data.metadata.repeat_mode != RepeatMode::None {
            log::warn!(
                "glyph repeat mode {:?} not supported, drawing single glyphs",
                data.metadata.repeat_mode
            );
        }
        let mut glyphset = Self {
            data,
            glyph: None,
            instances: Vec::new(),
        };
        glyphset.update(0.0, 1.0);
        glyphset
    }

    /// Supply the glyph shape; the glyphset becomes ready.
    pub fn set_glyph_geometry(&mut self, glyph: MorphGeometry) {
        self.glyph = Some(glyph);
    }

    /// Drop the glyph shape and every per-frame array.
    pub fn dispose(&mut self) {
        self.glyph = None;
        self.instances.clear();
        for map in [
            &mut self.data.positions,
            &mut self.data.axis1,
            &mut self.data.axis2,
            &mut self.data.axis3,
            &mut self.data.scale,
        ] {
            map.clear();
        }
        self.data.colors = None;
        self.data.labels = None;
        self.data.metadata.number_of_vertices = 0;
    }

    /// Whether the glyph geometry has arrived.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.glyph.is_some()
    }

    /// The glyph shape, once ready.
    #[must_use]
    pub fn glyph(&self) -> Option<&MorphGeometry> {
        self.glyph.as_ref()
    }

    /// Placed glyphs for the last updated time.
    #[must_use]
    pub fn instances(&self) -> &[GlyphInstance] {
        &self.instances
    }

    /// Source data.
    #[must_use]
    pub fn data(&self) -> &GlyphsetData {
        &self.data
    }

    /// Whether any per-frame array actually varies.
    #[must_use]
    pub fn is_time_varying(&self) -> bool {
        let m = &self.data.metadata;
        m.number_of_time_steps > 0 && (m.morph_colours || m.morph_vertices)
    }

    /// Whether [`update`](Self::update) needs calling when time changes.
    #[must_use]
    pub fn morphs(&self) -> bool {
        let m = &self.data.metadata;
        m.morph_colours || m.morph_vertices
    }

    /// Re-resolve every glyph for local `time` on a `duration` timeline.
    pub fn update(&mut self, time: f32, duration: f32) {
        let meta = &self.data.metadata;
        let weights = frame_weights(time, duration, meta.number_of_time_steps);
        let static_frame = [(0, 1.0)];
        let vertex_weights: &[(usize, f32)] =
            if meta.morph_vertices { &weights } else { &static_frame };
        let positions = lerp_frames(&self.data.positions, vertex_weights);
        let axis1 = lerp_frames(&self.data.axis1, vertex_weights);
        let axis2 = lerp_frames(&self.data.axis2, vertex_weights);
        let axis3 = lerp_frames(&self.data.axis3, vertex_weights);
        let scales = lerp_frames(&self.data.scale, vertex_weights);

        let colours: Option<Vec<Vec3>> = self.data.colors.as_ref().map(|colors| {
            let colour_weights: &[(usize, f32)] =
                if meta.morph_colours { &weights } else { &static_frame };
            let mut out = vec![Vec3::ZERO; frame(colors, 0).len()];
            for &(index, weight) in colour_weights {
                for (acc, hex) in out.iter_mut().zip(frame(colors, index)) {
                    *acc += rgb_from_hex(*hex) * weight;
                }
            }
            out
        });

        self.instances = (0..meta.number_of_vertices)
            .map(|i| GlyphInstance {
                transform: resolve_glyph_axes(
                    meta,
                    vec3_at(&positions, i),
                    [vec3_at(&axis1, i), vec3_at(&axis2, i), vec3_at(&axis3, i)],
                    vec3_at(&scales, i),
                ),
                colour: colours.as_ref().and_then(|c| c.get(i).copied()),
                label: self
                    .data
                    .labels
                    .as_ref()
                    .and_then(|l| l.get(i).cloned()),
            })
            .collect();
    }

    /// Union of every placed glyph's bounds; `None` until ready.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let shape = self.glyph.as_ref()?.bounding_box(0.0, 1.0)?;
        self.instances
            .iter()
            .map(|g| shape.transformed(&g.transform))
            .reduce(|a, b| a.union(&b))
    }
}

/// Glyph transform from anchor `point`, raw `axes` and per-axis `scale`.
///
/// Each axis is stretched by `sign(scale) * base_size + scale *
/// scale_factor`; the origin moves by `offset` in the stretched axes, and
/// the third axis flips when needed to keep the frame right-handed.
#[must_use]
pub fn resolve_glyph_axes(
    meta: &GlyphsetMetadata,
    point: Vec3,
    axes: [Vec3; 3],
    scale: Vec3,
) -> Mat4 {
    let mut axis_scale = [0.0_f32; 3];
    for (j, s) in axis_scale.iter_mut().enumerate() {
        let sign = if scale[j] < 0.0 { -1.0 } else { 1.0 };
        *s = sign * meta.base_size[j] + scale[j] * meta.scale_factors[j];
    }
    let a1 = axes[0] * axis_scale[0];
    let a2 = axes[1] * axis_scale[1];
    let mut a3 = axes[2] * axis_scale[2];
    let origin = point
        + meta.offset[0] * a1
        + meta.offset[1] * a2
        + meta.offset[2] * a3;
    if a3.dot(a1.cross(a2)) < 0.0 {
        a3 = -a3;
    }
    Mat4::from_cols(a1.extend(0.0), a2.extend(0.0), a3.extend(0.0), origin.extend(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_frame(values: &[f32]) -> BTreeMap<String, Vec<f32>> {
        BTreeMap::from([("0".to_owned(), values.to_vec())])
    }

    fn arrow_data() -> GlyphsetData {
        let mut positions = one_frame(&[0.0, 0.0, 0.0, 5.0, 0.0, 0.0]);
        let _ = positions.insert("1".to_owned(), vec![0.0, 2.0, 0.0, 5.0, 2.0, 0.0]);
        GlyphsetData {
            positions,
            axis1: one_frame(&[1.0, 0.0, 0.0, 1.0, 0.0, 0.0]),
            axis2: one_frame(&[0.0, 1.0, 0.0, 0.0, 1.0, 0.0]),
            axis3: one_frame(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]),
            scale: one_frame(&[1.0, 1.0, 1.0, 2.0, 2.0, 2.0]),
            colors: Some(BTreeMap::from([("0".to_owned(), vec![0xff0000, 0x00ff00])])),
            labels: None,
            metadata: GlyphsetMetadata {
                number_of_time_steps: 2,
                morph_colours: false,
                morph_vertices: false,
                repeat_mode: RepeatMode::None,
                number_of_vertices: 2,
                base_size: [0.0; 3],
                offset: [0.0; 3],
                scale_factors: [1.0; 3],
            },
        }
    }

    #[test]
    fn axes_scale_and_stay_right_handed() {
        let meta = arrow_data().metadata;
        let m = resolve_glyph_axes(
            &meta,
            Vec3::ONE,
            [Vec3::X, Vec3::Y, Vec3::Z],
            Vec3::new(2.0, 3.0, -4.0),
        );
        assert_eq!(m.x_axis.truncate(), Vec3::X * 2.0);
        assert_eq!(m.y_axis.truncate(), Vec3::Y * 3.0);
        // -4 * Z would be left-handed, so it is flipped.
        assert_eq!(m.z_axis.truncate(), Vec3::Z * 4.0);
        assert_eq!(m.w_axis.truncate(), Vec3::ONE);
    }

    #[test]
    fn ready_once_glyph_arrives() {
        let mut g = Glyphset::new(arrow_data());
        assert!(!g.is_ready());
        assert!(g.bounding_box().is_none());
        g.set_glyph_geometry(MorphGeometry::from_triangles(
            vec![Vec3::ZERO, Vec3::ONE],
            vec![],
        ));
        assert!(g.is_ready());
        let b = g.bounding_box().unwrap();
        assert_eq!(b.max, Vec3::new(7.0, 2.0, 2.0));
        assert_eq!(g.instances()[1].colour, Some(Vec3::Y));
    }

    #[test]
    fn static_glyphs_ignore_time_and_morphing_glyphs_follow_it() {
        let mut g = Glyphset::new(arrow_data());
        assert!(!g.is_time_varying());
        g.update(1.0, 1.0);
        assert_eq!(g.instances()[0].transform.w_axis.y, 0.0);

        let mut data = arrow_data();
        data.metadata.morph_vertices = true;
        let _ = data.axis1.insert("1".into(), data.axis1["0"].clone());
        let _ = data.axis2.insert("1".into(), data.axis2["0"].clone());
        let _ = data.axis3.insert("1".into(), data.axis3["0"].clone());
        let _ = data.scale.insert("1".into(), data.scale["0"].clone());
        let mut g = Glyphset::new(data);
        assert!(g.is_time_varying());
        g.update(0.5, 1.0);
        assert!((g.instances()[0].transform.w_axis.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn metadata_parses_from_json() {
        let json = r#"{
            "positions": {"0": [0, 0, 0]},
            "axis1": {"0": [1, 0, 0]},
            "axis2": {"0": [0, 1, 0]},
            "axis3": {"0": [0, 0, 1]},
            "scale": {"0": [1, 1, 1]},
            "metadata": {
                "number_of_time_steps": 1,
                "MorphColours": false,
                "MorphVertices": false,
                "repeat_mode": "AXES_2D",
                "number_of_vertices": 1,
                "base_size": [0, 0, 0],
                "offset": [0, 0, 0],
                "scale_factors": [1, 1, 1]
            }
        }"#;
        let data: GlyphsetData = serde_json::from_str(json).unwrap();
        assert_eq!(data.metadata.repeat_mode, RepeatMode::Axes2d);
        assert_eq!(Glyphset::new(data).instances().len(), 1);
    }
}
