//! Scene description files: the metadata item list and the view file.
//!
//! Parsing is lenient. A metadata document that is not a JSON array yields
//! no items, and individual items that do not match a known shape are
//! skipped with a warning so the rest of the scene still loads.

use serde::{Deserialize, Serialize};

use crate::camera::ViewportUpdate;

/// Mesh encoding of a surface item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileFormat {
    /// Legacy JSON mesh with optional morph frames.
    #[default]
    Json,
    /// Binary or ASCII STL.
    Stl,
    /// Wavefront OBJ.
    Obj,
}

/// Fields shared by every primitive item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PrimitiveItem {
    /// Asset location, relative to the metadata file.
    #[serde(rename = "URL")]
    pub url: String,
    /// Name given to the loaded object.
    #[serde(rename = "GroupName", default)]
    pub group_name: Option<String>,
    /// Whether vertex positions morph over time.
    #[serde(rename = "MorphVertices", default)]
    pub morph_vertices: bool,
    /// Whether vertex colours morph over time.
    #[serde(rename = "MorphColours", default)]
    pub morph_colours: bool,
    /// Mesh encoding; JSON when absent.
    #[serde(rename = "FileFormat", default)]
    pub file_format: FileFormat,
}

/// One entry of a metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum MetadataItem {
    /// Triangle surfaces.
    Surfaces(PrimitiveItem),
    /// Point cloud.
    Points(PrimitiveItem),
    /// Line segments.
    Lines(PrimitiveItem),
    /// Glyphset description plus the glyph shape it instances.
    Glyph {
        /// Glyphset data location.
        #[serde(rename = "URL")]
        url: String,
        /// Glyph mesh location.
        #[serde(rename = "GlyphGeometriesURL")]
        glyph_geometries_url: String,
        /// Name given to the glyphset.
        #[serde(rename = "GroupName", default)]
        group_name: Option<String>,
    },
    /// View file to apply to the camera.
    View {
        /// View file location.
        #[serde(rename = "URL")]
        url: String,
    },
}

impl MetadataItem {
    /// Whether loading this item produces a scene object. View items only
    /// move the camera.
    #[must_use]
    pub fn produces_object(&self) -> bool {
        !matches!(self, Self::View { .. })
    }
}

/// Parse a metadata document, skipping malformed items.
#[must_use]
pub fn parse_metadata(bytes: &[u8]) -> Vec<MetadataItem> {
    let values: Vec<serde_json::Value> = match serde_json::from_slice(bytes) {
        Ok(values) => values,
        Err(e) => {
            log::warn!("metadata is not a JSON array: {e}");
            return Vec::new();
        }
    };
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| {
            if value.is_null() {
                return None;
            }
            serde_json::from_value(value)
                .map_err(|e| log::warn!("skipping metadata item {i}: {e}"))
                .ok()
        })
        .collect()
}

/// View file contents. The camera fields follow [`ViewportUpdate`]; the
/// remaining arrays describe the `prefix_N.json` resources of a legacy
/// view bundle, indexed from zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewData {
    /// Camera pose; absent fields leave the camera untouched.
    #[serde(flatten)]
    pub viewport: ViewportUpdate,
    /// Number of model resources in the bundle.
    pub number_of_resources: usize,
    /// Per-resource flag: draw with vertex colours.
    pub colour: Vec<bool>,
    /// Per-resource opacity.
    pub opacity: Vec<f32>,
    /// Per-resource flag: morph vertex positions.
    pub time_enabled: Vec<bool>,
    /// Per-resource flag: morph vertex colours.
    pub morph_colour: Vec<bool>,
}

/// Parse a view file, or `None` (with a warning) when it is malformed.
#[must_use]
pub fn parse_view(bytes: &[u8]) -> Option<ViewData> {
    serde_json::from_slice(bytes)
        .map_err(|e| log::warn!("malformed view file: {e}"))
        .ok()
}

/// Per-model settings for a batch of legacy JSON models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSettings {
    /// Draw with vertex colours.
    pub vertex_colours: bool,
    /// Material opacity.
    pub opacity: f32,
    /// Morph vertex positions.
    pub time_enabled: bool,
    /// Morph vertex colours.
    pub morph_colour: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            vertex_colours: false,
            opacity: 1.0,
            time_enabled: false,
            morph_colour: false,
        }
    }
}

impl ViewData {
    /// Settings for resource `index`, defaulting every missing entry.
    #[must_use]
    pub fn model_settings(&self, index: usize) -> ModelSettings {
        let defaults = ModelSettings::default();
        ModelSettings {
            vertex_colours: self.colour.get(index).copied().unwrap_or(defaults.vertex_colours),
            opacity: self.opacity.get(index).copied().unwrap_or(defaults.opacity),
            time_enabled: self.time_enabled.get(index).copied().unwrap_or(defaults.time_enabled),
            morph_colour: self.morph_colour.get(index).copied().unwrap_or(defaults.morph_colour),
        }
    }

    /// Resource file names of a legacy bundle: `prefix_1.json` onwards.
    #[must_use]
    pub fn resource_urls(&self, prefix: &str) -> Vec<String> {
        (1..=self.number_of_resources)
            .map(|i| format!("{prefix}_{i}.json"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn metadata_items_parse_by_type() {
        let json = br#"[
            {"Type": "Surfaces", "URL": "heart_1.json", "GroupName": "heart",
             "MorphVertices": true, "MorphColours": false},
            {"Type": "Surfaces", "URL": "lung.obj", "FileFormat": "OBJ"},
            {"Type": "Glyph", "URL": "fibres.json", "GlyphGeometriesURL": "arrow.json",
             "GroupName": "fibres"},
            {"Type": "Points", "URL": "nodes.json"},
            {"Type": "View", "URL": "view.json"}
        ]"#;
        let items = parse_metadata(json);
        assert_eq!(items.len(), 5);
        match &items[0] {
            MetadataItem::Surfaces(item) => {
                assert_eq!(item.group_name.as_deref(), Some("heart"));
                assert!(item.morph_vertices);
                assert_eq!(item.file_format, FileFormat::Json);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            &items[1],
            MetadataItem::Surfaces(PrimitiveItem { file_format: FileFormat::Obj, .. })
        ));
        assert_eq!(items.iter().filter(|i| i.produces_object()).count(), 4);
    }

    #[test]
    fn malformed_items_are_skipped() {
        let json = br#"[{"Type": "Teapot"}, null, {"Type": "Lines", "URL": "l.json"}]"#;
        let items = parse_metadata(json);
        assert_eq!(items.len(), 1);
        assert!(parse_metadata(b"{\"not\": \"a list\"}").is_empty());
        assert!(parse_metadata(b"garbage").is_empty());
    }

    #[test]
    fn view_file_carries_pose_and_resources() {
        let json = br#"{
            "nearPlane": 0.5, "farPlane": 90, "eyePosition": [0, 0, 30],
            "targetPosition": [0, 0, 0], "upVector": [0, 1, 0],
            "numberOfResources": 2, "colour": [true], "opacity": [0.5, 1.0],
            "timeEnabled": [false, true], "morphColour": [false, false]
        }"#;
        let view = parse_view(json).unwrap();
        assert_eq!(view.viewport.eye_position, Some(Vec3::new(0.0, 0.0, 30.0)));
        assert_eq!(view.resource_urls("models/heart"), vec![
            "models/heart_1.json".to_owned(),
            "models/heart_2.json".to_owned(),
        ]);
        let second = view.model_settings(1);
        assert!(!second.vertex_colours);
        assert!(second.time_enabled);
        assert_eq!(view.model_settings(0).opacity, 0.5);
        assert!(parse_view(b"[1, 2]").is_none());
    }
}
