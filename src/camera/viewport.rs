//! Camera pose snapshots.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Immutable camera pose: clip planes plus eye, target and up vectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Near clipping plane distance.
    pub near_plane: f32,
    /// Far clipping plane distance.
    pub far_plane: f32,
    /// Camera position in world space.
    pub eye_position: Vec3,
    /// Look-at point in world space.
    pub target_position: Vec3,
    /// Up direction.
    pub up_vector: Vec3,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            near_plane: 0.1,
            far_plane: 2000.0,
            eye_position: Vec3::ZERO,
            target_position: Vec3::ZERO,
            up_vector: Vec3::Y,
        }
    }
}

impl Viewport {
    /// Distance between eye and target.
    #[must_use]
    pub fn eye_distance(&self) -> f32 {
        self.eye_position.distance(self.target_position)
    }

    /// Return a copy with every field present in `update` replaced.
    #[must_use]
    pub fn merged(&self, update: &ViewportUpdate) -> Self {
        Self {
            near_plane: update.near_plane.unwrap_or(self.near_plane),
            far_plane: update.far_plane.unwrap_or(self.far_plane),
            eye_position: update.eye_position.unwrap_or(self.eye_position),
            target_position: update
                .target_position
                .unwrap_or(self.target_position),
            up_vector: update.up_vector.unwrap_or(self.up_vector),
        }
    }
}

/// Partial viewport: absent fields leave the receiving pose untouched.
///
/// This is also the shape of a view description file, so it deserializes
/// directly from `{"nearPlane": .., "eyePosition": [..], ..}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewportUpdate {
    /// New near plane, if any.
    pub near_plane: Option<f32>,
    /// New far plane, if any.
    pub far_plane: Option<f32>,
    /// New eye position, if any.
    pub eye_position: Option<Vec3>,
    /// New target position, if any.
    pub target_position: Option<Vec3>,
    /// New up vector, if any.
    pub up_vector: Option<Vec3>,
}

impl From<Viewport> for ViewportUpdate {
    fn from(v: Viewport) -> Self {
        Self {
            near_plane: Some(v.near_plane),
            far_plane: Some(v.far_plane),
            eye_position: Some(v.eye_position),
            target_position: Some(v.target_position),
            up_vector: Some(v.up_vector),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_only_replaces_present_fields() {
        let base = Viewport::default();
        let update = ViewportUpdate {
            far_plane: Some(50.0),
            eye_position: Some(Vec3::new(0.0, 0.0, 10.0)),
            ..ViewportUpdate::default()
        };
        let merged = base.merged(&update);
        assert_eq!(merged.near_plane, 0.1);
        assert_eq!(merged.far_plane, 50.0);
        assert_eq!(merged.eye_position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(merged.up_vector, Vec3::Y);
    }

    #[test]
    fn partial_view_json_deserializes() {
        let json = r#"{"farPlane": 12.5, "upVector": [0, 0, 1]}"#;
        let update: ViewportUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.far_plane, Some(12.5));
        assert_eq!(update.up_vector, Some(Vec3::Z));
        assert!(update.near_plane.is_none());
        assert!(update.eye_position.is_none());
    }
}
