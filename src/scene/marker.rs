use glam::{Vec2, Vec3};

use crate::camera::CameraView;

/// Sprite scale of a marker at size 1, in screen fractions.
pub const MARKER_BASE_SCALE: Vec2 = Vec2::new(0.015, 0.02);

/// Size multiplier for the nearest marker in the depth window; the
/// farthest gets 1.
const NEAREST_MARKER_SIZE: f32 = 2.0;

/// Opacity of the farthest marker in the depth window; the nearest gets 1.
const FARTHEST_MARKER_OPACITY: f32 = 0.5;

/// Screen-space pin attached to a named object.
///
/// Enabled while markers are displayed and animation is paused. Each frame
/// the owning region projects every enabled marker, then rescales and fades
/// them by where their depth falls within the window spanned by all
/// projected markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    position: Vec3,
    enabled: bool,
    depth: Option<f32>,
    suppressed: bool,
    opacity: f32,
    size: f32,
}

impl Marker {
    /// Disabled marker at `position`.
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            enabled: false,
            depth: None,
            suppressed: false,
            opacity: 1.0,
            size: 1.0,
        }
    }

    /// Anchor point in the owning object's space.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the anchor.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Show the marker.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Hide the marker and forget its depth.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.depth = None;
    }

    /// Whether the marker is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enabled and inside the current depth window.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.enabled && !self.suppressed
    }

    /// Sprite opacity.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Sprite size multiplier.
    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Sprite scale after the size multiplier.
    #[must_use]
    pub fn sprite_scale(&self) -> Vec2 {
        MARKER_BASE_SCALE * self.size
    }

    /// Override the size multiplier.
    pub fn set_sprite_size(&mut self, size: f32) {
        self.size = size;
    }

    /// Normalized device depth from the last projection.
    #[must_use]
    pub fn depth(&self) -> Option<f32> {
        self.depth
    }

    /// Project the anchor through `camera`, given the owner's world
    /// transform. Markers outside the clip volume get no depth.
    pub fn update_depth(&mut self, camera: &CameraView, world: &glam::Mat4) -> Option<f32> {
        if !self.enabled {
            self.depth = None;
            return None;
        }
        let clip = camera.view_proj() * world.transform_point3(self.position).extend(1.0);
        self.depth = if clip.w > 0.0 {
            let ndc = clip.truncate() / clip.w;
            (ndc.abs().max_element() <= 1.0).then_some(ndc.z)
        } else {
            None
        };
        self.depth
    }

    /// Fit the sprite to the `[min, max]` depth window. Markers without a
    /// depth, or outside the window, are suppressed.
    pub fn apply_depth_window(&mut self, min: f32, max: f32) {
        if !self.enabled {
            return;
        }
        let Some(depth) = self.depth.filter(|d| (min..=max).contains(d)) else {
            self.suppressed = true;
            return;
        };
        let t = if max > min {
            (depth - min) / (max - min)
        } else {
            0.0
        };
        self.suppressed = false;
        self.size = NEAREST_MARKER_SIZE + (1.0 - NEAREST_MARKER_SIZE) * t;
        self.opacity = 1.0 + (FARTHEST_MARKER_OPACITY - 1.0) * t;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Camera, Viewport};
    use glam::Mat4;

    fn camera() -> CameraView {
        let viewport = Viewport {
            eye_position: Vec3::new(0.0, 0.0, 10.0),
            ..Viewport::default()
        };
        Camera::new(40.0, 1.0, &viewport).view()
    }

    #[test]
    fn disabled_marker_has_no_depth() {
        let mut m = Marker::new(Vec3::ZERO);
        assert_eq!(m.update_depth(&camera(), &Mat4::IDENTITY), None);
        m.enable();
        assert!(m.update_depth(&camera(), &Mat4::IDENTITY).is_some());
        m.disable();
        assert_eq!(m.depth(), None);
    }

    #[test]
    fn behind_camera_is_suppressed() {
        let mut m = Marker::new(Vec3::new(0.0, 0.0, 20.0));
        m.enable();
        assert_eq!(m.update_depth(&camera(), &Mat4::IDENTITY), None);
        m.apply_depth_window(0.0, 1.0);
        assert!(!m.is_visible());
    }

    #[test]
    fn depth_window_scales_near_and_far() {
        let cam = camera();
        let mut near = Marker::new(Vec3::new(0.0, 0.0, 5.0));
        let mut far = Marker::new(Vec3::new(0.0, 0.0, -5.0));
        near.enable();
        far.enable();
        let a = near.update_depth(&cam, &Mat4::IDENTITY).unwrap();
        let b = far.update_depth(&cam, &Mat4::IDENTITY).unwrap();
        assert!(a < b);
        near.apply_depth_window(a, b);
        far.apply_depth_window(a, b);
        assert!(near.is_visible() && far.is_visible());
        assert!((near.size() - 2.0).abs() < 1e-5);
        assert!((far.size() - 1.0).abs() < 1e-5);
        assert!((far.opacity() - 0.5).abs() < 1e-5);
        assert!(near.sprite_scale().x > far.sprite_scale().x);
    }
}
