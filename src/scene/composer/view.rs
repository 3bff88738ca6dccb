//! Camera framing for [`SceneComposer`].

use super::SceneComposer;
use crate::camera::{Viewport, ViewportUpdate};
use crate::scene::bounds::BoundingBox;

impl SceneComposer {
    /// Apply a view description to the current camera pose. Absent fields
    /// keep their value.
    pub fn load_view(&mut self, view: &ViewportUpdate) -> bool {
        self.controller.set_current_camera_settings(view);
        true
    }

    /// Bounds of every visible object, in world space.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.tree.bounding_box(self.tree.root(), true)
    }

    /// Viewport framing `bounds` at the scene's view angle, with clip
    /// planes `radius * clip_factor` either side of the eye distance.
    #[must_use]
    pub fn viewport_for_bounding_box(&self, bounds: &BoundingBox) -> Viewport {
        let radius = bounds.radius();
        self.controller.viewport_from_centre_and_radius(
            bounds.center(),
            radius,
            self.view_angle,
            radius * self.clip_factor,
        )
    }

    /// Move the camera to frame `bounds`.
    pub fn view_all_with_bounding_box(&mut self, bounds: &BoundingBox) {
        let viewport = self.viewport_for_bounding_box(bounds);
        self.controller
            .set_current_camera_settings(&ViewportUpdate::from(viewport));
    }

    /// Frame everything in the scene. No-op for an empty scene.
    pub fn view_all(&mut self) {
        if let Some(bounds) = self.bounding_box() {
            self.view_all_with_bounding_box(&bounds);
        }
    }

    /// Drawable size changed.
    pub fn on_window_resize(&mut self, width: f32, height: f32) {
        self.controller.on_resize(width, height);
    }

    /// Return to the default viewport.
    pub fn reset_view(&mut self) {
        self.controller.reset_view();
    }
}
