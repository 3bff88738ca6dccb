use glam::{Mat4, Vec3};

use super::core::{Camera, CameraView};

/// Off-axis stereo camera pair for side-by-side output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoCamera {
    /// Distance between the two eyes in world units.
    pub eye_separation: f32,
    /// Distance to the zero-parallax plane.
    pub focus: f32,
    /// Aspect multiplier for each half of the target.
    pub aspect: f32,
}

impl Default for StereoCamera {
    fn default() -> Self {
        Self {
            eye_separation: 0.064,
            focus: 10.0,
            aspect: 0.5,
        }
    }
}

impl StereoCamera {
    /// Left and right eye views for `camera`.
    #[must_use]
    pub fn views(&self, camera: &Camera) -> (CameraView, CameraView) {
        let base = camera.view();
        let near = camera.znear;
        let aspect = camera.aspect * self.aspect;
        let half_sep = self.eye_separation / 2.0;
        let sep_on_projection = half_sep * near / self.focus;
        let ymax = near * (camera.fovy.to_radians() * 0.5).tan();

        let eye = |offset: f32, shift: f32| {
            let xmin = -ymax * aspect + shift;
            let xmax = ymax * aspect + shift;
            let mut projection = Mat4::perspective_rh_gl(
                camera.fovy.to_radians(),
                aspect,
                near,
                camera.zfar,
            );
            projection.x_axis.x = 2.0 * near / (xmax - xmin);
            projection.z_axis.x = (xmax + xmin) / (xmax - xmin);
            let view = Mat4::from_translation(Vec3::X * -offset) * base.view;
            CameraView {
                view,
                projection,
                eye: camera.eye + view.inverse().transform_vector3(Vec3::X) * offset,
                aspect,
                ..base
            }
        };
        (
            eye(-half_sep, sep_on_projection),
            eye(half_sep, -sep_on_projection),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::viewport::Viewport;

    #[test]
    fn eyes_are_separated_along_camera_right() {
        let viewport = Viewport {
            eye_position: Vec3::new(0.0, 0.0, 10.0),
            ..Viewport::default()
        };
        let camera = Camera::new(40.0, 2.0, &viewport);
        let (left, right) = StereoCamera::default().views(&camera);
        assert!((right.eye.x - left.eye.x - 0.064).abs() < 1e-4);
        assert_eq!(left.aspect, 1.0);
        assert!(left.projection.z_axis.x > 0.0);
        assert!(right.projection.z_axis.x < 0.0);
    }
}
