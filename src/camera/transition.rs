//! Time-bounded camera motions driven by the controller's update clock.
//!
//! All durations and deltas are in scene time units (wall-clock seconds
//! multiplied by the play rate).

use std::fmt;

use glam::{Vec2, Vec3};

use super::core::Camera;
use super::navigation::{auto_tumble_axis, rotate_about_look_at};
use super::viewport::Viewport;

/// Advance `time` by `delta`, clamped to `duration`. Returns the actual
/// advance.
fn advance_clamped(time: &mut f32, delta: f32, duration: f32) -> f32 {
    let previous = *time;
    *time = (*time + delta).min(duration);
    *time - previous
}

/// Linear interpolation between two viewports over a fixed duration.
///
/// The clip planes are widened to `min(near)` / `max(far)` of both
/// endpoints for the whole transition and the up vector is snapped to the
/// ending one at construction.
#[derive(Clone)]
pub struct SmoothCameraTransition {
    start: Viewport,
    end: Viewport,
    duration: f32,
    time: f32,
    completed: bool,
}

impl SmoothCameraTransition {
    /// Create a transition from `start` to `end` lasting `duration`.
    #[must_use]
    pub fn new(start: Viewport, end: Viewport, duration: f32) -> Self {
        Self {
            start,
            end,
            duration,
            time: 0.0,
            completed: false,
        }
    }

    /// Near plane used for the whole transition.
    #[must_use]
    pub fn near_plane(&self) -> f32 {
        self.start.near_plane.min(self.end.near_plane)
    }

    /// Far plane used for the whole transition.
    #[must_use]
    pub fn far_plane(&self) -> f32 {
        self.start.far_plane.max(self.end.far_plane)
    }

    /// Apply the transition-wide clip planes and ending up vector.
    pub fn begin(&self, camera: &mut Camera) {
        camera.znear = self.near_plane();
        camera.zfar = self.far_plane();
        camera.up = self.end.up_vector;
    }

    /// Interpolation ratio at the current time.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        if self.duration > 0.0 {
            self.time / self.duration
        } else {
            1.0
        }
    }

    /// Pose at the current time.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        let r = self.ratio();
        let mix = |a: Vec3, b: Vec3| a * (1.0 - r) + b * r;
        Viewport {
            near_plane: self.near_plane(),
            far_plane: self.far_plane(),
            eye_position: mix(self.start.eye_position, self.end.eye_position),
            target_position: mix(
                self.start.target_position,
                self.end.target_position,
            ),
            up_vector: self.end.up_vector,
        }
    }

    /// Advance by `delta` and move the camera eye and target.
    pub fn update(&mut self, camera: &mut Camera, delta: f32) {
        let _ = advance_clamped(&mut self.time, delta, self.duration);
        let pose = self.viewport();
        camera.eye = pose.eye_position;
        camera.target = pose.target_position;
        if self.time >= self.duration {
            self.completed = true;
        }
    }

    /// Elapsed transition time.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Whether the end pose has been reached.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl fmt::Debug for SmoothCameraTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmoothCameraTransition")
            .field("time", &self.time)
            .field("duration", &self.duration)
            .field("completed", &self.completed)
            .finish_non_exhaustive()
    }
}

/// Rotation about the look-at point spread evenly over a duration.
#[derive(Debug, Clone)]
pub struct RotateCameraTransition {
    axis: Vec3,
    angle: f32,
    duration: f32,
    time: f32,
    completed: bool,
}

impl RotateCameraTransition {
    /// Rotate by `angle` radians about `axis` over `duration`.
    #[must_use]
    pub fn new(axis: Vec3, angle: f32, duration: f32) -> Self {
        Self {
            axis,
            angle,
            duration,
            time: 0.0,
            completed: false,
        }
    }

    /// Advance by `delta`, rotating by the matching share of the angle.
    pub fn update(&mut self, camera: &mut Camera, delta: f32) {
        if self.completed {
            return;
        }
        let ratio = if self.duration > 0.0 {
            advance_clamped(&mut self.time, delta, self.duration)
                / self.duration
        } else {
            self.time = self.duration;
            1.0
        };
        rotate_about_look_at(camera, self.axis, ratio * self.angle);
        if self.time >= self.duration {
            self.completed = true;
        }
    }

    /// Whether the full angle has been applied.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

/// Continuous rotation in a fixed screen-space direction.
#[derive(Debug, Clone)]
pub struct CameraAutoTumble {
    direction: Vec2,
    angle: f32,
    stop_on_camera_input: bool,
    axis: Vec3,
    require_update: bool,
}

impl CameraAutoTumble {
    /// Tumble toward `direction` (screen space, `y` down) by `rate`
    /// radians per update.
    #[must_use]
    pub fn new(direction: Vec2, rate: f32, stop_on_camera_input: bool) -> Self {
        Self {
            direction,
            angle: -rate,
            stop_on_camera_input,
            axis: Vec3::ZERO,
            require_update: true,
        }
    }

    /// Whether user interaction should end the tumble.
    #[must_use]
    pub fn stops_on_camera_input(&self) -> bool {
        self.stop_on_camera_input
    }

    /// Recompute the rotation axis from the current pose on next update.
    pub fn require_update(&mut self) {
        self.require_update = true;
    }

    /// Rotate the camera by one step.
    pub fn update(&mut self, camera: &mut Camera) {
        if self.require_update {
            if let Some(axis) = auto_tumble_axis(camera, self.direction) {
                self.axis = axis;
            }
            self.require_update = false;
        }
        rotate_about_look_at(camera, self.axis, self.angle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(eye: Vec3, near: f32, far: f32) -> Viewport {
        Viewport {
            near_plane: near,
            far_plane: far,
            eye_position: eye,
            target_position: Vec3::new(0.3, -1.7, 2.9),
            up_vector: Vec3::Y,
        }
    }

    fn camera_at(v: &Viewport) -> Camera {
        Camera::new(40.0, 1.0, v)
    }

    #[test]
    fn smooth_transition_ends_exactly_at_end_pose() {
        let a = viewport(Vec3::new(1.1, 2.3, 17.7), 0.7, 300.0);
        let mut b = viewport(Vec3::new(-8.3, 0.1, 44.9), 0.2, 150.0);
        b.target_position = Vec3::new(9.7, 3.3, -0.1);
        b.up_vector = Vec3::Z;
        let mut camera = camera_at(&a);
        let mut transition = SmoothCameraTransition::new(a, b, 1000.0);
        transition.begin(&mut camera);

        for _ in 0..7 {
            transition.update(&mut camera, 16.7);
            assert_eq!(camera.znear, 0.2);
            assert_eq!(camera.zfar, 300.0);
            assert!(!transition.is_completed());
        }
        transition.update(&mut camera, 5000.0);
        assert!(transition.is_completed());
        assert_eq!(transition.time(), 1000.0);
        assert_eq!(camera.eye, b.eye_position);
        assert_eq!(camera.target, b.target_position);
        assert_eq!(camera.up, b.up_vector);
        assert_eq!(camera.znear, 0.2);
        assert_eq!(camera.zfar, 300.0);
    }

    #[test]
    fn zero_duration_transition_completes_immediately() {
        let a = viewport(Vec3::new(0.0, 0.0, 5.0), 0.1, 10.0);
        let b = viewport(Vec3::new(0.0, 0.0, 9.0), 0.1, 10.0);
        let mut camera = camera_at(&a);
        let mut transition = SmoothCameraTransition::new(a, b, 0.0);
        transition.update(&mut camera, 0.0);
        assert!(transition.is_completed());
        assert_eq!(camera.eye, b.eye_position);
    }

    #[test]
    fn rotate_transition_applies_full_angle() {
        let start = Viewport {
            eye_position: Vec3::new(0.0, 0.0, 10.0),
            ..Viewport::default()
        };
        let mut camera = camera_at(&start);
        let mut transition = RotateCameraTransition::new(
            Vec3::Y,
            std::f32::consts::FRAC_PI_2,
            100.0,
        );
        for _ in 0..4 {
            transition.update(&mut camera, 30.0);
        }
        assert!(transition.is_completed());
        assert!((camera.eye - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn auto_tumble_rotates_each_update() {
        let start = Viewport {
            eye_position: Vec3::new(0.0, 0.0, 10.0),
            ..Viewport::default()
        };
        let mut camera = camera_at(&start);
        let mut tumble = CameraAutoTumble::new(Vec2::new(1.0, 0.0), 0.1, true);
        assert!(tumble.stops_on_camera_input());
        tumble.update(&mut camera);
        let first = camera.eye;
        tumble.update(&mut camera);
        assert!(first != Vec3::new(0.0, 0.0, 10.0));
        assert!(camera.eye != first);
        assert!((camera.eye.length() - 10.0).abs() < 1e-3);
    }
}
