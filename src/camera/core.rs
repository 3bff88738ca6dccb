use glam::{Mat3, Mat4, Quat, Vec3};

use super::viewport::Viewport;

/// Perspective camera defined by eye position, target, and projection
/// parameters.
///
/// The view orientation is only recomputed by [`look_at_target`] or
/// [`look_along`], matching a scene-graph camera whose rotation is set
/// explicitly once per frame after the pose has been moved.
///
/// [`look_at_target`]: Camera::look_at_target
/// [`look_along`]: Camera::look_along
#[derive(Debug, Clone)]
pub struct Camera {
    /// Eye (camera) position in world space.
    pub eye: Vec3,
    /// Look-at target position.
    pub target: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
    /// Camera-to-world rotation.
    orientation: Quat,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
/// GPU uniform buffer holding the view-projection matrix and camera metadata.
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world-space position.
    pub position: [f32; 3],
    /// Viewport aspect ratio.
    pub aspect: f32,
    /// Camera forward direction for lighting.
    pub forward: [f32; 3],
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
    /// Padding for GPU alignment.
    pub(crate) _pad: [f32; 2],
}

/// Matrices a render backend needs to draw one view of a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// World-to-view transform.
    pub view: Mat4,
    /// View-to-clip transform (OpenGL depth convention).
    pub projection: Mat4,
    /// Eye position in world space.
    pub eye: Vec3,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Aspect ratio the projection was built with.
    pub aspect: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Camera {
    /// Create a camera posed at `viewport`, already aimed at its target.
    #[must_use]
    pub fn new(fovy: f32, aspect: f32, viewport: &Viewport) -> Self {
        let mut camera = Self {
            eye: viewport.eye_position,
            target: viewport.target_position,
            up: viewport.up_vector,
            aspect,
            fovy,
            znear: viewport.near_plane,
            zfar: viewport.far_plane,
            orientation: Quat::IDENTITY,
        };
        camera.look_at_target();
        camera
    }

    /// Overwrite the whole pose from a viewport.
    pub fn apply_viewport(&mut self, viewport: &Viewport) {
        self.znear = viewport.near_plane;
        self.zfar = viewport.far_plane;
        self.eye = viewport.eye_position;
        self.target = viewport.target_position;
        self.up = viewport.up_vector;
    }

    /// Snapshot the current pose.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport {
            near_plane: self.znear,
            far_plane: self.zfar,
            eye_position: self.eye,
            target_position: self.target,
            up_vector: self.up,
        }
    }

    /// Re-aim the camera at its target using the current up vector.
    ///
    /// Degenerate poses (eye on target, up parallel to the view direction)
    /// keep the previous orientation.
    pub fn look_at_target(&mut self) {
        self.look_at_point(self.target);
    }

    /// Aim along `rotation * (target - eye)` from the current eye position.
    pub fn look_along(&mut self, rotation: Quat) {
        let direction = rotation * (self.target - self.eye);
        self.look_at_point(self.eye + direction);
    }

    fn look_at_point(&mut self, point: Vec3) {
        let dir = point - self.eye;
        if dir.length_squared() <= f32::EPSILON
            || dir.normalize().cross(self.up).length_squared() <= f32::EPSILON
        {
            log::trace!("camera look-at skipped: degenerate pose");
            return;
        }
        let world_to_view = Mat4::look_at_rh(self.eye, point, self.up);
        self.orientation =
            Quat::from_mat3(&Mat3::from_mat4(world_to_view)).inverse();
    }

    /// Unit vector the camera is looking along.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// World-to-view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.eye).inverse()
    }

    /// Projection matrix with OpenGL clip-space depth in `[-1, 1]`.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        )
    }

    /// Build the combined view-projection matrix.
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Map a point from normalized device coordinates back to world space.
    ///
    /// Returns `None` when the projection is singular or produces
    /// non-finite values (e.g. coincident near and far planes).
    #[must_use]
    pub fn unproject(&self, ndc: Vec3) -> Option<Vec3> {
        let view_proj = self.build_matrix();
        let det = view_proj.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let world = view_proj.inverse().project_point3(ndc);
        world.is_finite().then_some(world)
    }

    /// Map a world-space point to normalized device coordinates.
    #[must_use]
    pub fn project(&self, point: Vec3) -> Vec3 {
        self.build_matrix().project_point3(point)
    }

    /// Matrices for the backend.
    #[must_use]
    pub fn view(&self) -> CameraView {
        CameraView {
            view: self.view_matrix(),
            projection: self.projection_matrix(),
            eye: self.eye,
            fovy: self.fovy,
            aspect: self.aspect,
            znear: self.znear,
            zfar: self.zfar,
        }
    }
}

impl CameraView {
    /// Combined view-projection matrix.
    #[must_use]
    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Pack into the GPU uniform layout.
    #[must_use]
    pub fn uniform(&self) -> CameraUniform {
        let forward = self.view.inverse().transform_vector3(Vec3::NEG_Z);
        CameraUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
            position: self.eye.to_array(),
            aspect: self.aspect,
            forward: forward.normalize_or_zero().to_array(),
            fovy: self.fovy,
            znear: self.znear,
            zfar: self.zfar,
            _pad: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        let viewport = Viewport {
            near_plane: 1.0,
            far_plane: 100.0,
            eye_position: Vec3::new(0.0, 0.0, 10.0),
            target_position: Vec3::ZERO,
            up_vector: Vec3::Y,
        };
        Camera::new(40.0, 1.0, &viewport)
    }

    #[test]
    fn looks_toward_target() {
        let cam = camera();
        assert!((cam.forward() - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn unproject_inverts_project() {
        let cam = camera();
        let point = Vec3::new(1.0, -2.0, 3.0);
        let ndc = cam.project(point);
        let back = cam.unproject(ndc).unwrap();
        assert!((back - point).length() < 1e-3);
    }

    #[test]
    fn unproject_with_coincident_planes_is_none() {
        let mut cam = camera();
        cam.znear = 1.0;
        cam.zfar = 1.0;
        assert!(cam.unproject(Vec3::ZERO).is_none());
    }

    #[test]
    fn degenerate_look_at_keeps_orientation() {
        let mut cam = camera();
        let before = cam.forward();
        cam.target = cam.eye;
        cam.look_at_target();
        assert_eq!(cam.forward(), before);
    }

    #[test]
    fn uniform_carries_clip_planes() {
        let uniform = camera().view().uniform();
        assert_eq!(uniform.znear, 1.0);
        assert_eq!(uniform.zfar, 100.0);
        assert!((uniform.forward[2] + 1.0).abs() < 1e-5);
    }
}
