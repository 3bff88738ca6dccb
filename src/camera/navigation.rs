//! Trackball, pan and fly-zoom math applied directly to a [`Camera`] pose.
//!
//! Pointer coordinates are window-relative pixels with `y` growing
//! downward. Every function leaves the pose untouched when its inputs are
//! degenerate (zero-sized window, zero pointer motion, singular
//! projection).

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};

use super::core::Camera;

/// World-space pan scale applied to unprojected pointer motion.
pub const TRANSLATE_RATE: f32 = 0.002;
/// Smallest allowed `near / far` ratio while flying.
pub const MIN_NEAR_FAR_RATIO: f32 = 1e-5;
/// Above this `|dot(view dir, axis)|` the up vector seeds the rotation
/// basis instead of the view direction.
const AXIS_PARALLEL_LIMIT: f32 = 0.8;
/// Zoom sensitivity relative to window height.
const ZOOM_SCALE: f32 = 1.5;
/// Eye distance below which a fly step is refused.
const MIN_FLY_DISTANCE: f32 = 0.01;

/// Rotate the eye position and up vector about the look-at point.
pub fn rotate_about_look_at(camera: &mut Camera, axis: Vec3, angle: f32) {
    let a = axis.normalize_or_zero();
    if a == Vec3::ZERO {
        return;
    }
    let rel_eye = camera.eye - camera.target;
    let mut v = rel_eye.normalize_or_zero();
    if v.dot(a).abs() > AXIS_PARALLEL_LIMIT {
        v = camera.up;
    }
    let b = a.cross(v).normalize_or_zero();
    if b == Vec3::ZERO {
        log::trace!("rotation skipped: no basis orthogonal to axis");
        return;
    }
    let c = a.cross(b);

    let (eye_a, eye_b, eye_c) = (a.dot(rel_eye), b.dot(rel_eye), c.dot(rel_eye));
    let up = camera.up;
    let (up_a, up_b, up_c) = (a.dot(up), b.dot(up), c.dot(up));

    let (sin, cos) = angle.sin_cos();
    let new_b = cos * b + sin * c;
    let new_c = cos * c - sin * b;

    camera.eye = camera.target + a * eye_a + new_b * eye_b + new_c * eye_c;
    camera.up = a * up_a + new_b * up_b + new_c * up_c;
}

/// Axis for a screen-space drag direction `(dx, dy)` tilted by `phi`
/// toward the view direction.
fn tumble_axis(camera: &Camera, dx: f32, dy: f32, phi: f32) -> Vec3 {
    let a = (camera.eye - camera.target).normalize_or_zero();
    let b = camera.up.normalize_or_zero();
    let c = b.cross(a).normalize_or_zero();
    let e = dx * c + dy * b;
    phi.sin() * a + phi.cos() * e
}

/// Trackball rotation for a pointer drag from `previous` to `pointer`.
///
/// Returns `true` if the pose changed.
pub fn tumble(
    camera: &mut Camera,
    tumble_rate: f32,
    previous: Vec2,
    pointer: Vec2,
    size: Vec2,
) -> bool {
    let (width, height) = (size.x, size.y);
    if width <= 0.0 || height <= 0.0 {
        return false;
    }
    let radius = 0.25 * (width + height);
    let delta_x = pointer.x - previous.x;
    let delta_y = previous.y - pointer.y;
    let tangent_dist = delta_x.hypot(delta_y);
    if tangent_dist <= 0.0 {
        return false;
    }
    let dx = -delta_y / tangent_dist;
    let dy = delta_x / tangent_dist;
    let d = (dx * (pointer.x - 0.5 * (width - 1.0))
        + dy * (0.5 * (height - 1.0) - pointer.y))
        .clamp(-radius, radius);
    let phi = (d / radius).acos() - FRAC_PI_2;
    let angle = tumble_rate * tangent_dist / radius;
    let axis = tumble_axis(camera, dx, dy, phi);
    rotate_about_look_at(camera, axis, -angle);
    true
}

/// Rotation axis for a constant screen-space tumble direction.
///
/// `None` for a zero direction.
#[must_use]
pub fn auto_tumble_axis(camera: &Camera, direction: Vec2) -> Option<Vec3> {
    let tangent_dist = direction.length();
    if tangent_dist <= 0.0 {
        return None;
    }
    let radius = direction.x.abs() + direction.y.abs();
    let dx = -direction.y / tangent_dist;
    let dy = direction.x / tangent_dist;
    let d = (dx * direction.x - dy * direction.y).clamp(-radius, radius);
    let phi = (d / radius).acos() - FRAC_PI_2;
    Some(tumble_axis(camera, dx, dy, phi))
}

/// Pan eye and target together by the unprojected pointer motion.
///
/// The near/far blend factor is `0` unless `near < far` and the eye
/// distance lies inside `[near, far]`. Returns `true` if the pose changed.
pub fn translate(
    camera: &mut Camera,
    previous: Vec2,
    pointer: Vec2,
    height: f32,
) -> bool {
    let (near, far) = (camera.znear, camera.zfar);
    let distance = camera.eye.distance(camera.target);
    let fact = if far > near && distance >= near && distance <= far {
        (distance - near) / (far - near)
    } else {
        0.0
    };

    let unproject =
        |p: Vec2, z: f32| camera.unproject(Vec3::new(p.x, height - p.y, z));
    let (Some(old_near), Some(old_far), Some(new_near), Some(new_far)) = (
        unproject(previous, 0.0),
        unproject(previous, 1.0),
        unproject(pointer, 0.0),
        unproject(pointer, 1.0),
    ) else {
        log::trace!("pan skipped: projection is singular");
        return false;
    };

    let delta = TRANSLATE_RATE
        * ((1.0 - fact) * (new_near - old_near) + fact * (new_far - old_far));
    if !delta.is_finite() {
        return false;
    }
    camera.eye -= delta;
    camera.target -= delta;
    true
}

/// Move the eye along the view axis by `delta` pointer units, keeping the
/// near plane at or above `MIN_NEAR_FAR_RATIO * far` through `debt`.
///
/// Zooming in past the ratio floor clamps the near plane once and records
/// the overshoot in `debt`; later zoom-out steps repay it before the clip
/// planes move again. Returns `true` if the eye moved.
pub fn fly_zoom(
    camera: &mut Camera,
    debt: &mut f32,
    delta: f32,
    height: f32,
) -> bool {
    if height <= 0.0 {
        return false;
    }
    let to_eye = camera.eye - camera.target;
    let dist = to_eye.length();
    let dy = ZOOM_SCALE * delta / height;
    let step = dy * dist;
    if dist + step <= MIN_FLY_DISTANCE {
        return false;
    }
    camera.eye += to_eye.normalize_or_zero() * step;

    let floor = MIN_NEAR_FAR_RATIO * camera.zfar;
    if floor < camera.znear + step + *debt {
        if *debt != 0.0 {
            *debt += step;
            if *debt > 0.0 {
                camera.znear += *debt;
                camera.zfar += *debt;
                *debt = 0.0;
            } else {
                camera.znear += step;
                camera.zfar += step;
            }
        }
    } else {
        if *debt == 0.0 {
            let diff = camera.znear - floor;
            camera.znear = floor;
            camera.zfar -= diff;
            *debt -= MIN_NEAR_FAR_RATIO * camera.zfar;
        }
        *debt += step;
    }
    true
}
