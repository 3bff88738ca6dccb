use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Quat, Vec3};

/// Latest device attitude reported by the host, in degrees.
///
/// `alpha`, `beta` and `gamma` are intrinsic Z-X'-Y'' Tait-Bryan angles;
/// `screen` is the screen rotation relative to the device's natural
/// orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceOrientation {
    /// Rotation about the device z axis.
    pub alpha: f32,
    /// Rotation about the device x axis.
    pub beta: f32,
    /// Rotation about the device y axis.
    pub gamma: f32,
    /// Screen orientation angle.
    pub screen: f32,
}

impl DeviceOrientation {
    /// Rotation to apply to the eye-to-target vector.
    ///
    /// The camera looks out of the back of the device, so the device frame
    /// is tipped by -90 degrees about x before the screen rotation.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        let device = Quat::from_euler(
            EulerRot::YXZ,
            self.alpha.to_radians(),
            self.beta.to_radians(),
            -self.gamma.to_radians(),
        );
        let back_facing = Quat::from_axis_angle(Vec3::X, -FRAC_PI_2);
        let screen = Quat::from_axis_angle(Vec3::Z, -self.screen.to_radians());
        device * back_facing * screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_device_looks_down_the_screen_normal() {
        let q = DeviceOrientation::default().rotation();
        let looked = q * Vec3::NEG_Z;
        assert!((looked - Vec3::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn upright_device_looks_forward() {
        let q = DeviceOrientation {
            beta: 90.0,
            ..DeviceOrientation::default()
        }
        .rotation();
        let looked = q * Vec3::NEG_Z;
        assert!((looked - Vec3::NEG_Z).length() < 1e-5);
    }
}
