use glam::Vec3;

/// Headlight-style directional light whose position tracks the camera eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Light position; the light shines from here toward `target`.
    pub position: Vec3,
    /// Point the light is aimed at.
    pub target: Vec3,
    /// Linear RGB colour.
    pub color: [f32; 3],
    /// Scalar intensity.
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            color: [1.0, 1.0, 1.0],
            intensity: 0.8,
        }
    }
}

impl DirectionalLight {
    /// Unit direction the light travels in.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}
