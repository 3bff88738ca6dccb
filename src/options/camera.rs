use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Camera projection and interactive control parameters.
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 90.0), extend("step" = 1.0))]
    pub fovy: f32,
    /// Near clipping plane of the default viewport.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane of the default viewport.
    #[schemars(skip)]
    pub zfar: f32,
    /// Trackball rotation rate multiplier.
    #[schemars(title = "Tumble Rate", range(min = 0.1, max = 5.0), extend("step" = 0.1))]
    pub tumble_rate: f32,
    /// Accumulated zoom units per wheel notch.
    #[schemars(title = "Scroll Rate", range(min = 1.0, max = 200.0), extend("step" = 1.0))]
    pub scroll_rate: f32,
    /// Far-plane margin, as a multiple of the bounding radius, used by
    /// view-all framing.
    #[schemars(skip)]
    pub clip_factor: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 40.0,
            znear: 0.1,
            zfar: 2000.0,
            tumble_rate: 1.5,
            scroll_rate: 50.0,
            clip_factor: 4.0,
        }
    }
}
