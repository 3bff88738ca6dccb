use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Animation", inline)]
#[serde(default)]
/// Animation clock parameters.
pub struct AnimationOptions {
    /// Scene time units advanced per wall-clock second.
    #[schemars(title = "Play Rate", range(min = 0.0, max = 5000.0), extend("step" = 10.0))]
    pub play_rate: f32,
    /// Default duration of newly loaded objects, in scene time units.
    #[schemars(skip)]
    pub duration: f32,
    /// Duration of a camera path loop, in scene time units.
    #[schemars(skip)]
    pub path_duration: f32,
    /// Duration of the camera transition used when switching scenes.
    #[schemars(title = "Scene Transition", range(min = 0.0, max = 10000.0), extend("step" = 100.0))]
    pub scene_transition_duration: f32,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            play_rate: 500.0,
            duration: 3000.0,
            path_duration: 3000.0,
            scene_transition_duration: 3000.0,
        }
    }
}
