use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Display", inline)]
#[serde(default)]
/// Display toggles applied by the scene composer.
pub struct DisplayOptions {
    /// Show markers for named objects while animation is paused.
    #[schemars(title = "Markers")]
    pub display_markers: bool,
    /// Clear the target before each scene render.
    #[schemars(skip)]
    pub auto_clear: bool,
    /// Render side-by-side stereo output.
    #[schemars(title = "Stereo")]
    pub stereo: bool,
    /// Clear colour as linear RGBA.
    #[schemars(skip)]
    pub clear_color: [f32; 4],
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            display_markers: false,
            auto_clear: true,
            stereo: false,
            clear_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}
