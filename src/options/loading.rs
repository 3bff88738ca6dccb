use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Loading", inline)]
#[serde(default)]
/// Asset loading bookkeeping parameters.
pub struct LoadingOptions {
    /// First model id tried when assigning ids to new geometries.
    #[schemars(skip)]
    pub model_id_base: u32,
    /// Seconds the render gate may stay closed with no progress before a
    /// stall diagnostic is logged.
    #[schemars(title = "Stall Warning (s)", range(min = 1.0, max = 600.0), extend("step" = 1.0))]
    pub stall_warning_secs: f32,
}

impl Default for LoadingOptions {
    fn default() -> Self {
        Self {
            model_id_base: 1000,
            stall_warning_secs: 30.0,
        }
    }
}
