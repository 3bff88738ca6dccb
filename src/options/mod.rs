//! Centralized runtime options with TOML preset support.
//!
//! Camera, animation, loading and display settings are consolidated here.
//! Options serialize to/from TOML so hosts can keep presets on disk.

mod animation;
mod camera;
mod display;
mod loading;

use std::path::Path;

pub use animation::AnimationOptions;
pub use camera::CameraOptions;
pub use display::DisplayOptions;
pub use loading::LoadingOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::MorphviewError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[camera]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Camera projection and control parameters.
    pub camera: CameraOptions,
    /// Animation clock parameters.
    pub animation: AnimationOptions,
    /// Asset loading parameters.
    #[schemars(skip)]
    pub loading: LoadingOptions,
    /// Display toggles.
    pub display: DisplayOptions,
}

impl Options {
    /// JSON Schema of the host-tunable options. Loading is left out.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, MorphviewError> {
        let content =
            std::fs::read_to_string(path).map_err(MorphviewError::Io)?;
        toml::from_str(&content)
            .map_err(|e| MorphviewError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), MorphviewError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MorphviewError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(MorphviewError::Io)?;
        }
        std::fs::write(path, content).map_err(MorphviewError::Io)
    }

    /// Preset names (TOML file stems) in `dir`, sorted. An unreadable
    /// directory has no presets.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_owned))
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[animation]
play_rate = 250.0
";
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.animation.play_rate, 250.0);
        assert_eq!(opts.animation.duration, 3000.0);
        assert_eq!(opts.camera.tumble_rate, 1.5);
        assert_eq!(opts.loading.model_id_base, 1000);
        assert!(opts.display.auto_clear);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = std::env::temp_dir()
            .join(format!("morphview-options-{}", std::process::id()));
        let path = dir.join("zoomed.toml");
        let mut opts = Options::default();
        opts.camera.scroll_rate = 75.0;
        opts.display.stereo = true;
        opts.save(&path).unwrap();

        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded, opts);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn presets_are_listed_by_stem() {
        let dir = std::env::temp_dir()
            .join(format!("morphview-presets-{}", std::process::id()));
        let mut stereo = Options::default();
        stereo.display.stereo = true;
        stereo.save(&dir.join("stereo.toml")).unwrap();
        Options::default().save(&dir.join("anatomy.toml")).unwrap();
        std::fs::write(dir.join("notes.txt"), "not a preset").unwrap();

        assert_eq!(
            Options::list_presets(&dir),
            vec!["anatomy".to_owned(), "stereo".to_owned()]
        );
        assert!(Options::list_presets(&dir.join("missing")).is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = std::env::temp_dir()
            .join(format!("morphview-bad-options-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        std::fs::write(&path, "[camera\nfovy = ").unwrap();
        assert!(matches!(
            Options::load(&path),
            Err(MorphviewError::OptionsParse(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("camera"));
        assert!(props.contains_key("animation"));
        assert!(props.contains_key("display"));
        assert!(!props.contains_key("loading"));

        let camera = &props["camera"]["properties"];
        assert!(camera.get("tumble_rate").is_some());
        assert!(camera.get("znear").is_none());
    }
}
