//! Camera system for 3D scene viewing.
//!
//! Provides a trackball-style camera controller with pan, fly-zoom,
//! smooth and rotating transitions, keyframed paths, auto tumble, device
//! orientation and an off-axis stereo pair.

/// Interactive controller owning the camera pose and its drivers.
pub mod controller;
/// Core camera struct and GPU uniform types.
pub mod core;
/// Directional light that follows the camera.
pub mod light;
/// Trackball, pan and fly-zoom math.
pub mod navigation;
/// Device attitude to look-direction conversion.
pub mod orientation;
/// Keyframed camera paths.
pub mod path;
/// Off-axis stereo camera pair.
pub mod stereo;
/// Viewport-to-viewport, rotation and auto-tumble drivers.
pub mod transition;
/// Camera pose snapshots.
pub mod viewport;

pub use controller::{CameraController, ControlMode};
pub use core::{Camera, CameraUniform, CameraView};
pub use light::DirectionalLight;
pub use orientation::DeviceOrientation;
pub use path::{CameraPath, CameraPathData};
pub use stereo::StereoCamera;
pub use viewport::{Viewport, ViewportUpdate};
