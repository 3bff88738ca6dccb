use glam::{Vec2, Vec3};

use super::core::Camera;
use super::light::DirectionalLight;
use super::navigation::{fly_zoom, rotate_about_look_at, translate, tumble};
use super::orientation::DeviceOrientation;
use super::path::{CameraPath, CameraPathData, TimeFrame};
use super::transition::{
    CameraAutoTumble, RotateCameraTransition, SmoothCameraTransition,
};
use super::viewport::{Viewport, ViewportUpdate};
use crate::input::{
    ClickActions, InputEvent, InputResponse, InteractionState, MouseButton,
    PointerTracker,
};
use crate::options::Options;

/// Near-plane fraction of the eye distance used when the clip distance
/// would put the near plane too close to the eye.
const NEAR_CLIP_FACTOR: f32 = 0.95;

/// What drives the camera pose during [`CameraController::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControlMode {
    /// Direct pointer/touch navigation.
    #[default]
    Default,
    /// Playing a keyframed camera path.
    Path,
    /// Running a viewport-to-viewport transition.
    SmoothTransition,
    /// Running a rotation about the look-at point.
    RotateTransition,
    /// Continuous automatic tumbling.
    AutoTumble,
}

/// Interactive camera controller.
///
/// Owns the camera pose, the pointer/touch state machine, the directional
/// light that follows the eye, and the optional transition, path and
/// auto-tumble drivers. Input events only record pointer state; the pose
/// moves once per frame in [`update`](Self::update).
pub struct CameraController {
    camera: Camera,
    light: DirectionalLight,
    light_follows_path: bool,
    default_viewport: Viewport,
    size: Vec2,
    tracker: PointerTracker,
    click_actions: ClickActions,
    mode: ControlMode,
    enabled: bool,
    tumble_rate: f32,
    scroll_rate: f32,
    play_rate: f32,
    near_plane_fly_debt: f32,
    smooth_transition: Option<SmoothCameraTransition>,
    rotate_transition: Option<RotateCameraTransition>,
    auto_tumble: Option<CameraAutoTumble>,
    path: Option<CameraPath>,
    path_duration: f32,
    device_orientation: Option<DeviceOrientation>,
}

impl CameraController {
    /// Create an enabled controller posed at the default viewport.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        let default_viewport = Viewport {
            near_plane: options.camera.znear,
            far_plane: options.camera.zfar,
            ..Viewport::default()
        };
        let camera = Camera::new(options.camera.fovy, 1.0, &default_viewport);
        let mut controller = Self {
            camera,
            light: DirectionalLight::default(),
            light_follows_path: false,
            default_viewport,
            size: Vec2::ZERO,
            tracker: PointerTracker::default(),
            click_actions: ClickActions::default(),
            mode: ControlMode::Default,
            enabled: true,
            tumble_rate: options.camera.tumble_rate,
            scroll_rate: options.camera.scroll_rate,
            play_rate: options.animation.play_rate,
            near_plane_fly_debt: 0.0,
            smooth_transition: None,
            rotate_transition: None,
            auto_tumble: None,
            path: None,
            path_duration: options.animation.path_duration,
            device_orientation: None,
        };
        controller.reset_view();
        controller
    }

    // ---- Accessors ----

    /// The controlled camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The light that follows the camera eye.
    #[must_use]
    pub fn light(&self) -> &DirectionalLight {
        &self.light
    }

    /// Current control mode.
    #[must_use]
    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Current interaction state.
    #[must_use]
    pub fn interaction_state(&self) -> InteractionState {
        self.tracker.state()
    }

    /// Outstanding near-plane adjustment deferred by fly-zoom.
    #[must_use]
    pub fn near_plane_fly_debt(&self) -> f32 {
        self.near_plane_fly_debt
    }

    /// Drawing surface size in pixels.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Scene time units per second.
    #[must_use]
    pub fn play_rate(&self) -> f32 {
        self.play_rate
    }

    /// Set scene time units per second.
    pub fn set_play_rate(&mut self, play_rate: f32) {
        self.play_rate = play_rate;
    }

    /// Set the trackball rotation rate.
    pub fn set_tumble_rate(&mut self, rate: f32) {
        self.tumble_rate = rate;
    }

    /// Set the zoom units accumulated per wheel notch.
    pub fn set_scroll_rate(&mut self, rate: f32) {
        self.scroll_rate = rate;
    }

    /// Update the drawing surface size and projection aspect.
    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
        if width > 0.0 && height > 0.0 {
            self.camera.aspect = width / height;
        }
    }

    // ---- Input ----

    /// Start accepting input. Idempotent.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Stop accepting input and drop any interaction in progress.
    /// Idempotent.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.tracker.reset();
    }

    /// Whether input events are accepted.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Remap which interaction a mouse button starts.
    pub fn set_mouse_button_action(
        &mut self,
        button: MouseButton,
        state: InteractionState,
    ) {
        self.click_actions.set(button, state);
    }

    /// Record a pointer, touch or wheel event.
    pub fn handle_event(&mut self, event: &InputEvent) -> InputResponse {
        if !self.enabled {
            return InputResponse::Ignored;
        }
        let response =
            self.tracker
                .handle_event(event, &self.click_actions, self.scroll_rate);
        if self.tracker.state() != InteractionState::None
            && self.mode == ControlMode::AutoTumble
            && self
                .auto_tumble
                .as_ref()
                .is_some_and(CameraAutoTumble::stops_on_camera_input)
        {
            log::debug!("auto tumble stopped by camera input");
            self.stop_auto_tumble();
        }
        response
    }

    // ---- Viewports ----

    fn sync_light(&mut self) {
        self.light.position = self.camera.eye;
    }

    /// Restore the default viewport.
    pub fn reset_view(&mut self) {
        self.camera.apply_viewport(&self.default_viewport);
        self.near_plane_fly_debt = 0.0;
        self.camera.look_at_target();
        self.sync_light();
    }

    /// Replace the fields of the default viewport present in `update`.
    pub fn set_default_camera_settings(&mut self, update: &ViewportUpdate) {
        self.default_viewport = self.default_viewport.merged(update);
        self.sync_light();
    }

    /// Replace the fields of the current pose present in `update`.
    pub fn set_current_camera_settings(&mut self, update: &ViewportUpdate) {
        let viewport = self.camera.viewport().merged(update);
        self.camera.apply_viewport(&viewport);
        self.sync_light();
    }

    /// The stored default viewport.
    #[must_use]
    pub fn default_viewport(&self) -> Viewport {
        self.default_viewport
    }

    /// Snapshot of the current pose.
    #[must_use]
    pub fn current_viewport(&self) -> Viewport {
        self.camera.viewport()
    }

    /// Viewport framing a sphere at the given vertical view angle
    /// (degrees), keeping the current view direction and up vector.
    #[must_use]
    pub fn viewport_from_centre_and_radius(
        &self,
        centre: Vec3,
        radius: f32,
        view_angle: f32,
        clip_distance: f32,
    ) -> Viewport {
        let direction =
            (self.camera.eye - self.camera.target).normalize_or(Vec3::Z);
        let eye_distance = radius / (view_angle.to_radians() / 2.0).tan();
        let near_plane = if clip_distance > NEAR_CLIP_FACTOR * eye_distance {
            (1.0 - NEAR_CLIP_FACTOR) * eye_distance
        } else {
            eye_distance - clip_distance
        };
        Viewport {
            near_plane,
            far_plane: eye_distance + clip_distance,
            eye_position: centre + direction * eye_distance,
            target_position: centre,
            up_vector: self.camera.up,
        }
    }

    // ---- Frame update ----

    /// Advance the camera by one frame of `time_delta` seconds.
    ///
    /// Transitions and paths advance by `time_delta * play_rate`. Direct
    /// navigation only runs in [`ControlMode::Default`] and
    /// [`ControlMode::AutoTumble`]. The camera is re-aimed at its target
    /// afterwards, or along the device orientation when one is active.
    pub fn update(&mut self, time_delta: f32) {
        let delta = time_delta * self.play_rate;
        let mut control_enabled = self.enabled;
        match self.mode {
            ControlMode::Default => {}
            ControlMode::Path => {
                self.update_path(delta);
                control_enabled = false;
            }
            ControlMode::SmoothTransition => {
                if let Some(transition) = self.smooth_transition.as_mut() {
                    transition.update(&mut self.camera, delta);
                    if transition.is_completed() {
                        self.smooth_transition = None;
                        self.mode = ControlMode::Default;
                    }
                }
                control_enabled = false;
            }
            ControlMode::RotateTransition => {
                if let Some(transition) = self.rotate_transition.as_mut() {
                    transition.update(&mut self.camera, delta);
                    if transition.is_completed() {
                        self.rotate_transition = None;
                        self.mode = ControlMode::Default;
                    }
                }
                control_enabled = false;
            }
            ControlMode::AutoTumble => {
                if let Some(auto) = self.auto_tumble.as_mut() {
                    auto.update(&mut self.camera);
                }
            }
        }

        if control_enabled {
            self.apply_interaction();
        }

        if let Some(orientation) = self.device_orientation {
            self.camera.look_along(orientation.rotation());
        } else {
            self.camera.look_at_target();
        }
        self.sync_light();
    }

    fn apply_interaction(&mut self) {
        match self.tracker.state() {
            InteractionState::Rotate | InteractionState::TouchRotate => {
                let _ = tumble(
                    &mut self.camera,
                    self.tumble_rate,
                    self.tracker.previous(),
                    self.tracker.pointer(),
                    self.size,
                );
                self.tracker.sync_previous();
            }
            InteractionState::Pan | InteractionState::TouchPan => {
                let _ = translate(
                    &mut self.camera,
                    self.tracker.previous(),
                    self.tracker.pointer(),
                    self.size.y,
                );
                self.tracker.sync_previous();
            }
            InteractionState::Zoom
            | InteractionState::TouchZoom
            | InteractionState::Scroll => {
                let delta = self.tracker.take_zoom_delta();
                let _ = fly_zoom(
                    &mut self.camera,
                    &mut self.near_plane_fly_debt,
                    delta,
                    self.size.y,
                );
                self.tracker.finish_zoom();
            }
            InteractionState::None => {}
        }
        self.tracker.end_scroll();
    }

    /// Rotate the eye and up vector about the look-at point.
    pub fn rotate_about_look_at_point(&mut self, axis: Vec3, angle: f32) {
        rotate_about_look_at(&mut self.camera, axis, angle);
        self.sync_light();
    }

    // ---- Transitions ----

    /// Prepare a smooth transition between two viewports. Ignored while a
    /// rotate transition exists.
    pub fn camera_transition(
        &mut self,
        start: Viewport,
        end: Viewport,
        duration: f32,
    ) {
        if self.rotate_transition.is_some() {
            return;
        }
        let transition = SmoothCameraTransition::new(start, end, duration);
        transition.begin(&mut self.camera);
        self.smooth_transition = Some(transition);
    }

    /// Prepare a rotation about the look-at point. Ignored while a smooth
    /// transition exists.
    pub fn rotate_camera_transition(
        &mut self,
        axis: Vec3,
        angle: f32,
        duration: f32,
    ) {
        if self.smooth_transition.is_some() {
            return;
        }
        self.rotate_transition =
            Some(RotateCameraTransition::new(axis, angle, duration));
    }

    /// Start running the prepared transition, if any.
    pub fn enable_camera_transition(&mut self) {
        if self.smooth_transition.is_some() {
            self.mode = ControlMode::SmoothTransition;
        } else if self.rotate_transition.is_some() {
            self.mode = ControlMode::RotateTransition;
        }
    }

    /// Return to direct control, keeping the transition for later.
    pub fn pause_camera_transition(&mut self) {
        self.mode = ControlMode::Default;
    }

    /// Return to direct control and drop any transition.
    pub fn stop_camera_transition(&mut self) {
        self.mode = ControlMode::Default;
        self.smooth_transition = None;
        self.rotate_transition = None;
    }

    /// Whether a transition is currently running.
    #[must_use]
    pub fn is_transitioning_camera(&self) -> bool {
        matches!(
            self.mode,
            ControlMode::SmoothTransition | ControlMode::RotateTransition
        )
    }

    // ---- Auto tumble ----

    /// Prepare an automatic tumble toward a screen-space `direction`.
    pub fn auto_tumble(
        &mut self,
        direction: Vec2,
        rate: f32,
        stop_on_camera_input: bool,
    ) {
        self.auto_tumble =
            Some(CameraAutoTumble::new(direction, rate, stop_on_camera_input));
    }

    /// Start the prepared auto tumble.
    pub fn enable_auto_tumble(&mut self) {
        if self.auto_tumble.is_some() {
            self.mode = ControlMode::AutoTumble;
        }
    }

    /// Stop and drop the auto tumble.
    pub fn stop_auto_tumble(&mut self) {
        if self.mode == ControlMode::AutoTumble {
            self.mode = ControlMode::Default;
        }
        self.auto_tumble = None;
    }

    /// Recompute the tumble axis from the current pose on next update.
    pub fn update_auto_tumble(&mut self) {
        if let Some(auto) = self.auto_tumble.as_mut() {
            auto.require_update();
        }
    }

    /// Whether auto tumble is running.
    #[must_use]
    pub fn is_auto_tumble(&self) -> bool {
        self.mode == ControlMode::AutoTumble
    }

    // ---- Camera path ----

    /// Load a keyframed camera path.
    pub fn load_path(&mut self, data: &CameraPathData) {
        self.path = Some(CameraPath::new(data, self.path_duration));
    }

    /// Set the path loop duration.
    pub fn set_path_duration(&mut self, duration: f32) {
        self.path_duration = duration;
        if let Some(path) = self.path.as_mut() {
            path.set_duration(duration);
        }
    }

    /// Start playing the loaded path.
    pub fn play_path(&mut self) {
        self.mode = ControlMode::Path;
    }

    /// Stop playing the path.
    pub fn stop_path(&mut self) {
        if self.mode == ControlMode::Path {
            self.mode = ControlMode::Default;
        }
    }

    /// Whether the path is playing.
    #[must_use]
    pub fn is_playing_path(&self) -> bool {
        self.mode == ControlMode::Path
    }

    /// Current path time, `0` without a path.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.path.as_ref().map_or(0.0, CameraPath::time)
    }

    /// Set the path time, clamped to the path duration.
    pub fn set_time(&mut self, time: f32) {
        if let Some(path) = self.path.as_mut() {
            path.set_time(time);
        }
    }

    /// Number of path keyframes.
    #[must_use]
    pub fn number_of_time_frames(&self) -> usize {
        self.path.as_ref().map_or(0, CameraPath::number_of_time_frames)
    }

    /// Keyframes bracketing the current path time.
    #[must_use]
    pub fn current_time_frame(&self) -> Option<TimeFrame> {
        self.path.as_ref()?.current_time_frame()
    }

    /// Jump to a (fractional) keyframe.
    pub fn set_current_time_frame(&mut self, frame: f32) {
        if let Some(path) = self.path.as_mut() {
            path.set_current_time_frame(frame);
        }
    }

    /// Apply the path pose for the current path time. Only while the path
    /// is playing.
    pub fn calculate_path_now(&mut self) {
        if self.mode != ControlMode::Path {
            return;
        }
        self.update_path(0.0);
        self.sync_light();
    }

    /// Also move the light target along the path.
    pub fn enable_directional_light_update_with_path(&mut self, flag: bool) {
        self.light_follows_path = flag;
    }

    fn update_path(&mut self, delta: f32) {
        let Some(path) = self.path.as_mut() else {
            return;
        };
        path.advance(delta);
        if let Some((eye, target)) = path.pose() {
            self.camera.eye = eye;
            self.camera.target = target;
            if self.light_follows_path {
                self.light.target = target;
            }
        }
    }

    // ---- Device orientation ----

    /// Let device attitude supply the look direction.
    pub fn enable_device_orientation(&mut self) {
        if self.device_orientation.is_none() {
            self.device_orientation = Some(DeviceOrientation::default());
        }
    }

    /// Return to aiming at the target.
    pub fn disable_device_orientation(&mut self) {
        self.device_orientation = None;
    }

    /// Whether device orientation is active.
    #[must_use]
    pub fn is_device_orientation_enabled(&self) -> bool {
        self.device_orientation.is_some()
    }

    /// Record the latest device attitude. Ignored unless enabled.
    pub fn set_device_orientation(&mut self, orientation: DeviceOrientation) {
        if let Some(current) = self.device_orientation.as_mut() {
            *current = orientation;
        }
    }
}
