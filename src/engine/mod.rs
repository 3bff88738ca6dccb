//! The render loop: scenes, the animation clock and frame composition.

pub mod backend;
pub mod callbacks;
mod frame;
pub mod hud;
pub mod registry;
mod scene_management;

use self::callbacks::PreRenderCallbacks;
use self::hud::Hud;
use self::registry::{SceneId, SceneRegistry};
use crate::assets::AssetSource;
use crate::options::Options;
use crate::scene::SceneComposer;
use crate::util::frame_timing::FrameClock;

/// Handle for one outstanding frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Host hook for scheduling frames (the platform's animation-frame
/// callback). The host calls [`RenderLoop::on_frame`] when a requested
/// frame fires.
pub trait FrameScheduler {
    /// Ask for one frame callback.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraw a pending request.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Scheduler for hosts that drive frames themselves: every request is
/// granted, and the host keeps calling [`RenderLoop::on_frame`] while
/// [`RenderLoop::is_animating`] holds.
#[derive(Debug, Default)]
pub struct ImmediateScheduler {
    issued: u64,
}

impl FrameScheduler for ImmediateScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.issued += 1;
        FrameRequest(self.issued)
    }

    fn cancel_frame(&mut self, _request: FrameRequest) {}
}

/// Owns every scene and composes one frame from them.
///
/// # Scenes
///
/// A loop starts with one scene called `"default"`, which is current.
/// Further scenes come from [`create_scene`](Self::create_scene). Only the
/// current scene receives camera input; additional active scenes animate
/// alongside it and are drawn through its camera.
///
/// # Frame
///
/// Each frame runs, in order: resize check, clock delta, the current
/// scene's animation step, the additional scenes' animation steps, the
/// HUD overlay, the pre-render callbacks, and finally the current scene's
/// draw.
pub struct RenderLoop {
    options: Options,
    scenes: SceneRegistry,
    current: SceneId,
    additional: Vec<SceneId>,
    hud: Hud,
    callbacks: PreRenderCallbacks,
    clock: FrameClock,
    scheduler: Box<dyn FrameScheduler>,
    frame_request: Option<FrameRequest>,
    play_rate: f32,
    play_animation: bool,
    /// Size the host reports for the drawable's container.
    container_size: (u32, u32),
    /// Size last applied to the backend.
    current_size: (u32, u32),
}

impl RenderLoop {
    /// Loop with a `"default"` scene fetching through `source`.
    #[must_use]
    pub fn new(
        options: Options,
        source: Box<dyn AssetSource>,
        scheduler: Box<dyn FrameScheduler>,
    ) -> Self {
        let mut default = SceneComposer::new(&options, source);
        default.set_interactive_control_enable(true);
        let (scenes, current) = SceneRegistry::with_scene("default", default);
        log::info!("render loop created with default scene");
        Self {
            play_rate: options.animation.play_rate,
            options,
            scenes,
            current,
            additional: Vec::new(),
            hud: Hud::default(),
            callbacks: PreRenderCallbacks::default(),
            clock: FrameClock::default(),
            scheduler,
            frame_request: None,
            play_animation: true,
            container_size: (0, 0),
            current_size: (0, 0),
        }
    }

    /// Options new scenes are created with.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The pre-render callbacks.
    pub fn callbacks_mut(&mut self) -> &mut PreRenderCallbacks {
        &mut self.callbacks
    }

    /// The HUD overlay.
    #[must_use]
    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.clock.fps()
    }
}

#[cfg(test)]
mod tests;
