//! Frame scheduling and per-frame composition for [`RenderLoop`].

use super::backend::RenderBackend;
use super::RenderLoop;
use crate::scene::SceneComposer;

impl RenderLoop {
    // ---- Scheduling ----

    /// Start the loop. Idempotent: a pending request is kept.
    pub fn animate(&mut self) {
        if self.frame_request.is_none() {
            self.clock.reset();
            self.frame_request = Some(self.scheduler.request_frame());
        }
    }

    /// Stop the loop by withdrawing the pending request. Idempotent.
    /// In-flight asset fetches keep running and land on later frames.
    pub fn stop_animate(&mut self) {
        if let Some(request) = self.frame_request.take() {
            self.scheduler.cancel_frame(request);
        }
    }

    /// Whether a frame request is pending.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.frame_request.is_some()
    }

    /// Scheduler callback: draw one frame and request the next. A callback
    /// arriving after [`stop_animate`](Self::stop_animate) does nothing.
    pub fn on_frame(&mut self, backend: &mut dyn RenderBackend) {
        if self.frame_request.take().is_none() {
            return;
        }
        self.render(backend);
        self.frame_request = Some(self.scheduler.request_frame());
    }

    // ---- Frame ----

    /// Draw one frame, advancing animation by the wall-clock time since
    /// the previous one.
    pub fn render(&mut self, backend: &mut dyn RenderBackend) {
        let delta = self.clock.tick();
        self.render_frame(delta, backend);
    }

    /// Draw one frame with an explicit `delta` in seconds.
    pub fn render_frame(&mut self, delta: f32, backend: &mut dyn RenderBackend) {
        if self.current_size != self.container_size {
            self.apply_resize(backend);
        }
        let (play_rate, play) = (self.play_rate, self.play_animation);
        self.scenes[self.current].render_geometries(play_rate, delta, play);
        for id in &self.additional {
            self.scenes[*id].render_geometries(play_rate, delta, play);
        }
        if !self.hud.is_empty() {
            backend.clear_depth();
            backend.draw_overlay(self.hud.projection(), self.hud.sprites());
        }
        let _ = self.callbacks.run(&mut self.scenes[self.current]);
        let additional: Vec<&SceneComposer> = self
            .additional
            .iter()
            .filter_map(|id| self.scenes.get(*id))
            .collect();
        self.scenes[self.current].render_with(backend, &additional);
    }

    // ---- Size ----

    /// Report the container size. The backend, the current scene's camera
    /// and the HUD follow on the next frame.
    pub fn set_container_size(&mut self, width: u32, height: u32) {
        self.container_size = (width, height);
    }

    /// Size last applied to the backend.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.current_size
    }

    fn apply_resize(&mut self, backend: &mut dyn RenderBackend) {
        let (width, height) = self.container_size;
        log::debug!("resizing to {width}x{height}");
        backend.set_size(width, height);
        self.current_size = backend.size();
        self.resize_current_scene();
    }

    pub(super) fn resize_current_scene(&mut self) {
        let (width, height) = self.container_size;
        if width == 0 || height == 0 {
            return;
        }
        let (w, h) = (width as f32, height as f32);
        self.scenes[self.current].on_window_resize(w, h);
        self.hud.resize(w, h);
    }

    // ---- Animation ----

    /// Scene time units per second.
    #[must_use]
    pub fn play_rate(&self) -> f32 {
        self.play_rate
    }

    /// Set scene time units per second.
    pub fn set_play_rate(&mut self, play_rate: f32) {
        self.play_rate = play_rate;
    }

    /// Whether objects advance in time each frame.
    #[must_use]
    pub fn play_animation(&self) -> bool {
        self.play_animation
    }

    /// Play or pause object animation. The camera keeps updating.
    pub fn set_play_animation(&mut self, play: bool) {
        self.play_animation = play;
    }

    /// Current time of the scene on display.
    #[must_use]
    pub fn current_time(&self) -> f32 {
        self.current_scene().current_time()
    }

    /// Seek the scene on display to `time`.
    pub fn set_morphs_time(&mut self, time: f32) {
        self.current_scene_mut().set_morphs_time(time);
    }
}
