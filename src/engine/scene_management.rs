//! Scene management methods for [`RenderLoop`].

use super::hud::HudSprite;
use super::registry::SceneId;
use super::RenderLoop;
use crate::assets::AssetSource;
use crate::scene::SceneComposer;

impl RenderLoop {
    // ---- Registry ----

    /// Create a scene called `name`. Returns `None` if the name is taken.
    pub fn create_scene(
        &mut self,
        name: &str,
        source: Box<dyn AssetSource>,
    ) -> Option<SceneId> {
        let mut scene = SceneComposer::new(&self.options, source);
        scene.set_interactive_control_enable(false);
        let id = self.scenes.insert(name, scene);
        match id {
            Some(_) => log::info!("created scene {name}"),
            None => log::warn!("scene {name} already exists"),
        }
        id
    }

    /// Id of the scene called `name`.
    #[must_use]
    pub fn scene_by_name(&self, name: &str) -> Option<SceneId> {
        self.scenes.by_name(name)
    }

    /// Scene by id.
    #[must_use]
    pub fn scene(&self, id: SceneId) -> Option<&SceneComposer> {
        self.scenes.get(id)
    }

    /// Mutable scene by id.
    pub fn scene_mut(&mut self, id: SceneId) -> Option<&mut SceneComposer> {
        self.scenes.get_mut(id)
    }

    /// Id of the scene on display.
    #[must_use]
    pub fn current_scene_id(&self) -> SceneId {
        self.current
    }

    /// The scene on display.
    #[must_use]
    pub fn current_scene(&self) -> &SceneComposer {
        &self.scenes[self.current]
    }

    /// Mutable scene on display.
    pub fn current_scene_mut(&mut self) -> &mut SceneComposer {
        &mut self.scenes[self.current]
    }

    // ---- Active scenes ----

    /// Put `id` on display. It leaves the additional list if it was there,
    /// takes over camera input from the old scene and is sized to the
    /// container.
    pub fn set_current_scene(&mut self, id: SceneId) {
        if self.scenes.get(id).is_none() {
            return;
        }
        self.remove_active_scene(id);
        let old = std::mem::replace(&mut self.current, id);
        if old != id {
            self.scenes[old].set_interactive_control_enable(false);
        }
        self.scenes[id].set_interactive_control_enable(true);
        self.resize_current_scene();
        log::info!(
            "current scene is now {}",
            self.scenes.name_of(id).unwrap_or("?")
        );
    }

    /// Whether `id` is current or additionally active.
    #[must_use]
    pub fn is_scene_active(&self, id: SceneId) -> bool {
        self.current == id || self.additional.contains(&id)
    }

    /// Animate and draw `id` alongside the current scene, through the
    /// current scene's camera.
    pub fn add_active_scene(&mut self, id: SceneId) {
        if self.scenes.get(id).is_some() && !self.is_scene_active(id) {
            self.additional.push(id);
        }
    }

    /// Stop drawing additional scene `id`.
    pub fn remove_active_scene(&mut self, id: SceneId) {
        self.additional.retain(|s| *s != id);
    }

    /// Drop every additional scene, leaving only the current one.
    pub fn clear_all_active_scenes(&mut self) {
        self.additional.clear();
    }

    /// Additionally active scenes, in the order they were added.
    #[must_use]
    pub fn additional_scenes(&self) -> &[SceneId] {
        &self.additional
    }

    // ---- Camera ----

    /// Return the current scene to its default viewport.
    pub fn reset_view(&mut self) {
        self.current_scene_mut().reset_view();
    }

    /// Frame the current scene together with every additional scene,
    /// keeping the view direction. No-op while the current scene is empty.
    pub fn view_all(&mut self) {
        let Some(bounds) = self.current_scene().bounding_box() else {
            return;
        };
        let bounds = self
            .additional
            .iter()
            .filter_map(|id| self.scenes.get(*id)?.bounding_box())
            .fold(bounds, |acc, b| acc.union(&b));
        self.current_scene_mut().view_all_with_bounding_box(&bounds);
    }

    /// Fly the current camera to frame `ending`, over `duration` (the
    /// configured scene transition duration when `None`).
    pub fn transition_scene(&mut self, ending: SceneId, duration: Option<f32>) {
        let Some(bounds) = self.scenes.get(ending).and_then(SceneComposer::bounding_box)
        else {
            return;
        };
        let duration =
            duration.unwrap_or(self.options.animation.scene_transition_duration);
        let scene = self.current_scene_mut();
        let end = scene.viewport_for_bounding_box(&bounds);
        let controller = scene.controller_mut();
        let start = controller.current_viewport();
        controller.camera_transition(start, end, duration);
        controller.enable_camera_transition();
    }

    // ---- HUD ----

    /// Add a sprite to the orthographic overlay.
    pub fn add_to_ortho_scene(&mut self, sprite: HudSprite) {
        self.hud.add_sprite(sprite);
    }

    /// Pin a `width` x `height` logo to the bottom-right corner.
    pub fn add_logo(&mut self, texture: &str, width: f32, height: f32) {
        self.hud.add_logo(texture, width, height);
    }
}
