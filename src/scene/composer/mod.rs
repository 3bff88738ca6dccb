//! One scene: a region tree, its camera, asset loading and frame dispatch.
//!
//! The composer gates animation on load completion. Every issued load that
//! will produce an object raises the expected count; every object that
//! arrives raises the completed count. Until the two agree (and every
//! glyphset has its glyph shape) a frame only moves the camera, so parts
//! of a multi-file model never start morphing out of step.

mod loaders;
mod view;

use rustc_hash::FxHashMap;
use web_time::{Duration, Instant};

pub use self::loaders::LoadEvent;
use self::loaders::{MetadataBatch, PendingLoad};
use super::export::{ExportHandle, ExportSnapshot};
use super::loading::{DownloadProgress, LoadStatus, LoadTracker};
use super::mesh::MorphGeometry;
use super::object::{ObjectId, ObjectKind, RenderOptions, RenderableObject};
use super::region::{PickTarget, RegionId, RegionTree};
use crate::assets::{AssetSource, RequestId};
use crate::camera::{CameraController, StereoCamera};
use crate::engine::backend::{DrawItem, PixelRect, RenderBackend, SceneFrame};
use crate::error::MorphviewError;
use crate::input::{InputEvent, InputResponse};
use crate::options::Options;

/// A scene: region tree, camera controller and load bookkeeping.
pub struct SceneComposer {
    tree: RegionTree,
    controller: CameraController,
    stereo: StereoCamera,
    stereo_enabled: bool,
    source: Box<dyn AssetSource>,
    tracker: LoadTracker,
    pending: FxHashMap<RequestId, PendingLoad>,
    batches: FxHashMap<u64, MetadataBatch>,
    next_request: RequestId,
    next_batch: u64,
    events: Vec<LoadEvent>,
    duration: f32,
    model_id_base: u32,
    view_angle: f32,
    clip_factor: f32,
    display_markers: bool,
    auto_clear: bool,
    clear_colour: [f32; 4],
}

impl SceneComposer {
    /// Empty scene fetching assets through `source`.
    #[must_use]
    pub fn new(options: &Options, source: Box<dyn AssetSource>) -> Self {
        let mut tree = RegionTree::new();
        let root = tree.root();
        tree.set_duration(root, options.animation.duration);
        let mut controller = CameraController::new(options);
        controller.set_path_duration(options.animation.duration);
        Self {
            tree,
            controller,
            stereo: StereoCamera::default(),
            stereo_enabled: options.display.stereo,
            source,
            tracker: LoadTracker::new(Duration::from_secs_f32(
                options.loading.stall_warning_secs.max(0.0),
            )),
            pending: FxHashMap::default(),
            batches: FxHashMap::default(),
            next_request: 1,
            next_batch: 1,
            events: Vec::new(),
            duration: options.animation.duration,
            model_id_base: options.loading.model_id_base,
            view_angle: options.camera.fovy,
            clip_factor: options.camera.clip_factor,
            display_markers: options.display.display_markers,
            auto_clear: options.display.auto_clear,
            clear_colour: options.display.clear_color,
        }
    }

    // ---- Accessors ----

    /// The region tree.
    #[must_use]
    pub fn tree(&self) -> &RegionTree {
        &self.tree
    }

    /// Mutable region tree. Objects added here bypass load counting.
    pub fn tree_mut(&mut self) -> &mut RegionTree {
        &mut self.tree
    }

    /// The root region.
    #[must_use]
    pub fn root(&self) -> RegionId {
        self.tree.root()
    }

    /// The camera controller.
    #[must_use]
    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    /// Mutable camera controller.
    pub fn controller_mut(&mut self) -> &mut CameraController {
        &mut self.controller
    }

    /// Forward an input event to the camera controller.
    pub fn handle_event(&mut self, event: &InputEvent) -> InputResponse {
        self.controller.handle_event(event)
    }

    /// Enable or disable camera input.
    pub fn set_interactive_control_enable(&mut self, flag: bool) {
        if flag {
            self.controller.enable();
        } else {
            self.controller.disable();
        }
    }

    /// Whether marker sprites are shown while paused.
    #[must_use]
    pub fn display_markers(&self) -> bool {
        self.display_markers
    }

    /// Show or hide marker sprites.
    pub fn set_display_markers(&mut self, flag: bool) {
        self.display_markers = flag;
    }

    /// Whether [`render`](Self::render) clears the target first.
    #[must_use]
    pub fn auto_clear(&self) -> bool {
        self.auto_clear
    }

    /// Set whether [`render`](Self::render) clears the target first.
    pub fn set_auto_clear(&mut self, flag: bool) {
        self.auto_clear = flag;
    }

    /// Set the clear colour.
    pub fn set_clear_colour(&mut self, colour: [f32; 4]) {
        self.clear_colour = colour;
    }

    /// Draw side-by-side stereo instead of a single view.
    pub fn set_stereo_effect_enable(&mut self, flag: bool) {
        self.stereo_enabled = flag;
    }

    /// Whether stereo output is on.
    #[must_use]
    pub fn is_stereo_effect_enable(&self) -> bool {
        self.stereo_enabled
    }

    // ---- Time ----

    /// Set the timeline length of the scene, its objects and the camera
    /// path.
    pub fn set_duration(&mut self, duration: f32) {
        let root = self.tree.root();
        self.tree.set_duration(root, duration);
        self.duration = duration;
        self.controller.set_path_duration(duration);
    }

    /// Timeline length given to new objects.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Current time of the scene's first object, or 0 when empty.
    #[must_use]
    pub fn current_time(&self) -> f32 {
        let time = self.tree.current_time(self.tree.root());
        if time == -1.0 {
            0.0
        } else {
            time
        }
    }

    /// Seek every object to `time`.
    pub fn set_morphs_time(&mut self, time: f32) {
        let root = self.tree.root();
        self.tree.set_morph_time(root, time, true);
    }

    /// Whether any object changes with time.
    #[must_use]
    pub fn is_time_varying(&self) -> bool {
        self.tree.is_time_varying(self.tree.root())
    }

    // ---- Objects ----

    /// Add an object to the root region. It counts as issued and completed
    /// at once, so it never holds the render gate.
    pub fn add_object(&mut self, object: RenderableObject) -> Option<ObjectId> {
        self.add_object_to(self.tree.root(), object)
    }

    /// Add an object to `region`, counted like [`add_object`](Self::add_object).
    pub fn add_object_to(
        &mut self,
        region: RegionId,
        object: RenderableObject,
    ) -> Option<ObjectId> {
        let id = self.tree.add_object(region, object)?;
        let now = Instant::now();
        self.tracker.expect(1, now);
        self.tracker.complete(now);
        Some(id)
    }

    /// Wrap `geometry` in an object with the next free model id and add it
    /// like [`add_object`](Self::add_object).
    pub fn add_geometry(&mut self, geometry: MorphGeometry) -> Option<ObjectId> {
        let mut object = RenderableObject::geometry(geometry);
        object.set_model_id(self.next_available_model_id());
        self.add_object(object)
    }

    /// Remove and dispose an object wherever it lives. Returns whether it
    /// was present.
    pub fn remove_object(&mut self, object: ObjectId) -> bool {
        match self.tree.region_of(object) {
            Some(region) => self.tree.remove_object(region, object),
            None => false,
        }
    }

    /// Whether `object` is anywhere in this scene.
    #[must_use]
    pub fn object_is_in_scene(&self, object: ObjectId) -> bool {
        self.tree.object_is_in_region(self.tree.root(), object, true)
    }

    /// The geometry carrying `model_id`.
    #[must_use]
    pub fn geometry_by_model_id(&self, model_id: u32) -> Option<ObjectId> {
        self.tree
            .iter_objects()
            .find(|(_, o)| matches!(o.kind(), ObjectKind::Geometry(_)) && o.model_id() == Some(model_id))
            .map(|(id, _)| id)
    }

    /// First model id at or above the base not used by any geometry.
    #[must_use]
    pub fn next_available_model_id(&self) -> u32 {
        let mut id = self.model_id_base;
        while self.geometry_by_model_id(id).is_some() {
            id += 1;
        }
        id
    }

    /// Pickable objects, refreshed only when regions changed.
    pub fn pickable_objects(&mut self) -> Option<Vec<PickTarget>> {
        let root = self.tree.root();
        if !self.tree.check_pickable_update_required(root, true) {
            return None;
        }
        Some(self.tree.pickable_objects(root, self.display_markers, true))
    }

    /// Snapshot the scene and encode it as glTF on a worker thread.
    pub fn export_gltf(&self, binary: bool) -> Result<ExportHandle, MorphviewError> {
        ExportHandle::spawn(ExportSnapshot::capture(&self.tree), binary)
    }

    // ---- Load gate ----

    /// Aggregate download progress.
    #[must_use]
    pub fn download_progress(&self) -> DownloadProgress {
        self.tracker.download_progress()
    }

    /// Whether the render gate is open, stalled or waiting.
    #[must_use]
    pub fn load_status(&self) -> LoadStatus {
        self.tracker.status(Instant::now())
    }

    /// Expected and completed input counts.
    #[must_use]
    pub fn load_counts(&self) -> (usize, usize) {
        (self.tracker.expected(), self.tracker.completed())
    }

    /// Whether animation may advance: every expected input completed and
    /// every glyphset has its glyph.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.tracker.all_completed()
            && self.tree.iter_objects().all(|(_, o)| match o.kind() {
                ObjectKind::Glyphset(g) => g.is_ready(),
                _ => true,
            })
    }

    /// Fetches issued and not yet settled, counted or not.
    #[must_use]
    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }

    /// Load events since the last call.
    pub fn take_load_events(&mut self) -> Vec<LoadEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- Frame ----

    /// Per-frame step: apply finished loads, move the camera, then advance
    /// animation by `play_rate * delta` if the load gate is open. While
    /// the gate is closed the camera still updates with a zero delta.
    pub fn render_geometries(&mut self, play_rate: f32, delta: f32, play_animation: bool) {
        self.poll_loads();
        if self.is_ready() {
            self.controller.update(delta);
            let options = RenderOptions {
                display_markers: self.display_markers,
                camera: Some(self.controller.camera().view()),
            };
            let root = self.tree.root();
            self.tree
                .render_geometries(root, play_rate, delta, play_animation, &options, true);
        } else {
            self.controller.update(0.0);
            let _ = self.tracker.report_stall(Instant::now());
        }
    }

    fn draw_items(&self) -> Vec<DrawItem<'_>> {
        let root = self.tree.root();
        self.tree
            .all_objects(root, true)
            .into_iter()
            .filter_map(|id| {
                let object = self.tree.object(id)?;
                let region = self.tree.region_of(id)?;
                (object.visibility() && self.tree.is_shown(region)).then(|| DrawItem {
                    id,
                    object,
                    world: self.tree.world_transform(region),
                })
            })
            .collect()
    }

    /// Draw the scene: clear when auto-clear is on, then either one full
    /// view or a stereo pair in the left and right halves.
    pub fn render(&self, backend: &mut dyn RenderBackend) {
        self.render_with(backend, &[]);
    }

    /// [`render`](Self::render), also drawing the objects of `additional`
    /// scenes through this scene's camera.
    pub fn render_with(&self, backend: &mut dyn RenderBackend, additional: &[&Self]) {
        if self.auto_clear {
            backend.clear(self.clear_colour);
        }
        let mut items = self.draw_items();
        for scene in additional {
            items.extend(scene.draw_items());
        }
        // opaque first so blending sees what is behind it
        items.sort_by_key(|item| item.object.is_transparent());
        let light = *self.controller.light();
        if !self.stereo_enabled {
            backend.draw_scene(&SceneFrame {
                camera: self.controller.camera().view(),
                light,
                items,
            });
            return;
        }
        let (width, height) = backend.size();
        let half = width / 2;
        let (left, right) = self.stereo.views(self.controller.camera());
        for (x, camera) in [(0, left), (half, right)] {
            let rect = PixelRect {
                x,
                y: 0,
                width: half,
                height,
            };
            backend.set_scissor(Some(rect));
            backend.set_viewport(rect);
            backend.draw_scene(&SceneFrame {
                camera,
                light,
                items: items.clone(),
            });
        }
        backend.set_scissor(None);
        backend.set_viewport(PixelRect::full(width, height));
    }
}

#[cfg(test)]
mod tests;
