use glam::Vec3;

use super::bounds::BoundingBox;
use super::glyphset::Glyphset;
use super::marker::Marker;
use super::mesh::{FrameWeights, MorphGeometry};
use crate::camera::CameraView;
use crate::util::colour::{hex_from_rgb, hex_string, rgb_from_hex};

/// Default local timeline length.
pub const DEFAULT_DURATION: f32 = 3000.0;

/// Default surface colour.
pub const DEFAULT_COLOUR: Vec3 = Vec3::ONE;

/// Stable handle to an object owned by a [`RegionTree`](super::RegionTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    /// Raw numeric value.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Per-frame settings passed down to every rendered object.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Whether named objects show markers while paused.
    pub display_markers: bool,
    /// Camera used to project markers.
    pub camera: Option<CameraView>,
}

/// Which kind of primitive an object draws, with its vertex data.
#[derive(Debug, Clone)]
pub enum ObjectKind {
    /// Triangle surface.
    Geometry(MorphGeometry),
    /// Point cloud.
    Pointset(MorphGeometry),
    /// Line segments.
    Lines(MorphGeometry),
    /// Instanced glyphs.
    Glyphset(Glyphset),
}

/// Discriminant of [`ObjectKind`] for filtering without borrowing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// [`ObjectKind::Geometry`].
    Geometry,
    /// [`ObjectKind::Pointset`].
    Pointset,
    /// [`ObjectKind::Lines`].
    Lines,
    /// [`ObjectKind::Glyphset`].
    Glyphset,
}

impl ObjectKind {
    /// Discriminant.
    #[must_use]
    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            Self::Geometry(_) => PrimitiveType::Geometry,
            Self::Pointset(_) => PrimitiveType::Pointset,
            Self::Lines(_) => PrimitiveType::Lines,
            Self::Glyphset(_) => PrimitiveType::Glyphset,
        }
    }

    fn morph_geometry(&self) -> Option<&MorphGeometry> {
        match self {
            Self::Geometry(g) | Self::Pointset(g) | Self::Lines(g) => Some(g),
            Self::Glyphset(_) => None,
        }
    }
}

/// A drawable with its own morph timeline, material state and optional
/// marker.
///
/// Local time lives in `[0, duration]`. [`render`](Self::render) advances
/// it while animation plays, wrapping past the end; [`set_morph_time`]
/// clamps.
///
/// [`set_morph_time`]: Self::set_morph_time
#[derive(Debug, Clone)]
pub struct RenderableObject {
    kind: ObjectKind,
    model_id: Option<u32>,
    group_name: Option<String>,
    anatomical_id: Option<String>,
    time_enabled: bool,
    morph_colour: bool,
    duration: f32,
    time: f32,
    visible: bool,
    colour: Vec3,
    opacity: f32,
    frustum_culled: bool,
    vertex_colours: bool,
    marker: Option<Marker>,
    marker_update_required: bool,
}

impl RenderableObject {
    /// Wrap `kind` with default material and timeline.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        let mut object = Self {
            kind,
            model_id: None,
            group_name: None,
            anatomical_id: None,
            time_enabled: false,
            morph_colour: false,
            duration: DEFAULT_DURATION,
            time: 0.0,
            visible: true,
            colour: DEFAULT_COLOUR,
            opacity: 1.0,
            frustum_culled: true,
            vertex_colours: false,
            marker: None,
            marker_update_required: true,
        };
        object.sync_glyphs();
        object
    }

    /// Triangle surface.
    #[must_use]
    pub fn geometry(geometry: MorphGeometry) -> Self {
        Self::new(ObjectKind::Geometry(geometry))
    }

    /// Point cloud.
    #[must_use]
    pub fn pointset(geometry: MorphGeometry) -> Self {
        Self::new(ObjectKind::Pointset(geometry))
    }

    /// Line segments.
    #[must_use]
    pub fn lines(geometry: MorphGeometry) -> Self {
        Self::new(ObjectKind::Lines(geometry))
    }

    /// Instanced glyphs.
    #[must_use]
    pub fn glyphset(glyphset: Glyphset) -> Self {
        Self::new(ObjectKind::Glyphset(glyphset))
    }

    // ---- Identity ----

    /// Primitive data.
    #[must_use]
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// Mutable primitive data.
    pub fn kind_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }

    /// Primitive discriminant.
    #[must_use]
    pub fn primitive_type(&self) -> PrimitiveType {
        self.kind.primitive_type()
    }

    /// Scene-unique model identifier, for geometries added by a composer.
    #[must_use]
    pub fn model_id(&self) -> Option<u32> {
        self.model_id
    }

    /// Assign the model identifier.
    pub fn set_model_id(&mut self, id: u32) {
        self.model_id = Some(id);
    }

    /// Group name used for lookups and markers.
    #[must_use]
    pub fn group_name(&self) -> Option<&str> {
        self.group_name.as_deref()
    }

    /// Set the group name; empty names clear it.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.group_name = (!name.is_empty()).then_some(name);
    }

    /// Anatomical identifier.
    #[must_use]
    pub fn anatomical_id(&self) -> Option<&str> {
        self.anatomical_id.as_deref()
    }

    /// Set the anatomical identifier.
    pub fn set_anatomical_id(&mut self, id: impl Into<String>) {
        self.anatomical_id = Some(id.into());
    }

    // ---- Timeline ----

    /// Whether vertices morph over time.
    #[must_use]
    pub fn time_enabled(&self) -> bool {
        self.time_enabled
    }

    /// Enable vertex morphing.
    pub fn set_time_enabled(&mut self, flag: bool) {
        self.time_enabled = flag;
    }

    /// Whether colours morph over time.
    #[must_use]
    pub fn morph_colour(&self) -> bool {
        self.morph_colour
    }

    /// Enable colour morphing.
    pub fn set_morph_colour(&mut self, flag: bool) {
        self.morph_colour = flag;
    }

    /// Whether the drawn result changes with time.
    #[must_use]
    pub fn is_time_varying(&self) -> bool {
        match &self.kind {
            ObjectKind::Glyphset(g) => g.is_time_varying(),
            _ => self.time_enabled || self.morph_colour,
        }
    }

    /// Timeline length.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Set the timeline length, clamping the current time into it.
    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration;
        if self.time > duration {
            self.time = duration.max(0.0);
        }
        self.sync_glyphs();
    }

    /// Local time in `[0, duration]`.
    #[must_use]
    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// Jump to `time`, clamped to `[0, duration]`.
    pub fn set_morph_time(&mut self, time: f32) {
        let time = time.clamp(0.0, self.duration.max(0.0));
        if time != self.time {
            self.time = time;
            self.sync_glyphs();
        }
    }

    /// Morph target influences at the current time. Empty unless vertex
    /// morphing is enabled.
    #[must_use]
    pub fn morph_influences(&self) -> FrameWeights {
        match self.kind.morph_geometry() {
            Some(g) if self.time_enabled => g.influences(self.time, self.duration),
            _ => Vec::new(),
        }
    }

    /// Vertex positions at the current time.
    #[must_use]
    pub fn current_positions(&self) -> Vec<Vec3> {
        match self.kind.morph_geometry() {
            Some(g) if self.time_enabled => g.positions_at(self.time, self.duration),
            Some(g) => g.positions.clone(),
            None => Vec::new(),
        }
    }

    /// Vertex colours at the current time, empty when vertex colours are
    /// off.
    #[must_use]
    pub fn current_colours(&self) -> Vec<Vec3> {
        match self.kind.morph_geometry() {
            Some(g) if self.vertex_colours && self.morph_colour => {
                g.colors_at(self.time, self.duration)
            }
            Some(g) if self.vertex_colours => g.colors.clone(),
            _ => Vec::new(),
        }
    }

    fn sync_glyphs(&mut self) {
        let (time, duration) = (self.time, self.duration);
        if let ObjectKind::Glyphset(g) = &mut self.kind {
            g.update(time, duration);
        }
    }

    /// Animation step: advance local time by `delta` when playing, then
    /// refresh the marker.
    pub fn render(&mut self, delta: f32, play_animation: bool, options: &RenderOptions) {
        if play_animation {
            let mut time = self.time + delta;
            if time > self.duration && self.duration > 0.0 {
                time = time.rem_euclid(self.duration);
            }
            self.time = time;
            if let ObjectKind::Glyphset(g) = &self.kind {
                if g.morphs() {
                    self.sync_glyphs();
                }
            }
        }
        self.update_marker(play_animation, options);
    }

    // ---- Material ----

    /// Whether the object is drawn.
    #[must_use]
    pub fn visibility(&self) -> bool {
        self.visible
    }

    /// Show or hide the object.
    pub fn set_visibility(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Opacity in `[0, 1]`.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Whether the material needs blending.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }

    /// Set opacity; below 1 the object is drawn transparent.
    pub fn set_alpha(&mut self, alpha: f32) {
        self.opacity = alpha.clamp(0.0, 1.0);
    }

    /// Uniform material colour.
    #[must_use]
    pub fn colour(&self) -> Vec3 {
        self.colour
    }

    /// Set the material colour.
    pub fn set_colour(&mut self, colour: Vec3) {
        self.colour = colour;
    }

    /// Material colour as a hex string, `None` when colours morph.
    #[must_use]
    pub fn colour_hex(&self) -> Option<String> {
        (!self.morph_colour).then(|| hex_string(self.colour))
    }

    /// Material colour as packed `0xRRGGBB`.
    #[must_use]
    pub fn colour_packed(&self) -> u32 {
        hex_from_rgb(self.colour)
    }

    /// Set the material colour from packed `0xRRGGBB`.
    pub fn set_colour_hex(&mut self, hex: u32) {
        self.colour = rgb_from_hex(hex);
    }

    /// Whether the backend may cull the object against the frustum.
    #[must_use]
    pub fn frustum_culled(&self) -> bool {
        self.frustum_culled
    }

    /// Allow or forbid frustum culling.
    pub fn set_frustum_culled(&mut self, flag: bool) {
        self.frustum_culled = flag;
    }

    /// Whether per-vertex colours are used instead of the material colour.
    #[must_use]
    pub fn vertex_colours(&self) -> bool {
        self.vertex_colours
    }

    /// Toggle per-vertex colours.
    pub fn set_vertex_colours(&mut self, flag: bool) {
        self.vertex_colours = flag;
    }

    // ---- Bounds & markers ----

    /// Local-space bounds at the current time; `None` when hidden or
    /// empty.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        if !self.visible {
            return None;
        }
        match &self.kind {
            ObjectKind::Glyphset(g) => g.bounding_box(),
            ObjectKind::Geometry(g) | ObjectKind::Pointset(g) | ObjectKind::Lines(g) => {
                if self.time_enabled {
                    g.bounding_box(self.time, self.duration)
                } else {
                    BoundingBox::from_points(g.positions.iter().copied())
                }
            }
        }
    }

    /// Marker, once one has been created.
    #[must_use]
    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    pub(crate) fn marker_mut(&mut self) -> Option<&mut Marker> {
        self.marker.as_mut()
    }

    /// Create, place or hide the marker for the current animation state.
    ///
    /// Markers exist only for named objects, only while paused with
    /// markers displayed, and sit at the centre of the object's bounds.
    pub fn update_marker(&mut self, play_animation: bool, options: &RenderOptions) {
        if play_animation || !options.display_markers {
            if let Some(marker) = &mut self.marker {
                marker.disable();
            }
            self.marker_update_required = true;
            return;
        }
        if self.group_name.is_none() {
            return;
        }
        if self.marker.is_none() {
            self.marker = Some(Marker::new(Vec3::ZERO));
            self.marker_update_required = true;
        }
        if self.marker_update_required {
            let centre = self.bounding_box().map(|b| b.center());
            if let Some(marker) = &mut self.marker {
                marker.enable();
                if let Some(centre) = centre {
                    marker.set_position(centre);
                }
            }
            self.marker_update_required = false;
        }
    }

    /// Fit the marker into the `[min, max]` depth window of all markers.
    pub fn process_marker_visual(&mut self, min: f32, max: f32) {
        if let Some(marker) = &mut self.marker {
            marker.apply_depth_window(min, max);
        }
    }

    /// Release the primitive data. The object draws nothing afterwards.
    pub fn dispose(&mut self) {
        match &mut self.kind {
            ObjectKind::Geometry(g) | ObjectKind::Pointset(g) | ObjectKind::Lines(g) => {
                *g = MorphGeometry::default();
            }
            ObjectKind::Glyphset(g) => g.dispose(),
        }
        self.marker = None;
        self.group_name = None;
    }
}
