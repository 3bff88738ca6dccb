//! Load issuance and completion for [`SceneComposer`].

use web_time::Instant;

use super::SceneComposer;
use crate::assets::formats::{decode, decode_json_mesh, DecodedMesh};
use crate::assets::metadata::{
    parse_metadata, parse_view, FileFormat, MetadataItem, ModelSettings,
    PrimitiveItem,
};
use crate::assets::{resolve_url, FetchEvent, RequestId};
use crate::camera::CameraPathData;
use crate::scene::glyphset::{Glyphset, GlyphsetData};
use crate::scene::object::{ObjectId, ObjectKind, PrimitiveType, RenderableObject};

/// Something that happened to a load since the host last asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// A fetched asset produced a scene object.
    ObjectLoaded {
        /// Asset location.
        url: String,
        /// The new object.
        object: ObjectId,
    },
    /// A fetch or decode failed; the asset is absent from the scene.
    Failed {
        /// Asset location.
        url: String,
        /// Reason.
        message: String,
    },
    /// A view file was applied to the camera.
    ViewApplied {
        /// View file location.
        url: String,
    },
    /// A camera path was loaded into the controller.
    CameraPathLoaded {
        /// Path file location.
        url: String,
    },
    /// Every object item of a metadata document has settled.
    MetadataCompleted {
        /// Metadata file location.
        url: String,
    },
}

#[derive(Debug, Clone)]
pub(super) struct MetadataBatch {
    url: String,
    remaining: usize,
}

#[derive(Debug, Clone)]
pub(super) struct PrimitiveRequest {
    url: String,
    kind: PrimitiveType,
    format: FileFormat,
    group_name: Option<String>,
    settings: ModelSettings,
    batch: Option<u64>,
}

#[derive(Debug, Clone)]
pub(super) enum PendingLoad {
    Metadata { url: String },
    View { url: String },
    ViewBundle { url: String, prefix: String },
    Primitive(PrimitiveRequest),
    Glyphset {
        url: String,
        glyph_url: String,
        group_name: Option<String>,
        batch: Option<u64>,
    },
    GlyphGeometry { url: String, object: ObjectId },
    CameraPath { url: String },
}

impl PendingLoad {
    fn url(&self) -> &str {
        match self {
            Self::Metadata { url }
            | Self::View { url }
            | Self::ViewBundle { url, .. }
            | Self::Primitive(PrimitiveRequest { url, .. })
            | Self::Glyphset { url, .. }
            | Self::GlyphGeometry { url, .. }
            | Self::CameraPath { url } => url,
        }
    }

    /// Whether the load produces an object and so holds the render gate.
    fn is_counted(&self) -> bool {
        matches!(self, Self::Primitive(_) | Self::Glyphset { .. })
    }
}

impl SceneComposer {
    // ---- Issuance ----

    fn issue(&mut self, load: PendingLoad) -> RequestId {
        let id = self.next_request;
        self.next_request += 1;
        if load.is_counted() {
            self.tracker.expect(1, Instant::now());
        }
        log::debug!("loading {} (request {id})", load.url());
        let url = load.url().to_owned();
        let _ = self.pending.insert(id, load);
        self.source.fetch(id, &url);
        id
    }

    fn issue_primitive(
        &mut self,
        url: &str,
        kind: PrimitiveType,
        format: FileFormat,
        group_name: Option<&str>,
        settings: ModelSettings,
    ) -> RequestId {
        self.issue(PendingLoad::Primitive(PrimitiveRequest {
            url: url.to_owned(),
            kind,
            format,
            group_name: group_name.map(str::to_owned),
            settings,
            batch: None,
        }))
    }

    /// Load a metadata document and every item it lists. Item URLs are
    /// resolved against `url`.
    pub fn load_metadata_url(&mut self, url: &str) -> RequestId {
        self.issue(PendingLoad::Metadata { url: url.to_owned() })
    }

    /// Load a view file and apply it to the camera.
    pub fn load_view_url(&mut self, url: &str) -> RequestId {
        self.issue(PendingLoad::View { url: url.to_owned() })
    }

    /// Load `prefix_view.json`, apply it, then load the
    /// `prefix_1.json ..= prefix_N.json` models it announces.
    pub fn load_from_view_url(&mut self, prefix: &str) -> RequestId {
        self.issue(PendingLoad::ViewBundle {
            url: format!("{prefix}_view.json"),
            prefix: prefix.to_owned(),
        })
    }

    /// Load legacy JSON surfaces. `settings[i]` applies to `urls[i]`;
    /// missing entries use defaults.
    pub fn load_models_url(&mut self, urls: &[String], settings: &[ModelSettings]) -> Vec<RequestId> {
        urls.iter()
            .enumerate()
            .map(|(i, url)| {
                let settings = settings.get(i).copied().unwrap_or_default();
                self.issue_primitive(url, PrimitiveType::Geometry, FileFormat::Json, None, settings)
            })
            .collect()
    }

    /// Load an STL surface.
    pub fn load_stl(&mut self, url: &str, group_name: Option<&str>) -> RequestId {
        self.issue_primitive(
            url,
            PrimitiveType::Geometry,
            FileFormat::Stl,
            group_name,
            ModelSettings::default(),
        )
    }

    /// Load an OBJ file; each of its groups becomes a surface.
    pub fn load_obj(&mut self, url: &str, group_name: Option<&str>) -> RequestId {
        self.issue_primitive(
            url,
            PrimitiveType::Geometry,
            FileFormat::Obj,
            group_name,
            ModelSettings::default(),
        )
    }

    /// Load a legacy JSON point cloud.
    pub fn load_pointset_url(
        &mut self,
        url: &str,
        time_enabled: bool,
        morph_colour: bool,
        group_name: Option<&str>,
    ) -> RequestId {
        let settings = ModelSettings {
            time_enabled,
            morph_colour,
            vertex_colours: morph_colour,
            ..ModelSettings::default()
        };
        self.issue_primitive(url, PrimitiveType::Pointset, FileFormat::Json, group_name, settings)
    }

    /// Load legacy JSON line segments.
    pub fn load_lines_url(
        &mut self,
        url: &str,
        time_enabled: bool,
        morph_colour: bool,
        group_name: Option<&str>,
    ) -> RequestId {
        let settings = ModelSettings {
            time_enabled,
            morph_colour,
            vertex_colours: morph_colour,
            ..ModelSettings::default()
        };
        self.issue_primitive(url, PrimitiveType::Lines, FileFormat::Json, group_name, settings)
    }

    /// Load a glyphset description and, once it arrives, its glyph shape.
    pub fn load_glyphset_url(
        &mut self,
        url: &str,
        glyph_url: &str,
        group_name: Option<&str>,
    ) -> RequestId {
        self.issue(PendingLoad::Glyphset {
            url: url.to_owned(),
            glyph_url: glyph_url.to_owned(),
            group_name: group_name.map(str::to_owned),
            batch: None,
        })
    }

    /// Load a camera path into the controller.
    pub fn load_camera_path_url(&mut self, url: &str) -> RequestId {
        self.issue(PendingLoad::CameraPath { url: url.to_owned() })
    }

    fn issue_metadata_item(&mut self, reference: &str, item: MetadataItem, batch: Option<u64>) {
        match item {
            MetadataItem::Surfaces(p) => self.issue_item(reference, PrimitiveType::Geometry, p, batch),
            MetadataItem::Points(p) => self.issue_item(reference, PrimitiveType::Pointset, p, batch),
            MetadataItem::Lines(p) => self.issue_item(reference, PrimitiveType::Lines, p, batch),
            MetadataItem::Glyph {
                url,
                glyph_geometries_url,
                group_name,
            } => {
                let _ = self.issue(PendingLoad::Glyphset {
                    url: resolve_url(reference, &url),
                    glyph_url: resolve_url(reference, &glyph_geometries_url),
                    group_name,
                    batch,
                });
            }
            MetadataItem::View { url } => {
                let _ = self.load_view_url(&resolve_url(reference, &url));
            }
        }
    }

    fn issue_item(&mut self, reference: &str, kind: PrimitiveType, item: PrimitiveItem, batch: Option<u64>) {
        let _ = self.issue(PendingLoad::Primitive(PrimitiveRequest {
            url: resolve_url(reference, &item.url),
            kind,
            format: item.file_format,
            group_name: item.group_name,
            settings: ModelSettings {
                time_enabled: item.morph_vertices,
                morph_colour: item.morph_colours,
                vertex_colours: item.morph_colours,
                ..ModelSettings::default()
            },
            batch,
        }));
    }

    // ---- Completion ----

    /// Apply every fetch event the source has produced. Called at the
    /// start of each frame.
    pub fn poll_loads(&mut self) {
        for event in self.source.poll() {
            let now = Instant::now();
            match event {
                FetchEvent::Progress { id, loaded, total } => {
                    if self.pending.contains_key(&id) {
                        self.tracker.progress(id, loaded, total, now);
                    }
                }
                FetchEvent::Completed { id, bytes } => {
                    let Some(load) = self.pending.remove(&id) else {
                        continue;
                    };
                    let size = bytes.len() as u64;
                    self.tracker.progress(id, size, size, now);
                    self.complete(load, &bytes);
                }
                FetchEvent::Failed { id, message } => {
                    if let Some(load) = self.pending.remove(&id) {
                        self.fail(load, message);
                    }
                }
            }
        }
    }

    fn settle(&mut self, batch: Option<u64>) {
        let Some(key) = batch else {
            return;
        };
        let done = match self.batches.get_mut(&key) {
            Some(b) => {
                b.remaining = b.remaining.saturating_sub(1);
                b.remaining == 0
            }
            None => false,
        };
        if done {
            if let Some(b) = self.batches.remove(&key) {
                log::info!("all items of {} settled", b.url);
                self.events.push(LoadEvent::MetadataCompleted { url: b.url });
            }
        }
    }

    fn fail(&mut self, load: PendingLoad, message: String) {
        log::error!("failed to load {}: {message}", load.url());
        let now = Instant::now();
        if load.is_counted() {
            self.tracker.fail(now);
        } else {
            self.tracker.mark_error();
        }
        let batch = match &load {
            PendingLoad::Primitive(req) => req.batch,
            PendingLoad::Glyphset { batch, .. } => *batch,
            _ => None,
        };
        if let PendingLoad::GlyphGeometry { object, .. } = &load {
            // a glyphset without its glyph would hold the gate forever
            let _ = self.remove_object(*object);
        }
        self.events.push(LoadEvent::Failed {
            url: load.url().to_owned(),
            message,
        });
        self.settle(batch);
    }

    fn complete(&mut self, load: PendingLoad, bytes: &[u8]) {
        match load {
            PendingLoad::Metadata { url } => {
                let items = parse_metadata(bytes);
                let objects = items.iter().filter(|i| i.produces_object()).count();
                let batch = (objects > 0).then(|| {
                    let key = self.next_batch;
                    self.next_batch += 1;
                    let _ = self.batches.insert(key, MetadataBatch {
                        url: url.clone(),
                        remaining: objects,
                    });
                    key
                });
                for item in items {
                    self.issue_metadata_item(&url, item, batch);
                }
            }
            PendingLoad::View { url } => {
                if let Some(view) = parse_view(bytes) {
                    let _ = self.load_view(&view.viewport);
                    self.events.push(LoadEvent::ViewApplied { url });
                } else {
                    self.tracker.mark_error();
                }
            }
            PendingLoad::ViewBundle { url, prefix } => {
                let Some(view) = parse_view(bytes) else {
                    self.tracker.mark_error();
                    return;
                };
                let _ = self.load_view(&view.viewport);
                self.events.push(LoadEvent::ViewApplied { url });
                let urls = view.resource_urls(&prefix);
                let settings: Vec<ModelSettings> =
                    (0..urls.len()).map(|i| view.model_settings(i)).collect();
                let _ = self.load_models_url(&urls, &settings);
            }
            PendingLoad::Primitive(req) => self.complete_primitive(req, bytes),
            PendingLoad::Glyphset {
                url,
                glyph_url,
                group_name,
                batch,
            } => self.complete_glyphset(url, glyph_url, group_name, batch, bytes),
            PendingLoad::GlyphGeometry { url, object } => match decode_json_mesh(&url, bytes) {
                Ok(mesh) => {
                    if let Some(ObjectKind::Glyphset(g)) =
                        self.tree.object_mut(object).map(RenderableObject::kind_mut)
                    {
                        g.set_glyph_geometry(mesh.geometry);
                    }
                }
                Err(e) => self.fail(PendingLoad::GlyphGeometry { url, object }, e.to_string()),
            },
            PendingLoad::CameraPath { url } => match serde_json::from_slice::<CameraPathData>(bytes) {
                Ok(data) => {
                    self.controller.load_path(&data);
                    self.events.push(LoadEvent::CameraPathLoaded { url });
                }
                Err(e) => self.fail(PendingLoad::CameraPath { url }, e.to_string()),
            },
        }
    }

    fn primitive_object(&self, req: &PrimitiveRequest, mesh: DecodedMesh) -> RenderableObject {
        let material = mesh.material;
        let mut object = match req.kind {
            PrimitiveType::Pointset => RenderableObject::pointset(mesh.geometry),
            PrimitiveType::Lines => RenderableObject::lines(mesh.geometry),
            _ => RenderableObject::geometry(mesh.geometry),
        };
        if let Some(name) = req.group_name.clone().or(mesh.name) {
            object.set_name(name);
        }
        object.set_duration(self.duration);
        object.set_time_enabled(req.settings.time_enabled);
        object.set_morph_colour(req.settings.morph_colour);
        object.set_vertex_colours(req.settings.vertex_colours || material.vertex_colours);
        if let Some(colour) = material.colour {
            object.set_colour(colour);
        }
        object.set_alpha(material.opacity.unwrap_or(req.settings.opacity));
        object
    }

    fn complete_primitive(&mut self, req: PrimitiveRequest, bytes: &[u8]) {
        let meshes = match decode(req.format, &req.url, bytes) {
            Ok(meshes) => meshes,
            Err(e) => {
                self.fail(PendingLoad::Primitive(req), e.to_string());
                return;
            }
        };
        let now = Instant::now();
        if meshes.len() > 1 {
            self.tracker.expect(meshes.len() - 1, now);
        }
        let root = self.tree.root();
        for mesh in meshes {
            let mut object = self.primitive_object(&req, mesh);
            if req.kind == PrimitiveType::Geometry {
                object.set_model_id(self.next_available_model_id());
            }
            if let Some(id) = self.tree.add_object(root, object) {
                self.events.push(LoadEvent::ObjectLoaded {
                    url: req.url.clone(),
                    object: id,
                });
            }
            self.tracker.complete(now);
        }
        log::debug!("loaded {}", req.url);
        self.settle(req.batch);
    }

    fn complete_glyphset(
        &mut self,
        url: String,
        glyph_url: String,
        group_name: Option<String>,
        batch: Option<u64>,
        bytes: &[u8],
    ) {
        let data: GlyphsetData = match serde_json::from_slice(bytes) {
            Ok(data) => data,
            Err(e) => {
                let load = PendingLoad::Glyphset {
                    url,
                    glyph_url,
                    group_name,
                    batch,
                };
                self.fail(load, e.to_string());
                return;
            }
        };
        let mut object = RenderableObject::glyphset(Glyphset::new(data));
        if let Some(name) = group_name {
            object.set_name(name);
        }
        object.set_duration(self.duration);
        let root = self.tree.root();
        if let Some(id) = self.tree.add_object(root, object) {
            let _ = self.issue(PendingLoad::GlyphGeometry {
                url: glyph_url,
                object: id,
            });
            self.events.push(LoadEvent::ObjectLoaded { url, object: id });
        }
        self.tracker.complete(Instant::now());
        self.settle(batch);
    }
}
