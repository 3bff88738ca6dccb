//! glTF 2.0 export.
//!
//! Export happens in two steps. [`ExportSnapshot::capture`] copies the
//! current object state on the frame thread (morphs evaluated at each
//! object's current time). Encoding then runs on a worker thread and the
//! result comes back through an [`ExportHandle`].

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::mpsc;
use std::thread::JoinHandle;

use base64::Engine as _;
use glam::{Mat4, Vec3};
use gltf::binary::{self as glb, Glb};
use gltf::json;
use json::accessor::{ComponentType, GenericComponentType, Type};
use json::buffer::Target;
use json::material::{AlphaMode, PbrBaseColorFactor, PbrMetallicRoughness, StrengthFactor};
use json::mesh::{Mode, Semantic};
use json::validation::Checked::Valid;
use json::validation::USize64;
use json::Index;

use super::object::{ObjectKind, PrimitiveType, RenderableObject};
use super::region::RegionTree;
use crate::error::MorphviewError;

#[derive(Debug, Clone)]
struct MeshSnapshot {
    name: Option<String>,
    positions: Vec<Vec3>,
    colours: Vec<Vec3>,
    indices: Vec<u32>,
    mode: Mode,
    base_colour: [f32; 4],
}

#[derive(Debug, Clone)]
struct NodeSnapshot {
    name: Option<String>,
    mesh: usize,
    matrix: Mat4,
}

/// Copy of the exportable scene state.
#[derive(Debug, Clone, Default)]
pub struct ExportSnapshot {
    meshes: Vec<MeshSnapshot>,
    nodes: Vec<NodeSnapshot>,
}

impl ExportSnapshot {
    /// Capture every visible object in shown regions of `tree`.
    #[must_use]
    pub fn capture(tree: &RegionTree) -> Self {
        let mut snapshot = Self::default();
        let root = tree.root();
        for id in tree.all_objects(root, true) {
            let (Some(object), Some(region)) = (tree.object(id), tree.region_of(id)) else {
                continue;
            };
            if !object.visibility() || !tree.is_shown(region) {
                continue;
            }
            snapshot.add_object(object, tree.world_transform(region));
        }
        snapshot
    }

    /// Number of nodes that will be written.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn add_object(&mut self, object: &RenderableObject, world: Mat4) {
        let mut base_colour = object.colour().extend(object.opacity()).to_array();
        if object.vertex_colours() {
            base_colour = [1.0, 1.0, 1.0, object.opacity()];
        }
        let name = object.group_name().map(str::to_owned);
        match object.kind() {
            ObjectKind::Glyphset(glyphset) => {
                let Some(glyph) = glyphset.glyph() else {
                    return;
                };
                let mesh = self.push_mesh(MeshSnapshot {
                    name: name.clone(),
                    positions: glyph.positions.clone(),
                    colours: Vec::new(),
                    indices: glyph.indices.clone(),
                    mode: Mode::Triangles,
                    base_colour,
                });
                for instance in glyphset.instances() {
                    self.nodes.push(NodeSnapshot {
                        name: instance.label.clone().or_else(|| name.clone()),
                        mesh,
                        matrix: world * instance.transform,
                    });
                }
            }
            ObjectKind::Geometry(g) | ObjectKind::Pointset(g) | ObjectKind::Lines(g) => {
                let mode = match object.primitive_type() {
                    PrimitiveType::Pointset => Mode::Points,
                    PrimitiveType::Lines => Mode::Lines,
                    _ => Mode::Triangles,
                };
                let colours = if object.vertex_colours() {
                    object.current_colours()
                } else {
                    Vec::new()
                };
                let mesh = self.push_mesh(MeshSnapshot {
                    name: name.clone(),
                    positions: object.current_positions(),
                    colours,
                    indices: g.indices.clone(),
                    mode,
                    base_colour,
                });
                self.nodes.push(NodeSnapshot {
                    name,
                    mesh,
                    matrix: world,
                });
            }
        }
    }

    fn push_mesh(&mut self, mesh: MeshSnapshot) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    /// Encode as GLB (`binary`) or as glTF JSON with an embedded buffer.
    pub fn encode(&self, binary: bool) -> Result<Vec<u8>, MorphviewError> {
        let mut writer = GltfWriter::default();
        let meshes: Vec<Index<json::Mesh>> =
            self.meshes.iter().map(|m| writer.mesh(m)).collect();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            nodes.push(writer.root.push(json::Node {
                mesh: meshes.get(node.mesh).copied(),
                matrix: Some(node.matrix.to_cols_array()),
                name: node.name.clone(),
                ..Default::default()
            }));
        }
        let scene = writer.root.push(json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            nodes,
        });
        writer.root.scene = Some(scene);
        writer.root.asset.generator = Some("morphview".to_owned());

        while writer.bin.len() % 4 != 0 {
            writer.bin.push(0);
        }
        if !writer.bin.is_empty() {
            let uri = (!binary).then(|| {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&writer.bin);
                format!("data:application/octet-stream;base64,{encoded}")
            });
            let _ = writer.root.push(json::Buffer {
                byte_length: USize64::from(writer.bin.len()),
                extensions: Default::default(),
                extras: Default::default(),
                name: None,
                uri,
            });
        }

        if !binary {
            return Ok(serde_json::to_vec_pretty(&writer.root)?);
        }
        let document = serde_json::to_vec(&writer.root)?;
        let mut length = 12 + 8 + document.len().next_multiple_of(4);
        if !writer.bin.is_empty() {
            length += 8 + writer.bin.len();
        }
        let container = Glb {
            header: glb::Header {
                magic: *b"glTF",
                version: 2,
                length: u32::try_from(length)
                    .map_err(|_| MorphviewError::Export("scene exceeds 4 GiB".into()))?,
            },
            json: Cow::Owned(document),
            bin: (!writer.bin.is_empty()).then_some(Cow::Borrowed(writer.bin.as_slice())),
        };
        container
            .to_vec()
            .map_err(|e| MorphviewError::Export(e.to_string()))
    }
}

/// Accumulates the typed document and its single binary buffer.
#[derive(Default)]
struct GltfWriter {
    root: json::Root,
    bin: Vec<u8>,
}

impl GltfWriter {
    fn view(&mut self, bytes: &[u8], target: Target) -> Index<json::buffer::View> {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        // the buffer itself is pushed last, and is the only one
        self.root.push(json::buffer::View {
            buffer: Index::new(0),
            byte_length: USize64::from(bytes.len()),
            byte_offset: Some(USize64::from(offset)),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: Some(Valid(target)),
        })
    }

    fn accessor(
        &mut self,
        view: Index<json::buffer::View>,
        count: usize,
        component: ComponentType,
        type_: Type,
        bounds: Option<(Vec3, Vec3)>,
    ) -> Index<json::Accessor> {
        let to_value = |v: Vec3| json::Value::from(v.to_array().to_vec());
        self.root.push(json::Accessor {
            buffer_view: Some(view),
            byte_offset: None,
            count: USize64::from(count),
            component_type: Valid(GenericComponentType(component)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(type_),
            min: bounds.map(|(min, _)| to_value(min)),
            max: bounds.map(|(_, max)| to_value(max)),
            name: None,
            normalized: false,
            sparse: None,
        })
    }

    fn vec3_accessor(&mut self, values: &[Vec3], bounds: bool) -> Index<json::Accessor> {
        let flat: Vec<f32> = values.iter().flat_map(|v| v.to_array()).collect();
        let view = self.view(bytemuck::cast_slice(&flat), Target::ArrayBuffer);
        let bounds = bounds.then(|| {
            let min = values.iter().copied().fold(Vec3::splat(f32::INFINITY), Vec3::min);
            let max = values.iter().copied().fold(Vec3::splat(f32::NEG_INFINITY), Vec3::max);
            (min, max)
        });
        self.accessor(view, values.len(), ComponentType::F32, Type::Vec3, bounds)
    }

    fn index_accessor(&mut self, indices: &[u32]) -> Index<json::Accessor> {
        let view = self.view(bytemuck::cast_slice(indices), Target::ElementArrayBuffer);
        self.accessor(view, indices.len(), ComponentType::U32, Type::Scalar, None)
    }

    fn mesh(&mut self, mesh: &MeshSnapshot) -> Index<json::Mesh> {
        let alpha_mode = if mesh.base_colour[3] < 1.0 {
            AlphaMode::Blend
        } else {
            AlphaMode::Opaque
        };
        let material = self.root.push(json::Material {
            alpha_mode: Valid(alpha_mode),
            double_sided: true,
            pbr_metallic_roughness: PbrMetallicRoughness {
                base_color_factor: PbrBaseColorFactor(mesh.base_colour),
                metallic_factor: StrengthFactor(0.0),
                roughness_factor: StrengthFactor(1.0),
                ..Default::default()
            },
            ..Default::default()
        });

        let mut attributes = BTreeMap::new();
        if !mesh.positions.is_empty() {
            let _ = attributes.insert(
                Valid(Semantic::Positions),
                self.vec3_accessor(&mesh.positions, true),
            );
        }
        if !mesh.colours.is_empty() && mesh.colours.len() == mesh.positions.len() {
            let _ = attributes.insert(
                Valid(Semantic::Colors(0)),
                self.vec3_accessor(&mesh.colours, false),
            );
        }
        let indices = (!mesh.indices.is_empty()).then(|| self.index_accessor(&mesh.indices));
        let primitive = json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices,
            material: Some(material),
            mode: Valid(mesh.mode),
            targets: None,
        };
        self.root.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: mesh.name.clone(),
            primitives: vec![primitive],
            weights: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Background encoding
// ---------------------------------------------------------------------------

/// Pending export result.
pub struct ExportHandle {
    rx: mpsc::Receiver<Result<Vec<u8>, MorphviewError>>,
    worker: JoinHandle<()>,
}

impl ExportHandle {
    /// Encode `snapshot` on a worker thread.
    pub fn spawn(snapshot: ExportSnapshot, binary: bool) -> Result<Self, MorphviewError> {
        let (tx, rx) = mpsc::channel();
        let worker = std::thread::Builder::new()
            .name("gltf-export".into())
            .spawn(move || {
                let result = snapshot.encode(binary);
                if let Err(e) = &result {
                    log::error!("glTF export failed: {e}");
                }
                let _ = tx.send(result);
            })
            .map_err(MorphviewError::ThreadSpawn)?;
        Ok(Self { rx, worker })
    }

    /// The result if encoding has finished.
    #[must_use]
    pub fn try_recv(&self) -> Option<Result<Vec<u8>, MorphviewError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                Some(Err(MorphviewError::Export("export worker exited".into())))
            }
        }
    }

    /// Whether the worker thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Block until encoding finishes and the worker is joined.
    pub fn wait(self) -> Result<Vec<u8>, MorphviewError> {
        let result = self.rx.recv();
        if self.worker.join().is_err() {
            return Err(MorphviewError::Export("export worker panicked".into()));
        }
        result.map_err(|_| MorphviewError::Export("export worker exited".into()))?
    }
}
