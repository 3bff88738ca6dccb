//! Scene graph: regions, renderable objects and the per-scene composer.
//!
//! A [`SceneComposer`] owns one [`RegionTree`] and the camera that looks at
//! it. Objects arrive either directly or through the composer's asset
//! loaders, which hold animation back until every expected input has
//! landed.

pub mod bounds;
pub mod composer;
pub mod export;
pub mod glyphset;
pub mod loading;
pub mod marker;
pub mod mesh;
pub mod object;
pub mod region;

pub use bounds::BoundingBox;
pub use composer::{LoadEvent, SceneComposer};
pub use export::{ExportHandle, ExportSnapshot};
pub use glyphset::{Glyphset, GlyphsetData, GlyphsetMetadata, RepeatMode};
pub use loading::{DownloadProgress, LoadStatus, LoadTracker};
pub use marker::Marker;
pub use mesh::MorphGeometry;
pub use object::{
    ObjectId, ObjectKind, PrimitiveType, RenderOptions, RenderableObject,
};
pub use region::{PickTarget, Region, RegionId, RegionTree};
