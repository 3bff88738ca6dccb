//! Asset acquisition: transports, scene description files and mesh
//! decoders.
//!
//! Nothing here touches the scene. The composer issues fetches through an
//! [`AssetSource`], polls their events once per frame and hands completed
//! payloads to the parsers in [`metadata`] and [`formats`].

/// Mesh decoders (legacy JSON, STL, OBJ).
pub mod formats;
/// Metadata item lists and view files.
pub mod metadata;
/// Fetch transports.
pub mod source;

pub use formats::{DecodedMesh, MaterialHint};
pub use metadata::{FileFormat, MetadataItem, ModelSettings, ViewData};
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{
    resolve_url, AssetSource, FetchEvent, FileSource, ManualHandle,
    ManualSource, RequestId,
};
