// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]

//! Scene graph, camera controls and time-synchronized rendering for
//! morphing anatomical models.
//!
//! Morphview keeps a hierarchy of regions holding time-varying surfaces,
//! point clouds, line sets and glyphsets, an interactive orbit camera with
//! smooth transitions, and a render loop that only starts animating a scene
//! once every asset it is waiting for has arrived.
//!
//! # Key entry points
//!
//! - [`engine::RenderLoop`] - owns the scenes and composes each frame
//! - [`scene::SceneComposer`] - one scene: regions, camera, asset loading
//! - [`scene::RegionTree`] - the region hierarchy and its objects
//! - [`camera::CameraController`] - orbit/pan/zoom, transitions, paths
//! - [`options::Options`] - runtime configuration
//!
//! # Architecture
//!
//! Everything in a frame runs on the caller's thread. Asset fetches run on
//! worker threads behind an [`assets::AssetSource`] and are applied at the
//! start of the next frame; glTF export encodes on a worker thread. Drawing
//! goes through the [`engine::backend::RenderBackend`] trait, so the crate
//! itself holds no GPU state.

pub mod assets;
pub mod camera;
pub mod engine;
pub mod error;
pub mod input;
pub mod options;
pub mod scene;
pub mod util;

pub use error::MorphviewError;
