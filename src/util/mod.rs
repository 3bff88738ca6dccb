//! Shared utilities: frame timing and colour packing.

pub mod colour;
pub mod frame_timing;
