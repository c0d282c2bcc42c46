//! Shared terrain data types: chunk grid coordinates, bordered heightfields,
//! and edge-attenuation masks consumed by the generation and meshing crates.

mod coord;
mod falloff;
mod heightfield;

pub use coord::{ChunkCoord, derive_chunk_seed};
pub use falloff::FalloffMask;
pub use heightfield::Heightfield;
