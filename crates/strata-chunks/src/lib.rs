//! Chunk lifecycle and streaming: visibility-driven generation scheduling,
//! per-LOD mesh state, worker completion delivery, and downstream placement.

mod lod;
mod queue;
mod sinks;
mod store;

pub use lod::{ChunkStoreError, LodLevel, LodTable, distance_to_bounds, is_visible};
pub use queue::{Completion, CompletionQueue};
pub use sinks::{DisplaySink, PlacementKind, PlacementSink};
pub use store::{
    ChunkStore, CityParams, ForestParams, GenerationParams, PlacementParams, ResourceParams,
    StoreStats, StreamingParams,
};
