//! Boundary contracts toward the presentation side.
//!
//! The core computes *what* and *where*; these sinks are how a renderer or
//! scene graph consumes it. The core never reads back from a sink.

use glam::Vec3;
use strata_field::ChunkCoord;
use strata_mesh::{BandWeights, MeshData};
use strata_placement::{ResourceKind, TreeVariant};

/// What kind of visual object a placement decision refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementKind {
    Resource(ResourceKind),
    Tree(TreeVariant),
    Road,
    /// Building tier from the plot layout, 1..=4.
    Building(u8),
}

/// Accepts finished surfaces and visibility toggles for presentation.
pub trait DisplaySink {
    /// A chunk's mesh for one LOD is ready to show, along with the
    /// height-band texture weights derived from its heightfield.
    fn display_surface(
        &mut self,
        coord: ChunkCoord,
        lod_index: usize,
        mesh: &MeshData,
        weights: &BandWeights,
    );

    /// Toggle display visibility of a chunk's current surface.
    fn set_visible(&mut self, coord: ChunkCoord, visible: bool);
}

/// Accepts one call per resource/tree/road/building decision.
pub trait PlacementSink {
    fn place_visual_object(
        &mut self,
        kind: PlacementKind,
        position: Vec3,
        yaw_degrees: f32,
        scale: f32,
    );
}
