//! Recording sinks: log what the pipeline would hand to a renderer and
//! keep counts for the end-of-run summary.

use glam::Vec3;
use strata_chunks::{DisplaySink, PlacementKind, PlacementSink};
use strata_field::ChunkCoord;
use strata_mesh::{BandWeights, MeshData};
use tracing::{debug, info};

/// Counts surfaces and visibility toggles instead of uploading them.
#[derive(Debug, Default)]
pub struct LoggingDisplay {
    pub surfaces: u64,
    pub vertices: u64,
    pub shown: u64,
    pub hidden: u64,
}

impl DisplaySink for LoggingDisplay {
    fn display_surface(
        &mut self,
        coord: ChunkCoord,
        lod_index: usize,
        mesh: &MeshData,
        weights: &BandWeights,
    ) {
        self.surfaces += 1;
        self.vertices += mesh.vertex_count() as u64;
        info!(
            %coord,
            lod_index,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            weight_samples = weights.indices().len(),
            "surface ready"
        );
    }

    fn set_visible(&mut self, coord: ChunkCoord, visible: bool) {
        if visible {
            self.shown += 1;
        } else {
            self.hidden += 1;
        }
        debug!(%coord, visible, "visibility toggled");
    }
}

/// Counts placement decisions per kind.
#[derive(Debug, Default)]
pub struct LoggingPlacement {
    pub resources: u64,
    pub trees: u64,
    pub roads: u64,
    pub buildings: u64,
}

impl PlacementSink for LoggingPlacement {
    fn place_visual_object(
        &mut self,
        kind: PlacementKind,
        position: Vec3,
        yaw_degrees: f32,
        scale: f32,
    ) {
        match kind {
            PlacementKind::Resource(_) => self.resources += 1,
            PlacementKind::Tree(_) => self.trees += 1,
            PlacementKind::Road => self.roads += 1,
            PlacementKind::Building(_) => self.buildings += 1,
        }
        debug!(?kind, ?position, yaw_degrees, scale, "object placed");
    }
}
