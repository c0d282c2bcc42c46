//! Integer grid coordinates for terrain chunks and per-chunk seed derivation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::Vec2;

/// Grid coordinate identifying one terrain chunk.
///
/// Chunks tile the plane; the chunk at `(0, 0)` is centered on the world
/// origin and neighbors are one interior-size apart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    /// Create a coordinate from its grid components.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The chunk coordinate containing a 2D viewer position, given the
    /// world-space size of one chunk.
    pub fn from_world(position: Vec2, chunk_world_size: f32) -> Self {
        Self {
            x: (position.x / chunk_world_size).round() as i32,
            y: (position.y / chunk_world_size).round() as i32,
        }
    }

    /// World-space center of this chunk (also its noise-window offset).
    pub fn world_offset(&self, chunk_world_size: f32) -> Vec2 {
        Vec2::new(
            self.x as f32 * chunk_world_size,
            self.y as f32 * chunk_world_size,
        )
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Derive a u64 seed for a chunk from the world seed and its coordinate.
///
/// Uses SipHash (via std's `DefaultHasher`) to combine the world seed with
/// the coordinate into a well-distributed u64, so per-chunk random streams
/// are reproducible per location but decorrelated across chunks.
pub fn derive_chunk_seed(world_seed: u64, coord: ChunkCoord) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    coord.x.hash(&mut hasher);
    coord.y.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_world_rounds_to_nearest_chunk() {
        assert_eq!(ChunkCoord::from_world(Vec2::new(0.0, 0.0), 100.0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world(Vec2::new(60.0, -60.0), 100.0), ChunkCoord::new(1, -1));
        assert_eq!(ChunkCoord::from_world(Vec2::new(49.0, 49.0), 100.0), ChunkCoord::new(0, 0));
    }

    #[test]
    fn test_world_offset_scales_with_chunk_size() {
        let coord = ChunkCoord::new(2, -3);
        let offset = coord.world_offset(240.0);
        assert_eq!(offset, Vec2::new(480.0, -720.0));
    }

    #[test]
    fn test_derive_chunk_seed_deterministic() {
        let coord = ChunkCoord::new(7, -13);
        assert_eq!(derive_chunk_seed(42, coord), derive_chunk_seed(42, coord));
    }

    #[test]
    fn test_derive_chunk_seed_varies_by_coord_and_world_seed() {
        let a = ChunkCoord::new(0, 0);
        let b = ChunkCoord::new(0, 1);
        assert_ne!(derive_chunk_seed(42, a), derive_chunk_seed(42, b));
        assert_ne!(derive_chunk_seed(42, a), derive_chunk_seed(43, a));
    }
}
