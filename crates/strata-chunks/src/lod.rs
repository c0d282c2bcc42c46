//! Distance-based LOD selection and visibility predicates.

use glam::Vec2;
use strata_mesh::{TessellationError, validate_stride};

/// One detail level: the simplification level passed to the tessellator
/// and the viewer distance up to which it is displayed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodLevel {
    pub lod: u32,
    pub visible_distance: f32,
}

impl LodLevel {
    pub fn new(lod: u32, visible_distance: f32) -> Self {
        Self {
            lod,
            visible_distance,
        }
    }
}

/// Errors from chunk store construction.
#[derive(Debug, thiserror::Error)]
pub enum ChunkStoreError {
    /// A chunk must have at least one valid LOD configuration.
    #[error("LOD table must contain at least one level")]
    EmptyLodTable,
    /// A configured LOD's stride does not fit the chunk sample size.
    #[error(transparent)]
    InvalidLod(#[from] TessellationError),
    /// Visibility distances must be positive.
    #[error("LOD level {index} has a non-positive visibility distance")]
    NonPositiveDistance { index: usize },
    /// Visibility distances must be strictly increasing.
    #[error("LOD level {index} does not increase the visibility distance")]
    DistanceOrder { index: usize },
}

/// Ordered LOD thresholds; the last entry's distance is the maximum view
/// distance of the whole streamer.
#[derive(Clone, Debug)]
pub struct LodTable {
    levels: Vec<LodLevel>,
}

impl LodTable {
    /// Validate a threshold table against the chunk sample size.
    ///
    /// Fails fast on an empty table, a stride that does not divide the
    /// bordered grid, or distances that are not strictly increasing.
    pub fn new(levels: Vec<LodLevel>, bordered_size: usize) -> Result<Self, ChunkStoreError> {
        if levels.is_empty() {
            return Err(ChunkStoreError::EmptyLodTable);
        }
        for (index, level) in levels.iter().enumerate() {
            validate_stride(bordered_size, level.lod)?;
            if level.visible_distance <= 0.0 {
                return Err(ChunkStoreError::NonPositiveDistance { index });
            }
            if index > 0 && level.visible_distance <= levels[index - 1].visible_distance {
                return Err(ChunkStoreError::DistanceOrder { index });
            }
        }
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[LodLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Distance beyond which chunks are hidden entirely.
    pub fn max_view_distance(&self) -> f32 {
        self.levels[self.levels.len() - 1].visible_distance
    }

    /// Index of the level displayed at `distance`: the first threshold the
    /// distance is within, or the coarsest level beyond all thresholds.
    pub fn select(&self, distance: f32) -> usize {
        for (index, level) in self.levels.iter().enumerate() {
            if distance <= level.visible_distance {
                return index;
            }
        }
        self.levels.len() - 1
    }
}

/// A chunk is visible up to and including the maximum view distance.
pub fn is_visible(distance: f32, max_view_distance: f32) -> bool {
    distance <= max_view_distance
}

/// Euclidean distance from a point to a chunk's square bounds.
pub fn distance_to_bounds(point: Vec2, center: Vec2, half_extent: f32) -> f32 {
    let dx = ((point.x - center.x).abs() - half_extent).max(0.0);
    let dy = ((point.y - center.y).abs() - half_extent).max(0.0);
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Interior 12 accepts strides 1, 2, 4, and 6.
    const SIZE: usize = 14;

    fn table() -> LodTable {
        LodTable::new(
            vec![
                LodLevel::new(0, 100.0),
                LodLevel::new(1, 200.0),
                LodLevel::new(2, 400.0),
            ],
            SIZE,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(matches!(
            LodTable::new(Vec::new(), SIZE),
            Err(ChunkStoreError::EmptyLodTable)
        ));
    }

    #[test]
    fn test_incompatible_stride_rejected() {
        // Stride 4 does not divide interior 11.
        let result = LodTable::new(vec![LodLevel::new(2, 100.0)], 13);
        assert!(matches!(result, Err(ChunkStoreError::InvalidLod(_))));
    }

    #[test]
    fn test_non_increasing_distances_rejected() {
        let result = LodTable::new(
            vec![LodLevel::new(0, 100.0), LodLevel::new(1, 100.0)],
            SIZE,
        );
        assert!(matches!(
            result,
            Err(ChunkStoreError::DistanceOrder { index: 1 })
        ));
    }

    #[test]
    fn test_select_walks_ascending_thresholds() {
        let table = table();
        assert_eq!(table.select(0.0), 0);
        assert_eq!(table.select(100.0), 0, "threshold boundary is inclusive");
        assert_eq!(table.select(100.1), 1);
        assert_eq!(table.select(250.0), 2);
    }

    #[test]
    fn test_select_defaults_to_coarsest_beyond_all() {
        let table = table();
        assert_eq!(table.select(10_000.0), 2);
    }

    #[test]
    fn test_visibility_inclusive_at_max_view_distance() {
        let table = table();
        let max = table.max_view_distance();
        assert!(is_visible(max, max), "a chunk exactly at the edge stays visible");
        assert!(!is_visible(max + 0.001, max));
    }

    #[test]
    fn test_distance_to_bounds() {
        let center = Vec2::new(10.0, 10.0);
        // Inside the bounds.
        assert_eq!(distance_to_bounds(Vec2::new(9.0, 11.0), center, 5.0), 0.0);
        // Straight out along +x.
        assert_eq!(distance_to_bounds(Vec2::new(20.0, 10.0), center, 5.0), 5.0);
        // Diagonal from the corner.
        let d = distance_to_bounds(Vec2::new(18.0, 18.0), center, 5.0);
        assert!((d - (3.0f32 * 3.0 + 3.0 * 3.0).sqrt()).abs() < 1e-6);
    }
}
