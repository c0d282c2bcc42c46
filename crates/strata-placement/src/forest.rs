//! Forest spread: mirrored seeded scatter around a resource anchor.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::IVec2;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Which prefab family a tree belongs to, by height band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeVariant {
    Normal,
    Snow,
}

/// One tree candidate in heightfield sample coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeSite {
    pub coord: IVec2,
    /// Remaining spread depth when emitted; scales the planted tree.
    pub generation: u32,
}

/// Pick the prefab family for a site height; `None` when the height falls
/// outside the plantable band.
pub fn variant_for_height(
    height: f32,
    min_height: f32,
    snow_height: f32,
    max_height: f32,
) -> Option<TreeVariant> {
    if height <= min_height || height >= max_height {
        return None;
    }
    if height > snow_height {
        Some(TreeVariant::Snow)
    } else {
        Some(TreeVariant::Normal)
    }
}

/// Scatter tree sites outward from an anchor.
///
/// Each level derives one offset from the (seed, position) pair and emits
/// the mirrored coordinate pair around the current point, then continues
/// from both with a widened spread. An explicit worklist bounds the walk;
/// no recursion.
pub fn spread_forest(anchor: IVec2, generations: u32, start_spread: i32, seed: u64) -> Vec<TreeSite> {
    let mut sites = vec![TreeSite {
        coord: anchor,
        generation: generations,
    }];
    let mut worklist = vec![(anchor, generations, start_spread)];

    while let Some((start, generation, spread)) = worklist.pop() {
        if generation == 0 {
            continue;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(node_seed(seed, start));
        let offset = IVec2::new(
            rng.random_range(-spread..=spread),
            rng.random_range(-spread..=spread),
        );

        let forward = start + offset;
        sites.push(TreeSite {
            coord: forward,
            generation,
        });
        worklist.push((forward, generation - 1, spread + 1));

        let mirrored = start - offset;
        sites.push(TreeSite {
            coord: mirrored,
            generation,
        });
        worklist.push((mirrored, generation - 1, spread + 1));
    }

    sites
}

fn node_seed(seed: u64, position: IVec2) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    position.x.hash(&mut hasher);
    position.y.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spread_is_deterministic() {
        let a = spread_forest(IVec2::new(8, 8), 4, 2, 42);
        let b = spread_forest(IVec2::new(8, 8), 4, 2, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_spread_grows_with_generations() {
        let shallow = spread_forest(IVec2::new(8, 8), 1, 2, 42);
        let deep = spread_forest(IVec2::new(8, 8), 5, 2, 42);
        assert!(deep.len() > shallow.len());
        // Binary spread: 1 anchor + 2 per expanded node.
        assert_eq!(shallow.len(), 3);
    }

    #[test]
    fn test_zero_generations_keeps_only_anchor() {
        let sites = spread_forest(IVec2::new(3, 3), 0, 2, 7);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].coord, IVec2::new(3, 3));
    }

    #[test]
    fn test_different_seeds_scatter_differently() {
        let a = spread_forest(IVec2::new(8, 8), 4, 2, 1);
        let b = spread_forest(IVec2::new(8, 8), 4, 2, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_variant_band_selection() {
        assert_eq!(variant_for_height(0.5, 0.3, 0.8, 1.0), Some(TreeVariant::Normal));
        assert_eq!(variant_for_height(0.9, 0.3, 0.8, 1.0), Some(TreeVariant::Snow));
        assert_eq!(variant_for_height(0.2, 0.3, 0.8, 1.0), None);
        assert_eq!(variant_for_height(1.0, 0.3, 0.8, 1.0), None);
    }
}
