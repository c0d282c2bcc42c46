//! Resource deposit scoring over rectangular heightfield segments.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use strata_field::Heightfield;

/// Draw threshold above which a lowland segment yields a mid-value deposit.
const MID_VALUE_CUTOFF: u32 = 75;
/// Draw threshold above which a lowland segment yields a low-value deposit.
const LOW_VALUE_CUTOFF: u32 = 45;

/// What kind of deposit a segment holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    #[default]
    None,
    LowValue,
    MidValue,
    HighValue,
}

impl ResourceKind {
    /// Scoring ordinal folded into the composite weight.
    pub fn ordinal(self) -> f32 {
        match self {
            ResourceKind::None => 0.0,
            ResourceKind::LowValue => 30.0,
            ResourceKind::MidValue => 50.0,
            ResourceKind::HighValue => 90.0,
        }
    }
}

/// Rectangular region of a chunk's heightfield, in sample coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentBounds {
    pub x: usize,
    pub y: usize,
    pub size: usize,
}

impl SegmentBounds {
    pub fn new(x: usize, y: usize, size: usize) -> Self {
        Self { x, y, size }
    }

    pub fn center(&self) -> (usize, usize) {
        (self.x + self.size / 2, self.y + self.size / 2)
    }
}

/// A scored segment: suitability weights, assigned kind, and the sampled
/// vertex chosen as the placement anchor.
#[derive(Clone, Debug)]
pub struct ResourceSegment {
    pub bounds: SegmentBounds,
    pub kind: ResourceKind,
    /// Height sample at the segment center.
    pub center_height: f32,
    pub height_weight: f32,
    pub variance_weight: f32,
    /// Composite of height proximity, flatness, and kind ordinal.
    pub weight: f32,
    /// Sample coordinates of the anchor vertex inside the segment.
    pub anchor: (usize, usize),
}

impl ResourceSegment {
    /// Whether this segment qualifies for placement at all.
    pub fn is_eligible(&self) -> bool {
        self.kind != ResourceKind::None && self.weight > 0.0
    }
}

/// Seed for one segment's random stream, derived from the chunk seed and
/// the segment's position so results are reproducible per location but
/// decorrelated across segments.
pub fn segment_seed(chunk_seed: u64, bounds: SegmentBounds) -> u64 {
    let mut hasher = DefaultHasher::new();
    chunk_seed.hash(&mut hasher);
    bounds.x.hash(&mut hasher);
    bounds.y.hash(&mut hasher);
    hasher.finish()
}

/// Score one segment.
///
/// Height weight rewards proximity of the segment's center sample to the
/// target band; variance weight rewards flatness over the segment's
/// interior. Kind assignment draws from the segment-seeded stream: above
/// the mountain threshold a 1-in-5 draw yields a high-value deposit, below
/// it a draw over [0, 100) picks mid/low/none against fixed cutoffs.
pub fn score_segment(
    field: &Heightfield,
    bounds: SegmentBounds,
    target_height: f32,
    mountain_threshold: f32,
    seed: u64,
) -> ResourceSegment {
    let (cx, cy) = bounds.center();
    let center = field.get(cx, cy);

    let height_weight = (100.0 * (1.0 - (center - target_height).abs())).clamp(0.0, 100.0);

    let (min, max) = field.min_max_in(bounds.x, bounds.y, bounds.size, bounds.size);
    let variance_weight = (100.0 * (1.0 - (max - min).clamp(0.0, 1.0))).clamp(0.0, 100.0);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let kind = if center > mountain_threshold {
        if rng.random_range(0..5u32) == 0 {
            ResourceKind::HighValue
        } else {
            ResourceKind::None
        }
    } else {
        let draw = rng.random_range(0..100u32);
        if draw > MID_VALUE_CUTOFF {
            ResourceKind::MidValue
        } else if draw > LOW_VALUE_CUTOFF {
            ResourceKind::LowValue
        } else {
            ResourceKind::None
        }
    };

    let weight = (height_weight + variance_weight + kind.ordinal()) / 3.0;
    let anchor = pick_site(field, bounds, target_height, &mut rng);

    ResourceSegment {
        bounds,
        kind,
        center_height: center,
        height_weight,
        variance_weight,
        weight,
        anchor,
    }
}

/// Split a heightfield's interior into `divisions x divisions` segments and
/// score each one.
pub fn score_chunk(
    field: &Heightfield,
    divisions: usize,
    chunk_seed: u64,
    target_height: f32,
    mountain_threshold: f32,
) -> Vec<ResourceSegment> {
    let interior = field.bordered_size().saturating_sub(2);
    if divisions == 0 || interior / divisions == 0 {
        return Vec::new();
    }
    let segment_size = interior / divisions;

    let mut segments = Vec::with_capacity(divisions * divisions);
    for sy in 0..divisions {
        for sx in 0..divisions {
            let bounds =
                SegmentBounds::new(1 + sx * segment_size, 1 + sy * segment_size, segment_size);
            let seed = segment_seed(chunk_seed, bounds);
            segments.push(score_segment(
                field,
                bounds,
                target_height,
                mountain_threshold,
                seed,
            ));
        }
    }
    segments
}

/// Probe seeded sample positions inside the segment for a vertex at or
/// above the target band; falls back to the center when none qualifies.
fn pick_site(
    field: &Heightfield,
    bounds: SegmentBounds,
    target_height: f32,
    rng: &mut ChaCha8Rng,
) -> (usize, usize) {
    for _ in 0..bounds.size.max(1) * 2 {
        let x = bounds.x + rng.random_range(0..bounds.size.max(1));
        let y = bounds.y + rng.random_range(0..bounds.size.max(1));
        if x < field.bordered_size() && y < field.bordered_size() && field.get(x, y) >= target_height
        {
            return (x, y);
        }
    }
    bounds.center()
}
