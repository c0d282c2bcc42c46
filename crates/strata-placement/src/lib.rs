//! Terrain-derived content placement: resource segment scoring, forest
//! spread, and L-system plot layout with a turtle-walk interpreter.

mod city;
mod forest;
mod grammar;
mod resources;
mod turtle;

pub use city::{CityPiece, CityPlacement, PLOT_SPACING, PlotGrid, evaluate_grid, rasterize};
pub use forest::{TreeSite, TreeVariant, spread_forest, variant_for_height};
pub use grammar::{RuleTable, derive};
pub use resources::{
    ResourceKind, ResourceSegment, SegmentBounds, score_chunk, score_segment, segment_seed,
};
pub use turtle::{GrammarError, PlotSegment, TurtlePath, interpret};
