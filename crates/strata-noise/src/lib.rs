//! Deterministic multi-octave coherent-noise heightfield synthesis.
//!
//! Composites octaves of Perlin noise into bordered heightfields. A seeded
//! per-octave offset stream keeps output bit-identical for a given seed,
//! and the window offset translates sampling so adjacent chunks share
//! border samples under global normalization.

mod params;
mod synth;

pub use params::{NoiseError, NoiseParams, NormalizeMode};
pub use synth::{generate, max_possible_amplitude, octave_offsets};
