//! Noise synthesis parameters and boundary normalization.

use glam::Vec2;

/// Smallest scale accepted; non-positive scales are raised to this so the
/// sampling step never divides by zero.
pub const MIN_SCALE: f32 = 1e-4;

/// Largest supported octave count.
pub const MAX_OCTAVES: u32 = 6;

/// How a synthesized buffer is remapped after octave accumulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Remap into [0, 1] using the min/max observed in this buffer.
    /// Usable only for single standalone maps; adjacent chunks will not
    /// line up because each buffer sees a different observed range.
    Local,
    /// Divide by the theoretical maximum amplitude sum and clamp below at
    /// zero. Keeps cross-chunk height continuity for streamed terrain.
    #[default]
    Global,
}

/// Errors from noise parameter validation.
#[derive(Debug, thiserror::Error)]
pub enum NoiseError {
    /// Octave count outside the supported [1, 6] range.
    #[error("octave count {0} outside supported range 1..=6")]
    OctaveCount(u32),
}

/// Validated parameters for one noise field configuration.
///
/// Construct through [`NoiseParams::new`]: octave counts outside [1, 6]
/// are rejected, while scale, persistence, and lacunarity are normalized
/// in place rather than refused, so a generator can always be produced
/// from a slightly-off configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseParams {
    pub seed: u64,
    pub scale: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
    /// Translation of the sampled window, in interior world cells.
    pub offset: Vec2,
    pub normalize: NormalizeMode,
}

impl NoiseParams {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seed: u64,
        scale: f32,
        octaves: u32,
        persistence: f32,
        lacunarity: f32,
        offset: Vec2,
        normalize: NormalizeMode,
    ) -> Result<Self, NoiseError> {
        if octaves == 0 || octaves > MAX_OCTAVES {
            return Err(NoiseError::OctaveCount(octaves));
        }
        Ok(Self {
            seed,
            scale: if scale <= 0.0 { MIN_SCALE } else { scale },
            octaves,
            persistence: persistence.clamp(0.0, 1.0),
            lacunarity: lacunarity.max(1.0),
            offset,
            normalize,
        })
    }

    /// The same configuration translated to another window offset.
    pub fn with_offset(&self, offset: Vec2) -> Self {
        Self {
            offset,
            ..self.clone()
        }
    }
}
