//! Height-band texture weighting: maps samples to ordered color/layer bands.

use strata_field::Heightfield;

/// One texture/color band. A sample belongs to the first band in the
/// ordered list whose `height` threshold it does not exceed.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightBand {
    pub name: String,
    /// Upper height threshold (inclusive) of this band.
    pub height: f32,
    /// Linear RGB tint forwarded to the display side.
    pub color: [f32; 3],
}

impl HeightBand {
    pub fn new(name: impl Into<String>, height: f32, color: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            height,
            color,
        }
    }
}

/// Per-sample band assignment for one heightfield, forwarded to the
/// texture weighting sink alongside the mesh.
#[derive(Clone, Debug)]
pub struct BandWeights {
    size: usize,
    indices: Vec<u8>,
}

impl BandWeights {
    pub fn size(&self) -> usize {
        self.size
    }

    /// Band index assigned to sample `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> u8 {
        self.indices[y * self.size + x]
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }
}

/// Assign every sample to a band: first match wins over the ordered list;
/// samples above every threshold fall into the last band.
pub fn band_weights(field: &Heightfield, bands: &[HeightBand]) -> BandWeights {
    debug_assert!(!bands.is_empty(), "band table should not be empty");
    let size = field.bordered_size();
    let mut indices = vec![0u8; size * size];

    for y in 0..size {
        for x in 0..size {
            let sample = field.get(x, y);
            let mut assigned = bands.len().saturating_sub(1) as u8;
            for (i, band) in bands.iter().enumerate() {
                if sample <= band.height {
                    assigned = i as u8;
                    break;
                }
            }
            indices[y * size + x] = assigned;
        }
    }

    BandWeights { size, indices }
}
