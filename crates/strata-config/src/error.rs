//! Configuration error types.

/// Errors that can occur when loading, saving, or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    Write(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    Parse(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] ron::Error),

    /// Octave count outside the supported [1, 6] range.
    #[error("noise octave count {0} outside supported range 1..=6")]
    OctaveCount(u32),

    /// The LOD table has no entries.
    #[error("streaming LOD table must contain at least one level")]
    EmptyLodTable,

    /// A LOD stride does not evenly divide the chunk's bordered grid.
    #[error("LOD {lod} stride {stride} does not evenly divide chunk interior {interior}")]
    LodStride {
        lod: u32,
        stride: u32,
        interior: u32,
    },

    /// LOD visibility distances must be strictly increasing and positive.
    #[error("LOD level {index} has a non-increasing or non-positive visibility distance")]
    LodDistance { index: usize },

    /// The band table has no entries.
    #[error("height band table must contain at least one band")]
    EmptyBands,
}
