//! Configuration for the terrain pipeline.
//!
//! Runtime-configurable settings persisted to disk as RON, with CLI
//! overrides via clap. Validation normalizes slightly-off values at the
//! boundary (scale, lacunarity, persistence) and rejects what cannot be
//! normalized (octave count, LOD tables).

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BandConfig, CityConfig, Config, ForestConfig, LodLevelConfig, NoiseConfig, ResourcesConfig,
    StreamingConfig, TerrainConfig, WorldConfig,
};
pub use error::ConfigError;
