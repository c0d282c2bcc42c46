//! Command-line argument parsing for the terrain pipeline.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strata command-line arguments.
///
/// CLI values override settings loaded from the config file.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Procedural terrain streaming pipeline")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum view distance (overrides the last LOD threshold).
    #[arg(long)]
    pub view_distance: Option<f32>,

    /// Flat-shade generated meshes.
    #[arg(long)]
    pub flat_shading: Option<bool>,

    /// Number of simulation ticks to run.
    #[arg(long)]
    pub ticks: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to the config file (overrides the default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(distance) = args.view_distance {
            if let Some(last) = self.streaming.lod_levels.last_mut() {
                last.visible_distance = distance;
            }
        }
        if let Some(flat) = args.flat_shading {
            self.terrain.flat_shading = flat;
        }
    }
}
