//! Demo binary that streams terrain around a viewer walking a straight
//! line, logging generation and placement activity each tick.
//!
//! Configuration is loaded from `strata.ron` and can be overridden via CLI
//! flags. Run with `cargo run -p strata-demo -- --seed 42 --ticks 120`.

mod sinks;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use glam::Vec2;
use strata_chunks::{
    ChunkStore, CityParams, ForestParams, GenerationParams, LodLevel, PlacementParams,
    ResourceParams, StreamingParams,
};
use strata_config::{CliArgs, Config};
use strata_mesh::{HeightBand, PiecewiseCurve, ShadingMode};
use strata_noise::{NoiseParams, NormalizeMode};
use strata_placement::RuleTable;
use tracing::{error, info};

use crate::sinks::{LoggingDisplay, LoggingPlacement};

fn main() {
    let args = CliArgs::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("strata.ron"));
    let mut config = match Config::load_or_default(&config_path) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("could not load {}: {error}", config_path.display());
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    let fallback = args.log_level.as_deref().unwrap_or("info");
    strata_log::init_logging(fallback);

    if let Err(error) = config.validate() {
        error!(%error, "invalid configuration");
        std::process::exit(1);
    }

    let ticks = args.ticks.unwrap_or(240);
    if let Err(error) = run(&config, ticks) {
        error!(%error, "streaming setup failed");
        std::process::exit(1);
    }
}

fn run(config: &Config, ticks: u32) -> Result<(), strata_chunks::ChunkStoreError> {
    let mut store = build_store(config)?;
    let chunk_world = store.chunk_world_size() * config.world.uniform_scale;
    info!(
        seed = config.world.seed,
        chunk_world,
        lod_levels = config.streaming.lod_levels.len(),
        "starting terrain stream"
    );

    // Walk diagonally at a third of a chunk per tick; far enough to force
    // window rebuilds, slow enough to reuse resident chunks.
    let step = Vec2::splat(chunk_world / 3.0);
    let mut viewer = Vec2::ZERO;
    for tick in 0..ticks {
        let applied = store.tick(viewer);
        if applied > 0 {
            let stats = store.stats();
            info!(
                tick,
                applied,
                resident = stats.resident_chunks,
                visible = stats.visible_chunks,
                in_flight = store.in_flight(),
                "tick"
            );
        }
        viewer += step;
        std::thread::sleep(Duration::from_millis(16));
    }

    // Let outstanding workers finish so the summary covers them.
    while store.in_flight() > 0 {
        store.drain_completions();
        std::thread::sleep(Duration::from_millis(5));
    }
    store.drain_completions();

    let stats = store.stats();
    info!(
        heightfields = stats.heightfields_requested,
        meshes = stats.meshes_completed,
        stale = stats.stale_dropped,
        resident = stats.resident_chunks,
        "stream finished"
    );
    Ok(())
}

fn build_store(
    config: &Config,
) -> Result<ChunkStore<LoggingDisplay, LoggingPlacement>, strata_chunks::ChunkStoreError> {
    let streaming = StreamingParams {
        chunk_size: config.terrain.chunk_size as usize,
        move_threshold: config.streaming.move_threshold,
        max_resident_chunks: config.streaming.max_resident_chunks as usize,
        uniform_scale: config.world.uniform_scale,
    };

    // Validation already normalized these; construction cannot reject them.
    let noise = NoiseParams::new(
        config.world.seed,
        config.noise.scale,
        config.noise.octaves,
        config.noise.persistence,
        config.noise.lacunarity,
        Vec2::ZERO,
        NormalizeMode::Global,
    )
    .expect("validated noise config");

    let generation = GenerationParams {
        noise,
        use_falloff: config.terrain.use_falloff,
        height_multiplier: config.terrain.height_multiplier,
        curve: Arc::new(PiecewiseCurve::new(config.terrain.height_curve.clone())),
        shading: if config.terrain.flat_shading {
            ShadingMode::Flat
        } else {
            ShadingMode::Smooth
        },
        bands: Arc::new(
            config
                .bands
                .iter()
                .map(|band| HeightBand::new(band.name.clone(), band.height, band.color))
                .collect(),
        ),
    };

    let lod_levels = config
        .streaming
        .lod_levels
        .iter()
        .map(|level| LodLevel::new(level.lod, level.visible_distance))
        .collect();

    let placement = PlacementParams {
        world_seed: config.world.seed,
        resources: ResourceParams {
            divisions: config.resources.divisions as usize,
            target_height: config.resources.target_height,
            mountain_threshold: config.resources.mountain_threshold,
        },
        forest: ForestParams {
            generations: config.forest.generations,
            start_spread: config.forest.start_spread,
            min_height: config.forest.min_height,
            snow_height: config.forest.snow_height,
            max_height: config.forest.max_height,
        },
        city: CityParams {
            axiom: config.city.axiom.clone(),
            rules: config
                .city
                .rules
                .iter()
                .map(|(symbol, replacement)| (*symbol, replacement.clone()))
                .collect::<RuleTable>(),
            iterations: config.city.iterations,
            max_tier: config.city.max_tier,
            lower_height: config.city.lower_height,
            upper_height: config.city.upper_height,
            min_flatness: config.city.min_flatness,
        },
    };

    ChunkStore::new(
        streaming,
        generation,
        lod_levels,
        placement,
        LoggingDisplay::default(),
        LoggingPlacement::default(),
    )
}
