//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World identity and global scale.
    pub world: WorldConfig,
    /// Noise synthesis settings.
    pub noise: NoiseConfig,
    /// Height remap and shading settings.
    pub terrain: TerrainConfig,
    /// Chunk streaming and LOD settings.
    pub streaming: StreamingConfig,
    /// Resource segment scoring settings.
    pub resources: ResourcesConfig,
    /// Forest spread settings.
    pub forest: ForestConfig,
    /// Plot grammar settings.
    pub city: CityConfig,
    /// Ordered height bands for texture weighting.
    pub bands: Vec<BandConfig>,
}

/// World identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed driving every deterministic stream in the pipeline.
    pub seed: u64,
    /// World-to-terrain scale factor.
    pub uniform_scale: f32,
}

/// Noise synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseConfig {
    /// Spatial scale of the broadest features.
    pub scale: f32,
    /// Octave count, 1..=6.
    pub octaves: u32,
    /// Amplitude falloff per octave, [0, 1].
    pub persistence: f32,
    /// Frequency growth per octave, >= 1.
    pub lacunarity: f32,
}

/// Height remap and mesh appearance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Bordered heightfield sample count per axis.
    pub chunk_size: u32,
    /// Vertical exaggeration applied after the height curve.
    pub height_multiplier: f32,
    /// Monotone `(input, output)` keys of the height remap curve.
    pub height_curve: Vec<(f32, f32)>,
    /// Carve island-style edges into every chunk.
    pub use_falloff: bool,
    /// Duplicate vertices per triangle instead of smooth normals.
    pub flat_shading: bool,
}

/// One LOD threshold entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LodLevelConfig {
    pub lod: u32,
    pub visible_distance: f32,
}

/// Chunk streaming behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Viewer movement before the visible set is recomputed.
    pub move_threshold: f32,
    /// Soft cap on resident chunks (0 disables eviction).
    pub max_resident_chunks: u32,
    /// Ordered LOD thresholds; the last distance is the view distance.
    pub lod_levels: Vec<LodLevelConfig>,
}

/// Resource segment scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResourcesConfig {
    /// The chunk interior splits into `divisions x divisions` segments.
    pub divisions: u32,
    /// Preferred deposit height, normalized.
    pub target_height: f32,
    /// Heights above this draw from the mountain table.
    pub mountain_threshold: f32,
}

/// Forest spread around low-value deposits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForestConfig {
    pub generations: u32,
    pub start_spread: i32,
    /// Plantable band, normalized heights.
    pub min_height: f32,
    pub snow_height: f32,
    pub max_height: f32,
}

/// Plot grammar and city layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CityConfig {
    pub axiom: String,
    /// Symbol rewriting rules.
    pub rules: Vec<(char, String)>,
    pub iterations: u32,
    /// Highest building tier placed next to roads.
    pub max_tier: u8,
    /// Height band a hosting segment center must fall in.
    pub lower_height: f32,
    pub upper_height: f32,
    /// Minimum variance weight (flatness) of a hosting segment.
    pub min_flatness: f32,
}

/// One texture/color band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BandConfig {
    pub name: String,
    /// Upper height threshold, inclusive.
    pub height: f32,
    pub color: [f32; 3],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            uniform_scale: 2.5,
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            scale: 30.0,
            octaves: 3,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            chunk_size: 242,
            height_multiplier: 20.0,
            height_curve: vec![(0.0, 0.0), (0.4, 0.04), (1.0, 1.0)],
            use_falloff: false,
            flat_shading: false,
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            move_threshold: 25.0,
            max_resident_chunks: 512,
            lod_levels: vec![
                LodLevelConfig {
                    lod: 0,
                    visible_distance: 200.0,
                },
                LodLevelConfig {
                    lod: 2,
                    visible_distance: 400.0,
                },
                LodLevelConfig {
                    lod: 4,
                    visible_distance: 600.0,
                },
            ],
        }
    }
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            divisions: 4,
            target_height: 0.45,
            mountain_threshold: 0.7,
        }
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            generations: 5,
            start_spread: 2,
            min_height: 0.3,
            snow_height: 0.8,
            max_height: 0.95,
        }
    }
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            axiom: "A".into(),
            rules: vec![
                ('A', "AB[<BA".into()),
                ('B', "AA>AB]<".into()),
            ],
            iterations: 3,
            max_tier: 4,
            lower_height: 0.3,
            upper_height: 0.65,
            min_flatness: 85.0,
        }
    }
}

/// Default band table, ordered from water to snow.
pub fn default_bands() -> Vec<BandConfig> {
    vec![
        BandConfig {
            name: "water".into(),
            height: 0.3,
            color: [0.13, 0.3, 0.74],
        },
        BandConfig {
            name: "sand".into(),
            height: 0.37,
            color: [0.83, 0.78, 0.5],
        },
        BandConfig {
            name: "grass".into(),
            height: 0.6,
            color: [0.24, 0.57, 0.25],
        },
        BandConfig {
            name: "rock".into(),
            height: 0.85,
            color: [0.42, 0.35, 0.3],
        },
        BandConfig {
            name: "snow".into(),
            height: 1.0,
            color: [0.93, 0.94, 0.95],
        },
    ]
}

impl Config {
    /// Load a config from a RON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        ron::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Save this config as pretty-printed RON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::default();
        let content = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content).map_err(ConfigError::Write)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Normalize what can be normalized and reject what cannot.
    ///
    /// Scale, persistence, and lacunarity are corrected in place; an octave
    /// count outside [1, 6], an unusable LOD table, or an empty band table
    /// fail fast.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.noise.octaves == 0 || self.noise.octaves > 6 {
            return Err(ConfigError::OctaveCount(self.noise.octaves));
        }
        if self.noise.scale <= 0.0 {
            self.noise.scale = 1e-4;
        }
        if self.noise.lacunarity < 1.0 {
            self.noise.lacunarity = 1.0;
        }
        self.noise.persistence = self.noise.persistence.clamp(0.0, 1.0);

        if self.streaming.lod_levels.is_empty() {
            return Err(ConfigError::EmptyLodTable);
        }
        let interior = self.terrain.chunk_size.saturating_sub(2);
        let mut previous_distance = 0.0;
        for (index, level) in self.streaming.lod_levels.iter().enumerate() {
            let stride = if level.lod == 0 { 1 } else { 2 * level.lod };
            if interior == 0 || interior % stride != 0 {
                return Err(ConfigError::LodStride {
                    lod: level.lod,
                    stride,
                    interior,
                });
            }
            if level.visible_distance <= previous_distance {
                return Err(ConfigError::LodDistance { index });
            }
            previous_distance = level.visible_distance;
        }

        if self.bands.is_empty() {
            self.bands = default_bands();
        }
        if self.terrain.height_curve.is_empty() {
            self.terrain.height_curve = vec![(0.0, 0.0), (1.0, 1.0)];
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            noise: NoiseConfig::default(),
            terrain: TerrainConfig::default(),
            streaming: StreamingConfig::default(),
            resources: ResourcesConfig::default(),
            forest: ForestConfig::default(),
            city: CityConfig::default(),
            bands: default_bands(),
        }
    }
}
