//! The chunk store: owns generated chunks, schedules asynchronous
//! generation, and drives downstream placement.

use std::sync::Arc;

use glam::{IVec2, Vec2, Vec3};
use hashbrown::HashMap;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use strata_field::{ChunkCoord, FalloffMask, Heightfield, derive_chunk_seed};
use strata_mesh::{
    BandWeights, HeightBand, HeightCurve, MeshData, ShadingMode, band_weights, tessellate,
};
use strata_noise::{NoiseParams, generate};
use strata_placement::{
    CityPiece, PLOT_SPACING, ResourceKind, ResourceSegment, RuleTable, derive, evaluate_grid,
    interpret, rasterize, score_chunk, segment_seed, spread_forest, variant_for_height,
};

use crate::lod::{ChunkStoreError, LodLevel, LodTable, distance_to_bounds, is_visible};
use crate::queue::{Completion, CompletionQueue};
use crate::sinks::{DisplaySink, PlacementKind, PlacementSink};

/// Streaming behavior of the store.
#[derive(Clone, Debug)]
pub struct StreamingParams {
    /// Bordered heightfield sample count per axis.
    pub chunk_size: usize,
    /// Viewer movement (in terrain units) required before the visible set
    /// is recomputed.
    pub move_threshold: f32,
    /// Soft cap on resident chunks; hidden chunks farthest from the viewer
    /// are evicted beyond it. Zero disables eviction.
    pub max_resident_chunks: usize,
    /// World-to-terrain scale applied to incoming viewer positions and
    /// outgoing placement positions.
    pub uniform_scale: f32,
}

impl Default for StreamingParams {
    fn default() -> Self {
        Self {
            chunk_size: 242,
            move_threshold: 25.0,
            max_resident_chunks: 512,
            uniform_scale: 2.5,
        }
    }
}

/// Everything a worker needs to synthesize one chunk's data.
#[derive(Clone)]
pub struct GenerationParams {
    /// Noise configuration; the window offset is overridden per chunk.
    pub noise: NoiseParams,
    /// Carve island-style edges into every chunk.
    pub use_falloff: bool,
    pub height_multiplier: f32,
    pub curve: Arc<dyn HeightCurve + Send + Sync>,
    pub shading: ShadingMode,
    /// Ordered height bands for texture weighting.
    pub bands: Arc<Vec<HeightBand>>,
}

/// Resource segment scoring configuration.
#[derive(Clone, Copy, Debug)]
pub struct ResourceParams {
    /// The chunk interior is split into `divisions x divisions` segments.
    pub divisions: usize,
    pub target_height: f32,
    pub mountain_threshold: f32,
}

/// Forest spread configuration; height thresholds are in normalized sample
/// space, like the band table.
#[derive(Clone, Copy, Debug)]
pub struct ForestParams {
    pub generations: u32,
    pub start_spread: i32,
    pub min_height: f32,
    pub snow_height: f32,
    pub max_height: f32,
}

/// Plot grammar configuration for city layout.
#[derive(Clone, Debug)]
pub struct CityParams {
    pub axiom: String,
    pub rules: RuleTable,
    pub iterations: u32,
    pub max_tier: u8,
    /// Height band a segment center must fall in to host a city.
    pub lower_height: f32,
    pub upper_height: f32,
    /// Minimum variance weight (flatness) a segment needs.
    pub min_flatness: f32,
}

/// All placement configuration consumed after a chunk's first mesh lands.
#[derive(Clone, Debug)]
pub struct PlacementParams {
    pub world_seed: u64,
    pub resources: ResourceParams,
    pub forest: ForestParams,
    pub city: CityParams,
}

/// Counters exposed for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub heightfields_requested: u64,
    pub meshes_requested: u64,
    pub meshes_completed: u64,
    pub stale_dropped: u64,
    pub resident_chunks: usize,
    pub visible_chunks: usize,
}

#[derive(Default)]
struct LodSlot {
    mesh: Option<MeshData>,
    requested: bool,
}

struct Chunk {
    center: Vec2,
    field: Option<Arc<Heightfield>>,
    weights: Option<BandWeights>,
    lod_slots: Vec<LodSlot>,
    previous_lod: Option<usize>,
    visible: bool,
    placed: bool,
}

impl Chunk {
    fn new(center: Vec2, lod_count: usize) -> Self {
        let mut lod_slots = Vec::with_capacity(lod_count);
        lod_slots.resize_with(lod_count, LodSlot::default);
        Self {
            center,
            field: None,
            weights: None,
            lod_slots,
            previous_lod: None,
            visible: false,
            placed: false,
        }
    }
}

/// Owns every generated chunk, keyed by grid coordinate.
///
/// Single-threaded consumer: all chunk and mesh state is mutated only here,
/// on the thread calling [`ChunkStore::tick`]. Workers communicate solely
/// through the completion queue. Per-chunk lifecycle: heightfield pending →
/// ready → per-LOD meshes pending/ready as the viewer's distance crosses
/// thresholds; completed LOD meshes are kept and never regenerated.
pub struct ChunkStore<D: DisplaySink, P: PlacementSink> {
    streaming: StreamingParams,
    generation: GenerationParams,
    lods: LodTable,
    placement: PlacementParams,

    queue: CompletionQueue,
    chunks: HashMap<ChunkCoord, Chunk>,
    visible_last: Vec<ChunkCoord>,
    last_viewer: Option<Vec2>,
    falloff: Option<Arc<FalloffMask>>,
    stats: StoreStats,

    display: D,
    placement_sink: P,
}

impl<D: DisplaySink, P: PlacementSink> ChunkStore<D, P> {
    /// Validate the configuration and build an empty store.
    pub fn new(
        streaming: StreamingParams,
        generation: GenerationParams,
        lod_levels: Vec<LodLevel>,
        placement: PlacementParams,
        display: D,
        placement_sink: P,
    ) -> Result<Self, ChunkStoreError> {
        let lods = LodTable::new(lod_levels, streaming.chunk_size)?;
        let falloff = generation
            .use_falloff
            .then(|| Arc::new(FalloffMask::generate(streaming.chunk_size)));
        Ok(Self {
            streaming,
            generation,
            lods,
            placement,
            queue: CompletionQueue::new(),
            chunks: HashMap::new(),
            visible_last: Vec::new(),
            last_viewer: None,
            falloff,
            stats: StoreStats::default(),
            display,
            placement_sink,
        })
    }

    /// World cells between adjacent chunk origins.
    pub fn chunk_world_size(&self) -> f32 {
        (self.streaming.chunk_size - 3) as f32
    }

    /// Advance one frame: fold in the viewer position, then deliver
    /// completed generation results. Returns the number of completions
    /// applied.
    pub fn tick(&mut self, viewer_world: Vec2) -> usize {
        self.update_viewer(viewer_world);
        self.drain_completions()
    }

    /// Recompute the required chunk window when the viewer has moved past
    /// the movement threshold (always on the first call).
    pub fn update_viewer(&mut self, viewer_world: Vec2) {
        let viewer = viewer_world / self.streaming.uniform_scale;
        let threshold_sq = self.streaming.move_threshold * self.streaming.move_threshold;
        let moved = match self.last_viewer {
            None => true,
            Some(previous) => previous.distance_squared(viewer) > threshold_sq,
        };
        if moved {
            self.last_viewer = Some(viewer);
            self.refresh_visible(viewer);
        }
    }

    /// Apply every completion delivered before this call; results workers
    /// enqueue during the drain wait for the next tick.
    pub fn drain_completions(&mut self) -> usize {
        let mut completed = Vec::new();
        self.queue.drain(|completion| completed.push(completion));
        let applied = completed.len();
        for completion in completed {
            self.apply(completion);
        }
        applied
    }

    pub fn stats(&self) -> StoreStats {
        let mut stats = self.stats;
        stats.resident_chunks = self.chunks.len();
        stats.visible_chunks = self.visible_last.len();
        stats
    }

    /// Jobs submitted but not yet applied.
    pub fn in_flight(&self) -> u64 {
        self.queue.in_flight()
    }

    pub fn has_heightfield(&self, coord: ChunkCoord) -> bool {
        self.chunks
            .get(&coord)
            .is_some_and(|chunk| chunk.field.is_some())
    }

    pub fn has_mesh(&self, coord: ChunkCoord, lod_index: usize) -> bool {
        self.chunks
            .get(&coord)
            .and_then(|chunk| chunk.lod_slots.get(lod_index))
            .is_some_and(|slot| slot.mesh.is_some())
    }

    pub fn is_chunk_visible(&self, coord: ChunkCoord) -> bool {
        self.chunks.get(&coord).is_some_and(|chunk| chunk.visible)
    }

    fn refresh_visible(&mut self, viewer: Vec2) {
        let previously_visible = std::mem::take(&mut self.visible_last);
        for coord in previously_visible {
            if let Some(chunk) = self.chunks.get_mut(&coord) {
                chunk.visible = false;
            }
            self.display.set_visible(coord, false);
        }

        let chunk_world = self.chunk_world_size();
        let current = ChunkCoord::from_world(viewer, chunk_world);
        let radius = (self.lods.max_view_distance() / chunk_world).round() as i32;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let coord = ChunkCoord::new(current.x + dx, current.y + dy);
                if !self.chunks.contains_key(&coord) {
                    self.create_chunk(coord);
                }
                self.update_chunk(coord, viewer);
            }
        }

        self.evict_excess(viewer);
    }

    fn create_chunk(&mut self, coord: ChunkCoord) {
        let center = coord.world_offset(self.chunk_world_size());
        self.chunks
            .insert(coord, Chunk::new(center, self.lods.len()));
        self.display.set_visible(coord, false);
        self.request_heightfield(coord);
    }

    fn request_heightfield(&mut self, coord: ChunkCoord) {
        let offset = coord.world_offset(self.chunk_world_size());
        let params = self.generation.noise.with_offset(offset);
        let size = self.streaming.chunk_size;
        let falloff = self.falloff.clone();
        let bands = Arc::clone(&self.generation.bands);

        self.stats.heightfields_requested += 1;
        debug!(%coord, "requesting heightfield");
        self.queue.submit(move || {
            let mut field = generate(size, size, &params);
            if let Some(mask) = falloff {
                field.apply_falloff(&mask);
            }
            let weights = band_weights(&field, &bands);
            Completion::Heightfield {
                coord,
                field,
                weights,
            }
        });
    }

    fn request_mesh(&mut self, coord: ChunkCoord, lod_index: usize) {
        let Some(chunk) = self.chunks.get(&coord) else {
            return;
        };
        let Some(field) = chunk.field.clone() else {
            return;
        };
        let lod = self.lods.levels()[lod_index].lod;
        let curve = Arc::clone(&self.generation.curve);
        let multiplier = self.generation.height_multiplier;
        let shading = self.generation.shading;

        self.stats.meshes_requested += 1;
        debug!(%coord, lod, "requesting mesh");
        self.queue.submit(move || {
            let result = tessellate(&field, curve.as_ref(), multiplier, lod, shading);
            Completion::Mesh {
                coord,
                lod_index,
                result,
            }
        });
    }

    /// Refresh one chunk's visibility and LOD against the viewer. No-op
    /// until the chunk's heightfield has been delivered, so a mesh request
    /// can never precede it.
    fn update_chunk(&mut self, coord: ChunkCoord, viewer: Vec2) {
        let max_view = self.lods.max_view_distance();
        let half_extent = self.chunk_world_size() * 0.5;

        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        if chunk.field.is_none() {
            return;
        }

        let distance = distance_to_bounds(viewer, chunk.center, half_extent);
        let visible = is_visible(distance, max_view);

        let mut display_lod = None;
        let mut request_lod = None;
        if visible {
            let lod_index = self.lods.select(distance);
            if chunk.previous_lod != Some(lod_index) {
                let slot = &mut chunk.lod_slots[lod_index];
                if slot.mesh.is_some() {
                    chunk.previous_lod = Some(lod_index);
                    display_lod = Some(lod_index);
                } else if !slot.requested {
                    slot.requested = true;
                    request_lod = Some(lod_index);
                }
            }
            if !chunk.visible {
                self.visible_last.push(coord);
            }
        }
        chunk.visible = visible;

        if let Some(lod_index) = display_lod {
            if let Some(chunk) = self.chunks.get(&coord) {
                if let (Some(mesh), Some(weights)) =
                    (chunk.lod_slots[lod_index].mesh.as_ref(), chunk.weights.as_ref())
                {
                    self.display.display_surface(coord, lod_index, mesh, weights);
                }
            }
        }
        if let Some(lod_index) = request_lod {
            self.request_mesh(coord, lod_index);
        }
        self.display.set_visible(coord, visible);
    }

    fn apply(&mut self, completion: Completion) {
        let Some(viewer) = self.last_viewer else {
            return;
        };
        match completion {
            Completion::Heightfield {
                coord,
                field,
                weights,
            } => {
                let Some(chunk) = self.chunks.get_mut(&coord) else {
                    self.stats.stale_dropped += 1;
                    debug!(%coord, "dropping heightfield for evicted chunk");
                    return;
                };
                chunk.field = Some(Arc::new(field));
                chunk.weights = Some(weights);
                self.update_chunk(coord, viewer);
            }
            Completion::Mesh {
                coord,
                lod_index,
                result,
            } => {
                let mesh = match result {
                    Ok(mesh) => mesh,
                    Err(error) => {
                        warn!(%coord, lod_index, %error, "mesh generation failed");
                        if let Some(chunk) = self.chunks.get_mut(&coord) {
                            chunk.lod_slots[lod_index].requested = false;
                        }
                        return;
                    }
                };
                let Some(chunk) = self.chunks.get_mut(&coord) else {
                    self.stats.stale_dropped += 1;
                    debug!(%coord, "dropping mesh for evicted chunk");
                    return;
                };
                // Slots fill lazily and monotonically; a completed LOD is
                // never replaced.
                if chunk.lod_slots[lod_index].mesh.is_none() {
                    chunk.lod_slots[lod_index].mesh = Some(mesh);
                }
                self.stats.meshes_completed += 1;

                let first_mesh = !chunk.placed;
                chunk.placed = true;
                if first_mesh {
                    self.run_placement(coord);
                }
                self.update_chunk(coord, viewer);
            }
        }
    }

    /// Distance-based eviction of hidden chunks beyond the residency cap.
    fn evict_excess(&mut self, viewer: Vec2) {
        let cap = self.streaming.max_resident_chunks;
        if cap == 0 || self.chunks.len() <= cap {
            return;
        }
        let half_extent = self.chunk_world_size() * 0.5;
        let mut hidden: Vec<(ChunkCoord, f32)> = self
            .chunks
            .iter()
            .filter(|(_, chunk)| !chunk.visible)
            .map(|(&coord, chunk)| {
                (coord, distance_to_bounds(viewer, chunk.center, half_extent))
            })
            .collect();
        hidden.sort_by(|a, b| b.1.total_cmp(&a.1));

        let excess = self.chunks.len() - cap;
        for (coord, _) in hidden.into_iter().take(excess) {
            self.chunks.remove(&coord);
            debug!(%coord, "evicted distant chunk");
        }
    }

    /// Resource, forest, and plot layout placement; runs once per chunk on
    /// its first completed mesh.
    fn run_placement(&mut self, coord: ChunkCoord) {
        let Some(chunk) = self.chunks.get(&coord) else {
            return;
        };
        let Some(field) = chunk.field.clone() else {
            return;
        };
        let center = chunk.center;
        let curve = Arc::clone(&self.generation.curve);
        let multiplier = self.generation.height_multiplier;
        let uniform = self.streaming.uniform_scale;
        let params = self.placement.clone();

        let chunk_seed = derive_chunk_seed(params.world_seed, coord);
        let mut yaw_rng = ChaCha8Rng::seed_from_u64(chunk_seed);
        let segments = score_chunk(
            &field,
            params.resources.divisions,
            chunk_seed,
            params.resources.target_height,
            params.resources.mountain_threshold,
        );

        let mut city_done = false;
        for segment in &segments {
            if segment.is_eligible() {
                let position =
                    sample_world_position(&field, curve.as_ref(), multiplier, center, segment.anchor);
                self.placement_sink.place_visual_object(
                    PlacementKind::Resource(segment.kind),
                    position * uniform,
                    yaw_rng.random_range(0.0..360.0),
                    1.0,
                );
                if segment.kind == ResourceKind::LowValue {
                    self.plant_forest(&field, center, chunk_seed, segment, &mut yaw_rng);
                }
            } else if !city_done && city_suitable(segment, &params.city) {
                self.lay_out_city(&field, center, coord, segment, &params.city);
                city_done = true;
            }
        }
    }

    fn plant_forest(
        &mut self,
        field: &Heightfield,
        center: Vec2,
        chunk_seed: u64,
        segment: &ResourceSegment,
        yaw_rng: &mut ChaCha8Rng,
    ) {
        let forest = self.placement.forest;
        let curve = Arc::clone(&self.generation.curve);
        let multiplier = self.generation.height_multiplier;
        let uniform = self.streaming.uniform_scale;
        let size = field.bordered_size() as i32;

        let anchor = IVec2::new(segment.anchor.0 as i32, segment.anchor.1 as i32);
        let sites = spread_forest(
            anchor,
            forest.generations,
            forest.start_spread,
            segment_seed(chunk_seed, segment.bounds),
        );

        for site in sites {
            if site.coord.x < 1 || site.coord.y < 1 || site.coord.x > size - 2 || site.coord.y > size - 2
            {
                continue;
            }
            let sample = (site.coord.x as usize, site.coord.y as usize);
            let height = field.get(sample.0, sample.1);
            let Some(variant) = variant_for_height(
                height,
                forest.min_height,
                forest.snow_height,
                forest.max_height,
            ) else {
                continue;
            };
            let position = sample_world_position(field, curve.as_ref(), multiplier, center, sample);
            let scale = 1.0 + site.generation as f32 / forest.generations.max(1) as f32;
            self.placement_sink.place_visual_object(
                PlacementKind::Tree(variant),
                position * uniform,
                yaw_rng.random_range(0.0..360.0),
                scale,
            );
        }
    }

    fn lay_out_city(
        &mut self,
        field: &Heightfield,
        center: Vec2,
        coord: ChunkCoord,
        segment: &ResourceSegment,
        city: &CityParams,
    ) {
        let derived = derive(&city.axiom, &city.rules, city.iterations);
        let path = match interpret(&derived) {
            Ok(path) => path,
            // Fatal to this layout only; other chunks are unaffected.
            Err(error) => {
                warn!(%coord, %error, "plot layout failed");
                return;
            }
        };

        let curve = Arc::clone(&self.generation.curve);
        let multiplier = self.generation.height_multiplier;
        let uniform = self.streaming.uniform_scale;
        let origin =
            sample_world_position(field, curve.as_ref(), multiplier, center, segment.anchor);

        let grid = rasterize(&path);
        for placement in evaluate_grid(&grid, city.max_tier) {
            let kind = match placement.piece {
                CityPiece::Road => PlacementKind::Road,
                CityPiece::Building(tier) => PlacementKind::Building(tier),
            };
            let offset = Vec3::new(
                placement.grid_pos.x as f32 * PLOT_SPACING,
                0.0,
                placement.grid_pos.y as f32 * PLOT_SPACING,
            );
            self.placement_sink
                .place_visual_object(kind, (origin + offset) * uniform, 0.0, 1.0);
        }
    }
}

/// Whether a scored segment can host a plot layout: empty of resources,
/// flat enough, and inside the configured height band.
fn city_suitable(segment: &ResourceSegment, city: &CityParams) -> bool {
    segment.kind == ResourceKind::None
        && segment.variance_weight >= city.min_flatness
        && segment.center_height > city.lower_height
        && segment.center_height < city.upper_height
}

/// World position of a heightfield sample, using the same mapping as the
/// LOD-0 tessellation lattice.
fn sample_world_position(
    field: &Heightfield,
    curve: &dyn HeightCurve,
    height_multiplier: f32,
    center: Vec2,
    sample: (usize, usize),
) -> Vec3 {
    let world_size = (field.bordered_size() - 3) as f32;
    let half = world_size / 2.0;
    let x = center.x - half + (sample.0 as f32 - 1.0);
    let z = center.y + half - (sample.1 as f32 - 1.0);
    let y = curve.evaluate(field.get(sample.0, sample.1)) * height_multiplier;
    Vec3::new(x, y, z)
}
