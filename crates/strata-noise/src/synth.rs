//! Octave accumulation over Perlin noise.

use noise::{NoiseFn, Perlin};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use strata_field::Heightfield;

use crate::params::{NoiseParams, NormalizeMode};

/// Per-octave window translations drawn from a seeded stream.
///
/// One offset pair per octave, fully reproducible for a given seed. The
/// caller-supplied window offset is folded in here (added on x, subtracted
/// on y to match the row-to-depth flip in the mesh mapping), so every
/// sample of the field reuses the same precomputed translations.
pub fn octave_offsets(params: &NoiseParams) -> Vec<[f64; 2]> {
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    (0..params.octaves)
        .map(|_| {
            let ox: f64 = rng.random_range(-100_000.0..100_000.0);
            let oy: f64 = rng.random_range(-100_000.0..100_000.0);
            [ox + params.offset.x as f64, oy - params.offset.y as f64]
        })
        .collect()
}

/// Theoretical maximum of the octave amplitude sum for these parameters.
pub fn max_possible_amplitude(params: &NoiseParams) -> f32 {
    let mut sum = 0.0;
    let mut amplitude = 1.0;
    for _ in 0..params.octaves {
        sum += amplitude;
        amplitude *= params.persistence;
    }
    sum
}

/// Synthesize a `width x height` heightfield.
///
/// Each cell accumulates `octaves` layers of Perlin noise; octave `i`
/// samples at `(cell - half_extent + offset[i]) / scale * lacunarity^i`
/// with amplitude `persistence^i`. Identical parameters always produce a
/// bit-identical buffer.
pub fn generate(width: usize, height: usize, params: &NoiseParams) -> Heightfield {
    let perlin = Perlin::new(params.seed as u32);
    let offsets = octave_offsets(params);
    let max_amplitude = max_possible_amplitude(params);

    let half_width = width as f64 / 2.0;
    let half_height = height as f64 / 2.0;
    let scale = params.scale as f64;

    let mut buffer = vec![0.0f32; width * height];
    let mut observed_min = f32::INFINITY;
    let mut observed_max = f32::NEG_INFINITY;

    for y in 0..height {
        for x in 0..width {
            let mut amplitude = 1.0f32;
            let mut frequency = 1.0f64;
            let mut accumulated = 0.0f32;

            for offset in &offsets {
                let sample_x = (x as f64 - half_width + offset[0]) / scale * frequency;
                let sample_y = (y as f64 - half_height + offset[1]) / scale * frequency;
                let value = perlin.get([sample_x, sample_y]) as f32;

                accumulated += value * amplitude;
                amplitude *= params.persistence;
                frequency *= params.lacunarity as f64;
            }

            if accumulated > observed_max {
                observed_max = accumulated;
            }
            if accumulated < observed_min {
                observed_min = accumulated;
            }
            buffer[y * width + x] = accumulated;
        }
    }

    match params.normalize {
        NormalizeMode::Local => {
            let range = (observed_max - observed_min).max(f32::EPSILON);
            for value in &mut buffer {
                *value = (*value - observed_min) / range;
            }
        }
        NormalizeMode::Global => {
            for value in &mut buffer {
                *value = ((*value + 1.0) / max_amplitude).max(0.0);
            }
        }
    }

    Heightfield::from_samples(width, buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::NoiseError;
    use glam::Vec2;

    fn params(offset: Vec2, normalize: NormalizeMode) -> NoiseParams {
        NoiseParams::new(42, 30.0, 4, 0.5, 2.0, offset, normalize).unwrap()
    }

    #[test]
    fn test_same_params_bit_identical() {
        let p = params(Vec2::new(120.0, -64.0), NormalizeMode::Global);
        let a = generate(61, 61, &p);
        let b = generate(61, 61, &p);
        assert_eq!(a.samples(), b.samples(), "same parameters must reproduce the buffer exactly");
    }

    #[test]
    fn test_octave_offsets_reproducible_per_seed() {
        let p = params(Vec2::ZERO, NormalizeMode::Global);
        assert_eq!(octave_offsets(&p), octave_offsets(&p));

        let other = NoiseParams::new(43, 30.0, 4, 0.5, 2.0, Vec2::ZERO, NormalizeMode::Global)
            .unwrap();
        assert_ne!(octave_offsets(&p), octave_offsets(&other));
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate(33, 33, &params(Vec2::ZERO, NormalizeMode::Global));
        let p_b = NoiseParams::new(999, 30.0, 4, 0.5, 2.0, Vec2::ZERO, NormalizeMode::Global)
            .unwrap();
        let b = generate(33, 33, &p_b);
        assert_ne!(a.samples(), b.samples());
    }

    #[test]
    fn test_local_mode_spans_unit_range() {
        let field = generate(65, 65, &params(Vec2::ZERO, NormalizeMode::Local));
        let (min, max) = field.min_max();
        assert!((min - 0.0).abs() < 1e-6, "local min should hit 0, got {min}");
        assert!((max - 1.0).abs() < 1e-6, "local max should hit 1, got {max}");
    }

    #[test]
    fn test_global_mode_never_negative() {
        let field = generate(65, 65, &params(Vec2::new(512.0, 512.0), NormalizeMode::Global));
        let (min, _) = field.min_max();
        assert!(min >= 0.0, "global mode clamps below at zero, got {min}");
    }

    #[test]
    fn test_global_mode_adjacent_windows_share_border_columns() {
        // Two chunks one interior-size apart along +x: the right columns of
        // the left field must line up with the left columns of the right
        // field at the same rows.
        let size = 23usize;
        let interior = (size - 3) as f32;
        let left = generate(size, size, &params(Vec2::ZERO, NormalizeMode::Global));
        let right = generate(
            size,
            size,
            &params(Vec2::new(interior, 0.0), NormalizeMode::Global),
        );

        for y in 0..size {
            for x in 0..3 {
                let a = left.get(x + size - 3, y);
                let b = right.get(x, y);
                assert!(
                    (a - b).abs() < 1e-4,
                    "border sample mismatch at ({x}, {y}): {a} vs {b}"
                );
            }
        }
    }

    #[test]
    fn test_global_mode_vertical_neighbors_share_border_rows() {
        // The +y neighbor continues the field toward lower rows because the
        // window offset is subtracted on y.
        let size = 23usize;
        let interior = (size - 3) as f32;
        let base = generate(size, size, &params(Vec2::ZERO, NormalizeMode::Global));
        let above = generate(
            size,
            size,
            &params(Vec2::new(0.0, interior), NormalizeMode::Global),
        );

        for x in 0..size {
            for y in 0..3 {
                let a = base.get(x, y);
                let b = above.get(x, y + size - 3);
                assert!(
                    (a - b).abs() < 1e-4,
                    "border sample mismatch at ({x}, {y}): {a} vs {b}"
                );
            }
        }
    }

    #[test]
    fn test_invalid_octaves_rejected() {
        let err = NoiseParams::new(1, 30.0, 9, 0.5, 2.0, Vec2::ZERO, NormalizeMode::Global);
        assert!(matches!(err, Err(NoiseError::OctaveCount(9))));
    }
}
