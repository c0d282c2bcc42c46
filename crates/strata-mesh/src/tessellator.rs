//! Heightfield to mesh conversion with LOD strides and seam borders.

use glam::{Vec2, Vec3};
use strata_field::Heightfield;

use crate::curve::HeightCurve;
use crate::mesh_data::{MeshData, ShadingMode};

/// Errors from stride/LOD validation.
#[derive(Debug, thiserror::Error)]
pub enum TessellationError {
    /// The stride does not evenly divide the interior of the bordered grid.
    #[error(
        "stride {stride} for LOD {lod} does not evenly divide interior size {interior} \
         (bordered size {bordered})"
    )]
    StrideMismatch {
        lod: u32,
        stride: usize,
        bordered: usize,
        interior: usize,
    },
    /// The stride leaves fewer than two interior vertex lines.
    #[error("bordered size {bordered} leaves no interior quads at stride {stride}")]
    TooCoarse { bordered: usize, stride: usize },
}

/// Simplification stride for a LOD level: full resolution at 0, then
/// every `2 * lod` samples.
pub fn stride_for_lod(lod: u32) -> usize {
    if lod == 0 { 1 } else { (2 * lod) as usize }
}

/// Check a (bordered size, LOD) combination, returning the stride.
///
/// Valid strides satisfy `(bordered_size - 2) % stride == 0` and leave at
/// least two interior vertex lines so the mesh has renderable quads.
pub fn validate_stride(bordered_size: usize, lod: u32) -> Result<usize, TessellationError> {
    let stride = stride_for_lod(lod);
    let interior = bordered_size.saturating_sub(2);
    if interior == 0 || interior % stride != 0 {
        return Err(TessellationError::StrideMismatch {
            lod,
            stride,
            bordered: bordered_size,
            interior,
        });
    }
    if interior / stride < 2 {
        return Err(TessellationError::TooCoarse {
            bordered: bordered_size,
            stride,
        });
    }
    Ok(stride)
}

/// Tessellate a bordered heightfield at one LOD level.
///
/// Vertex heights are `curve(sample) * height_multiplier`. The outermost
/// sample ring becomes border vertices (negative index space) that only
/// feed seam-normal accumulation. Every LOD maps its interior onto the
/// same world extent, centered on the chunk origin, so stacked LOD meshes
/// of one chunk coincide and LOD-0 edges of adjacent chunks share vertices
/// exactly.
pub fn tessellate(
    field: &Heightfield,
    curve: &dyn HeightCurve,
    height_multiplier: f32,
    lod: u32,
    shading: ShadingMode,
) -> Result<MeshData, TessellationError> {
    let n = field.bordered_size();
    let stride = validate_stride(n, lod)?;

    // Sample lattice along one axis: the border ring plus every stride-th
    // interior line. (n - 2) % stride == 0 guarantees the lattice lands on
    // the far interior line exactly.
    let mut lattice: Vec<usize> = Vec::with_capacity((n - 2) / stride + 2);
    lattice.push(0);
    lattice.extend((stride..=n - 2).step_by(stride));
    lattice.push(n - 1);
    let lines = lattice.len();

    let world_size = (n - 3) as f32;
    let top_left = Vec2::new(-world_size / 2.0, world_size / 2.0);
    let interior_span = (n - 2 - stride) as f32;

    let interior_count = (lines - 2) * (lines - 2);
    let border_count = lines * 4 - 4;
    let mut mesh = MeshData::with_counts(interior_count, border_count);

    // Signed vertex indices over the lattice: border ring counts down from
    // -1, interior counts up from 0, both in scan order.
    let mut index_map = vec![0i32; lines * lines];
    let mut interior_index = 0i32;
    let mut border_index = -1i32;
    for (row, &y) in lattice.iter().enumerate() {
        for (col, &x) in lattice.iter().enumerate() {
            let on_border = x == 0 || y == 0 || x == n - 1 || y == n - 1;
            index_map[row * lines + col] = if on_border {
                let index = border_index;
                border_index -= 1;
                index
            } else {
                let index = interior_index;
                interior_index += 1;
                index
            };
        }
    }

    for (row, &y) in lattice.iter().enumerate() {
        for (col, &x) in lattice.iter().enumerate() {
            let index = index_map[row * lines + col];
            let percent = Vec2::new(
                (x as f32 - stride as f32) / interior_span,
                (y as f32 - stride as f32) / interior_span,
            );
            let height = curve.evaluate(field.get(x, y)) * height_multiplier;
            let position = Vec3::new(
                top_left.x + percent.x * world_size,
                height,
                top_left.y - percent.y * world_size,
            );
            mesh.add_vertex(position, percent, index);

            if row < lines - 1 && col < lines - 1 {
                let a = index_map[row * lines + col];
                let b = index_map[row * lines + col + 1];
                let c = index_map[(row + 1) * lines + col];
                let d = index_map[(row + 1) * lines + col + 1];
                mesh.add_triangle(a, d, c);
                mesh.add_triangle(d, a, b);
            }
        }
    }

    Ok(match shading {
        ShadingMode::Smooth => {
            mesh.compute_smooth_normals();
            mesh
        }
        ShadingMode::Flat => mesh.into_flat_shaded(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::LinearCurve;
    use glam::Vec2 as GVec2;
    use strata_noise::{NoiseParams, NormalizeMode, generate};

    /// Bordered size with interior 12: strides 1, 2, 4, 6 all divide it.
    const SIZE: usize = 14;

    fn noisy_field(offset: GVec2) -> Heightfield {
        let params =
            NoiseParams::new(7, 18.0, 4, 0.5, 2.0, offset, NormalizeMode::Global).unwrap();
        generate(SIZE, SIZE, &params)
    }

    #[test]
    fn test_stride_for_lod_mapping() {
        assert_eq!(stride_for_lod(0), 1);
        assert_eq!(stride_for_lod(1), 2);
        assert_eq!(stride_for_lod(3), 6);
    }

    #[test]
    fn test_validate_stride_rejects_uneven_division() {
        // Interior 11 is not divisible by stride 2.
        assert!(matches!(
            validate_stride(13, 1),
            Err(TessellationError::StrideMismatch { stride: 2, .. })
        ));
        assert!(validate_stride(14, 1).is_ok());
        assert!(validate_stride(14, 3).is_ok());
        // Stride 12 would leave a single interior line.
        assert!(matches!(
            validate_stride(14, 6),
            Err(TessellationError::TooCoarse { .. })
        ));
    }

    #[test]
    fn test_vertex_and_triangle_counts_at_lod0() {
        let mesh = tessellate(&noisy_field(GVec2::ZERO), &LinearCurve, 5.0, 0, ShadingMode::Smooth)
            .unwrap();
        // 12x12 interior vertices, 11x11 interior quads.
        assert_eq!(mesh.vertex_count(), 144);
        assert_eq!(mesh.triangle_count(), 11 * 11 * 2);
        assert_eq!(mesh.border_vertex_count(), 14 * 4 - 4);
        assert!(mesh.border_triangle_count() > 0);
    }

    #[test]
    fn test_higher_lod_reduces_vertices_but_keeps_extent() {
        let field = noisy_field(GVec2::ZERO);
        let fine = tessellate(&field, &LinearCurve, 5.0, 0, ShadingMode::Smooth).unwrap();
        let coarse = tessellate(&field, &LinearCurve, 5.0, 2, ShadingMode::Smooth).unwrap();
        assert!(coarse.vertex_count() < fine.vertex_count());

        let extent = |mesh: &MeshData| {
            mesh.positions()
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), p| {
                    (min.min(p.x), max.max(p.x))
                })
        };
        let (fine_min, fine_max) = extent(&fine);
        let (coarse_min, coarse_max) = extent(&coarse);
        assert!((fine_min - coarse_min).abs() < 1e-5);
        assert!((fine_max - coarse_max).abs() < 1e-5);
    }

    #[test]
    fn test_renderable_indices_reference_interior_only() {
        let mesh = tessellate(&noisy_field(GVec2::ZERO), &LinearCurve, 5.0, 1, ShadingMode::Smooth)
            .unwrap();
        let count = mesh.vertex_count() as u32;
        for &index in mesh.indices() {
            assert!(index < count, "index {index} out of interior range {count}");
        }
    }

    #[test]
    fn test_smooth_normals_are_unit_length() {
        let mesh = tessellate(&noisy_field(GVec2::ZERO), &LinearCurve, 8.0, 0, ShadingMode::Smooth)
            .unwrap();
        for n in mesh.normals() {
            assert!((n.length() - 1.0).abs() < 1e-4, "normal {n:?} not normalized");
        }
    }

    #[test]
    fn test_adjacent_chunk_seam_normals_match_at_lod0() {
        // Two chunks one interior-size apart along +x, generated
        // independently; normals along the shared edge must agree because
        // each chunk's border ring mirrors the neighbor's samples.
        let interior = (SIZE - 3) as f32;
        let left = tessellate(
            &noisy_field(GVec2::ZERO),
            &LinearCurve,
            8.0,
            0,
            ShadingMode::Smooth,
        )
        .unwrap();
        let right = tessellate(
            &noisy_field(GVec2::new(interior, 0.0)),
            &LinearCurve,
            8.0,
            0,
            ShadingMode::Smooth,
        )
        .unwrap();

        // Interior vertices form a 12x12 scan-order grid; the left chunk's
        // last column pairs with the right chunk's first column.
        let per_line = SIZE - 2;
        for row in 0..per_line {
            let a = left.normals()[row * per_line + (per_line - 1)];
            let b = right.normals()[row * per_line];
            assert!(
                (a - b).length() < 1e-3,
                "seam normal mismatch at row {row}: {a:?} vs {b:?}"
            );
        }
    }

    #[test]
    fn test_flat_shading_discards_border_and_duplicates() {
        let mesh = tessellate(&noisy_field(GVec2::ZERO), &LinearCurve, 5.0, 0, ShadingMode::Flat)
            .unwrap();
        assert_eq!(mesh.border_vertex_count(), 0);
        assert_eq!(mesh.vertex_count(), mesh.triangle_count() * 3);
    }

    #[test]
    fn test_height_multiplier_scales_heights() {
        let field = noisy_field(GVec2::ZERO);
        let low = tessellate(&field, &LinearCurve, 1.0, 0, ShadingMode::Smooth).unwrap();
        let high = tessellate(&field, &LinearCurve, 10.0, 0, ShadingMode::Smooth).unwrap();
        for (a, b) in low.positions().iter().zip(high.positions()) {
            assert!((a.y * 10.0 - b.y).abs() < 1e-4);
        }
    }
}
