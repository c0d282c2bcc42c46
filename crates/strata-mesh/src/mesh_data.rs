//! Mesh buffers with a parallel border vertex set in negative index space.

use glam::{Vec2, Vec3};

/// Per-vertex normal policy for a tessellated surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShadingMode {
    /// Accumulate face normals (border triangles included) into shared
    /// vertices; seams between independently generated chunks match.
    #[default]
    Smooth,
    /// Duplicate vertices per triangle and bake one face normal onto each
    /// duplicate; border data is unused.
    Flat,
}

/// Triangulated surface produced by the tessellator.
///
/// Interior vertices carry non-negative indices and form the renderable
/// surface. Border vertices live in a parallel buffer addressed by negative
/// indices (`-1` is border slot 0); triangles touching them are kept only
/// for normal accumulation and never emitted in [`MeshData::indices`].
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    vertices: Vec<Vec3>,
    uvs: Vec<Vec2>,
    normals: Vec<Vec3>,
    triangles: Vec<u32>,

    border_vertices: Vec<Vec3>,
    border_triangles: Vec<i32>,
}

impl MeshData {
    /// Allocate buffers for a mesh with the given interior and border
    /// vertex counts.
    pub fn with_counts(interior_vertices: usize, border_vertices: usize) -> Self {
        Self {
            vertices: vec![Vec3::ZERO; interior_vertices],
            uvs: vec![Vec2::ZERO; interior_vertices],
            normals: Vec::new(),
            triangles: Vec::new(),
            border_vertices: vec![Vec3::ZERO; border_vertices],
            border_triangles: Vec::new(),
        }
    }

    /// Store a vertex at a signed lattice index. Border vertices (negative
    /// index) keep only their position; UVs apply to interior vertices.
    pub fn add_vertex(&mut self, position: Vec3, uv: Vec2, index: i32) {
        if index < 0 {
            self.border_vertices[(-index - 1) as usize] = position;
        } else {
            self.vertices[index as usize] = position;
            self.uvs[index as usize] = uv;
        }
    }

    /// Append a triangle. A triple touching the border index space is
    /// routed to the border list and contributes to normals only.
    pub fn add_triangle(&mut self, a: i32, b: i32, c: i32) {
        if a < 0 || b < 0 || c < 0 {
            self.border_triangles.extend_from_slice(&[a, b, c]);
        } else {
            self.triangles
                .extend_from_slice(&[a as u32, b as u32, c as u32]);
        }
    }

    fn point(&self, index: i32) -> Vec3 {
        if index < 0 {
            self.border_vertices[(-index - 1) as usize]
        } else {
            self.vertices[index as usize]
        }
    }

    fn face_normal(&self, a: i32, b: i32, c: i32) -> Vec3 {
        let point_a = self.point(a);
        let ab = self.point(b) - point_a;
        let ac = self.point(c) - point_a;
        ab.cross(ac).normalize_or_zero()
    }

    /// Bake smooth per-vertex normals from interior and border triangles.
    pub fn compute_smooth_normals(&mut self) {
        let mut accumulated = vec![Vec3::ZERO; self.vertices.len()];

        for triple in self.triangles.chunks_exact(3) {
            let (a, b, c) = (triple[0] as i32, triple[1] as i32, triple[2] as i32);
            let normal = self.face_normal(a, b, c);
            accumulated[a as usize] += normal;
            accumulated[b as usize] += normal;
            accumulated[c as usize] += normal;
        }

        for triple in self.border_triangles.chunks_exact(3) {
            let normal = self.face_normal(triple[0], triple[1], triple[2]);
            for &index in triple {
                if index >= 0 {
                    accumulated[index as usize] += normal;
                }
            }
        }

        self.normals = accumulated
            .into_iter()
            .map(Vec3::normalize_or_zero)
            .collect();
    }

    /// Rebuild as a flat-shaded mesh: every triangle gets three unique
    /// vertices carrying the face normal. Border data is dropped.
    pub fn into_flat_shaded(self) -> MeshData {
        let triangle_count = self.triangles.len() / 3;
        let mut flat = MeshData {
            vertices: Vec::with_capacity(triangle_count * 3),
            uvs: Vec::with_capacity(triangle_count * 3),
            normals: Vec::with_capacity(triangle_count * 3),
            triangles: Vec::with_capacity(triangle_count * 3),
            border_vertices: Vec::new(),
            border_triangles: Vec::new(),
        };

        for triple in self.triangles.chunks_exact(3) {
            let normal =
                self.face_normal(triple[0] as i32, triple[1] as i32, triple[2] as i32);
            for &index in triple {
                flat.triangles.push(flat.vertices.len() as u32);
                flat.vertices.push(self.vertices[index as usize]);
                flat.uvs.push(self.uvs[index as usize]);
                flat.normals.push(normal);
            }
        }

        flat
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Renderable triangle indices; never references border vertices.
    pub fn indices(&self) -> &[u32] {
        &self.triangles
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn border_vertex_count(&self) -> usize {
        self.border_vertices.len()
    }

    pub fn border_triangle_count(&self) -> usize {
        self.border_triangles.len() / 3
    }
}
