//! Heightfield tessellation: LOD strides, border-stitched seam normals,
//! caller-supplied height remap curves, and height-band texture weights.

mod bands;
mod curve;
mod mesh_data;
mod tessellator;

pub use bands::{BandWeights, HeightBand, band_weights};
pub use curve::{HeightCurve, LinearCurve, PiecewiseCurve};
pub use mesh_data::{MeshData, ShadingMode};
pub use tessellator::{TessellationError, stride_for_lod, tessellate, validate_stride};
