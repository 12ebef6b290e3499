//! Tessellation for circles is implemented here.

pub mod circle_tessellator;
pub mod segment;

pub use circle_tessellator::CircleTessellator;
pub use segment::{Segment, SegmentVector};

/// Vertex buffers index data type.
pub type IndexDataType = u16; // Must match INDEX_FORMAT

pub const INDEX_FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint16;

/// The amount of vertices a single segment can address with [`IndexDataType`] indices.
pub const MAX_SEGMENT_VERTICES: usize = IndexDataType::MAX as usize + 1;

/// Vertices emitted per point.
pub const QUAD_VERTICES: usize = 4;
/// Indices emitted per point (two triangles).
pub const QUAD_INDICES: usize = 6;
