//! Device-facing types: vertex records, uniform blocks and the seams through which buckets
//! upload buffers and issue draw calls.

pub mod eventually;
pub mod resource;
pub mod shaders;

pub use crate::tessellation::INDEX_FORMAT;

/// The result of issuing the draw calls of a bucket.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderCommandResult {
    Success,
    Failure,
}
