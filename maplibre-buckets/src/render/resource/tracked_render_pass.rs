//! A render pass which allows tracking, for example using a tracing framework.

use std::ops::Range;

use log::trace;

/// The draw calls which buckets issue. Implemented by [`TrackedRenderPass`] and by recording
/// passes in tests.
pub trait DrawPass<'a> {
    type Buffer: 'a;

    /// Assign a whole vertex buffer to a slot.
    fn set_vertex_buffer(&mut self, slot_index: u32, buffer: &'a Self::Buffer);

    /// Sets the active index buffer.
    fn set_index_buffer(&mut self, buffer: &'a Self::Buffer, index_format: wgpu::IndexFormat);

    /// Draws indexed primitives using the active index buffer and the active vertex buffer(s).
    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>);
}

/// A [`wgpu::RenderPass`] which traces all draw calls.
/// The pipeline and bind groups are set by the painter which owns this pass.
pub struct TrackedRenderPass<'a> {
    pass: wgpu::RenderPass<'a>,
}

impl<'a> TrackedRenderPass<'a> {
    /// Tracks the supplied render pass.
    pub fn new(pass: wgpu::RenderPass<'a>) -> Self {
        Self { pass }
    }

    /// Sets the active [`wgpu::RenderPipeline`].
    ///
    /// Subsequent draw calls will exhibit the behavior defined by the `pipeline`.
    pub fn set_render_pipeline(&mut self, pipeline: &'a wgpu::RenderPipeline) {
        trace!("set pipeline: {pipeline:?}");
        self.pass.set_pipeline(pipeline);
    }

    /// Sets the active [`wgpu::BindGroup`] for a given bind group index. The bind group layout in
    /// the active pipeline when any `draw()` function is called must match the layout of this
    /// `bind group`.
    pub fn set_bind_group(
        &mut self,
        index: usize,
        bind_group: &'a wgpu::BindGroup,
        dynamic_uniform_indices: &[u32],
    ) {
        self.pass
            .set_bind_group(index as u32, bind_group, dynamic_uniform_indices);
    }

    pub fn into_inner(self) -> wgpu::RenderPass<'a> {
        self.pass
    }
}

impl<'a> DrawPass<'a> for TrackedRenderPass<'a> {
    type Buffer = wgpu::Buffer;

    fn set_vertex_buffer(&mut self, slot_index: u32, buffer: &'a wgpu::Buffer) {
        trace!("set vertex buffer {slot_index}: {buffer:?}");
        self.pass.set_vertex_buffer(slot_index, buffer.slice(..));
    }

    fn set_index_buffer(&mut self, buffer: &'a wgpu::Buffer, index_format: wgpu::IndexFormat) {
        self.pass.set_index_buffer(buffer.slice(..), index_format);
    }

    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>) {
        trace!("draw indexed: {indices:?} {base_vertex} {instances:?}");
        self.pass.draw_indexed(indices, base_vertex, instances);
    }
}
