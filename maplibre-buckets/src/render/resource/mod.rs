//! Utilities which holds references to GPU-owned. Usually a resource is a wrapper which makes using
//! buffers or render passes simpler.

pub use shader::*;
pub use tracked_render_pass::*;

mod shader;
mod tracked_render_pass;

use crate::error::Error;

/// Creates device-side buffers. Implemented for [`wgpu::Device`], other implementations allow
/// running the upload path without a GPU.
pub trait UploadContext {
    type Buffer;

    /// Creates a buffer which is initialized with `contents`.
    fn upload_buffer(
        &self,
        label: &'static str,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> Result<Self::Buffer, Error>;
}

impl UploadContext for wgpu::Device {
    type Buffer = wgpu::Buffer;

    fn upload_buffer(
        &self,
        label: &'static str,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> Result<Self::Buffer, Error> {
        // Allocation failures are reported through the error scopes of the device
        Ok(wgpu::util::DeviceExt::create_buffer_init(
            self,
            &wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            },
        ))
    }
}
