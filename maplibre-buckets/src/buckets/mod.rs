//! Buckets hold the GPU-ready geometry of one style layer within one tile.

pub mod circle_bucket;
pub mod paint_property_binder;

pub use circle_bucket::{CircleBucket, CircleBuffers};
pub use paint_property_binder::{CirclePaintPropertyBinders, PaintPropertyBinder};

use crate::{
    error::Error,
    render::{
        resource::{DrawPass, UploadContext},
        RenderCommandResult,
    },
};

/// Capabilities the render thread needs from any kind of bucket.
pub trait RenderBucket<B> {
    fn has_data(&self) -> bool;

    fn needs_upload(&self) -> bool;

    fn upload(&mut self, context: &dyn UploadContext<Buffer = B>) -> Result<(), Error>;

    fn render<'a>(&'a self, pass: &mut dyn DrawPass<'a, Buffer = B>) -> RenderCommandResult
    where
        B: 'a;
}

impl<B> RenderBucket<B> for CircleBucket<B> {
    fn has_data(&self) -> bool {
        CircleBucket::has_data(self)
    }

    fn needs_upload(&self) -> bool {
        CircleBucket::needs_upload(self)
    }

    fn upload(&mut self, context: &dyn UploadContext<Buffer = B>) -> Result<(), Error> {
        CircleBucket::upload(self, context)
    }

    fn render<'a>(&'a self, pass: &mut dyn DrawPass<'a, Buffer = B>) -> RenderCommandResult
    where
        B: 'a,
    {
        CircleBucket::render(self, pass)
    }
}

/// All kinds of buckets.
pub enum Bucket<B> {
    Circle(CircleBucket<B>),
}

impl<B> Bucket<B> {
    pub fn as_circle(&self) -> Option<&CircleBucket<B>> {
        match self {
            Bucket::Circle(bucket) => Some(bucket),
        }
    }
}

impl<B> From<CircleBucket<B>> for Bucket<B> {
    fn from(bucket: CircleBucket<B>) -> Self {
        Bucket::Circle(bucket)
    }
}

impl<B> RenderBucket<B> for Bucket<B> {
    fn has_data(&self) -> bool {
        match self {
            Bucket::Circle(bucket) => bucket.has_data(),
        }
    }

    fn needs_upload(&self) -> bool {
        match self {
            Bucket::Circle(bucket) => bucket.needs_upload(),
        }
    }

    fn upload(&mut self, context: &dyn UploadContext<Buffer = B>) -> Result<(), Error> {
        match self {
            Bucket::Circle(bucket) => bucket.upload(context),
        }
    }

    fn render<'a>(&'a self, pass: &mut dyn DrawPass<'a, Buffer = B>) -> RenderCommandResult
    where
        B: 'a,
    {
        match self {
            Bucket::Circle(bucket) => bucket.render(pass),
        }
    }
}
