//! Builds buckets from vector tiles on worker threads.

mod process_circle;
mod transferables;

pub use process_circle::{
    process_circle_layer, process_circle_tile, CircleTileRequest, ProcessCircleError,
};
pub use transferables::{BucketMessage, Context, SendError};
