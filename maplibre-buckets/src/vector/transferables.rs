use std::{
    fmt::{Debug, Formatter},
    sync::mpsc,
};

use thiserror::Error;

use crate::{buckets::Bucket, coords::WorldTileCoords};

/// Results which a worker sends to the render thread. Buckets are moved, never shared.
pub enum BucketMessage<B> {
    LayerBucketed {
        coords: WorldTileCoords,
        layer_name: String,
        bucket: Bucket<B>,
    },
    LayerMissing {
        coords: WorldTileCoords,
        layer_name: String,
    },
    TileFinished {
        coords: WorldTileCoords,
    },
}

impl<B> BucketMessage<B> {
    pub fn coords(&self) -> WorldTileCoords {
        match self {
            BucketMessage::LayerBucketed { coords, .. }
            | BucketMessage::LayerMissing { coords, .. }
            | BucketMessage::TileFinished { coords } => *coords,
        }
    }
}

impl<B> Debug for BucketMessage<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BucketMessage::LayerBucketed {
                coords, layer_name, ..
            } => write!(f, "LayerBucketed({coords}, {layer_name})"),
            BucketMessage::LayerMissing { coords, layer_name } => {
                write!(f, "LayerMissing({coords}, {layer_name})")
            }
            BucketMessage::TileFinished { coords } => write!(f, "TileFinished({coords})"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("the receiving side of the context was dropped")]
    Disconnected,
}

/// The channel through which results leave a worker.
pub trait Context<B> {
    fn send(&self, message: BucketMessage<B>) -> Result<(), SendError>;
}

impl<B> Context<B> for mpsc::Sender<BucketMessage<B>> {
    fn send(&self, message: BucketMessage<B>) -> Result<(), SendError> {
        mpsc::Sender::send(self, message).map_err(|_| SendError::Disconnected)
    }
}
