//! Provides utilities related to coordinates.

use std::{
    fmt,
    fmt::{Display, Formatter},
};

use serde::{Deserialize, Serialize};

/// The default extent of vector tiles.
pub const EXTENT_UINT: u32 = 4096;

/// The unit in which geometries are placed on a tile (0-EXTENT).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileSpace;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoomLevel(u8);

impl ZoomLevel {
    pub const fn new(z: u8) -> Self {
        ZoomLevel(z)
    }
}

impl Display for ZoomLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ZoomLevel> for u8 {
    fn from(zoom_level: ZoomLevel) -> Self {
        zoom_level.0
    }
}

impl From<ZoomLevel> for f32 {
    fn from(zoom_level: ZoomLevel) -> Self {
        zoom_level.0 as f32
    }
}

/// Every tile has tile coordinates. Every tile coordinate can be mapped to a coordinate within
/// the world. This provides the freedom to map from [TMS](https://wiki.openstreetmap.org/wiki/TMS)
/// tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldTileCoords {
    pub x: i32,
    pub y: i32,
    pub z: ZoomLevel,
}

impl From<(i32, i32, ZoomLevel)> for WorldTileCoords {
    fn from(tuple: (i32, i32, ZoomLevel)) -> Self {
        WorldTileCoords {
            x: tuple.0,
            y: tuple.1,
            z: tuple.2,
        }
    }
}

impl Display for WorldTileCoords {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "WorldTileCoords(x={}, y={}, z={})", self.x, self.y, self.z)
    }
}
