//! Settings for building buckets

use serde::{Deserialize, Serialize};

use crate::{coords::EXTENT_UINT, error::Error, tessellation::MAX_SEGMENT_VERTICES};

/// Defines how the map is rendered. Only continuously rendered maps drop geometry which lies
/// outside of the tile.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapMode {
    /// Continually updating map
    #[default]
    Continuous,
    /// A once-off still image of an arbitrary viewport
    Static,
    /// A once-off still image of a single tile
    Tile,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketSettings {
    max_vertices_per_segment: usize,
    mode: MapMode,
    extent: u32,
}

impl BucketSettings {
    /// Validates and creates settings.
    ///
    /// # Arguments
    ///
    /// * `max_vertices_per_segment` - Maximum amount of vertices a single draw call references.
    ///    Must be within `1..=65536` because indices are stored as `u16`.
    /// * `mode` - The [`MapMode`] the buckets are built for.
    pub fn new(max_vertices_per_segment: usize, mode: MapMode) -> Result<Self, Error> {
        let settings = Self {
            max_vertices_per_segment,
            mode,
            extent: EXTENT_UINT,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Changes the tile extent, which is used to drop geometry outside of a tile.
    pub fn with_extent(mut self, extent: u32) -> Result<Self, Error> {
        self.extent = extent;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_vertices_per_segment == 0
            || self.max_vertices_per_segment > MAX_SEGMENT_VERTICES
        {
            return Err(Error::Settings(format!(
                "max_vertices_per_segment must be within 1..={MAX_SEGMENT_VERTICES}, got {}",
                self.max_vertices_per_segment
            )));
        }

        if self.extent == 0 || self.extent > i16::MAX as u32 {
            return Err(Error::Settings(format!(
                "extent must be within 1..={}, got {}",
                i16::MAX,
                self.extent
            )));
        }

        Ok(())
    }

    pub fn max_vertices_per_segment(&self) -> usize {
        self.max_vertices_per_segment
    }

    pub fn mode(&self) -> MapMode {
        self.mode
    }

    pub fn extent(&self) -> u32 {
        self.extent
    }
}

impl Default for BucketSettings {
    fn default() -> Self {
        Self {
            max_vertices_per_segment: MAX_SEGMENT_VERTICES,
            mode: MapMode::default(),
            extent: EXTENT_UINT,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::settings::{BucketSettings, MapMode};

    #[test]
    fn test_default_is_valid() {
        let settings = BucketSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_vertices_per_segment(), 65536);
        assert_eq!(settings.mode(), MapMode::Continuous);
        assert_eq!(settings.extent(), 4096);
    }

    #[test]
    fn test_ceiling_out_of_range() {
        assert!(BucketSettings::new(0, MapMode::Continuous).is_err());
        assert!(BucketSettings::new(65537, MapMode::Continuous).is_err());
        assert!(BucketSettings::new(4, MapMode::Static).is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let settings: BucketSettings =
            serde_json::from_str(r#"{"mode": "Static", "max_vertices_per_segment": 1024}"#)
                .unwrap();
        assert_eq!(settings.mode(), MapMode::Static);
        assert_eq!(settings.max_vertices_per_segment(), 1024);
        assert_eq!(settings.extent(), 4096);
    }
}
