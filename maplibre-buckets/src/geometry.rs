//! Geometry and features of a decoded vector tile layer.
//! Features are consumed through the [`GeometryTileFeature`] trait, so they can be backed by
//! vector tiles or any other decoded source.

use std::{collections::HashMap, ops::Index};

use crate::{coords::TileSpace, euclid::Point2D};

/// A coordinate within a tile. Valid coordinates are within `0..EXTENT_UINT`.
pub type GeometryCoordinate = Point2D<i16, TileSpace>;

#[derive(Default, Clone, Debug, PartialEq)]
pub struct GeometryCoordinates(pub Vec<GeometryCoordinate>);

impl GeometryCoordinates {
    pub fn from_points(points: &[(i16, i16)]) -> Self {
        GeometryCoordinates(
            points
                .iter()
                .map(|(x, y)| GeometryCoordinate::new(*x, *y))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeometryCoordinate> {
        self.0.iter()
    }
}

impl Index<usize> for GeometryCoordinates {
    type Output = GeometryCoordinate;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// The rings, lines or point groups of a feature. For point features every entry holds the
/// points of one (multi-)point.
pub type GeometryCollection = Vec<GeometryCoordinates>;

pub type PropertyMap = HashMap<String, serde_json::Value>;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FeatureType {
    #[default]
    Unknown = 0,
    Point = 1,
    LineString = 2,
    Polygon = 3,
}

pub trait GeometryTileFeature {
    fn feature_type(&self) -> FeatureType;

    /// Returns the property with the given key.
    fn value(&self, key: &str) -> Option<&serde_json::Value>;

    fn id(&self) -> Option<u64>;

    fn geometries(&self) -> &GeometryCollection;
}

/// A feature of a vector tile layer which owns its geometry and properties.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct VectorGeometryTileFeature {
    pub feature_type: FeatureType,
    pub id: Option<u64>,
    pub properties: PropertyMap,
    pub geometry: GeometryCollection,
}

impl VectorGeometryTileFeature {
    pub fn new(feature_type: FeatureType, geometry: GeometryCollection) -> Self {
        Self {
            feature_type,
            id: None,
            properties: PropertyMap::new(),
            geometry,
        }
    }

    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }
}

impl GeometryTileFeature for VectorGeometryTileFeature {
    fn feature_type(&self) -> FeatureType {
        self.feature_type
    }

    fn value(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn geometries(&self) -> &GeometryCollection {
        &self.geometry
    }
}
