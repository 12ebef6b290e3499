//! Collects the features of a geozero datasource, for example a layer of a Mapbox Vector Tile.

use geozero::{
    error::GeozeroError, ColumnValue, FeatureProcessor, GeomProcessor, PropertyProcessor,
};
use serde_json::Value;

use crate::geometry::{
    FeatureType, GeometryCoordinate, GeometryCoordinates, PropertyMap, VectorGeometryTileFeature,
};

type GeoResult<T> = geozero::error::Result<T>;

/// Builds [`VectorGeometryTileFeature`]s from processing events. Coordinates are expected to be
/// in tile space, as produced by the MVT reader.
#[derive(Default)]
pub struct FeatureCollector {
    features: Vec<VectorGeometryTileFeature>,

    feature_type: FeatureType,
    properties: PropertyMap,
    geometry: Vec<GeometryCoordinates>,
    in_multipoint: bool,
}

impl FeatureCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn features(&self) -> &[VectorGeometryTileFeature] {
        &self.features
    }

    pub fn into_features(self) -> Vec<VectorGeometryTileFeature> {
        self.features
    }

    fn begin_part(&mut self, feature_type: FeatureType, size: usize) {
        if self.feature_type == FeatureType::Unknown {
            self.feature_type = feature_type;
        }
        self.geometry.push(GeometryCoordinates(Vec::with_capacity(size)));
    }
}

fn to_tile_coordinate(value: f64) -> i16 {
    value.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

fn column_to_json(value: &ColumnValue) -> Value {
    match value {
        ColumnValue::Byte(v) => Value::from(*v),
        ColumnValue::UByte(v) => Value::from(*v),
        ColumnValue::Bool(v) => Value::from(*v),
        ColumnValue::Short(v) => Value::from(*v),
        ColumnValue::UShort(v) => Value::from(*v),
        ColumnValue::Int(v) => Value::from(*v),
        ColumnValue::UInt(v) => Value::from(*v),
        ColumnValue::Long(v) => Value::from(*v),
        ColumnValue::ULong(v) => Value::from(*v),
        ColumnValue::Float(v) => Value::from(*v),
        ColumnValue::Double(v) => Value::from(*v),
        ColumnValue::String(v) | ColumnValue::DateTime(v) => Value::from(*v),
        ColumnValue::Json(v) => serde_json::from_str(v).unwrap_or_else(|_| Value::from(*v)),
        _ => Value::Null,
    }
}

impl GeomProcessor for FeatureCollector {
    fn xy(&mut self, x: f64, y: f64, _idx: usize) -> GeoResult<()> {
        let Some(part) = self.geometry.last_mut() else {
            return Err(GeozeroError::Geometry(
                "coordinate outside of a geometry".to_string(),
            ));
        };
        part.0.push(GeometryCoordinate::new(
            to_tile_coordinate(x),
            to_tile_coordinate(y),
        ));
        Ok(())
    }

    fn point_begin(&mut self, _idx: usize) -> GeoResult<()> {
        if !self.in_multipoint {
            self.begin_part(FeatureType::Point, 1);
        }
        Ok(())
    }

    fn multipoint_begin(&mut self, size: usize, _idx: usize) -> GeoResult<()> {
        self.in_multipoint = true;
        self.begin_part(FeatureType::Point, size);
        Ok(())
    }

    fn multipoint_end(&mut self, _idx: usize) -> GeoResult<()> {
        self.in_multipoint = false;
        Ok(())
    }

    fn linestring_begin(&mut self, _tagged: bool, size: usize, _idx: usize) -> GeoResult<()> {
        self.begin_part(FeatureType::LineString, size);
        Ok(())
    }

    fn polygon_begin(&mut self, _tagged: bool, _size: usize, _idx: usize) -> GeoResult<()> {
        // rings are reported as linestrings
        self.feature_type = FeatureType::Polygon;
        Ok(())
    }
}

impl PropertyProcessor for FeatureCollector {
    fn property(&mut self, _idx: usize, name: &str, value: &ColumnValue) -> GeoResult<bool> {
        self.properties
            .insert(name.to_string(), column_to_json(value));
        Ok(false)
    }
}

impl FeatureProcessor for FeatureCollector {
    fn feature_begin(&mut self, _idx: u64) -> GeoResult<()> {
        self.feature_type = FeatureType::Unknown;
        self.properties = PropertyMap::new();
        self.geometry = Vec::new();
        self.in_multipoint = false;
        Ok(())
    }

    fn feature_end(&mut self, _idx: u64) -> GeoResult<()> {
        let feature = VectorGeometryTileFeature {
            feature_type: self.feature_type,
            id: None,
            properties: std::mem::take(&mut self.properties),
            geometry: std::mem::take(&mut self.geometry),
        };
        self.features.push(feature);
        Ok(())
    }
}
