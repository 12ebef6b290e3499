//! Reading features from decoded vector tiles.

pub mod feature_collector;

pub use feature_collector::FeatureCollector;
