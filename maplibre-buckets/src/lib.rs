//! # maplibre-buckets
//!
//! Builds GPU-ready geometry for style layers of vector tiles. A bucket collects the features of
//! one style layer within one tile, tessellates them into vertex and index buffers, splits these
//! into draw-call sized segments and binds data-driven paint properties per vertex.
//!
//! Buckets are built on a worker thread and then moved to the render thread, which uploads them
//! to the GPU and issues the draw calls. Currently circle layers are supported.
//!
//! ### Example
//!
//! ```rust
//! use maplibre_buckets::{
//!     buckets::CircleBucket,
//!     geometry::{FeatureType, GeometryCoordinates, VectorGeometryTileFeature},
//!     settings::BucketSettings,
//!     style::CirclePaint,
//! };
//!
//! let paint = CirclePaint::default().evaluate(14.0).unwrap();
//! let mut bucket: CircleBucket<wgpu::Buffer> =
//!     CircleBucket::new(&paint, 14.0, &BucketSettings::default());
//!
//! let feature = VectorGeometryTileFeature::new(
//!     FeatureType::Point,
//!     vec![GeometryCoordinates::from_points(&[(100, 200)])],
//! );
//! bucket.add_feature(&feature, &feature.geometry);
//! assert!(bucket.has_data());
//! ```

pub mod buckets;
pub mod coords;
pub mod error;
pub mod geometry;
pub mod io;
pub mod render;
pub mod settings;
pub mod style;
pub mod tessellation;
pub mod vector;

pub use lyon::geom::euclid;
