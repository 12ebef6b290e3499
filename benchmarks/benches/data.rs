use criterion::{criterion_group, criterion_main, Criterion};
use maplibre_buckets::{
    buckets::CircleBucket,
    geometry::{FeatureType, GeometryCoordinates, VectorGeometryTileFeature},
    settings::BucketSettings,
    style::{CirclePaint, CirclePaintProperties},
};
use serde_json::json;

const FEATURE_COUNT: i32 = 20_000;

fn features() -> Vec<VectorGeometryTileFeature> {
    (0..FEATURE_COUNT)
        .map(|i| {
            VectorGeometryTileFeature::new(
                FeatureType::Point,
                vec![GeometryCoordinates::from_points(&[(
                    (i % 4096) as i16,
                    (i / 4096) as i16,
                )])],
            )
            .with_property("size", i % 10)
            .with_property("class", if i % 2 == 0 { "park" } else { "school" })
        })
        .collect()
}

fn build(properties: &CirclePaintProperties, features: &[VectorGeometryTileFeature]) {
    let mut bucket: CircleBucket<wgpu::Buffer> =
        CircleBucket::new(properties, 14.0, &BucketSettings::default());
    for feature in features {
        bucket.add_feature(feature, &feature.geometry);
    }
    assert!(bucket.has_data());
}

fn bench_circle_bucket(c: &mut Criterion) {
    let features = features();

    let constant = CirclePaintProperties::default();
    c.bench_function("circle_bucket_constant_paint", |b| {
        b.iter(|| build(&constant, &features))
    });

    let paint: CirclePaint = serde_json::from_value(json!({
        "circle-radius": ["interpolate", ["linear"], ["zoom"], 10, ["get", "size"], 16, 20],
        "circle-color": ["match", ["get", "class"], "park", "#00ff00", "#ff0000"]
    }))
    .unwrap();
    let data_driven = paint.evaluate(14.0).unwrap();
    c.bench_function("circle_bucket_data_driven_paint", |b| {
        b.iter(|| build(&data_driven, &features))
    });
}

criterion_group!(benches, bench_circle_bucket);
criterion_main!(benches);
