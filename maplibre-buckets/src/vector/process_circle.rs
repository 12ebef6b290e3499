use geozero::{
    mvt::{tile, Message},
    GeozeroDatasource,
};
use thiserror::Error;

use crate::{
    buckets::CircleBucket,
    coords::WorldTileCoords,
    geometry::GeometryTileFeature,
    io::FeatureCollector,
    settings::BucketSettings,
    style::StyleLayer,
    vector::transferables::{BucketMessage, Context, SendError},
};

#[derive(Error, Debug)]
pub enum ProcessCircleError {
    /// Sending of results failed
    #[error("sending data back through context failed")]
    Send(#[from] SendError),
    #[error("decoding tile failed: {0}")]
    Decode(String),
}

/// A request to build the circle buckets of a tile.
pub struct CircleTileRequest {
    pub coords: WorldTileCoords,
    pub layers: Vec<StyleLayer>,
    pub settings: BucketSettings,
}

/// Builds a bucket for every circle style layer of the request and sends it through `context`.
/// Style layers which can not be bucketed are reported as missing. The tile is always finished
/// unless sending fails.
#[tracing::instrument(skip_all)]
pub fn process_circle_tile<B, C: Context<B>>(
    data: &[u8],
    request: &CircleTileRequest,
    context: &C,
) -> Result<(), ProcessCircleError> {
    let mut tile =
        geozero::mvt::Tile::decode(data).map_err(|e| ProcessCircleError::Decode(e.to_string()))?;
    let coords = request.coords;

    for style_layer in &request.layers {
        if style_layer.type_ != "circle" {
            continue;
        }

        let source_layer = style_layer
            .source_layer
            .as_deref()
            .unwrap_or(style_layer.id.as_str());

        match tile
            .layers
            .iter_mut()
            .find(|layer| layer.name == source_layer)
        {
            Some(layer) => {
                process_circle_layer(coords, style_layer, layer, &request.settings, context)?
            }
            None => {
                tracing::info!("requested layer {source_layer} at {coords} not found in tile");
                layer_missing(coords, style_layer, context)?;
            }
        }
    }

    tracing::info!("circle buckets at {coords} finished");
    context.send(BucketMessage::TileFinished { coords })?;

    Ok(())
}

/// Builds the bucket of a single circle style layer from the features of `layer`. If the paint
/// or the features of the layer are invalid, the layer is reported as missing. Only failing to
/// send is returned as an error.
#[tracing::instrument(skip_all, fields(layer = %style_layer.id))]
pub fn process_circle_layer<B, C: Context<B>>(
    coords: WorldTileCoords,
    style_layer: &StyleLayer,
    layer: &mut tile::Layer,
    settings: &BucketSettings,
    context: &C,
) -> Result<(), ProcessCircleError> {
    let Some(paint) = style_layer.circle_paint() else {
        tracing::error!("layer {} at {coords} has no valid circle paint", style_layer.id);
        return layer_missing(coords, style_layer, context);
    };

    let zoom = f32::from(coords.z);
    let properties = match paint.evaluate(zoom) {
        Ok(properties) => properties,
        Err(e) => {
            tracing::error!("layer {} at {coords} paint evaluation failed {e:?}", style_layer.id);
            return layer_missing(coords, style_layer, context);
        }
    };

    let mut collector = FeatureCollector::new();
    if let Err(e) = layer.process(&mut collector) {
        tracing::error!("layer {} at {coords} processing failed {e:?}", layer.name);
        return layer_missing(coords, style_layer, context);
    }

    let mut bucket = CircleBucket::new(&properties, zoom, settings);
    for feature in collector.features() {
        bucket.add_feature(feature, feature.geometries());
    }

    context.send(BucketMessage::LayerBucketed {
        coords,
        layer_name: style_layer.id.clone(),
        bucket: bucket.into(),
    })?;

    Ok(())
}

fn layer_missing<B, C: Context<B>>(
    coords: WorldTileCoords,
    style_layer: &StyleLayer,
    context: &C,
) -> Result<(), ProcessCircleError> {
    context.send(BucketMessage::LayerMissing {
        coords,
        layer_name: style_layer.id.clone(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, thread};

    use serde_json::json;

    use crate::{
        buckets::{
            paint_property_binder::tests::{TestBuffer, TestContext},
            RenderBucket,
        },
        coords::{WorldTileCoords, ZoomLevel},
        io::feature_collector::tests::POINT_TILE,
        settings::BucketSettings,
        style::StyleLayer,
        vector::{
            process_circle::{process_circle_tile, CircleTileRequest, ProcessCircleError},
            transferables::BucketMessage,
        },
    };

    fn request(layers: serde_json::Value) -> CircleTileRequest {
        CircleTileRequest {
            coords: (3, 5, ZoomLevel::new(12)).into(),
            layers: serde_json::from_value::<Vec<StyleLayer>>(layers).unwrap(),
            settings: BucketSettings::default(),
        }
    }

    #[test]
    fn test_buckets_are_moved_to_render_thread() {
        let (sender, receiver) = mpsc::channel::<BucketMessage<TestBuffer>>();

        let worker = thread::spawn(move || {
            let request = request(json!([
                {
                    "id": "parks",
                    "type": "circle",
                    "source-layer": "poi",
                    "paint": {"circle-radius": ["match", ["get", "class"], "park", 8, 2]}
                },
                {"id": "roads", "type": "circle", "source-layer": "transportation"},
                {"id": "water", "type": "fill", "source-layer": "water"}
            ]));
            process_circle_tile(POINT_TILE, &request, &sender).is_ok()
        });
        assert!(worker.join().unwrap());

        let messages: Vec<_> = receiver.try_iter().collect();
        assert_eq!(messages.len(), 3);

        let mut bucket = match messages.into_iter().next() {
            Some(BucketMessage::LayerBucketed {
                layer_name, bucket, ..
            }) => {
                assert_eq!(layer_name, "parks");
                bucket
            }
            other => panic!("unexpected message {other:?}"),
        };

        let circles = bucket.as_circle().unwrap();
        assert_eq!(circles.vertices().len(), 4);
        assert_eq!(circles.vertices()[0].position, [25, 17]);
        assert_eq!(
            circles
                .paint_property_binders()
                .get("circle-radius")
                .unwrap()
                .vertex_len(),
            4
        );

        let context = TestContext::default();
        bucket.upload(&context).unwrap();
        assert_eq!(context.upload_count(), 3);
    }

    #[test]
    fn test_missing_layers_are_reported() {
        let (sender, receiver) = mpsc::channel::<BucketMessage<TestBuffer>>();
        let request = request(json!([
            {"id": "roads", "type": "circle", "source-layer": "transportation"}
        ]));

        process_circle_tile(POINT_TILE, &request, &sender).unwrap();

        let messages: Vec<_> = receiver.try_iter().collect();
        assert!(matches!(
            messages.as_slice(),
            [
                BucketMessage::LayerMissing { layer_name, .. },
                BucketMessage::TileFinished { .. }
            ] if layer_name == "roads"
        ));
        assert_eq!(
            messages[1].coords(),
            WorldTileCoords::from((3, 5, ZoomLevel::new(12)))
        );
    }

    #[test]
    fn test_invalid_layers_do_not_abort_tile() {
        let (sender, receiver) = mpsc::channel::<BucketMessage<TestBuffer>>();
        let request = request(json!([
            {
                "id": "broken",
                "type": "circle",
                "source-layer": "poi",
                "paint": {"circle-radius": ["sqrt", 4]}
            },
            {
                "id": "unreadable",
                "type": "circle",
                "source-layer": "poi",
                "paint": {"circle-translate": "left"}
            },
            {"id": "parks", "type": "circle", "source-layer": "poi"}
        ]));

        process_circle_tile(POINT_TILE, &request, &sender).unwrap();

        let messages: Vec<_> = receiver.try_iter().collect();
        assert_eq!(messages.len(), 4, "{messages:?}");
        assert!(matches!(
            &messages[0],
            BucketMessage::LayerMissing { layer_name, .. } if layer_name == "broken"
        ));
        assert!(matches!(
            &messages[1],
            BucketMessage::LayerMissing { layer_name, .. } if layer_name == "unreadable"
        ));
        match &messages[2] {
            BucketMessage::LayerBucketed {
                layer_name, bucket, ..
            } => {
                assert_eq!(layer_name, "parks");
                assert!(bucket.has_data());
            }
            other => panic!("unexpected message {other:?}"),
        }
        assert!(matches!(messages[3], BucketMessage::TileFinished { .. }));
    }

    #[test]
    fn test_dropped_receiver() {
        let (sender, receiver) = mpsc::channel::<BucketMessage<TestBuffer>>();
        drop(receiver);

        let result = process_circle_tile(POINT_TILE, &request(json!([])), &sender);
        assert!(matches!(result, Err(ProcessCircleError::Send(_))));
    }

    #[test]
    fn test_invalid_tile() {
        let (sender, _receiver) = mpsc::channel::<BucketMessage<TestBuffer>>();

        let result = process_circle_tile(&[0xff, 0xff], &request(json!([])), &sender);
        assert!(matches!(result, Err(ProcessCircleError::Decode(_))));
    }
}
