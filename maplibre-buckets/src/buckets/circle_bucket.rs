//! Buckets of circle layers.

use crate::{
    buckets::paint_property_binder::CirclePaintPropertyBinders,
    error::Error,
    geometry::{FeatureType, GeometryCollection, GeometryTileFeature},
    render::{
        eventually::Eventually,
        resource::{DrawPass, UploadContext, VertexBufferLayout},
        shaders::{CircleLayoutVertex, ShaderCirclePaint},
        RenderCommandResult, INDEX_FORMAT,
    },
    settings::{BucketSettings, MapMode},
    style::{Alignment, CirclePaintProperties},
    tessellation::{CircleTessellator, IndexDataType, SegmentVector},
};

/// Device buffers of an uploaded bucket.
pub struct CircleBuffers<B> {
    pub vertex_buffer: B,
    pub index_buffer: B,
}

/// Geometry and paint attributes of the circles of one style layer within one tile.
///
/// A bucket is filled on a worker through [`CircleBucket::add_feature`] and afterwards moved to
/// the render thread, which calls [`CircleBucket::upload`] and [`CircleBucket::render`].
pub struct CircleBucket<B> {
    mode: MapMode,
    tessellator: CircleTessellator,
    paint_property_binders: CirclePaintPropertyBinders<B>,
    translate: [f32; 2],
    translate_anchor: Alignment,
    pitch_scale: Alignment,
    pitch_alignment: Alignment,

    buffers: Eventually<CircleBuffers<B>>,
    /// Whether vertices were added since the last upload.
    dirty: bool,
}

impl<B> CircleBucket<B> {
    pub fn new(properties: &CirclePaintProperties, zoom: f32, settings: &BucketSettings) -> Self {
        Self {
            mode: settings.mode(),
            tessellator: CircleTessellator::new(settings),
            paint_property_binders: CirclePaintPropertyBinders::new(properties, zoom),
            translate: properties.translate,
            translate_anchor: properties.translate_anchor,
            pitch_scale: properties.pitch_scale,
            pitch_alignment: properties.pitch_alignment,
            buffers: Eventually::Uninitialized,
            dirty: false,
        }
    }

    /// Tessellates the points of `geometry` and evaluates the data-driven paint properties of
    /// `feature` for every vertex which was added. Features which are not points are ignored.
    pub fn add_feature(&mut self, feature: &dyn GeometryTileFeature, geometry: &GeometryCollection) {
        if feature.feature_type() != FeatureType::Point {
            tracing::trace!(
                "ignoring feature {:?} of type {:?} in circle bucket",
                feature.id(),
                feature.feature_type()
            );
            return;
        }

        let added = self.tessellator.tessellate_points(geometry);
        if added > 0 {
            self.dirty = true;
        }

        self.paint_property_binders
            .populate_vertex_vectors(feature, self.tessellator.buffer.vertices.len());
    }

    pub fn has_data(&self) -> bool {
        !self.tessellator.segments.is_empty()
    }

    pub fn needs_upload(&self) -> bool {
        self.has_data() && (!self.buffers.is_initialized() || self.dirty)
    }

    /// Creates the vertex, index and attribute buffers. Does nothing if the bucket is uploaded
    /// already and no features were added since.
    #[tracing::instrument(skip_all)]
    pub fn upload<C>(&mut self, context: &C) -> Result<(), Error>
    where
        C: UploadContext<Buffer = B> + ?Sized,
    {
        if !self.needs_upload() {
            return Ok(());
        }

        let vertex_buffer = context.upload_buffer(
            "circle vertex buffer",
            bytemuck::cast_slice(&self.tessellator.buffer.vertices),
            wgpu::BufferUsages::VERTEX,
        )?;
        let index_buffer = context.upload_buffer(
            "circle index buffer",
            bytemuck::cast_slice(&self.tessellator.buffer.indices),
            wgpu::BufferUsages::INDEX,
        )?;
        self.paint_property_binders.upload(context)?;

        self.buffers.set(CircleBuffers {
            vertex_buffer,
            index_buffer,
        });
        self.dirty = false;

        Ok(())
    }

    /// Binds the layout vertices at slot `0`, the data-driven attributes at the following slots
    /// and draws every segment. The pipeline and the paint uniforms have to be set by the caller.
    pub fn render<'a, P>(&'a self, pass: &mut P) -> RenderCommandResult
    where
        P: DrawPass<'a, Buffer = B> + ?Sized,
    {
        let Some(buffers) = self.buffers.as_ref() else {
            tracing::error!("circle bucket is rendered before it was uploaded");
            return RenderCommandResult::Failure;
        };

        if self.dirty {
            tracing::error!("circle bucket changed since it was uploaded");
            return RenderCommandResult::Failure;
        }

        pass.set_vertex_buffer(0, &buffers.vertex_buffer);

        for (slot, buffer) in (1..).zip(self.paint_property_binders.attribute_buffers()) {
            let Some(buffer) = buffer else {
                tracing::error!("paint attribute buffer at slot {slot} is missing");
                return RenderCommandResult::Failure;
            };
            pass.set_vertex_buffer(slot, buffer);
        }

        pass.set_index_buffer(&buffers.index_buffer, INDEX_FORMAT);

        for segment in self.segments() {
            pass.draw_indexed(segment.index_range(), segment.base_vertex(), 0..1);
        }

        RenderCommandResult::Success
    }

    /// Layouts of the vertex buffers in the order [`CircleBucket::render`] binds them.
    pub fn vertex_buffer_layouts(&self) -> Vec<VertexBufferLayout> {
        let mut layouts = vec![CircleLayoutVertex::describe_layout()];
        layouts.extend(self.paint_property_binders.vertex_buffer_layouts());
        layouts
    }

    pub fn paint_uniforms(&self, current_zoom: f32) -> ShaderCirclePaint {
        let mut uniforms = ShaderCirclePaint {
            translate: self.translate,
            translate_anchor: self.translate_anchor.shader_flag(),
            pitch_scale: self.pitch_scale.shader_flag(),
            pitch_alignment: self.pitch_alignment.shader_flag(),
            ..ShaderCirclePaint::default()
        };
        self.paint_property_binders
            .set_uniforms(&mut uniforms, current_zoom);
        uniforms
    }

    pub fn vertices(&self) -> &[CircleLayoutVertex] {
        &self.tessellator.buffer.vertices
    }

    pub fn indices(&self) -> &[IndexDataType] {
        &self.tessellator.buffer.indices
    }

    pub fn segments(&self) -> &SegmentVector {
        &self.tessellator.segments
    }

    pub fn paint_property_binders(&self) -> &CirclePaintPropertyBinders<B> {
        &self.paint_property_binders
    }

    pub fn mode(&self) -> MapMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Range;

    use serde_json::json;

    use crate::{
        buckets::{
            circle_bucket::CircleBucket,
            paint_property_binder::tests::{TestBuffer, TestContext},
        },
        geometry::{FeatureType, GeometryCoordinates, VectorGeometryTileFeature},
        render::{resource::DrawPass, RenderCommandResult},
        settings::{BucketSettings, MapMode},
        style::{CirclePaint, CirclePaintProperties},
        tessellation::Segment,
    };

    #[derive(Default)]
    struct RecordingPass<'a> {
        vertex_buffers: Vec<(u32, &'a TestBuffer)>,
        index_buffer: Option<&'a TestBuffer>,
        draws: Vec<(Range<u32>, i32, Range<u32>)>,
    }

    impl<'a> DrawPass<'a> for RecordingPass<'a> {
        type Buffer = TestBuffer;

        fn set_vertex_buffer(&mut self, slot_index: u32, buffer: &'a TestBuffer) {
            self.vertex_buffers.push((slot_index, buffer));
        }

        fn set_index_buffer(&mut self, buffer: &'a TestBuffer, _index_format: wgpu::IndexFormat) {
            self.index_buffer = Some(buffer);
        }

        fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>) {
            self.draws.push((indices, base_vertex, instances));
        }
    }

    fn point(x: i16, y: i16) -> VectorGeometryTileFeature {
        VectorGeometryTileFeature::new(
            FeatureType::Point,
            vec![GeometryCoordinates::from_points(&[(x, y)])],
        )
    }

    fn bucket(max_vertices_per_segment: usize) -> CircleBucket<TestBuffer> {
        let settings = BucketSettings::new(max_vertices_per_segment, MapMode::Continuous).unwrap();
        CircleBucket::new(&CirclePaintProperties::default(), 10.0, &settings)
    }

    fn data_driven_bucket() -> CircleBucket<TestBuffer> {
        let paint: CirclePaint = serde_json::from_value(json!({
            "circle-radius": ["get", "size"],
            "circle-color": ["match", ["get", "class"], "park", "#00ff00", "#ff0000"]
        }))
        .unwrap();
        CircleBucket::new(
            &paint.evaluate(10.0).unwrap(),
            10.0,
            &BucketSettings::default(),
        )
    }

    #[test]
    fn test_quad_per_point() {
        let mut bucket = bucket(65536);
        let feature = VectorGeometryTileFeature::new(
            FeatureType::Point,
            vec![GeometryCoordinates::from_points(&[
                (1, 1),
                (2, 2),
                (3, 3),
            ])],
        );

        assert!(!bucket.has_data());
        bucket.add_feature(&feature, &feature.geometry);

        assert!(bucket.has_data());
        assert_eq!(bucket.vertices().len(), 12);
        assert_eq!(bucket.indices().len(), 18);
    }

    #[test]
    fn test_small_ceiling_single_point() {
        let mut bucket = bucket(4);
        let feature = point(10, 10);
        bucket.add_feature(&feature, &feature.geometry);

        assert_eq!(
            bucket.segments().as_slice(),
            &[Segment {
                vertex_offset: 0,
                index_offset: 0,
                vertex_length: 4,
                index_length: 6,
            }]
        );
    }

    #[test]
    fn test_twenty_thousand_points_split_at_u16_limit() {
        let mut bucket = bucket(65536);
        for i in 0..20_000 {
            let feature = point((i % 4096) as i16, (i / 4096) as i16);
            bucket.add_feature(&feature, &feature.geometry);
        }

        let lengths: Vec<_> = bucket
            .segments()
            .iter()
            .map(|segment| segment.vertex_length)
            .collect();
        assert_eq!(lengths, vec![65_536, 14_464]);
        assert_eq!(bucket.vertices().len(), 80_000);

        let last = bucket.segments().as_slice()[1];
        assert_eq!(last.vertex_offset, 65_536);
        assert_eq!(last.index_offset, 98_304);
        assert_eq!(bucket.indices()[last.index_offset], 0);
        assert!(bucket
            .segments()
            .iter()
            .all(|segment| segment.vertex_length <= 65_536));
    }

    #[test]
    fn test_out_of_extent_point_has_no_data() {
        let mut bucket = bucket(65536);
        let feature = point(-5, 4096);
        bucket.add_feature(&feature, &feature.geometry);

        assert!(!bucket.has_data());
        assert!(!bucket.needs_upload());
    }

    #[test]
    fn test_non_point_features_are_ignored() {
        let mut bucket = bucket(65536);
        let line = VectorGeometryTileFeature::new(
            FeatureType::LineString,
            vec![GeometryCoordinates::from_points(&[(0, 0), (10, 10)])],
        );
        bucket.add_feature(&line, &line.geometry);

        assert!(!bucket.has_data());
    }

    #[test]
    fn test_binders_track_vertex_count() {
        let mut bucket = data_driven_bucket();

        let features = [
            point(1, 1).with_property("size", 3).with_property("class", "park"),
            point(-1, 1).with_property("size", 4),
            VectorGeometryTileFeature::new(
                FeatureType::Point,
                vec![GeometryCoordinates::from_points(&[(5, 5), (6, 6)])],
            ),
        ];

        for feature in &features {
            bucket.add_feature(feature, &feature.geometry);
            let binders = bucket.paint_property_binders();
            assert_eq!(
                binders.get("circle-radius").unwrap().vertex_len(),
                bucket.vertices().len()
            );
            assert_eq!(
                binders.get("circle-color").unwrap().vertex_len(),
                bucket.vertices().len()
            );
            assert_eq!(binders.get("circle-blur").unwrap().vertex_len(), 0);
        }

        assert_eq!(bucket.vertices().len(), 12);
    }

    #[test]
    fn test_upload_once() {
        let mut bucket = bucket(65536);
        let feature = point(1, 1);
        bucket.add_feature(&feature, &feature.geometry);
        assert!(bucket.needs_upload());

        let context = TestContext::default();
        bucket.upload(&context).unwrap();
        assert_eq!(
            *context.uploads.borrow(),
            vec![("circle vertex buffer", 32), ("circle index buffer", 12)]
        );
        assert!(!bucket.needs_upload());

        bucket.upload(&context).unwrap();
        assert_eq!(context.upload_count(), 2);

        let feature = point(2, 2);
        bucket.add_feature(&feature, &feature.geometry);
        assert!(bucket.needs_upload());
        bucket.upload(&context).unwrap();
        assert_eq!(context.upload_count(), 4);
    }

    #[test]
    fn test_upload_failure_is_propagated() {
        let mut bucket = bucket(65536);
        let feature = point(1, 1);
        bucket.add_feature(&feature, &feature.geometry);

        let context = TestContext {
            fail: true,
            ..TestContext::default()
        };
        let error = bucket.upload(&context).unwrap_err();
        assert_eq!(
            error.to_string(),
            "uploading buffer `circle vertex buffer` failed: out of memory"
        );
        assert!(bucket.needs_upload());
    }

    #[test]
    fn test_render_draws_every_segment() {
        let mut bucket = bucket(8);
        let feature = VectorGeometryTileFeature::new(
            FeatureType::Point,
            vec![GeometryCoordinates::from_points(&[
                (1, 1),
                (2, 2),
                (3, 3),
            ])],
        );
        bucket.add_feature(&feature, &feature.geometry);

        let mut pass = RecordingPass::default();
        assert_eq!(bucket.render(&mut pass), RenderCommandResult::Failure);
        assert!(pass.draws.is_empty());

        bucket.upload(&TestContext::default()).unwrap();

        let mut pass = RecordingPass::default();
        assert_eq!(bucket.render(&mut pass), RenderCommandResult::Success);
        assert_eq!(pass.vertex_buffers.len(), 1);
        assert_eq!(pass.vertex_buffers[0].0, 0);
        assert_eq!(
            pass.index_buffer.map(|buffer| buffer.label),
            Some("circle index buffer")
        );
        assert_eq!(pass.draws, vec![(0..12, 0, 0..1), (12..18, 8, 0..1)]);
    }

    #[test]
    fn test_render_binds_attribute_buffers() {
        let mut bucket = data_driven_bucket();
        let feature = point(1, 1).with_property("size", 2);
        bucket.add_feature(&feature, &feature.geometry);
        bucket.upload(&TestContext::default()).unwrap();

        let mut pass = RecordingPass::default();
        assert_eq!(bucket.render(&mut pass), RenderCommandResult::Success);

        let bound: Vec<_> = pass
            .vertex_buffers
            .iter()
            .map(|(slot, buffer)| (*slot, buffer.label))
            .collect();
        assert_eq!(
            bound,
            vec![
                (0, "circle vertex buffer"),
                (1, "circle-color"),
                (2, "circle-radius")
            ]
        );
        assert_eq!(bucket.vertex_buffer_layouts().len(), 3);
    }

    #[test]
    fn test_render_stale_bucket_fails() {
        let mut bucket = bucket(65536);
        let feature = point(1, 1);
        bucket.add_feature(&feature, &feature.geometry);
        bucket.upload(&TestContext::default()).unwrap();
        bucket.add_feature(&feature, &feature.geometry);

        let mut pass = RecordingPass::default();
        assert_eq!(bucket.render(&mut pass), RenderCommandResult::Failure);
    }

    #[test]
    fn test_paint_uniforms() {
        let paint: CirclePaint = serde_json::from_value(json!({
            "circle-radius": 7,
            "circle-translate": [2, 3],
            "circle-translate-anchor": "viewport",
            "circle-stroke-width": ["interpolate", ["linear"], ["zoom"], 10, ["get", "w"], 11, 2]
        }))
        .unwrap();
        let bucket: CircleBucket<TestBuffer> = CircleBucket::new(
            &paint.evaluate(10.0).unwrap(),
            10.0,
            &BucketSettings::default(),
        );

        let uniforms = bucket.paint_uniforms(10.25);
        assert_eq!(uniforms.radius, 7.0);
        assert_eq!(uniforms.translate, [2.0, 3.0]);
        assert_eq!(uniforms.translate_anchor, 1);
        assert_eq!(uniforms.pitch_scale, 0);
        assert_eq!(uniforms.pitch_alignment, 1);
        assert_eq!(uniforms.interpolation[1][0], 0.25);
        assert_eq!(bucket.mode(), MapMode::Continuous);
    }
}
