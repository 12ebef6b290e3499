//! Tessellator implementation.

use lyon::tessellation::VertexBuffers;

use crate::{
    geometry::{GeometryCollection, GeometryCoordinate},
    render::shaders::{CircleLayoutVertex, Corner},
    settings::{BucketSettings, MapMode},
    tessellation::{IndexDataType, SegmentVector, QUAD_INDICES, QUAD_VERTICES},
};

/// Builds one quad per point. The quad is extruded to a circle on the GPU, so all four vertices
/// share the anchor and only differ in their [`Corner`].
pub struct CircleTessellator {
    pub buffer: VertexBuffers<CircleLayoutVertex, IndexDataType>,
    pub segments: SegmentVector,

    clip_to_extent: bool,
    extent: i32,
}

impl CircleTessellator {
    pub fn new(settings: &BucketSettings) -> Self {
        Self {
            buffer: VertexBuffers::new(),
            segments: SegmentVector::new(settings.max_vertices_per_segment()),
            // Circles of neighbouring tiles must be kept for still images, otherwise they would be
            // clipped at tile boundaries
            clip_to_extent: settings.mode() == MapMode::Continuous,
            extent: settings.extent() as i32,
        }
    }

    fn is_within_extent(&self, point: &GeometryCoordinate) -> bool {
        let (x, y) = (point.x as i32, point.y as i32);
        x >= 0 && x < self.extent && y >= 0 && y < self.extent
    }

    /// Emits a quad for every point in `geometry` and returns the amount of vertices added.
    pub fn tessellate_points(&mut self, geometry: &GeometryCollection) -> usize {
        let vertices_before = self.buffer.vertices.len();

        for point in geometry.iter().flat_map(|points| points.iter()) {
            if self.clip_to_extent && !self.is_within_extent(point) {
                tracing::trace!("dropping point {point:?} outside of tile");
                continue;
            }

            self.tessellate_point(point);
        }

        self.buffer.vertices.len() - vertices_before
    }

    fn tessellate_point(&mut self, point: &GeometryCoordinate) {
        let segment = self.segments.prepare(
            self.buffer.vertices.len(),
            self.buffer.indices.len(),
            QUAD_VERTICES,
        );

        let index = segment.vertex_length as IndexDataType;

        self.buffer.vertices.extend(
            Corner::ALL
                .iter()
                .map(|corner| CircleLayoutVertex::new(*point, *corner)),
        );

        // 0, 1, 2
        // 0, 3, 2
        self.buffer.indices.extend_from_slice(&[
            index,
            index + 1,
            index + 2,
            index,
            index + 3,
            index + 2,
        ]);

        segment.vertex_length += QUAD_VERTICES;
        segment.index_length += QUAD_INDICES;
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        geometry::GeometryCoordinates,
        render::shaders::Corner,
        settings::{BucketSettings, MapMode},
        tessellation::CircleTessellator,
    };

    #[test]
    fn test_quad_per_point() {
        let mut tessellator = CircleTessellator::new(&BucketSettings::default());

        let added = tessellator.tessellate_points(&vec![
            GeometryCoordinates::from_points(&[(10, 10), (20, 20)]),
            GeometryCoordinates::from_points(&[(30, 30)]),
        ]);

        assert_eq!(added, 12);
        assert_eq!(tessellator.buffer.vertices.len(), 12);
        assert_eq!(tessellator.buffer.indices.len(), 18);
        assert_eq!(
            &tessellator.buffer.indices[6..12],
            &[4, 5, 6, 4, 7, 6],
            "indices are relative to the segment"
        );

        let corners: Vec<_> = tessellator.buffer.vertices[4..8]
            .iter()
            .map(|vertex| vertex.corner().unwrap())
            .collect();
        assert_eq!(corners, Corner::ALL.to_vec());
        assert!(tessellator.buffer.vertices[4..8]
            .iter()
            .all(|vertex| vertex.position == [20, 20]));
    }

    #[test]
    fn test_points_outside_extent_are_dropped() {
        let mut tessellator = CircleTessellator::new(&BucketSettings::default());

        let added = tessellator.tessellate_points(&vec![GeometryCoordinates::from_points(&[
            (-1, 10),
            (10, 4096),
            (4095, 0),
        ])]);

        assert_eq!(added, 4);
        assert_eq!(tessellator.segments.len(), 1);
    }

    #[test]
    fn test_still_images_keep_points_outside_extent() {
        let settings = BucketSettings::new(65536, MapMode::Static).unwrap();
        let mut tessellator = CircleTessellator::new(&settings);

        let added = tessellator
            .tessellate_points(&vec![GeometryCoordinates::from_points(&[(-100, 5000)])]);

        assert_eq!(added, 4);
    }

    #[test]
    fn test_indices_restart_in_new_segment() {
        let settings = BucketSettings::new(8, MapMode::Continuous).unwrap();
        let mut tessellator = CircleTessellator::new(&settings);

        tessellator.tessellate_points(&vec![GeometryCoordinates::from_points(&[
            (1, 1),
            (2, 2),
            (3, 3),
        ])]);

        assert_eq!(tessellator.segments.len(), 2);
        assert_eq!(&tessellator.buffer.indices[12..18], &[0, 1, 2, 0, 3, 2]);
        let last = tessellator.segments.as_slice()[1];
        assert_eq!(last.vertex_offset, 8);
        assert_eq!(last.index_offset, 12);
    }
}
