//! Splits shared vertex and index buffers into ranges which can be drawn with a single draw call.

/// A contiguous range of the vertex and index buffers of a bucket. Indices within a segment are
/// relative to `vertex_offset`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Segment {
    pub vertex_offset: usize,
    pub index_offset: usize,
    pub vertex_length: usize,
    pub index_length: usize,
}

impl Segment {
    pub fn new(vertex_offset: usize, index_offset: usize) -> Self {
        Self {
            vertex_offset,
            index_offset,
            vertex_length: 0,
            index_length: 0,
        }
    }

    /// Range within the index buffer, as expected by `draw_indexed`.
    pub fn index_range(&self) -> std::ops::Range<u32> {
        self.index_offset as u32..(self.index_offset + self.index_length) as u32
    }

    /// The vertex which index `0` of this segment refers to.
    pub fn base_vertex(&self) -> i32 {
        self.vertex_offset as i32
    }
}

/// An ordered list of segments. Segments are only ever appended.
#[derive(Clone, Debug)]
pub struct SegmentVector {
    segments: Vec<Segment>,
    max_vertices: usize,
}

impl SegmentVector {
    pub fn new(max_vertices: usize) -> Self {
        debug_assert!(max_vertices > 0);
        Self {
            segments: Vec::new(),
            max_vertices,
        }
    }

    /// Returns the segment which `vertex_count` new vertices are appended to.
    ///
    /// A new segment starting at `vertex_offset` and `index_offset` is opened if the current one
    /// can not address `vertex_count` more vertices. A run of vertices which is larger than the
    /// maximum gets a segment of its own, so no geometry is ever dropped.
    pub fn prepare(
        &mut self,
        vertex_offset: usize,
        index_offset: usize,
        vertex_count: usize,
    ) -> &mut Segment {
        let needs_new_segment = match self.segments.last() {
            None => true,
            Some(last) => {
                last.vertex_length > 0 && last.vertex_length + vertex_count > self.max_vertices
            }
        };

        if needs_new_segment {
            if vertex_count > self.max_vertices {
                log::warn!(
                    "{vertex_count} vertices exceed the segment maximum of {}, using a dedicated segment",
                    self.max_vertices
                );
            }
            self.segments
                .push(Segment::new(vertex_offset, index_offset));
        }

        let max_vertices = self.max_vertices;
        let segment = self
            .segments
            .last_mut()
            .unwrap_or_else(|| unreachable!("a segment was pushed above"));

        debug_assert!(
            segment.vertex_length + vertex_count <= max_vertices || segment.vertex_length == 0
        );
        debug_assert_eq!(segment.vertex_offset + segment.vertex_length, vertex_offset);
        debug_assert_eq!(segment.index_offset + segment.index_length, index_offset);

        segment
    }

    pub fn max_vertices(&self) -> usize {
        self.max_vertices
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }
}

impl<'a> IntoIterator for &'a SegmentVector {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
