use bytemuck_derive::{Pod, Zeroable};

use crate::{geometry::GeometryCoordinate, render::resource::VertexBufferLayout};

pub type Vec2f32 = [f32; 2];
pub type Vec4f32 = [f32; 4];

/// Identifies the corner of the quad which a [`CircleLayoutVertex`] represents. The shader
/// extrudes the anchor into this direction by the circle radius.
///
/// ```text
/// 3 ───── 2
/// │     ╱ │
/// │   ╱   │
/// │ ╱     │
/// 0 ───── 1
/// ```
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Corner {
    BottomLeft = 0,
    BottomRight = 1,
    TopRight = 2,
    TopLeft = 3,
}

impl Corner {
    /// Corners in the order they are written to the vertex buffer.
    pub const ALL: [Corner; 4] = [
        Corner::BottomLeft,
        Corner::BottomRight,
        Corner::TopRight,
        Corner::TopLeft,
    ];

    pub fn extrude(self) -> [i8; 2] {
        match self {
            Corner::BottomLeft => [-1, -1],
            Corner::BottomRight => [1, -1],
            Corner::TopRight => [1, 1],
            Corner::TopLeft => [-1, 1],
        }
    }

    pub fn from_code(code: u32) -> Option<Corner> {
        Corner::ALL.get(code as usize).copied()
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct CircleLayoutVertex {
    pub position: [i16; 2],
    pub corner: u32,
}

impl CircleLayoutVertex {
    pub fn new(anchor: GeometryCoordinate, corner: Corner) -> Self {
        Self {
            position: [anchor.x, anchor.y],
            corner: corner as u32,
        }
    }

    pub fn corner(&self) -> Option<Corner> {
        Corner::from_code(self.corner)
    }

    pub fn describe_layout() -> VertexBufferLayout {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<CircleLayoutVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: vec![
                // position
                wgpu::VertexAttribute {
                    offset: 0,
                    format: wgpu::VertexFormat::Sint16x2,
                    shader_location: 0,
                },
                // corner
                wgpu::VertexAttribute {
                    offset: wgpu::VertexFormat::Sint16x2.size(),
                    format: wgpu::VertexFormat::Uint32,
                    shader_location: 1,
                },
            ],
        }
    }
}

/// Uniform block of a circle layer. Holds the values of paint properties which are constant for
/// the whole bucket and the zoom interpolation factors of composite properties.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ShaderCirclePaint {
    pub color: Vec4f32,
    pub stroke_color: Vec4f32,
    pub radius: f32,
    pub blur: f32,
    pub opacity: f32,
    pub stroke_width: f32,
    pub stroke_opacity: f32,
    /// Alignment flags, `0` for map and `1` for viewport.
    pub translate_anchor: u32,
    pub pitch_scale: u32,
    pub pitch_alignment: u32,
    pub translate: Vec2f32,
    pub _padding1: Vec2f32,
    /// Interpolation factors in the order color, radius, blur, opacity, stroke width,
    /// stroke color, stroke opacity.
    pub interpolation: [Vec4f32; 2],
}
