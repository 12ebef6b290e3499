//! Binds paint properties either as uniforms or as per-vertex attributes.

use std::ops::Range;

use bytemuck::Pod;
use csscolorparser::Color;

use crate::{
    error::Error,
    geometry::GeometryTileFeature,
    render::{
        resource::{UploadContext, VertexBufferLayout},
        shaders::{ShaderCirclePaint, Vec4f32},
    },
    style::{
        CirclePaintProperties, PossiblyEvaluatedPropertyValue, PropertyExpression, StyleValue,
    },
};

/// Values which can be stored as vertex attributes.
pub trait AttributeValue: StyleValue {
    type Packed: Pod + std::fmt::Debug;

    /// Format of a single packed value.
    const FORMAT: wgpu::VertexFormat;
    /// Format of two packed values, which the shader interpolates between.
    const ZOOM_INTERPOLATED_FORMAT: wgpu::VertexFormat;

    fn pack(&self) -> Self::Packed;
}

impl AttributeValue for f32 {
    type Packed = f32;

    const FORMAT: wgpu::VertexFormat = wgpu::VertexFormat::Float32;
    const ZOOM_INTERPOLATED_FORMAT: wgpu::VertexFormat = wgpu::VertexFormat::Float32x2;

    fn pack(&self) -> Self::Packed {
        *self
    }
}

impl AttributeValue for Color {
    type Packed = [f32; 2];

    const FORMAT: wgpu::VertexFormat = wgpu::VertexFormat::Float32x2;
    const ZOOM_INTERPOLATED_FORMAT: wgpu::VertexFormat = wgpu::VertexFormat::Float32x4;

    fn pack(&self) -> Self::Packed {
        [pack_u8_pair(self.r, self.g), pack_u8_pair(self.b, self.a)]
    }
}

/// Stores two color channels within `0..=1` in one float. The shader unpacks them with
/// `floor(value / 256)` and `mod(value, 256)`.
pub fn pack_u8_pair(a: f64, b: f64) -> f32 {
    let channel = |value: f64| (255.0 * value.clamp(0.0, 1.0)).floor();
    (channel(a) * 256.0 + channel(b)) as f32
}

pub fn color_to_uniform(color: &Color) -> Vec4f32 {
    [
        color.r as f32,
        color.g as f32,
        color.b as f32,
        color.a as f32,
    ]
}

/// A paint property of a bucket. Constant properties are bound as uniforms, data-driven ones get
/// a value per vertex.
pub enum PaintPropertyBinder<T: AttributeValue, B> {
    Constant(T),
    Source {
        expression: PropertyExpression<T>,
        vertex_vector: Vec<T::Packed>,
        buffer: Option<B>,
    },
    Composite {
        expression: PropertyExpression<T>,
        /// The zoom levels at which the expression is evaluated, `zoom..zoom + 1`.
        zoom_range: Range<f32>,
        vertex_vector: Vec<[T::Packed; 2]>,
        buffer: Option<B>,
    },
}

impl<T: AttributeValue, B> PaintPropertyBinder<T, B> {
    pub fn new(value: &PossiblyEvaluatedPropertyValue<T>, zoom: f32) -> Self {
        match value {
            PossiblyEvaluatedPropertyValue::Constant(constant) => {
                PaintPropertyBinder::Constant(constant.clone())
            }
            PossiblyEvaluatedPropertyValue::Source(expression) => PaintPropertyBinder::Source {
                expression: expression.clone(),
                vertex_vector: Vec::new(),
                buffer: None,
            },
            PossiblyEvaluatedPropertyValue::Composite(expression) => {
                PaintPropertyBinder::Composite {
                    expression: expression.clone(),
                    zoom_range: zoom..zoom + 1.0,
                    vertex_vector: Vec::new(),
                    buffer: None,
                }
            }
        }
    }

    /// Evaluates the property for `feature` and repeats the value until the binder holds
    /// `length` values. `length` is the vertex count of the bucket after the feature was added.
    pub fn populate_vertex_vector(&mut self, feature: &dyn GeometryTileFeature, length: usize) {
        match self {
            PaintPropertyBinder::Constant(_) => {}
            PaintPropertyBinder::Source {
                expression,
                vertex_vector,
                ..
            } => {
                debug_assert!(vertex_vector.len() <= length);
                if vertex_vector.len() < length {
                    let value = expression.evaluate_feature(feature).pack();
                    vertex_vector.resize(length, value);
                }
            }
            PaintPropertyBinder::Composite {
                expression,
                zoom_range,
                vertex_vector,
                ..
            } => {
                debug_assert!(vertex_vector.len() <= length);
                if vertex_vector.len() < length {
                    let min = expression.evaluate(zoom_range.start, feature).pack();
                    let max = expression.evaluate(zoom_range.end, feature).pack();
                    vertex_vector.resize(length, [min, max]);
                }
            }
        }
    }

    /// Creates the vertex buffer of a data-driven property. Constant properties upload nothing.
    pub fn upload<C>(&mut self, context: &C, label: &'static str) -> Result<(), Error>
    where
        C: UploadContext<Buffer = B> + ?Sized,
    {
        let (contents, buffer) = match self {
            PaintPropertyBinder::Constant(_) => return Ok(()),
            PaintPropertyBinder::Source {
                vertex_vector,
                buffer,
                ..
            } => (bytemuck::cast_slice::<_, u8>(vertex_vector.as_slice()), buffer),
            PaintPropertyBinder::Composite {
                vertex_vector,
                buffer,
                ..
            } => (bytemuck::cast_slice::<_, u8>(vertex_vector.as_slice()), buffer),
        };

        *buffer = Some(context.upload_buffer(label, contents, wgpu::BufferUsages::VERTEX)?);
        Ok(())
    }

    pub fn attribute_buffer(&self) -> Option<&B> {
        match self {
            PaintPropertyBinder::Constant(_) => None,
            PaintPropertyBinder::Source { buffer, .. }
            | PaintPropertyBinder::Composite { buffer, .. } => buffer.as_ref(),
        }
    }

    pub fn vertex_buffer_layout(&self, shader_location: u32) -> Option<VertexBufferLayout> {
        let (format, array_stride) = match self {
            PaintPropertyBinder::Constant(_) => return None,
            PaintPropertyBinder::Source { .. } => (T::FORMAT, std::mem::size_of::<T::Packed>()),
            PaintPropertyBinder::Composite { .. } => (
                T::ZOOM_INTERPOLATED_FORMAT,
                2 * std::mem::size_of::<T::Packed>(),
            ),
        };

        Some(VertexBufferLayout {
            array_stride: array_stride as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: vec![wgpu::VertexAttribute {
                offset: 0,
                format,
                shader_location,
            }],
        })
    }

    pub fn constant_value(&self) -> Option<&T> {
        match self {
            PaintPropertyBinder::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// How far `current_zoom` is between the two values of a composite property, following the
    /// zoom curve of its expression.
    pub fn interpolation_factor(&self, current_zoom: f32) -> f32 {
        match self {
            PaintPropertyBinder::Composite {
                expression,
                zoom_range,
                ..
            } => expression
                .expression
                .interpolation_factor(
                    zoom_range.start as f64..zoom_range.end as f64,
                    current_zoom as f64,
                )
                .clamp(0.0, 1.0) as f32,
            _ => 0.0,
        }
    }

    pub fn vertex_len(&self) -> usize {
        match self {
            PaintPropertyBinder::Constant(_) => 0,
            PaintPropertyBinder::Source { vertex_vector, .. } => vertex_vector.len(),
            PaintPropertyBinder::Composite { vertex_vector, .. } => vertex_vector.len(),
        }
    }

    pub fn is_data_driven(&self) -> bool {
        !matches!(self, PaintPropertyBinder::Constant(_))
    }
}

/// Type-erased view of a binder, used to address binders by property name.
pub trait AttributeBinder<B> {
    fn is_data_driven(&self) -> bool;

    fn vertex_len(&self) -> usize;

    fn attribute_buffer(&self) -> Option<&B>;

    fn vertex_buffer_layout(&self, shader_location: u32) -> Option<VertexBufferLayout>;
}

impl<T: AttributeValue, B> AttributeBinder<B> for PaintPropertyBinder<T, B> {
    fn is_data_driven(&self) -> bool {
        PaintPropertyBinder::is_data_driven(self)
    }

    fn vertex_len(&self) -> usize {
        PaintPropertyBinder::vertex_len(self)
    }

    fn attribute_buffer(&self) -> Option<&B> {
        PaintPropertyBinder::attribute_buffer(self)
    }

    fn vertex_buffer_layout(&self, shader_location: u32) -> Option<VertexBufferLayout> {
        PaintPropertyBinder::vertex_buffer_layout(self, shader_location)
    }
}

/// Shader location of the first paint attribute. Locations `0` and `1` are used by
/// [`CircleLayoutVertex`](crate::render::shaders::CircleLayoutVertex).
pub const FIRST_PAINT_ATTRIBUTE_LOCATION: u32 = 2;

/// The binders of all circle paint properties which can be data-driven.
pub struct CirclePaintPropertyBinders<B> {
    pub color: PaintPropertyBinder<Color, B>,
    pub radius: PaintPropertyBinder<f32, B>,
    pub blur: PaintPropertyBinder<f32, B>,
    pub opacity: PaintPropertyBinder<f32, B>,
    pub stroke_width: PaintPropertyBinder<f32, B>,
    pub stroke_color: PaintPropertyBinder<Color, B>,
    pub stroke_opacity: PaintPropertyBinder<f32, B>,
}

impl<B> CirclePaintPropertyBinders<B> {
    /// Property names in binding order.
    pub const PROPERTY_NAMES: [&'static str; 7] = [
        "circle-color",
        "circle-radius",
        "circle-blur",
        "circle-opacity",
        "circle-stroke-width",
        "circle-stroke-color",
        "circle-stroke-opacity",
    ];

    pub fn new(properties: &CirclePaintProperties, zoom: f32) -> Self {
        Self {
            color: PaintPropertyBinder::new(&properties.color, zoom),
            radius: PaintPropertyBinder::new(&properties.radius, zoom),
            blur: PaintPropertyBinder::new(&properties.blur, zoom),
            opacity: PaintPropertyBinder::new(&properties.opacity, zoom),
            stroke_width: PaintPropertyBinder::new(&properties.stroke_width, zoom),
            stroke_color: PaintPropertyBinder::new(&properties.stroke_color, zoom),
            stroke_opacity: PaintPropertyBinder::new(&properties.stroke_opacity, zoom),
        }
    }

    pub fn populate_vertex_vectors(&mut self, feature: &dyn GeometryTileFeature, length: usize) {
        self.color.populate_vertex_vector(feature, length);
        self.radius.populate_vertex_vector(feature, length);
        self.blur.populate_vertex_vector(feature, length);
        self.opacity.populate_vertex_vector(feature, length);
        self.stroke_width.populate_vertex_vector(feature, length);
        self.stroke_color.populate_vertex_vector(feature, length);
        self.stroke_opacity.populate_vertex_vector(feature, length);
    }

    pub fn upload<C>(&mut self, context: &C) -> Result<(), Error>
    where
        C: UploadContext<Buffer = B> + ?Sized,
    {
        self.color.upload(context, "circle-color")?;
        self.radius.upload(context, "circle-radius")?;
        self.blur.upload(context, "circle-blur")?;
        self.opacity.upload(context, "circle-opacity")?;
        self.stroke_width.upload(context, "circle-stroke-width")?;
        self.stroke_color.upload(context, "circle-stroke-color")?;
        self.stroke_opacity.upload(context, "circle-stroke-opacity")?;
        Ok(())
    }

    /// All binders along with their property names, in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &dyn AttributeBinder<B>)> {
        let binders: [&dyn AttributeBinder<B>; 7] = [
            &self.color,
            &self.radius,
            &self.blur,
            &self.opacity,
            &self.stroke_width,
            &self.stroke_color,
            &self.stroke_opacity,
        ];
        Self::PROPERTY_NAMES.into_iter().zip(binders)
    }

    /// Looks up a binder by the name of its style property, e.g. `circle-radius`.
    pub fn get(&self, property: &str) -> Option<&dyn AttributeBinder<B>> {
        self.iter()
            .find(|(name, _)| *name == property)
            .map(|(_, binder)| binder)
    }

    /// Vertex buffers of data-driven properties, in binding order.
    pub fn attribute_buffers(&self) -> impl Iterator<Item = Option<&B>> {
        self.iter()
            .filter(|(_, binder)| binder.is_data_driven())
            .map(|(_, binder)| binder.attribute_buffer())
    }

    /// Every property has a fixed shader location, so that shaders can be specialized by
    /// enabling or disabling attributes.
    pub fn vertex_buffer_layouts(&self) -> Vec<VertexBufferLayout> {
        self.iter()
            .zip(FIRST_PAINT_ATTRIBUTE_LOCATION..)
            .filter_map(|((_, binder), location)| binder.vertex_buffer_layout(location))
            .collect()
    }

    /// Writes the constant values and interpolation factors into `uniforms`. Values of
    /// data-driven properties are left untouched.
    pub fn set_uniforms(&self, uniforms: &mut ShaderCirclePaint, current_zoom: f32) {
        if let Some(color) = self.color.constant_value() {
            uniforms.color = color_to_uniform(color);
        }
        if let Some(radius) = self.radius.constant_value() {
            uniforms.radius = *radius;
        }
        if let Some(blur) = self.blur.constant_value() {
            uniforms.blur = *blur;
        }
        if let Some(opacity) = self.opacity.constant_value() {
            uniforms.opacity = *opacity;
        }
        if let Some(stroke_width) = self.stroke_width.constant_value() {
            uniforms.stroke_width = *stroke_width;
        }
        if let Some(stroke_color) = self.stroke_color.constant_value() {
            uniforms.stroke_color = color_to_uniform(stroke_color);
        }
        if let Some(stroke_opacity) = self.stroke_opacity.constant_value() {
            uniforms.stroke_opacity = *stroke_opacity;
        }

        uniforms.interpolation = [
            [
                self.color.interpolation_factor(current_zoom),
                self.radius.interpolation_factor(current_zoom),
                self.blur.interpolation_factor(current_zoom),
                self.opacity.interpolation_factor(current_zoom),
            ],
            [
                self.stroke_width.interpolation_factor(current_zoom),
                self.stroke_color.interpolation_factor(current_zoom),
                self.stroke_opacity.interpolation_factor(current_zoom),
                0.0,
            ],
        ];
    }
}
