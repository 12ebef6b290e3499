//! Paint properties of circle layers.

use csscolorparser::Color;
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    style::property::{PossiblyEvaluatedPropertyValue, StyleProperty},
};

pub const DEFAULT_RADIUS: f32 = 5.0;
pub const DEFAULT_BLUR: f32 = 0.0;
pub const DEFAULT_OPACITY: f32 = 1.0;
pub const DEFAULT_STROKE_WIDTH: f32 = 0.0;
pub const DEFAULT_STROKE_OPACITY: f32 = 1.0;

fn default_color() -> Color {
    Color::new(0.0, 0.0, 0.0, 1.0)
}

/// Whether a property is relative to the map or to the viewport.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Alignment {
    #[serde(rename = "map")]
    Map,
    #[serde(rename = "viewport")]
    Viewport,
}

impl Alignment {
    /// Value of the alignment in shader uniforms.
    pub fn shader_flag(self) -> u32 {
        match self {
            Alignment::Map => 0,
            Alignment::Viewport => 1,
        }
    }
}

/// Circle layer paint as it is written in a style.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CirclePaint {
    #[serde(rename = "circle-radius")]
    #[serde(default, deserialize_with = "StyleProperty::<f32>::deserialize_or_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_radius: Option<StyleProperty<f32>>,
    #[serde(rename = "circle-color")]
    #[serde(default, deserialize_with = "StyleProperty::<Color>::deserialize_or_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_color: Option<StyleProperty<Color>>,
    #[serde(rename = "circle-blur")]
    #[serde(default, deserialize_with = "StyleProperty::<f32>::deserialize_or_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_blur: Option<StyleProperty<f32>>,
    #[serde(rename = "circle-opacity")]
    #[serde(default, deserialize_with = "StyleProperty::<f32>::deserialize_or_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_opacity: Option<StyleProperty<f32>>,
    #[serde(rename = "circle-stroke-width")]
    #[serde(default, deserialize_with = "StyleProperty::<f32>::deserialize_or_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_stroke_width: Option<StyleProperty<f32>>,
    #[serde(rename = "circle-stroke-color")]
    #[serde(default, deserialize_with = "StyleProperty::<Color>::deserialize_or_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_stroke_color: Option<StyleProperty<Color>>,
    #[serde(rename = "circle-stroke-opacity")]
    #[serde(default, deserialize_with = "StyleProperty::<f32>::deserialize_or_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_stroke_opacity: Option<StyleProperty<f32>>,
    #[serde(rename = "circle-translate")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle_translate: Option<[f32; 2]>,
    #[serde(rename = "circle-translate-anchor")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle_translate_anchor: Option<Alignment>,
    #[serde(rename = "circle-pitch-scale")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle_pitch_scale: Option<Alignment>,
    #[serde(rename = "circle-pitch-alignment")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle_pitch_alignment: Option<Alignment>,
}

fn possibly_evaluate<T: crate::style::property::StyleValue>(
    property: &Option<StyleProperty<T>>,
    name: &'static str,
    zoom: f32,
    default: T,
) -> Result<PossiblyEvaluatedPropertyValue<T>, Error> {
    match property {
        Some(property) => property.possibly_evaluate(name, zoom, default),
        None => Ok(PossiblyEvaluatedPropertyValue::Constant(default)),
    }
}

impl CirclePaint {
    /// Evaluates the paint for the zoom level of a tile. Unset properties take their defaults.
    pub fn evaluate(&self, zoom: f32) -> Result<CirclePaintProperties, Error> {
        Ok(CirclePaintProperties {
            radius: possibly_evaluate(&self.circle_radius, "circle-radius", zoom, DEFAULT_RADIUS)?,
            color: possibly_evaluate(&self.circle_color, "circle-color", zoom, default_color())?,
            blur: possibly_evaluate(&self.circle_blur, "circle-blur", zoom, DEFAULT_BLUR)?,
            opacity: possibly_evaluate(
                &self.circle_opacity,
                "circle-opacity",
                zoom,
                DEFAULT_OPACITY,
            )?,
            stroke_width: possibly_evaluate(
                &self.circle_stroke_width,
                "circle-stroke-width",
                zoom,
                DEFAULT_STROKE_WIDTH,
            )?,
            stroke_color: possibly_evaluate(
                &self.circle_stroke_color,
                "circle-stroke-color",
                zoom,
                default_color(),
            )?,
            stroke_opacity: possibly_evaluate(
                &self.circle_stroke_opacity,
                "circle-stroke-opacity",
                zoom,
                DEFAULT_STROKE_OPACITY,
            )?,
            translate: self.circle_translate.unwrap_or([0.0, 0.0]),
            translate_anchor: self.circle_translate_anchor.unwrap_or(Alignment::Map),
            pitch_scale: self.circle_pitch_scale.unwrap_or(Alignment::Map),
            pitch_alignment: self.circle_pitch_alignment.unwrap_or(Alignment::Viewport),
        })
    }
}

/// Circle paint evaluated for one zoom level. Data-driven properties are evaluated per feature
/// by the paint property binders of a bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct CirclePaintProperties {
    pub radius: PossiblyEvaluatedPropertyValue<f32>,
    pub color: PossiblyEvaluatedPropertyValue<Color>,
    pub blur: PossiblyEvaluatedPropertyValue<f32>,
    pub opacity: PossiblyEvaluatedPropertyValue<f32>,
    pub stroke_width: PossiblyEvaluatedPropertyValue<f32>,
    pub stroke_color: PossiblyEvaluatedPropertyValue<Color>,
    pub stroke_opacity: PossiblyEvaluatedPropertyValue<f32>,
    pub translate: [f32; 2],
    pub translate_anchor: Alignment,
    pub pitch_scale: Alignment,
    pub pitch_alignment: Alignment,
}

impl Default for CirclePaintProperties {
    fn default() -> Self {
        use PossiblyEvaluatedPropertyValue::Constant;

        Self {
            radius: Constant(DEFAULT_RADIUS),
            color: Constant(default_color()),
            blur: Constant(DEFAULT_BLUR),
            opacity: Constant(DEFAULT_OPACITY),
            stroke_width: Constant(DEFAULT_STROKE_WIDTH),
            stroke_color: Constant(default_color()),
            stroke_opacity: Constant(DEFAULT_STROKE_OPACITY),
            translate: [0.0, 0.0],
            translate_anchor: Alignment::Map,
            pitch_scale: Alignment::Map,
            pitch_alignment: Alignment::Viewport,
        }
    }
}
