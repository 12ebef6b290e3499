use std::fmt::Debug;

use csscolorparser::Color;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    error::Error,
    geometry::GeometryTileFeature,
    style::expression::{EvaluationContext, Expression},
};

/// Values which paint properties can take.
pub trait StyleValue: Clone + Debug + Sized {
    fn from_json(value: &Value) -> Option<Self>;

    fn interpolate(from: &Self, to: &Self, t: f64) -> Self;
}

impl StyleValue for Value {
    fn from_json(value: &Value) -> Option<Self> {
        Some(value.clone())
    }

    fn interpolate(from: &Self, to: &Self, t: f64) -> Self {
        match (from.as_f64(), to.as_f64()) {
            (Some(from), Some(to)) => Value::from(f64::interpolate(&from, &to, t)),
            _ if t < 1.0 => from.clone(),
            _ => to.clone(),
        }
    }
}

impl StyleValue for f64 {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_f64()
    }

    fn interpolate(from: &Self, to: &Self, t: f64) -> Self {
        from + (to - from) * t
    }
}

impl StyleValue for f32 {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_f64().map(|value| value as f32)
    }

    fn interpolate(from: &Self, to: &Self, t: f64) -> Self {
        f64::interpolate(&(*from as f64), &(*to as f64), t) as f32
    }
}

impl StyleValue for Color {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_str().and_then(|value| value.parse::<Color>().ok())
    }

    fn interpolate(from: &Self, to: &Self, t: f64) -> Self {
        let lerp = |from: f64, to: f64| f64::interpolate(&from, &to, t);
        Color::new(
            lerp(from.r, to.r),
            lerp(from.g, to.g),
            lerp(from.b, to.b),
            lerp(from.a, to.a),
        )
    }
}

/// A paint property as it is written in a style.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum StyleProperty<T> {
    Constant(T),
    Expression(Value),
}

impl<T: StyleValue> StyleProperty<T> {
    /// Accepts a literal value, an expression array or a legacy `{"stops": ...}` function.
    /// Anything else is treated as an unset property.
    pub fn deserialize_or_none<'de, D>(deserializer: D) -> Result<Option<StyleProperty<T>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer).map_err(serde::de::Error::custom)?;
        if let Some(constant) = T::from_json(&value) {
            return Ok(Some(StyleProperty::Constant(constant)));
        }
        if value.is_array() || value.is_object() {
            return Ok(Some(StyleProperty::Expression(value)));
        }
        Ok(None)
    }

    /// Evaluates everything which does not depend on features. Properties which do are kept as
    /// expressions and evaluated per feature.
    pub fn possibly_evaluate(
        &self,
        property: &'static str,
        zoom: f32,
        default: T,
    ) -> Result<PossiblyEvaluatedPropertyValue<T>, Error> {
        let json = match self {
            StyleProperty::Constant(value) => {
                return Ok(PossiblyEvaluatedPropertyValue::Constant(value.clone()))
            }
            StyleProperty::Expression(json) => json,
        };

        let expression =
            Expression::parse(json).map_err(|source| Error::Style { property, source })?;

        if expression.is_feature_constant() {
            let value = expression
                .evaluate(&EvaluationContext::zoom(zoom))
                .unwrap_or_else(|| {
                    log::warn!("paint property {property} evaluated to no value, using default");
                    default
                });
            return Ok(PossiblyEvaluatedPropertyValue::Constant(value));
        }

        let expression = PropertyExpression {
            expression,
            default,
        };

        Ok(if expression.expression.is_zoom_constant() {
            PossiblyEvaluatedPropertyValue::Source(expression)
        } else {
            PossiblyEvaluatedPropertyValue::Composite(expression)
        })
    }
}

/// An expression which depends on features, along with the value used if it can not be
/// evaluated for a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyExpression<T> {
    pub expression: Expression,
    pub default: T,
}

impl<T: StyleValue> PropertyExpression<T> {
    /// Evaluates an expression which depends on the zoom level and the feature.
    pub fn evaluate(&self, zoom: f32, feature: &dyn GeometryTileFeature) -> T {
        self.evaluate_in(&EvaluationContext::new(zoom, feature))
    }

    /// Evaluates an expression which only depends on the feature.
    pub fn evaluate_feature(&self, feature: &dyn GeometryTileFeature) -> T {
        self.evaluate_in(&EvaluationContext {
            zoom: None,
            feature: Some(feature),
        })
    }

    fn evaluate_in(&self, context: &EvaluationContext) -> T {
        self.expression
            .evaluate(context)
            .unwrap_or_else(|| self.default.clone())
    }
}

/// A paint property after everything which only depends on the zoom level of the tile was
/// evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum PossiblyEvaluatedPropertyValue<T> {
    /// Same value for every feature.
    Constant(T),
    /// Depends on feature properties only.
    Source(PropertyExpression<T>),
    /// Depends on feature properties and the zoom level.
    Composite(PropertyExpression<T>),
}

impl<T> PossiblyEvaluatedPropertyValue<T> {
    pub fn is_data_driven(&self) -> bool {
        !matches!(self, PossiblyEvaluatedPropertyValue::Constant(_))
    }

    pub fn constant(&self) -> Option<&T> {
        match self {
            PossiblyEvaluatedPropertyValue::Constant(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use csscolorparser::Color;
    use serde_json::json;

    use crate::style::property::{PossiblyEvaluatedPropertyValue, StyleProperty};

    #[test]
    fn test_deserialize_constant_and_expression() {
        let constant: StyleProperty<f32> = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(constant, StyleProperty::Constant(3.0));

        let color: StyleProperty<Color> = serde_json::from_value(json!("#ff0000")).unwrap();
        assert_eq!(
            color,
            StyleProperty::Constant(Color::new(1.0, 0.0, 0.0, 1.0))
        );

        let expression: StyleProperty<f32> =
            serde_json::from_value(json!(["get", "size"])).unwrap();
        assert_eq!(expression, StyleProperty::Expression(json!(["get", "size"])));
    }

    #[test]
    fn test_classify() {
        let zoom_only: StyleProperty<f32> =
            StyleProperty::Expression(json!(["interpolate", ["linear"], ["zoom"], 0, 0, 10, 10]));
        assert_eq!(
            zoom_only.possibly_evaluate("circle-radius", 5.0, 1.0).unwrap(),
            PossiblyEvaluatedPropertyValue::Constant(5.0)
        );

        let source: StyleProperty<f32> = StyleProperty::Expression(json!(["get", "size"]));
        let evaluated = source.possibly_evaluate("circle-radius", 5.0, 1.0).unwrap();
        assert!(matches!(evaluated, PossiblyEvaluatedPropertyValue::Source(_)));
        assert!(evaluated.is_data_driven());

        let composite: StyleProperty<f32> = StyleProperty::Expression(json!([
            "interpolate",
            ["linear"],
            ["zoom"],
            0,
            ["get", "size"],
            10,
            1
        ]));
        assert!(matches!(
            composite.possibly_evaluate("circle-radius", 5.0, 1.0).unwrap(),
            PossiblyEvaluatedPropertyValue::Composite(_)
        ));
    }

    #[test]
    fn test_invalid_expression_names_property() {
        let invalid: StyleProperty<f32> = StyleProperty::Expression(json!(["sqrt", 4]));
        let error = invalid
            .possibly_evaluate("circle-blur", 0.0, 0.0)
            .unwrap_err();
        assert_eq!(error.to_string(), "invalid paint property `circle-blur`");
    }

    #[test]
    fn test_unresolvable_constant_uses_default() {
        let missing: StyleProperty<f32> = StyleProperty::Expression(json!("not a number"));
        assert_eq!(
            missing.possibly_evaluate("circle-opacity", 0.0, 1.0).unwrap(),
            PossiblyEvaluatedPropertyValue::Constant(1.0)
        );
    }
}
