//! A subset of the style expression language: `get`, `zoom`, `match`, `interpolate`, `step`,
//! `coalesce` and `literal`, plus legacy `{"stops": ...}` functions.

use serde_json::Value;
use thiserror::Error;

use crate::{geometry::GeometryTileFeature, style::property::StyleValue};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("unknown expression operator `{0}`")]
    UnknownOperator(String),
    #[error("wrong arguments for `{0}`")]
    InvalidArguments(&'static str),
    #[error("stops of `{0}` must be numbers in ascending order")]
    InvalidStops(&'static str),
}

/// Inputs which expressions can depend on.
#[derive(Copy, Clone, Default)]
pub struct EvaluationContext<'a> {
    pub zoom: Option<f32>,
    pub feature: Option<&'a dyn GeometryTileFeature>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(zoom: f32, feature: &'a dyn GeometryTileFeature) -> Self {
        Self {
            zoom: Some(zoom),
            feature: Some(feature),
        }
    }

    pub fn zoom(zoom: f32) -> Self {
        Self {
            zoom: Some(zoom),
            feature: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Literal(Value),
    Get(String),
    Zoom,
    Match {
        input: Box<Expression>,
        branches: Vec<(Vec<Value>, Expression)>,
        fallback: Box<Expression>,
    },
    Interpolate {
        base: f64,
        input: Box<Expression>,
        stops: Vec<(f64, Expression)>,
    },
    Step {
        input: Box<Expression>,
        base: Box<Expression>,
        stops: Vec<(f64, Expression)>,
    },
    Coalesce(Vec<Expression>),
}

impl Expression {
    pub fn parse(json: &Value) -> Result<Self, ExpressionError> {
        match json {
            Value::Array(array) => match array.first() {
                Some(Value::String(operator)) => Self::parse_operator(operator, &array[1..]),
                _ => Ok(Expression::Literal(json.clone())),
            },
            Value::Object(object) if object.contains_key("stops") => Self::parse_function(json),
            _ => Ok(Expression::Literal(json.clone())),
        }
    }

    fn parse_operator(operator: &str, args: &[Value]) -> Result<Self, ExpressionError> {
        match operator {
            "literal" => match args {
                [value] => Ok(Expression::Literal(value.clone())),
                _ => Err(ExpressionError::InvalidArguments("literal")),
            },
            "get" => match args {
                [Value::String(key)] => Ok(Expression::Get(key.clone())),
                _ => Err(ExpressionError::InvalidArguments("get")),
            },
            "zoom" => match args {
                [] => Ok(Expression::Zoom),
                _ => Err(ExpressionError::InvalidArguments("zoom")),
            },
            "match" => {
                // input, (label, output)+, fallback
                if args.len() < 4 || args.len() % 2 != 0 {
                    return Err(ExpressionError::InvalidArguments("match"));
                }
                let input = Self::parse(&args[0])?;
                let (fallback, pairs) = args[1..]
                    .split_last()
                    .ok_or(ExpressionError::InvalidArguments("match"))?;

                let branches = pairs
                    .chunks(2)
                    .map(|pair| {
                        let labels = match &pair[0] {
                            Value::Array(labels) => labels.clone(),
                            label => vec![label.clone()],
                        };
                        Ok((labels, Self::parse(&pair[1])?))
                    })
                    .collect::<Result<Vec<_>, ExpressionError>>()?;

                Ok(Expression::Match {
                    input: Box::new(input),
                    branches,
                    fallback: Box::new(Self::parse(fallback)?),
                })
            }
            "interpolate" => {
                if args.len() < 4 || args.len() % 2 != 0 {
                    return Err(ExpressionError::InvalidArguments("interpolate"));
                }
                let base = match args[0].as_array().map(Vec::as_slice) {
                    Some([Value::String(kind)]) if kind == "linear" => 1.0,
                    Some([Value::String(kind), base]) if kind == "exponential" => base
                        .as_f64()
                        .ok_or(ExpressionError::InvalidArguments("interpolate"))?,
                    _ => return Err(ExpressionError::InvalidArguments("interpolate")),
                };

                Ok(Expression::Interpolate {
                    base,
                    input: Box::new(Self::parse(&args[1])?),
                    stops: Self::parse_stops("interpolate", &args[2..])?,
                })
            }
            "step" => {
                if args.len() < 2 || args.len() % 2 != 0 {
                    return Err(ExpressionError::InvalidArguments("step"));
                }
                Ok(Expression::Step {
                    input: Box::new(Self::parse(&args[0])?),
                    base: Box::new(Self::parse(&args[1])?),
                    stops: Self::parse_stops("step", &args[2..])?,
                })
            }
            "coalesce" => Ok(Expression::Coalesce(
                args.iter().map(Self::parse).collect::<Result<_, _>>()?,
            )),
            _ => Err(ExpressionError::UnknownOperator(operator.to_string())),
        }
    }

    fn parse_stops(
        operator: &'static str,
        args: &[Value],
    ) -> Result<Vec<(f64, Expression)>, ExpressionError> {
        let stops = args
            .chunks(2)
            .map(|pair| {
                let input = pair[0]
                    .as_f64()
                    .ok_or(ExpressionError::InvalidStops(operator))?;
                Ok((input, Self::parse(&pair[1])?))
            })
            .collect::<Result<Vec<_>, ExpressionError>>()?;

        if stops.windows(2).any(|pair| pair[0].0 >= pair[1].0) {
            return Err(ExpressionError::InvalidStops(operator));
        }

        Ok(stops)
    }

    /// Parses legacy functions like `{"property": "size", "stops": [[0, 1], [10, 5]]}`.
    fn parse_function(json: &Value) -> Result<Self, ExpressionError> {
        let input = match json.get("property").and_then(Value::as_str) {
            Some(property) => Expression::Get(property.to_string()),
            None => Expression::Zoom,
        };

        let stops = json
            .get("stops")
            .and_then(Value::as_array)
            .ok_or(ExpressionError::InvalidArguments("stops"))?;

        let pairs = stops
            .iter()
            .map(|stop| match stop.as_array().map(Vec::as_slice) {
                Some([input, output]) => Ok((input.clone(), output.clone())),
                _ => Err(ExpressionError::InvalidArguments("stops")),
            })
            .collect::<Result<Vec<_>, ExpressionError>>()?;

        let kind = json
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("exponential");

        match kind {
            "categorical" => {
                let default = json.get("default").cloned().unwrap_or(Value::Null);
                Ok(Expression::Match {
                    input: Box::new(input),
                    branches: pairs
                        .into_iter()
                        .map(|(label, output)| (vec![label], Expression::Literal(output)))
                        .collect(),
                    fallback: Box::new(Expression::Literal(default)),
                })
            }
            "interval" | "exponential" => {
                let stops = pairs
                    .into_iter()
                    .map(|(input, output)| {
                        input
                            .as_f64()
                            .map(|input| (input, Expression::Literal(output)))
                            .ok_or(ExpressionError::InvalidStops("stops"))
                    })
                    .collect::<Result<Vec<_>, ExpressionError>>()?;

                if stops.is_empty() || stops.windows(2).any(|pair| pair[0].0 >= pair[1].0) {
                    return Err(ExpressionError::InvalidStops("stops"));
                }

                if kind == "interval" {
                    let base = stops[0].1.clone();
                    Ok(Expression::Step {
                        input: Box::new(input),
                        base: Box::new(base),
                        stops,
                    })
                } else {
                    Ok(Expression::Interpolate {
                        base: json.get("base").and_then(Value::as_f64).unwrap_or(1.0),
                        input: Box::new(input),
                        stops,
                    })
                }
            }
            _ => Err(ExpressionError::UnknownOperator(kind.to_string())),
        }
    }

    /// Whether the result is independent of the feature which is evaluated.
    pub fn is_feature_constant(&self) -> bool {
        match self {
            Expression::Get(_) => false,
            Expression::Literal(_) | Expression::Zoom => true,
            Expression::Match {
                input,
                branches,
                fallback,
            } => {
                input.is_feature_constant()
                    && fallback.is_feature_constant()
                    && branches
                        .iter()
                        .all(|(_, output)| output.is_feature_constant())
            }
            Expression::Interpolate { input, stops, .. } => {
                input.is_feature_constant() && stops.iter().all(|(_, o)| o.is_feature_constant())
            }
            Expression::Step { input, base, stops } => {
                input.is_feature_constant()
                    && base.is_feature_constant()
                    && stops.iter().all(|(_, o)| o.is_feature_constant())
            }
            Expression::Coalesce(expressions) => {
                expressions.iter().all(Expression::is_feature_constant)
            }
        }
    }

    /// Whether the result is independent of the zoom level.
    pub fn is_zoom_constant(&self) -> bool {
        match self {
            Expression::Zoom => false,
            Expression::Literal(_) | Expression::Get(_) => true,
            Expression::Match {
                input,
                branches,
                fallback,
            } => {
                input.is_zoom_constant()
                    && fallback.is_zoom_constant()
                    && branches.iter().all(|(_, output)| output.is_zoom_constant())
            }
            Expression::Interpolate { input, stops, .. } => {
                input.is_zoom_constant() && stops.iter().all(|(_, o)| o.is_zoom_constant())
            }
            Expression::Step { input, base, stops } => {
                input.is_zoom_constant()
                    && base.is_zoom_constant()
                    && stops.iter().all(|(_, o)| o.is_zoom_constant())
            }
            Expression::Coalesce(expressions) => {
                expressions.iter().all(Expression::is_zoom_constant)
            }
        }
    }

    /// Evaluates to `None` if an input is missing or has the wrong type.
    pub fn evaluate<T: StyleValue>(&self, context: &EvaluationContext) -> Option<T> {
        match self {
            Expression::Literal(value) => T::from_json(value),
            Expression::Get(key) => context
                .feature
                .and_then(|feature| feature.value(key))
                .and_then(T::from_json),
            Expression::Zoom => context.zoom.and_then(|zoom| T::from_json(&Value::from(zoom))),
            Expression::Match {
                input,
                branches,
                fallback,
            } => {
                let Some(input) = input.evaluate::<Value>(context) else {
                    return fallback.evaluate(context);
                };
                branches
                    .iter()
                    .find(|(labels, _)| labels.iter().any(|label| json_eq(label, &input)))
                    .map_or_else(
                        || fallback.evaluate(context),
                        |(_, output)| output.evaluate(context),
                    )
            }
            Expression::Interpolate { base, input, stops } => {
                let input = input.evaluate::<f64>(context)?;
                let upper = stops.iter().position(|(stop, _)| *stop > input);

                match upper {
                    Some(0) => stops[0].1.evaluate(context),
                    None => stops.last()?.1.evaluate(context),
                    Some(upper) => {
                        let (lower_input, lower_output) = &stops[upper - 1];
                        let (upper_input, upper_output) = &stops[upper];
                        let t = interpolation_factor(*base, *lower_input..*upper_input, input);
                        Some(T::interpolate(
                            &lower_output.evaluate(context)?,
                            &upper_output.evaluate(context)?,
                            t,
                        ))
                    }
                }
            }
            Expression::Step { input, base, stops } => {
                let input = input.evaluate::<f64>(context)?;
                stops
                    .iter()
                    .rev()
                    .find(|(stop, _)| input >= *stop)
                    .map_or_else(|| base.evaluate(context), |(_, output)| output.evaluate(context))
            }
            Expression::Coalesce(expressions) => expressions
                .iter()
                .find_map(|expression| expression.evaluate(context)),
        }
    }

    /// Position of `input` within `range` along the zoom curve of the expression. Zoom steps
    /// never blend between their outputs, so their factor is always `0`.
    pub fn interpolation_factor(&self, range: std::ops::Range<f64>, input: f64) -> f64 {
        match self.zoom_curve() {
            Some(Expression::Step { .. }) => 0.0,
            Some(Expression::Interpolate { base, .. }) => {
                interpolation_factor(*base, range, input)
            }
            _ => interpolation_factor(1.0, range, input),
        }
    }

    /// The `interpolate` or `step` expression whose input is the zoom level.
    fn zoom_curve(&self) -> Option<&Expression> {
        match self {
            Expression::Interpolate { input, .. } | Expression::Step { input, .. }
                if **input == Expression::Zoom =>
            {
                Some(self)
            }
            Expression::Interpolate { stops, .. } => {
                stops.iter().find_map(|(_, output)| output.zoom_curve())
            }
            Expression::Step { base, stops, .. } => base
                .zoom_curve()
                .or_else(|| stops.iter().find_map(|(_, output)| output.zoom_curve())),
            Expression::Match {
                branches, fallback, ..
            } => branches
                .iter()
                .find_map(|(_, output)| output.zoom_curve())
                .or_else(|| fallback.zoom_curve()),
            Expression::Coalesce(expressions) => {
                expressions.iter().find_map(Expression::zoom_curve)
            }
            Expression::Literal(_) | Expression::Get(_) | Expression::Zoom => None,
        }
    }
}

fn json_eq(label: &Value, value: &Value) -> bool {
    match (label.as_f64(), value.as_f64()) {
        (Some(label), Some(value)) => label == value,
        _ => label == value,
    }
}

/// Position of `input` within `range`, for exponential curves with the given `base`.
pub fn interpolation_factor(base: f64, range: std::ops::Range<f64>, input: f64) -> f64 {
    let difference = range.end - range.start;
    if difference == 0.0 {
        return 0.0;
    }
    let progress = input - range.start;

    if base == 1.0 {
        progress / difference
    } else {
        (base.powf(progress) - 1.0) / (base.powf(difference) - 1.0)
    }
}
