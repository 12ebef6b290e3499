//! Paint properties of style layers and the expressions they are written in.

pub mod circle;
pub mod expression;
pub mod layer;
pub mod property;

pub use circle::{Alignment, CirclePaint, CirclePaintProperties};
pub use layer::{LayerPaint, StyleLayer};
pub use property::{PossiblyEvaluatedPropertyValue, PropertyExpression, StyleProperty, StyleValue};
