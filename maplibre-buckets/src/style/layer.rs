//! Vector tile layer descriptions.

use serde::{Deserialize, Serialize};

use crate::style::circle::CirclePaint;

/// The different types of paints.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", content = "paint")]
pub enum LayerPaint {
    #[serde(rename = "circle")]
    Circle(CirclePaint),
}

/// Stores the styles of a specific layer. Layers of types which can not be bucketed, and circle
/// layers with invalid paint, have no paint.
#[derive(Debug, Clone)]
pub struct StyleLayer {
    pub id: String,
    pub type_: String,
    pub paint: Option<LayerPaint>,
    pub source: Option<String>,
    pub source_layer: Option<String>,
}

impl StyleLayer {
    pub fn circle_paint(&self) -> Option<&CirclePaint> {
        match &self.paint {
            Some(LayerPaint::Circle(paint)) => Some(paint),
            None => None,
        }
    }
}

#[derive(Deserialize)]
struct StyleLayerDef {
    id: String,
    #[serde(rename = "type")]
    type_: String,
    source: Option<String>,
    #[serde(rename = "source-layer")]
    source_layer: Option<String>,
    paint: Option<serde_json::Value>,
}

impl<'de> Deserialize<'de> for StyleLayer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let def = StyleLayerDef::deserialize(deserializer)?;

        let paint = match def.type_.as_str() {
            // Circle layers without paint use the default paint
            "circle" => serde_json::from_value(def.paint.unwrap_or(serde_json::Value::Null))
                .map(|paint: Option<CirclePaint>| LayerPaint::Circle(paint.unwrap_or_default()))
                .map_err(|e| log::error!("circle paint failed {}: {:?}", def.id, e))
                .ok(),
            _ => None,
        };

        Ok(StyleLayer {
            id: def.id,
            type_: def.type_,
            paint,
            source: def.source,
            source_layer: def.source_layer,
        })
    }
}
