//! Input features: points of interest and network lines

use geo::{LineString, Point};

use crate::geometry::line_length;

/// Feature attribute bag, carried from inputs to outputs
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Point of interest with a stable identifier
#[derive(Debug, Clone, PartialEq)]
pub struct PointFeature {
    pub id: String,
    pub geometry: Point<f64>,
    pub properties: Attributes,
}

impl PointFeature {
    pub fn new(id: impl Into<String>, geometry: Point<f64>) -> Self {
        Self {
            id: id.into(),
            geometry,
            properties: Attributes::new(),
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Attributes) -> Self {
        self.properties = properties;
        self
    }
}

/// Network line (road, path segment)
#[derive(Debug, Clone, PartialEq)]
pub struct LineFeature {
    pub geometry: LineString<f64>,
    pub properties: Attributes,
}

impl LineFeature {
    pub fn new(geometry: LineString<f64>) -> Self {
        Self {
            geometry,
            properties: Attributes::new(),
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Attributes) -> Self {
        self.properties = properties;
        self
    }

    pub fn length(&self) -> f64 {
        line_length(&self.geometry)
    }
}
