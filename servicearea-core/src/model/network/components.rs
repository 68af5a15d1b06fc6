//! Network graph components - nodes and edges

use geo::{LineString, Point};

use crate::model::Attributes;

/// Network graph node: a line endpoint or an intersection
#[derive(Debug, Clone)]
pub struct NetworkNode {
    /// Node coordinates
    pub geometry: Point<f64>,
}

/// Network graph edge (one input line)
#[derive(Debug, Clone)]
pub struct NetworkEdge {
    /// Euclidean length of the geometry
    pub length: f64,
    /// Geometry, oriented from the source node to the target node
    pub geometry: LineString<f64>,
    /// Attributes of the line the edge was built from
    pub properties: Attributes,
}

impl NetworkEdge {
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").and_then(|value| value.as_str())
    }
}
