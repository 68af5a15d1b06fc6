//! `GeoJSON` conversion of batch results.

use geojson::{Feature, FeatureCollection, Geometry, GeometryValue, feature::Id};
use serde_json::Value;

use crate::{
    Error,
    algo::{BatchReport, ReachedEdge, ServiceAreaPolygon},
};

impl ServiceAreaPolygon {
    /// Polygon feature with the point's id and attributes
    pub fn to_feature(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(GeometryValue::from(&self.geometry))),
            id: Some(Id::String(self.id.clone())),
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }
}

impl ReachedEdge {
    /// Line feature with the edge attributes plus `distance`, `whole` and
    /// the id of the point the edge was reached from
    pub fn to_feature(&self, point_id: &str) -> Feature {
        let mut properties = self.properties.clone();
        properties.insert("distance".to_string(), Value::from(self.distance));
        properties.insert("whole".to_string(), Value::Bool(self.whole));
        properties.insert("point_id".to_string(), Value::from(point_id));

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(GeometryValue::from(&self.geometry))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

impl BatchReport {
    /// One polygon feature per successful point
    pub fn areas_to_geojson(&self) -> FeatureCollection {
        collection(self.areas().map(ServiceAreaPolygon::to_feature).collect())
    }

    /// One line feature per reached edge or fragment
    pub fn edges_to_geojson(&self) -> FeatureCollection {
        collection(
            self.edges()
                .map(|(point_id, edge)| edge.to_feature(point_id))
                .collect(),
        )
    }

    pub fn areas_to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.areas_to_geojson())
            .map_err(|e| Error::InvalidData(e.to_string()))
    }

    pub fn edges_to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.edges_to_geojson())
            .map_err(|e| Error::InvalidData(e.to_string()))
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
