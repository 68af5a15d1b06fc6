//! GeoJSON readers for network lines and points of interest

use std::path::Path;

use geojson::{Feature, GeoJson, feature::Id};
use log::warn;
use serde_json::Value as JsonValue;

use crate::{
    Error,
    model::{Attributes, LineFeature, PointFeature},
};

/// Read network lines from a GeoJSON file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid GeoJSON
pub fn read_line_features(path: impl AsRef<Path>) -> Result<Vec<LineFeature>, Error> {
    let text = std::fs::read_to_string(path)?;
    line_features_from_str(&text)
}

/// Read points of interest from a GeoJSON file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid GeoJSON
pub fn read_point_features(path: impl AsRef<Path>) -> Result<Vec<PointFeature>, Error> {
    let text = std::fs::read_to_string(path)?;
    point_features_from_str(&text)
}

/// Parse network lines; multi-line strings are split into their parts
pub fn line_features_from_str(text: &str) -> Result<Vec<LineFeature>, Error> {
    let mut lines = Vec::new();

    for (position, feature) in parse_features(text)?.into_iter().enumerate() {
        let properties = feature.properties.unwrap_or_default();
        let Some(geometry) = feature.geometry else {
            warn!("Skipping network feature {position} without geometry");
            continue;
        };

        match geo::Geometry::<f64>::try_from(geometry)? {
            geo::Geometry::LineString(line) => {
                lines.push(LineFeature::new(line).with_properties(properties));
            }
            geo::Geometry::MultiLineString(multi) => {
                lines.extend(
                    multi
                        .into_iter()
                        .map(|line| LineFeature::new(line).with_properties(properties.clone())),
                );
            }
            _ => warn!("Skipping network feature {position}: not a line geometry"),
        }
    }

    Ok(lines)
}

/// Parse points of interest
pub fn point_features_from_str(text: &str) -> Result<Vec<PointFeature>, Error> {
    let mut points = Vec::new();

    for (position, feature) in parse_features(text)?.into_iter().enumerate() {
        let properties = feature.properties.unwrap_or_default();
        let id = feature_id(feature.id, &properties, position);
        let Some(geometry) = feature.geometry else {
            warn!("Skipping point feature {id} without geometry");
            continue;
        };

        match geo::Geometry::<f64>::try_from(geometry)? {
            geo::Geometry::Point(point) => {
                points.push(PointFeature::new(id, point).with_properties(properties));
            }
            _ => warn!("Skipping point feature {id}: not a point geometry"),
        }
    }

    Ok(points)
}

fn parse_features(text: &str) -> Result<Vec<Feature>, Error> {
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection.features),
        GeoJson::Feature(feature) => Ok(vec![feature]),
        GeoJson::Geometry(_) => Err(Error::InvalidData(
            "Expected a GeoJSON feature or feature collection, got a bare geometry".to_string(),
        )),
    }
}

fn feature_id(id: Option<Id>, properties: &Attributes, position: usize) -> String {
    match id {
        Some(Id::String(id)) => id,
        Some(Id::Number(id)) => id.to_string(),
        None => match properties.get("id") {
            Some(JsonValue::String(id)) => id.clone(),
            Some(JsonValue::Number(id)) => id.to_string(),
            _ => position.to_string(),
        },
    }
}
