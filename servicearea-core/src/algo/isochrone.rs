//! Service area of a single point: regional extract, snapping, search and
//! polygon assembly.

use geo::{MultiPolygon, Point, Polygon, Rect, coord};
use log::debug;

use crate::{
    Error,
    algo::{
        assembly::BufferAssembler,
        search::{ReachedEdge, ServiceAreaSearch},
        snap::snap_to_network,
    },
    loading::{FeatureSource, ServiceAreaConfig},
    model::{Attributes, PointFeature},
};

/// Service-area polygon carrying the attributes of its point
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceAreaPolygon {
    pub id: String,
    pub properties: Attributes,
    pub geometry: MultiPolygon<f64>,
}

/// Everything computed for one point
#[derive(Debug, Clone, PartialEq)]
pub struct PointServiceArea {
    pub area: ServiceAreaPolygon,
    pub edges: Vec<ReachedEdge>,
}

/// Square of half-width `radius` centred on `center`
pub fn search_region(center: &Point<f64>, radius: f64) -> Polygon<f64> {
    Rect::new(
        coord! { x: center.x() - radius, y: center.y() - radius },
        coord! { x: center.x() + radius, y: center.y() + radius },
    )
    .to_polygon()
}

/// Compute the service area of `point` over the lines of `source`.
///
/// # Errors
///
/// Propagates source errors and any failure of the snapping, search or
/// assembly stages.
pub fn calculate_service_area<S>(
    source: &S,
    point: &PointFeature,
    config: &ServiceAreaConfig,
) -> Result<PointServiceArea, Error>
where
    S: FeatureSource + ?Sized,
{
    let radius = config.search_radius();
    let region = search_region(&point.geometry, radius);
    let lines = source.features_intersecting(&region)?;
    debug!("Point {}: {} lines in region", point.id, lines.len());

    let snapped = snap_to_network(lines, point, radius, &config.network)?;
    let area = ServiceAreaSearch::new(&snapped.graph, config.network_distance)
        .run(&snapped.start_path());
    let edges = area.reached_edges(&snapped.graph);

    let geometry = BufferAssembler::new(config.buffer_distance).assemble(&edges)?;
    debug!(
        "Point {}: {} reached edges, {} polygons",
        point.id,
        edges.len(),
        geometry.0.len()
    );

    Ok(PointServiceArea {
        area: ServiceAreaPolygon {
            id: point.id.clone(),
            properties: point.properties.clone(),
            geometry,
        },
        edges,
    })
}
