//! Snapping a point of interest onto the network.
//!
//! The nearest line is split at the projected point so the search can start
//! exactly there. When the projection falls on a line end, the existing node
//! is used instead.

use geo::{Closest, ClosestPoint, Coord, Distance, Euclidean, LineLocatePoint, Point};
use log::debug;
use petgraph::graph::NodeIndex;

use crate::{
    Error,
    algo::search::Path,
    geometry::{line_length, split_at_fraction},
    loading::NetworkConfig,
    model::{LineFeature, NetworkGraph, PointFeature},
    spatial::LineIndex,
};

/// Regional graph with the search origin placed at the snapped point
#[derive(Debug, Clone)]
pub struct SnappedNetwork {
    pub graph: NetworkGraph,
    pub origin: NodeIndex,
    /// Distance between the point of interest and the network
    pub snap_distance: f64,
}

impl SnappedNetwork {
    /// Path holding only the origin node
    pub fn start_path(&self) -> Path {
        Path::new(self.origin)
    }
}

/// Closest line to a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestLine {
    /// Position of the line in the input slice
    pub position: usize,
    /// Closest point on the line
    pub snapped: Point<f64>,
    pub distance: f64,
}

/// Closest line within `radius` of `point`; ties go to the earliest line
pub fn nearest_line(lines: &[LineFeature], point: &Point<f64>, radius: f64) -> Option<NearestLine> {
    let index = LineIndex::new(lines.iter().map(|line| &line.geometry));
    let mut candidates = index.near(point, radius).collect::<Vec<_>>();
    candidates.sort_unstable();

    let mut nearest: Option<NearestLine> = None;
    for position in candidates {
        let snapped = match lines[position].geometry.closest_point(point) {
            Closest::SinglePoint(snapped) | Closest::Intersection(snapped) => snapped,
            Closest::Indeterminate => continue,
        };
        let distance = Euclidean.distance(&snapped, point);

        if nearest.is_none_or(|best| distance < best.distance) {
            nearest = Some(NearestLine {
                position,
                snapped,
                distance,
            });
        }
    }

    nearest.filter(|line| line.distance <= radius)
}

/// Snap `point` onto the nearest of `lines` and build the regional graph.
///
/// # Errors
///
/// `Error::SnapFailure` if no line lies within `radius`,
/// `Error::GraphConstruction` if the origin cannot be found in the graph.
pub fn snap_to_network(
    mut lines: Vec<LineFeature>,
    point: &PointFeature,
    radius: f64,
    config: &NetworkConfig,
) -> Result<SnappedNetwork, Error> {
    let Some(nearest) = nearest_line(&lines, &point.geometry, radius) else {
        return Err(Error::SnapFailure {
            point_id: point.id.clone(),
            radius,
        });
    };
    debug!(
        "Point {} snapped to line {} at distance {:.3}",
        point.id, nearest.position, nearest.distance
    );

    let line = &lines[nearest.position].geometry;
    let fraction = line.line_locate_point(&nearest.snapped).unwrap_or(0.0);
    let (head, tail) = split_at_fraction(line, fraction);

    let existing_vertex = if line_length(&head) <= config.precision {
        line.0.first().copied()
    } else if line_length(&tail) <= config.precision {
        line.0.last().copied()
    } else {
        None
    };

    if let Some(vertex) = existing_vertex {
        let graph = NetworkGraph::from_lines(lines, config);
        let origin = vertex_origin(&graph, vertex, config)?;
        return Ok(SnappedNetwork {
            graph,
            origin,
            snap_distance: nearest.distance,
        });
    }

    let original = lines.remove(nearest.position);
    lines.push(LineFeature::new(head).with_properties(original.properties.clone()));
    lines.push(LineFeature::new(tail).with_properties(original.properties));
    let head_position = lines.len() - 2;
    let tail_position = lines.len() - 1;

    let graph = NetworkGraph::from_lines(lines, config);
    let origin = split_origin(&graph, head_position, tail_position)?;
    debug!(
        "Split line {} for point {}; origin node {} has degree {}",
        nearest.position,
        point.id,
        origin.index(),
        graph.degree(origin)
    );

    Ok(SnappedNetwork {
        graph,
        origin,
        snap_distance: nearest.distance,
    })
}

fn vertex_origin(
    graph: &NetworkGraph,
    vertex: Coord<f64>,
    config: &NetworkConfig,
) -> Result<NodeIndex, Error> {
    let origin = graph.node_at(vertex).ok_or_else(|| {
        Error::GraphConstruction(format!("no node at snapped vertex {vertex:?}"))
    })?;

    let degree = graph.degree(origin);
    if degree < config.intersection_degree {
        debug!(
            "Snapped onto node {} of degree {degree}, not an intersection",
            origin.index()
        );
    }

    Ok(origin)
}

fn split_origin(
    graph: &NetworkGraph,
    head_position: usize,
    tail_position: usize,
) -> Result<NodeIndex, Error> {
    let endpoints = |position| {
        graph
            .edge_for_line(position)
            .and_then(|edge| graph.endpoints(edge))
    };
    let (Some((head_start, head_end)), Some((tail_start, tail_end))) =
        (endpoints(head_position), endpoints(tail_position))
    else {
        return Err(Error::GraphConstruction(
            "split lines are missing from the graph".to_string(),
        ));
    };

    if head_end == tail_start {
        return Ok(head_end);
    }

    [head_start, head_end]
        .into_iter()
        .find(|node| *node == tail_start || *node == tail_end)
        .ok_or_else(|| Error::GraphConstruction("split lines share no node".to_string()))
}
