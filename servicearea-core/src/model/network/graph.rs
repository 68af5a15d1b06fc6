//! Adjacency graph built from network lines

use geo::Coord;
use hashbrown::HashMap;
use log::{debug, warn};
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use super::components::{NetworkEdge, NetworkNode};
use crate::geometry::line_length;
use crate::loading::NetworkConfig;
use crate::model::LineFeature;

type GridKey = (i64, i64);

/// Undirected network graph.
///
/// Every input line becomes one edge, in input order, and coincident
/// endpoints share a node. Multi-edges and self-loops are kept. Edge and
/// node indices are the identities used by the search.
#[derive(Debug, Clone)]
pub struct NetworkGraph {
    pub graph: UnGraph<NetworkNode, NetworkEdge>,
    node_lookup: HashMap<GridKey, NodeIndex>,
    degrees: Vec<usize>,
    line_edges: Vec<Option<EdgeIndex>>,
    precision: f64,
}

impl NetworkGraph {
    pub fn from_lines(lines: Vec<LineFeature>, config: &NetworkConfig) -> Self {
        let mut network = Self {
            graph: UnGraph::with_capacity(lines.len() + 1, lines.len()),
            node_lookup: HashMap::with_capacity(lines.len() + 1),
            degrees: Vec::with_capacity(lines.len() + 1),
            line_edges: Vec::with_capacity(lines.len()),
            precision: config.precision,
        };

        for (position, line) in lines.into_iter().enumerate() {
            let (Some(&first), Some(&last)) = (line.geometry.0.first(), line.geometry.0.last())
            else {
                warn!("Skipping network line {position} without coordinates");
                network.line_edges.push(None);
                continue;
            };
            if line.geometry.0.len() < 2 {
                warn!("Skipping network line {position} with a single coordinate");
                network.line_edges.push(None);
                continue;
            }

            let source = network.node_for(first);
            let target = network.node_for(last);
            let edge = network.graph.add_edge(
                source,
                target,
                NetworkEdge {
                    length: line_length(&line.geometry),
                    geometry: line.geometry,
                    properties: line.properties,
                },
            );

            // A self-loop contributes both of its ends
            network.degrees[source.index()] += 1;
            network.degrees[target.index()] += 1;
            network.line_edges.push(Some(edge));
        }

        debug!(
            "Built network graph with {} nodes and {} edges",
            network.graph.node_count(),
            network.graph.edge_count()
        );

        network
    }

    fn node_for(&mut self, coord: Coord<f64>) -> NodeIndex {
        let key = grid_key(coord, self.precision);
        if let Some(&node) = self.node_lookup.get(&key) {
            return node;
        }

        let node = self.graph.add_node(NetworkNode {
            geometry: coord.into(),
        });
        self.degrees.push(0);
        self.node_lookup.insert(key, node);
        node
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, node: NodeIndex) -> &NetworkNode {
        &self.graph[node]
    }

    pub fn edge(&self, edge: EdgeIndex) -> &NetworkEdge {
        &self.graph[edge]
    }

    /// Source and target node of an edge, in geometry order
    pub fn endpoints(&self, edge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(edge)
    }

    /// Number of incident edge ends
    pub fn degree(&self, node: NodeIndex) -> usize {
        self.degrees.get(node.index()).copied().unwrap_or(0)
    }

    /// Edges touching `node`; a self-loop is listed once
    pub fn incident_edges(&self, node: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(node).map(|edge| edge.id())
    }

    pub fn is_self_loop(&self, edge: EdgeIndex) -> bool {
        self.endpoints(edge)
            .is_some_and(|(source, target)| source == target)
    }

    /// Endpoint of `edge` opposite to `node`, `None` if `node` is not on it
    pub fn opposite(&self, edge: EdgeIndex, node: NodeIndex) -> Option<NodeIndex> {
        match self.endpoints(edge)? {
            (source, target) if source == node => Some(target),
            (source, target) if target == node => Some(source),
            _ => None,
        }
    }

    /// Node at a coordinate, within the configured precision
    pub fn node_at(&self, coord: Coord<f64>) -> Option<NodeIndex> {
        self.node_lookup
            .get(&grid_key(coord, self.precision))
            .copied()
    }

    /// Edge built from the line at `position` of the input
    pub fn edge_for_line(&self, position: usize) -> Option<EdgeIndex> {
        self.line_edges.get(position).copied().flatten()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn grid_key(coord: Coord<f64>, precision: f64) -> GridKey {
    (
        (coord.x / precision).round() as i64,
        (coord.y / precision).round() as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, coord, line_string};

    fn build(lines: Vec<LineString<f64>>) -> NetworkGraph {
        let lines = lines.into_iter().map(LineFeature::new).collect();
        NetworkGraph::from_lines(lines, &NetworkConfig::default())
    }

    #[test]
    fn test_shared_endpoints_collapse() {
        let network = build(vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 10.0, y: 0.0), (x: 10.0, y: 10.0)],
            line_string![(x: 10.0, y: 0.0), (x: 20.0, y: 0.0)],
        ]);

        assert_eq!(network.node_count(), 4);
        assert_eq!(network.edge_count(), 3);

        let center = network.node_at(coord! { x: 10.0, y: 0.0 }).unwrap();
        assert_eq!(network.degree(center), 3);
        assert_eq!(network.incident_edges(center).count(), 3);
    }

    #[test]
    fn test_self_loop_counts_twice() {
        let network = build(vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![
                (x: 10.0, y: 0.0),
                (x: 20.0, y: 0.0),
                (x: 20.0, y: 10.0),
                (x: 10.0, y: 0.0)
            ],
        ]);

        let junction = network.node_at(coord! { x: 10.0, y: 0.0 }).unwrap();
        let ring = network.edge_for_line(1).unwrap();

        assert!(network.is_self_loop(ring));
        assert_eq!(network.degree(junction), 3);
        assert_eq!(network.incident_edges(junction).count(), 2);
        assert_eq!(network.opposite(ring, junction), Some(junction));
    }

    #[test]
    fn test_multi_edges_are_kept() {
        let network = build(vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 5.0), (x: 10.0, y: 0.0)],
        ]);

        assert_eq!(network.node_count(), 2);
        assert_eq!(network.edge_count(), 2);
        let first = network.edge_for_line(0).unwrap();
        let second = network.edge_for_line(1).unwrap();
        assert_ne!(first, second);
        assert_eq!(network.endpoints(first), network.endpoints(second));
    }

    #[test]
    fn test_degenerate_lines_are_skipped() {
        let network = build(vec![
            LineString::new(vec![]),
            line_string![(x: 1.0, y: 1.0)],
            line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0)],
        ]);

        assert_eq!(network.edge_count(), 1);
        assert_eq!(network.edge_for_line(0), None);
        assert_eq!(network.edge_for_line(1), None);
        let edge = network.edge_for_line(2).unwrap();
        assert!((network.edge(edge).length() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_precision_merges_nearby_endpoints() {
        let lines = vec![
            LineFeature::new(line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]),
            LineFeature::new(line_string![(x: 10.0004, y: 0.0), (x: 20.0, y: 0.0)]),
        ];
        let config = NetworkConfig {
            precision: 0.01,
            ..NetworkConfig::default()
        };
        let network = NetworkGraph::from_lines(lines, &config);

        assert_eq!(network.node_count(), 3);
    }

    #[test]
    fn test_opposite_rejects_foreign_node() {
        let network = build(vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 50.0, y: 0.0), (x: 60.0, y: 0.0)],
        ]);

        let edge = network.edge_for_line(0).unwrap();
        let foreign = network.node_at(coord! { x: 50.0, y: 0.0 }).unwrap();
        assert_eq!(network.opposite(edge, foreign), None);
    }
}
