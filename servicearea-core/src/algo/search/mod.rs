//! Distance-bounded search over a network graph.
//!
//! Every branch extends its path edge by edge. Edges that fit in the
//! remaining budget are claimed whole and explored further, edges that do
//! not are chopped where the budget runs out. Branches fork into parallel
//! sub-searches which all record into the same [`ServiceArea`].

mod area;
mod path;

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, warn};
use petgraph::graph::{EdgeIndex, NodeIndex};
use rayon::prelude::*;

pub use area::{Claim, Fragment, Reach, ReachedEdge, ServiceArea};
pub use path::Path;

use crate::{Error, model::NetworkGraph};

/// Counters describing one search run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Paths whose last node was expanded
    pub explored_paths: usize,
    /// Edges cut where the budget ran out
    pub chopped_edges: usize,
    /// Branches abandoned on a graph inconsistency
    pub dropped_branches: usize,
}

/// Search state shared by all branches of one origin
#[derive(Debug)]
pub struct ServiceAreaSearch<'a> {
    network: &'a NetworkGraph,
    budget: f64,
    area: ServiceArea,
    explored_paths: AtomicUsize,
    chopped_edges: AtomicUsize,
    dropped_branches: AtomicUsize,
}

impl<'a> ServiceAreaSearch<'a> {
    pub fn new(network: &'a NetworkGraph, budget: f64) -> Self {
        Self {
            network,
            budget,
            area: ServiceArea::new(),
            explored_paths: AtomicUsize::new(0),
            chopped_edges: AtomicUsize::new(0),
            dropped_branches: AtomicUsize::new(0),
        }
    }

    /// Explore from `start` and hand back the filled service area
    pub fn run(self, start: &Path) -> ServiceArea {
        self.explore(start);

        let stats = self.stats();
        debug!(
            "Search from node {} reached {} edges ({} paths, {} chopped, {} dropped)",
            start.origin().index(),
            self.area.len(),
            stats.explored_paths,
            stats.chopped_edges,
            stats.dropped_branches
        );

        self.area
    }

    pub fn service_area(&self) -> &ServiceArea {
        &self.area
    }

    pub fn stats(&self) -> SearchStats {
        SearchStats {
            explored_paths: self.explored_paths.load(Ordering::Relaxed),
            chopped_edges: self.chopped_edges.load(Ordering::Relaxed),
            dropped_branches: self.dropped_branches.load(Ordering::Relaxed),
        }
    }

    /// Expand the last node of `path`, then join the sub-searches of every
    /// branch worth continuing.
    pub fn explore(&self, path: &Path) {
        self.explored_paths.fetch_add(1, Ordering::Relaxed);

        let node = path.last_node();
        let travelled = path.length();
        let mut branches = Vec::new();

        for edge_id in self.network.incident_edges(node) {
            if path.last_edge() == Some(edge_id) {
                continue;
            }
            let Some(far) = self.network.opposite(edge_id, node) else {
                continue;
            };

            let extended = path.extend(edge_id, far, self.network.edge(edge_id).length());
            if extended.length() <= self.budget {
                let recorded = self.area.record(
                    edge_id,
                    Claim::Whole {
                        distance: travelled,
                    },
                );
                // Dead ends are recorded but not explored
                if recorded && self.network.degree(far) > 1 && extended.is_valid() {
                    branches.push(extended);
                }
            } else {
                self.chop(path, edge_id);
            }
        }

        branches.par_iter().for_each(|branch| self.explore(branch));
    }

    fn chop(&self, path: &Path, edge_id: EdgeIndex) {
        let remaining = self.budget - path.length();
        if remaining <= 0.0 || !path.is_valid() {
            return;
        }

        match chop_claims(
            self.network,
            edge_id,
            path.last_node(),
            path.length(),
            remaining,
        ) {
            Ok(claims) => {
                self.chopped_edges.fetch_add(1, Ordering::Relaxed);
                for claim in claims {
                    self.area.record(edge_id, claim);
                }
            }
            Err(err) => {
                self.dropped_branches.fetch_add(1, Ordering::Relaxed);
                warn!("Dropping search branch: {err}");
            }
        }
    }
}

/// Claims for an edge cut `remaining` units away from `arrival`.
///
/// A regular edge is cut from the end the path arrives at. A self-loop is
/// cut once per traversal direction.
pub(crate) fn chop_claims(
    network: &NetworkGraph,
    edge: EdgeIndex,
    arrival: NodeIndex,
    distance: f64,
    remaining: f64,
) -> Result<Vec<Claim>, Error> {
    let (source, target) = network.endpoints(edge).ok_or_else(|| {
        Error::GraphConstruction(format!("edge {} is not in the graph", edge.index()))
    })?;

    let fragment = Fragment {
        distance,
        length: remaining.min(network.edge(edge).length()),
    };
    debug!(
        "Chopping edge {} ({}) at {} from node {}",
        edge.index(),
        network.edge(edge).name().unwrap_or("unnamed"),
        fragment.length,
        arrival.index()
    );

    if source == arrival && network.is_self_loop(edge) {
        Ok(vec![Claim::FromSource(fragment), Claim::FromTarget(fragment)])
    } else if source == arrival {
        Ok(vec![Claim::FromSource(fragment)])
    } else if target == arrival {
        Ok(vec![Claim::FromTarget(fragment)])
    } else {
        Err(Error::GraphConstruction(format!(
            "node {} is not an endpoint of edge {}",
            arrival.index(),
            edge.index()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::line_length;
    use crate::loading::NetworkConfig;
    use crate::model::LineFeature;
    use approx::assert_relative_eq;
    use geo::{LineString, coord, line_string};

    fn build(lines: Vec<LineString<f64>>) -> NetworkGraph {
        let lines = lines.into_iter().map(LineFeature::new).collect();
        NetworkGraph::from_lines(lines, &NetworkConfig::default())
    }

    fn grid() -> NetworkGraph {
        let mut lines = Vec::new();
        for i in 0..3 {
            let at = f64::from(i) * 10.0;
            lines.push(line_string![(x: 0.0, y: at), (x: 10.0, y: at)]);
            lines.push(line_string![(x: 10.0, y: at), (x: 20.0, y: at)]);
            lines.push(line_string![(x: at, y: 0.0), (x: at, y: 10.0)]);
            lines.push(line_string![(x: at, y: 10.0), (x: at, y: 20.0)]);
        }
        build(lines)
    }

    fn arm_and_loop() -> NetworkGraph {
        build(vec![
            line_string![(x: 0.0, y: 0.0), (x: 20.0, y: 0.0)],
            line_string![
                (x: 20.0, y: 0.0),
                (x: 40.0, y: 0.0),
                (x: 40.0, y: 20.0),
                (x: 20.0, y: 20.0),
                (x: 20.0, y: 0.0)
            ],
        ])
    }

    #[test]
    fn test_grid_respects_budget() {
        let network = grid();
        let center = network.node_at(coord! { x: 10.0, y: 10.0 }).unwrap();
        let budget = 15.0;

        let area = ServiceAreaSearch::new(&network, budget).run(&Path::new(center));
        let reached = area.reached_edges(&network);

        assert_eq!(reached.len(), 12);
        assert_eq!(reached.iter().filter(|edge| edge.whole).count(), 4);
        for edge in &reached {
            assert!(edge.distance <= budget);
            assert!(edge.distance + line_length(&edge.geometry) <= budget + 1e-9);
        }
    }

    #[test]
    fn test_whole_edges_keep_shortest_distance() {
        let network = grid();
        let corner = network.node_at(coord! { x: 0.0, y: 0.0 }).unwrap();

        let area = ServiceAreaSearch::new(&network, 100.0).run(&Path::new(corner));

        assert_eq!(area.len(), network.edge_count());
        let far_edge = network.edge_for_line(9).unwrap();
        assert_eq!(area.get(far_edge), Some(Reach::Whole { distance: 30.0 }));
        for (_, reach) in area.entries() {
            assert!(matches!(reach, Reach::Whole { distance } if distance <= 30.0));
        }
    }

    #[test]
    fn test_dead_ends_are_not_explored() {
        let network = build(vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 10.0)],
            line_string![(x: 0.0, y: 10.0), (x: 0.0, y: 20.0)],
        ]);
        let origin = network.node_at(coord! { x: 0.0, y: 0.0 }).unwrap();

        let search = ServiceAreaSearch::new(&network, 100.0);
        search.explore(&Path::new(origin));

        assert_eq!(search.service_area().len(), 3);
        // The origin and the middle node of the second street
        assert_eq!(search.stats().explored_paths, 2);
    }

    #[test]
    fn test_loop_is_chopped_in_both_directions() {
        let network = arm_and_loop();
        let origin = network.node_at(coord! { x: 0.0, y: 0.0 }).unwrap();
        let ring = network.edge_for_line(1).unwrap();

        let area = ServiceAreaSearch::new(&network, 70.0).run(&Path::new(origin));

        let arm = network.edge_for_line(0).unwrap();
        assert_eq!(area.get(arm), Some(Reach::Whole { distance: 0.0 }));
        let fragment = Fragment {
            distance: 20.0,
            length: 50.0,
        };
        assert_eq!(
            area.get(ring),
            Some(Reach::Partial {
                from_source: Some(fragment),
                from_target: Some(fragment),
            })
        );

        let pieces = area
            .reached_edges(&network)
            .into_iter()
            .filter(|edge| edge.edge == ring)
            .collect::<Vec<_>>();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].geometry.0.first(), Some(&coord! { x: 20.0, y: 0.0 }));
        assert_eq!(pieces[0].geometry.0.last(), Some(&coord! { x: 30.0, y: 20.0 }));
        assert_eq!(pieces[1].geometry.0.first(), Some(&coord! { x: 40.0, y: 10.0 }));
        assert_eq!(pieces[1].geometry.0.last(), Some(&coord! { x: 20.0, y: 0.0 }));
        for piece in pieces {
            assert_relative_eq!(line_length(&piece.geometry), 50.0);
        }
    }

    #[test]
    fn test_loop_within_budget_is_whole() {
        let network = arm_and_loop();
        let origin = network.node_at(coord! { x: 0.0, y: 0.0 }).unwrap();
        let ring = network.edge_for_line(1).unwrap();

        let area = ServiceAreaSearch::new(&network, 200.0).run(&Path::new(origin));

        assert_eq!(area.get(ring), Some(Reach::Whole { distance: 20.0 }));
    }

    #[test]
    fn test_chop_from_foreign_node_fails() {
        let network = build(vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 50.0, y: 0.0), (x: 60.0, y: 0.0)],
        ]);
        let edge = network.edge_for_line(0).unwrap();
        let foreign = network.node_at(coord! { x: 60.0, y: 0.0 }).unwrap();

        let result = chop_claims(&network, edge, foreign, 0.0, 5.0);

        assert!(matches!(result, Err(Error::GraphConstruction(_))));
    }

    #[test]
    fn test_chop_self_loop_gives_both_ends() {
        let network = arm_and_loop();
        let ring = network.edge_for_line(1).unwrap();
        let junction = network.node_at(coord! { x: 20.0, y: 0.0 }).unwrap();
        let fragment = Fragment {
            distance: 20.0,
            length: 30.0,
        };

        let claims = chop_claims(&network, ring, junction, 20.0, 30.0).unwrap();

        assert!(network.is_self_loop(ring));
        assert_eq!(
            claims,
            vec![Claim::FromSource(fragment), Claim::FromTarget(fragment)]
        );
    }

    #[test]
    fn test_chop_from_target_end() {
        let network = build(vec![line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]]);
        let edge = network.edge_for_line(0).unwrap();
        let target = network.node_at(coord! { x: 10.0, y: 0.0 }).unwrap();

        let claims = chop_claims(&network, edge, target, 12.0, 4.0).unwrap();

        assert_eq!(
            claims,
            vec![Claim::FromTarget(Fragment {
                distance: 12.0,
                length: 4.0
            })]
        );
    }
}
