//! Shared result of a search and the policy merging claims on one edge.
//!
//! Claims form a join: recording is idempotent and the final map does not
//! depend on the order in which branches record their claims.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use geo::LineString;
use petgraph::graph::EdgeIndex;

use crate::geometry::substring;
use crate::model::{Attributes, NetworkGraph};

/// Chopped part of an edge, anchored at one of its ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    /// Path length at the anchoring node
    pub distance: f64,
    /// Reached length along the edge
    pub length: f64,
}

impl Fragment {
    /// Same-end fragments nest, so the longer one contains the other
    fn supersedes(&self, other: &Fragment) -> bool {
        self.length > other.length
            || (self.length == other.length && self.distance < other.distance)
    }
}

/// What a search branch asserts about one edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Claim {
    /// The whole edge fits in the budget; `distance` is the path length
    /// before the edge
    Whole { distance: f64 },
    /// Fragment starting at the edge's source node
    FromSource(Fragment),
    /// Fragment ending at the edge's target node
    FromTarget(Fragment),
}

/// Recorded reach of one edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reach {
    Whole {
        distance: f64,
    },
    Partial {
        from_source: Option<Fragment>,
        from_target: Option<Fragment>,
    },
}

impl Reach {
    fn from_claim(claim: Claim) -> Self {
        match claim {
            Claim::Whole { distance } => Reach::Whole { distance },
            Claim::FromSource(fragment) => Reach::Partial {
                from_source: Some(fragment),
                from_target: None,
            },
            Claim::FromTarget(fragment) => Reach::Partial {
                from_source: None,
                from_target: Some(fragment),
            },
        }
    }

    /// Entry after applying `claim`, `None` when the claim changes nothing
    fn merge(&self, claim: Claim) -> Option<Reach> {
        match (*self, claim) {
            (Reach::Whole { distance: kept }, Claim::Whole { distance }) => {
                (distance < kept).then_some(Reach::Whole { distance })
            }
            (Reach::Whole { .. }, _) => None,
            (Reach::Partial { .. }, Claim::Whole { distance }) => Some(Reach::Whole { distance }),
            (
                Reach::Partial {
                    from_source,
                    from_target,
                },
                Claim::FromSource(fragment),
            ) => better(from_source, fragment).map(|from_source| Reach::Partial {
                from_source: Some(from_source),
                from_target,
            }),
            (
                Reach::Partial {
                    from_source,
                    from_target,
                },
                Claim::FromTarget(fragment),
            ) => better(from_target, fragment).map(|from_target| Reach::Partial {
                from_source,
                from_target: Some(from_target),
            }),
        }
    }
}

fn better(kept: Option<Fragment>, candidate: Fragment) -> Option<Fragment> {
    match kept {
        Some(kept) if !candidate.supersedes(&kept) => None,
        _ => Some(candidate),
    }
}

/// Edge (or part of it) reached from the origin
#[derive(Debug, Clone, PartialEq)]
pub struct ReachedEdge {
    pub edge: EdgeIndex,
    /// Path length from the origin to the start of `geometry`
    pub distance: f64,
    pub geometry: LineString<f64>,
    pub properties: Attributes,
    /// `false` for chopped fragments
    pub whole: bool,
}

/// Concurrent map from edge identity to its best known reach
#[derive(Debug, Default)]
pub struct ServiceArea {
    entries: DashMap<EdgeIndex, Reach>,
}

impl ServiceArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the merge policy for one claim.
    ///
    /// Returns `true` if the entry was inserted or replaced. The
    /// read-compare-write runs under the key's shard lock.
    pub fn record(&self, edge: EdgeIndex, claim: Claim) -> bool {
        match self.entries.entry(edge) {
            Entry::Vacant(entry) => {
                entry.insert(Reach::from_claim(claim));
                true
            }
            Entry::Occupied(mut entry) => {
                let merged = entry.get().merge(claim);
                match merged {
                    Some(merged) => {
                        entry.insert(merged);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    pub fn get(&self, edge: EdgeIndex) -> Option<Reach> {
        self.entries.get(&edge).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of all entries, sorted by edge
    pub fn entries(&self) -> Vec<(EdgeIndex, Reach)> {
        let mut entries = self
            .entries
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect::<Vec<_>>();
        entries.sort_unstable_by_key(|(edge, _)| *edge);
        entries
    }

    /// Materialize the geometries of every entry.
    ///
    /// Whole entries give the edge geometry. Each fragment gives the part of
    /// the edge next to its anchoring node, so an edge reached from both ends
    /// yields two lines.
    pub fn reached_edges(&self, network: &NetworkGraph) -> Vec<ReachedEdge> {
        let mut reached = Vec::with_capacity(self.len());

        for (edge_id, reach) in self.entries() {
            let edge = network.edge(edge_id);
            let reached_edge = |distance: f64, geometry: LineString<f64>, whole: bool| ReachedEdge {
                edge: edge_id,
                distance,
                geometry,
                properties: edge.properties.clone(),
                whole,
            };

            match reach {
                Reach::Whole { distance } => {
                    reached.push(reached_edge(distance, edge.geometry.clone(), true));
                }
                Reach::Partial {
                    from_source,
                    from_target,
                } => {
                    if let Some(fragment) = from_source {
                        let geometry = substring(&edge.geometry, 0.0, fragment.length);
                        reached.push(reached_edge(fragment.distance, geometry, false));
                    }
                    if let Some(fragment) = from_target {
                        let geometry =
                            substring(&edge.geometry, edge.length - fragment.length, edge.length);
                        reached.push(reached_edge(fragment.distance, geometry, false));
                    }
                }
            }
        }

        reached
    }
}
