//! Search paths with shared prefixes.
//!
//! Extending a path allocates one step and points back at the parent, so
//! sibling branches share everything up to their fork.

use std::sync::Arc;

use itertools::Itertools;
use petgraph::graph::{EdgeIndex, NodeIndex};

#[derive(Debug)]
struct Step {
    edge: EdgeIndex,
    node: NodeIndex,
    length: f64,
    prev: Option<Arc<Step>>,
}

/// Walk from the search origin through a sequence of edges
#[derive(Debug, Clone)]
pub struct Path {
    origin: NodeIndex,
    head: Option<Arc<Step>>,
}

impl Path {
    /// Path made of the origin node only
    pub fn new(origin: NodeIndex) -> Self {
        Self { origin, head: None }
    }

    pub fn origin(&self) -> NodeIndex {
        self.origin
    }

    pub fn last_node(&self) -> NodeIndex {
        self.head.as_ref().map_or(self.origin, |step| step.node)
    }

    /// Edge the path arrived on, `None` at the origin
    pub fn last_edge(&self) -> Option<EdgeIndex> {
        self.head.as_ref().map(|step| step.edge)
    }

    /// Sum of the edge lengths
    pub fn length(&self) -> f64 {
        self.head.as_ref().map_or(0.0, |step| step.length)
    }

    pub fn edge_count(&self) -> usize {
        self.steps().count()
    }

    /// A path that went somewhere and came back to the origin
    pub fn is_closed(&self) -> bool {
        self.head.is_some() && self.last_node() == self.origin
    }

    #[must_use]
    pub fn extend(&self, edge: EdgeIndex, node: NodeIndex, edge_length: f64) -> Path {
        Path {
            origin: self.origin,
            head: Some(Arc::new(Step {
                edge,
                node,
                length: self.length() + edge_length,
                prev: self.head.clone(),
            })),
        }
    }

    /// Nodes from the origin to the last node
    pub fn nodes(&self) -> Vec<NodeIndex> {
        let mut nodes = self.steps().map(|step| step.node).collect::<Vec<_>>();
        nodes.push(self.origin);
        nodes.reverse();
        nodes
    }

    /// Edges from the origin to the last node
    pub fn edges(&self) -> Vec<EdgeIndex> {
        let mut edges = self.steps().map(|step| step.edge).collect::<Vec<_>>();
        edges.reverse();
        edges
    }

    /// No immediate backtrack and no repeated node, except a closed walk
    /// ending on its own origin.
    pub fn is_valid(&self) -> bool {
        let backtracks = self
            .steps()
            .tuple_windows()
            .any(|(later, earlier)| later.edge == earlier.edge);
        if backtracks {
            return false;
        }

        let nodes = self.nodes();
        let checked = if self.is_closed() {
            &nodes[..nodes.len() - 1]
        } else {
            &nodes[..]
        };
        checked.iter().all_unique()
    }

    fn steps(&self) -> impl Iterator<Item = &Step> {
        std::iter::successors(self.head.as_deref(), |step| step.prev.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn n(index: usize) -> NodeIndex {
        NodeIndex::new(index)
    }

    fn e(index: usize) -> EdgeIndex {
        EdgeIndex::new(index)
    }

    #[test]
    fn test_origin_only_path() {
        let path = Path::new(n(0));

        assert_eq!(path.last_node(), n(0));
        assert_eq!(path.last_edge(), None);
        assert_eq!(path.edge_count(), 0);
        assert!(!path.is_closed());
        assert!(path.is_valid());
        assert_relative_eq!(path.length(), 0.0);
    }

    #[test]
    fn test_length_is_sum_of_edges() {
        let path = Path::new(n(0))
            .extend(e(0), n(1), 12.5)
            .extend(e(1), n(2), 7.5);

        assert_relative_eq!(path.length(), 20.0);
        assert_eq!(path.nodes(), vec![n(0), n(1), n(2)]);
        assert_eq!(path.edges(), vec![e(0), e(1)]);
        assert!(path.is_valid());
    }

    #[test]
    fn test_extension_leaves_parent_untouched() {
        let parent = Path::new(n(0)).extend(e(0), n(1), 5.0);
        let left = parent.extend(e(1), n(2), 1.0);
        let right = parent.extend(e(2), n(3), 2.0);

        assert_eq!(parent.edge_count(), 1);
        assert_eq!(left.nodes(), vec![n(0), n(1), n(2)]);
        assert_eq!(right.nodes(), vec![n(0), n(1), n(3)]);
    }

    #[test]
    fn test_repeated_node_is_invalid() {
        let path = Path::new(n(0))
            .extend(e(0), n(1), 1.0)
            .extend(e(1), n(2), 1.0)
            .extend(e(2), n(3), 1.0)
            .extend(e(3), n(1), 1.0);

        assert!(!path.is_valid());
    }

    #[test]
    fn test_closed_walk_is_valid() {
        let path = Path::new(n(0))
            .extend(e(0), n(1), 1.0)
            .extend(e(1), n(2), 1.0)
            .extend(e(2), n(0), 1.0);

        assert!(path.is_closed());
        assert!(path.is_valid());

        let beyond = path.extend(e(0), n(1), 1.0);
        assert!(!beyond.is_valid());
    }

    #[test]
    fn test_self_loop_at_origin_is_closed() {
        let path = Path::new(n(0)).extend(e(7), n(0), 4.0);

        assert!(path.is_closed());
        assert!(path.is_valid());
    }

    #[test]
    fn test_immediate_backtrack_is_invalid() {
        let path = Path::new(n(0))
            .extend(e(0), n(1), 1.0)
            .extend(e(0), n(0), 1.0);

        assert!(path.is_closed());
        assert!(!path.is_valid());
    }
}
