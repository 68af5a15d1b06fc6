//! R-tree over network line envelopes.
//!
//! The tree only stores envelopes and the position of each line in the
//! slice it was built from. Exact distances are left to the caller, which
//! owns the geometries.

use geo::{BoundingRect, LineString, Point, Rect};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};

type LineRtreeItem = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Envelope index over a slice of lines
#[derive(Debug, Clone)]
pub struct LineIndex {
    tree: RTree<LineRtreeItem>,
}

impl LineIndex {
    /// Bulk load envelopes, skipping lines without a bounding box
    pub fn new<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a LineString<f64>>,
    {
        let items = lines
            .into_iter()
            .enumerate()
            .filter_map(|(position, line)| {
                let rect = line.bounding_rect()?;
                let envelope = Rectangle::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                );
                Some(GeomWithData::new(envelope, position))
            })
            .collect::<Vec<_>>();

        Self {
            tree: RTree::bulk_load(items),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Positions of lines whose envelope intersects `rect`
    pub fn intersecting(&self, rect: &Rect<f64>) -> impl Iterator<Item = usize> + use<'_> {
        let envelope = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|item| item.data)
    }

    /// Positions of lines whose envelope comes within `radius` of `point`
    pub fn near(&self, point: &Point<f64>, radius: f64) -> impl Iterator<Item = usize> + use<'_> {
        let rect = Rect::new(
            (point.x() - radius, point.y() - radius),
            (point.x() + radius, point.y() + radius),
        );
        self.intersecting(&rect)
    }
}
