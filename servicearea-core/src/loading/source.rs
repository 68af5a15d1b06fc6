//! Network feature sources.
//!
//! The engine only needs "lines intersecting a region". Anything able to
//! answer that (files, databases, tiles) can be plugged in through
//! [`FeatureSource`].

use geo::{BoundingRect, Intersects, Polygon};
use log::debug;

use crate::{Error, model::LineFeature, spatial::LineIndex};

/// Provider of network lines for a region
pub trait FeatureSource: Sync {
    /// Lines whose geometry intersects `region`
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying data cannot be read
    fn features_intersecting(&self, region: &Polygon<f64>) -> Result<Vec<LineFeature>, Error>;
}

/// Network held in memory behind an R-tree
#[derive(Debug, Clone)]
pub struct InMemoryNetwork {
    lines: Vec<LineFeature>,
    index: LineIndex,
}

impl InMemoryNetwork {
    pub fn new(lines: Vec<LineFeature>) -> Self {
        let index = LineIndex::new(lines.iter().map(|line| &line.geometry));
        debug!("Indexed {} of {} network lines", index.len(), lines.len());

        Self { lines, index }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[LineFeature] {
        &self.lines
    }
}

impl FeatureSource for InMemoryNetwork {
    fn features_intersecting(&self, region: &Polygon<f64>) -> Result<Vec<LineFeature>, Error> {
        let Some(bounds) = region.bounding_rect() else {
            return Ok(Vec::new());
        };

        let mut positions = self.index.intersecting(&bounds).collect::<Vec<_>>();
        // Keep input order so graphs are built deterministically
        positions.sort_unstable();

        Ok(positions
            .into_iter()
            .map(|position| &self.lines[position])
            .filter(|line| line.geometry.intersects(region))
            .cloned()
            .collect())
    }
}
