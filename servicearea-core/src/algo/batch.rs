//! Service areas for many points.
//!
//! Large batches are cut into chunks of `points_per_chunk` points which run
//! as parallel tasks. Points never share state: each one gets its own
//! regional graph, and one failing point does not affect the others.

use log::{error, info};
use rayon::prelude::*;

use crate::{
    Error,
    algo::{
        isochrone::{PointServiceArea, ServiceAreaPolygon, calculate_service_area},
        search::ReachedEdge,
    },
    loading::{FeatureSource, ServiceAreaConfig},
    model::PointFeature,
};

/// Point that produced no service area
#[derive(Debug)]
pub struct PointFailure {
    pub id: String,
    pub error: Error,
}

/// Outcome of a batch, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<PointServiceArea>,
    pub failures: Vec<PointFailure>,
}

impl BatchReport {
    pub fn areas(&self) -> impl Iterator<Item = &ServiceAreaPolygon> {
        self.results.iter().map(|result| &result.area)
    }

    /// Reached edges of all points, with the id of the point they belong to
    pub fn edges(&self) -> impl Iterator<Item = (&str, &ReachedEdge)> {
        self.results.iter().flat_map(|result| {
            result
                .edges
                .iter()
                .map(move |edge| (result.area.id.as_str(), edge))
        })
    }

    fn append(&mut self, mut other: BatchReport) {
        self.results.append(&mut other.results);
        self.failures.append(&mut other.failures);
    }
}

/// Runs the single-point pipeline over a set of points
pub struct BatchCoordinator<'a, S: FeatureSource + ?Sized> {
    source: &'a S,
    config: &'a ServiceAreaConfig,
}

impl<'a, S: FeatureSource + ?Sized> BatchCoordinator<'a, S> {
    pub fn new(source: &'a S, config: &'a ServiceAreaConfig) -> Self {
        Self { source, config }
    }

    pub fn run(&self, points: &[PointFeature]) -> BatchReport {
        let chunk_size = self.config.points_per_chunk.max(1);

        let report = if points.len() <= chunk_size {
            self.run_chunk(points)
        } else {
            info!(
                "Splitting {} points into chunks of {chunk_size}",
                points.len()
            );
            points
                .par_chunks(chunk_size)
                .map(|chunk| self.run_chunk(chunk))
                .collect::<Vec<_>>()
                .into_iter()
                .fold(BatchReport::default(), |mut report, chunk| {
                    report.append(chunk);
                    report
                })
        };

        info!(
            "Computed {} service areas, {} points failed",
            report.results.len(),
            report.failures.len()
        );
        report
    }

    fn run_chunk(&self, points: &[PointFeature]) -> BatchReport {
        let mut report = BatchReport::default();

        for point in points {
            match calculate_service_area(self.source, point, self.config) {
                Ok(result) => report.results.push(result),
                Err(err) => {
                    error!("Service area for point {} failed: {err}", point.id);
                    report.failures.push(PointFailure {
                        id: point.id.clone(),
                        error: err,
                    });
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::InMemoryNetwork;
    use crate::model::LineFeature;
    use geo::{Point, line_string};

    fn avenue() -> InMemoryNetwork {
        InMemoryNetwork::new(vec![LineFeature::new(
            line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)],
        )])
    }

    #[test]
    fn test_failures_are_isolated() {
        let network = avenue();
        let config = ServiceAreaConfig::new(20.0, 5.0);
        let points = vec![
            PointFeature::new("a", Point::new(100.0, 1.0)),
            PointFeature::new("lost", Point::new(100.0, 500.0)),
            PointFeature::new("b", Point::new(300.0, -1.0)),
        ];

        let report = BatchCoordinator::new(&network, &config).run(&points);

        let ids = report.areas().map(|area| area.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, "lost");
        assert!(matches!(report.failures[0].error, Error::SnapFailure { .. }));
    }

    #[test]
    fn test_chunked_run_keeps_input_order() {
        let network = avenue();
        let points = (0..9)
            .map(|i| PointFeature::new(format!("p{i}"), Point::new(50.0 + 100.0 * f64::from(i), 2.0)))
            .collect::<Vec<_>>();
        let sequential_config = ServiceAreaConfig::new(20.0, 5.0);
        let chunked_config = sequential_config.clone().with_points_per_chunk(2);

        let sequential = BatchCoordinator::new(&network, &sequential_config).run(&points);
        let chunked = BatchCoordinator::new(&network, &chunked_config).run(&points);

        assert!(chunked.failures.is_empty());
        assert_eq!(chunked.results, sequential.results);
        assert_eq!(
            chunked.edges().filter(|(id, _)| *id == "p3").count(),
            2
        );
    }
}
