use serde::{Deserialize, Serialize};

use crate::Error;

/// Points handled by one batch task before the batch is split
pub const DEFAULT_POINTS_PER_CHUNK: usize = 1000;

/// Settings for building a network graph from lines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Grid size used to decide whether two endpoints are the same node
    pub precision: f64,
    /// Minimum degree of a node considered an intersection when a point
    /// snaps onto an existing vertex
    pub intersection_degree: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            precision: 1e-9,
            intersection_degree: 3,
        }
    }
}

/// Parameters of a service area computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAreaConfig {
    /// Maximum travel distance along the network
    pub network_distance: f64,
    /// Width of the buffer around reached edges
    pub buffer_distance: f64,
    /// Batch partition size, not read from configuration files
    #[serde(skip, default = "default_points_per_chunk")]
    pub points_per_chunk: usize,
    #[serde(default)]
    pub network: NetworkConfig,
}

fn default_points_per_chunk() -> usize {
    DEFAULT_POINTS_PER_CHUNK
}

impl ServiceAreaConfig {
    pub fn new(network_distance: f64, buffer_distance: f64) -> Self {
        Self {
            network_distance,
            buffer_distance,
            points_per_chunk: DEFAULT_POINTS_PER_CHUNK,
            network: NetworkConfig::default(),
        }
    }

    #[must_use]
    pub fn with_points_per_chunk(mut self, points_per_chunk: usize) -> Self {
        self.points_per_chunk = points_per_chunk;
        self
    }

    #[must_use]
    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    /// Radius of the regional extract and of the snapping search
    pub fn search_radius(&self) -> f64 {
        self.network_distance + self.buffer_distance
    }
}

/// Reject configurations the engine cannot work with
pub fn validate_config(config: &ServiceAreaConfig) -> Result<(), Error> {
    if !config.network_distance.is_finite() || config.network_distance <= 0.0 {
        return Err(Error::Config(format!(
            "network_distance must be a positive number, got {}",
            config.network_distance
        )));
    }

    if !config.buffer_distance.is_finite() || config.buffer_distance <= 0.0 {
        return Err(Error::Config(format!(
            "buffer_distance must be a positive number, got {}",
            config.buffer_distance
        )));
    }

    if config.points_per_chunk == 0 {
        return Err(Error::Config(
            "points_per_chunk must be at least 1".to_string(),
        ));
    }

    if !config.network.precision.is_finite() || config.network.precision <= 0.0 {
        return Err(Error::Config(format!(
            "network precision must be a positive number, got {}",
            config.network.precision
        )));
    }

    Ok(())
}
