//! This module is responsible for loading network and point data
//! and for the configuration of service area computations.

mod config;
pub mod geojson;
mod source;

pub use config::{DEFAULT_POINTS_PER_CHUNK, NetworkConfig, ServiceAreaConfig, validate_config};
pub use source::{FeatureSource, InMemoryNetwork};
