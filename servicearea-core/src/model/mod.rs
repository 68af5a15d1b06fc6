//! Data model for network service areas
//!
//! Contains input features and the graph built from a regional network
//! extract.

pub mod features;
pub mod network;

pub use features::{Attributes, LineFeature, PointFeature};
pub use network::{NetworkEdge, NetworkGraph, NetworkNode};
