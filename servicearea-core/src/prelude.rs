pub use crate::Error;

// Pipeline entry points
pub use crate::algo::{
    BatchCoordinator, BatchReport, PointFailure, PointServiceArea, ServiceAreaPolygon,
    calculate_service_area,
};
pub use crate::loading::{
    FeatureSource, InMemoryNetwork, NetworkConfig, ServiceAreaConfig, validate_config,
};

// Building blocks
pub use crate::algo::{BufferAssembler, ReachedEdge, ServiceAreaSearch, snap_to_network};
pub use crate::model::{Attributes, LineFeature, NetworkGraph, PointFeature};
