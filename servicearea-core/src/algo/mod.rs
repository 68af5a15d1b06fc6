//! Service-area algorithms: snapping, search, assembly and batching

pub mod assembly;
pub mod batch;
pub mod isochrone;
pub mod search;
pub mod snap;

pub use assembly::BufferAssembler;
pub use batch::{BatchCoordinator, BatchReport, PointFailure};
pub use isochrone::{PointServiceArea, ServiceAreaPolygon, calculate_service_area, search_region};
pub use search::{
    Claim, Fragment, Path, Reach, ReachedEdge, SearchStats, ServiceArea, ServiceAreaSearch,
};
pub use snap::{NearestLine, SnappedNetwork, nearest_line, snap_to_network};
