use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No network line within {radius} of point {point_id}")]
    SnapFailure { point_id: String, radius: f64 },
    #[error("Graph construction error: {0}")]
    GraphConstruction(String),
    #[error("Union error: {0}")]
    Union(String),
    #[error("Assembly made no progress: {unjoined} buffered edges could not be joined")]
    NoProgress { unjoined: usize },
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Service area is empty")]
    EmptyServiceArea,
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}
