//! Network-constrained service areas.
//!
//! For every point of interest the engine extracts the surrounding network
//! lines, snaps the point onto them, walks the graph up to a travel
//! distance and buffers the reached edges into a polygon.

pub mod algo;
pub mod error;
pub mod geometry;
pub mod loading;
pub mod model;
pub mod output;
pub mod prelude;
pub mod spatial;

pub use error::Error;
