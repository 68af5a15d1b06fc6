//! Spatial indexing of network lines

mod index;

pub use index::LineIndex;
