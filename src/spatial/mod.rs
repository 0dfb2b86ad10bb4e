//! Spatial indexing and distance-based grouping of projected markers.

pub mod clustering;
pub mod index;

pub use clustering::{single_linkage, Clustering};
pub use index::{SpatialIndex, SpatialItem};
