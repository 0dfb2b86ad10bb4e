pub mod basemap;
pub mod source;

// Re-exports for convenience
pub use basemap::{Basemap, BasemapRegistry};
pub use source::{TileSource, XyzSource};
