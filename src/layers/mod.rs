//! Map layers owned by the core: POI markers with clustering, and the
//! user's own position.

pub mod marker;
pub mod style;
pub mod user_location;

pub use marker::{Cluster, MarkerGroup, MarkerLayer, RenderableFeature};
pub use style::{style, Glyph, Label, Rgba, VisualStyle};
pub use user_location::UserLocationLayer;
