//! # poimap
//!
//! A point-of-interest map core inspired by the usual web-map widgets.
//!
//! This library plots a catalog of named locations as markers, groups nearby
//! markers into clusters at low zoom, and drives the selection / popup /
//! viewport interaction model on top of it. Free-text search goes through a
//! geocoding service and the user's own position through a geolocation
//! provider; both run as one-shot async tasks whose results are applied on
//! the map's owning thread.

pub mod animation;
pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod services;
pub mod spatial;
pub mod tiles;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::Bounds,
    builder::MapBuilder,
    config::MapConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::PoiMap,
    viewport::Viewport,
};

pub use crate::data::{
    catalog::LocationCatalog,
    icons::IconResolver,
    location::{Location, LocationId, LocationKind},
};

pub use crate::layers::{
    marker::{Cluster, MarkerGroup, MarkerLayer, RenderableFeature},
    style::{style, VisualStyle},
};

pub use crate::input::{
    controller::InteractionController,
    events::{InputEvent, MapEvent, Notice, NoticeKind},
    selection::SelectionState,
};

pub use crate::services::{
    geocoding::{GeocodeError, Geocoder, PhotonGeocoder},
    geolocation::{GeolocationError, GeolocationProvider, Position, PositionOptions},
};

pub use crate::tiles::{basemap::Basemap, source::TileSource};

pub use crate::ui::{panel::Panel, popup::Popup};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot encoding error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Unknown basemap: {0}")]
    UnknownBasemap(String),

    #[error("Unknown location id: {0}")]
    UnknownLocation(u64),

    #[error("Duplicate location id: {0}")]
    DuplicateLocation(u64),

    #[error("No async runtime available: {0}")]
    Runtime(String),

    #[error("Map has been disposed")]
    Disposed,
}

/// Error type alias for convenience
pub type Error = MapError;
