//! Prelude module for common poimap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use poimap::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    builder::MapBuilder,
    config::{
        BasemapConfig, ClusterConfig, GeocoderConfig, GeolocationConfig, InteractionConfig,
        MapConfig, ViewConfig,
    },
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
    style::{style, Glyph, Label, VisualStyle},
    user_location::UserLocationLayer,
};

pub use crate::input::{
    controller::{InteractionController, ViewCommand},
    events::{InputEvent, KeyCode, MapEvent, MouseButton, Notice, NoticeKind},
    selection::{SelectionState, UserFix},
};

pub use crate::services::{
    geocoding::{GeocodeError, GeocodeHit, Geocoder, PhotonGeocoder},
    geolocation::{
        FixedPosition, GeolocationError, GeolocationProvider, Position, PositionOptions,
        Unsupported,
    },
};

pub use crate::tiles::{
    basemap::{Basemap, BasemapRegistry},
    source::{TileSource, XyzSource},
};

pub use crate::ui::{
    panel::{CategoryFilter, Panel, PanelEvent},
    popup::{Popup, PopupContent},
};

pub use crate::animation::transitions::{EasingType, ViewTransition};

pub use crate::runtime::{spawn, AsyncHandle, AsyncSpawner};

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};

pub use futures::Future;
