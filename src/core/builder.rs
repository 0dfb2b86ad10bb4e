//! Map builder for fluent API configuration
//!
//! This module provides a MapBuilder that assembles a [`PoiMap`] from a
//! configuration, a location catalog and the services it talks to.

use crate::{
    core::{
        config::MapConfig,
        geo::{LatLng, Point},
        map::PoiMap,
        viewport::Viewport,
    },
    data::{catalog::LocationCatalog, icons::IconResolver, location::Location},
    input::controller::LocateCallback,
    prelude::Arc,
    runtime::AsyncSpawner,
    services::{
        geocoding::{Geocoder, PhotonGeocoder},
        geolocation::{provider_from_config, GeolocationProvider},
    },
    tiles::basemap::BasemapRegistry,
    MapError, Result,
};

/// Builder for creating and configuring PoiMap instances
pub struct MapBuilder {
    config: MapConfig,
    /// Locations to plot; the bundled catalog when unset
    catalog: Option<LocationCatalog>,
    geocoder: Option<Arc<dyn Geocoder>>,
    geolocation: Option<Arc<dyn GeolocationProvider>>,
    /// Executor for one-shot tasks; the global runtime when unset
    spawner: Option<Arc<dyn AsyncSpawner>>,
    on_locate: Option<LocateCallback>,
}

impl MapBuilder {
    /// Create a new MapBuilder with default settings
    pub fn new() -> Self {
        Self {
            config: MapConfig::default(),
            catalog: None,
            geocoder: None,
            geolocation: None,
            spawner: None,
            on_locate: None,
        }
    }

    pub fn with_config(mut self, config: MapConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_catalog(mut self, catalog: LocationCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Validates `locations` into a catalog
    pub fn with_locations(self, locations: Vec<Location>) -> Result<Self> {
        Ok(self.with_catalog(LocationCatalog::new(locations)?))
    }

    /// Set the initial center and zoom level
    pub fn with_center_and_zoom(mut self, center: LatLng, zoom: f64) -> Self {
        self.config.view.center = center;
        self.config.view.zoom = zoom;
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.config.view.width = width;
        self.config.view.height = height;
        self
    }

    /// Set zoom limits
    pub fn with_zoom_limits(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.config.view.min_zoom = min_zoom;
        self.config.view.max_zoom = max_zoom;
        self
    }

    /// Pixel distance under which markers merge
    pub fn with_cluster_distance(mut self, distance_px: f64) -> Self {
        self.config.clustering.distance_px = distance_px;
        self
    }

    /// Draw every marker on its own from `zoom` upwards
    pub fn with_clustering_disabled_at(mut self, zoom: f64) -> Self {
        self.config.clustering.disable_at_zoom = Some(zoom);
        self
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_geolocation(mut self, provider: Arc<dyn GeolocationProvider>) -> Self {
        self.geolocation = Some(provider);
        self
    }

    pub fn with_spawner(mut self, spawner: Arc<dyn AsyncSpawner>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Called with the user position after every successful geolocation
    pub fn on_locate(mut self, callback: impl FnMut(LatLng) + Send + 'static) -> Self {
        self.on_locate = Some(Box::new(callback));
        self
    }

    /// Build the map with the configured options
    pub fn build(self) -> Result<PoiMap> {
        let view = &self.config.view;
        if !view.center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "initial center {:?}",
                view.center
            )));
        }
        if view.min_zoom > view.max_zoom {
            return Err(MapError::InvalidCoordinates(format!(
                "zoom limits {}..{}",
                view.min_zoom, view.max_zoom
            )));
        }

        let mut viewport = Viewport::new(view.center, view.zoom, Point::new(view.width, view.height));
        viewport.set_zoom_limits(view.min_zoom, view.max_zoom);
        viewport.set_zoom(view.zoom);

        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => LocationCatalog::builtin()?,
        };
        let icons = IconResolver::with_overrides(&self.config.icons);
        let basemaps = BasemapRegistry::from_config(&self.config.basemaps)?;

        let geocoder: Arc<dyn Geocoder> = match self.geocoder {
            Some(geocoder) => geocoder,
            None => Arc::new(PhotonGeocoder::new(&self.config.geocoder)?),
        };
        let geolocation = self
            .geolocation
            .unwrap_or_else(|| provider_from_config(&self.config.geolocation));

        let mut map = PoiMap::from_parts(
            self.config,
            viewport,
            catalog,
            icons,
            basemaps,
            geocoder,
            geolocation,
            self.spawner,
        );
        if let Some(callback) = self.on_locate {
            map.on_locate(callback);
        }
        Ok(map)
    }
}

impl Default for MapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience methods for common map configurations
impl MapBuilder {
    /// Map with tighter clusters that break up for street-level zooms
    pub fn dense() -> Self {
        Self::new().with_config(MapConfig::dense())
    }
}
