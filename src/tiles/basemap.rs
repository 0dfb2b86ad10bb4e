use crate::core::config::{BasemapConfig, BasemapDefinition};
use crate::core::geo::TileCoord;
use crate::tiles::source::{TileSource, XyzSource};
use crate::{MapError, Result};

pub const VOYAGER: &str = "Voyager";
pub const SATELLITE: &str = "Satellite";

/// A named tile source the user can switch to
#[derive(Debug, Clone, PartialEq)]
pub struct Basemap {
    pub name: String,
    pub source: XyzSource,
    pub attribution: String,
}

impl Basemap {
    pub fn new(name: impl Into<String>, source: XyzSource, attribution: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source,
            attribution: attribution.into(),
        }
    }

    /// Carto Voyager raster tiles
    pub fn voyager() -> Self {
        Self::new(
            VOYAGER,
            XyzSource::new(
                "https://{a-d}.basemaps.cartocdn.com/rastertiles/voyager/{z}/{x}/{y}{r}.png",
            )
            .with_max_zoom(20),
            "© OpenStreetMap contributors © CARTO",
        )
    }

    /// Esri World Imagery
    pub fn satellite() -> Self {
        Self::new(
            SATELLITE,
            XyzSource::new(
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
            )
            .with_max_zoom(20),
            "Tiles © Esri — Source: Esri, Maxar",
        )
    }

    pub fn tile_url(&self, coord: TileCoord) -> String {
        self.source.url(coord)
    }

    pub fn max_zoom(&self) -> u8 {
        self.source.max_zoom()
    }
}

impl From<&BasemapDefinition> for Basemap {
    fn from(def: &BasemapDefinition) -> Self {
        Self::new(
            def.name.clone(),
            XyzSource::new(def.url_template.clone()).with_max_zoom(def.max_zoom),
            def.attribution.clone(),
        )
    }
}

/// Ordered set of basemaps with exactly one active entry
#[derive(Debug, Clone)]
pub struct BasemapRegistry {
    basemaps: Vec<Basemap>,
    active: usize,
}

impl BasemapRegistry {
    /// Voyager and Satellite, Voyager active
    pub fn builtin() -> Self {
        Self {
            basemaps: vec![Basemap::voyager(), Basemap::satellite()],
            active: 0,
        }
    }

    pub fn from_config(config: &BasemapConfig) -> Result<Self> {
        let mut registry = Self::builtin();
        for def in &config.extra {
            registry.add(Basemap::from(def));
        }
        for basemap in &mut registry.basemaps {
            basemap.source = basemap.source.clone().with_retina(config.retina);
        }
        registry.set_active(&config.active)?;
        Ok(registry)
    }

    /// Adds a basemap, replacing one with the same name
    pub fn add(&mut self, basemap: Basemap) {
        match self.basemaps.iter_mut().find(|b| b.name == basemap.name) {
            Some(existing) => *existing = basemap,
            None => self.basemaps.push(basemap),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.basemaps.iter().map(|b| b.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Basemap> {
        self.basemaps.iter().find(|b| b.name == name)
    }

    pub fn active(&self) -> &Basemap {
        &self.basemaps[self.active]
    }

    /// Switches the active basemap; returns whether it changed
    pub fn set_active(&mut self, name: &str) -> Result<bool> {
        let index = self
            .basemaps
            .iter()
            .position(|b| b.name == name)
            .ok_or_else(|| MapError::UnknownBasemap(name.to_string()))?;
        let changed = index != self.active;
        self.active = index;
        Ok(changed)
    }

    pub fn len(&self) -> usize {
        self.basemaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basemaps.is_empty()
    }
}

impl Default for BasemapRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
