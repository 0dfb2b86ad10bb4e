//! Configuration system for map behavior tuning
//!
//! This module provides a hierarchical configuration that covers clustering,
//! interaction (zoom levels, animation durations), the geolocation request
//! policy, the geocoding endpoint, basemaps and icon overrides. Every field has
//! a default, so a JSON document only needs to name what it changes.

use crate::animation::transitions::EasingType;
use crate::core::constants::{
    DEFAULT_CENTER, DEFAULT_CLUSTER_DISTANCE_PX, DEFAULT_HIT_TOLERANCE_PX, DEFAULT_ZOOM,
    DETAIL_ZOOM, FIT_PADDING_PX, LOCATE_ZOOM, SEARCH_ZOOM,
};
use crate::core::geo::LatLng;
use crate::prelude::HashMap;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub view: ViewConfig,
    pub clustering: ClusterConfig,
    pub interaction: InteractionConfig,
    pub geolocation: GeolocationConfig,
    pub geocoder: GeocoderConfig,
    pub basemaps: BasemapConfig,
    /// Extra or replacement category icons, keyed by category
    pub icons: HashMap<String, String>,
}

impl MapConfig {
    /// Parse a JSON document, filling unspecified fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        log::info!("loaded map configuration from {}", path.as_ref().display());
        Self::from_json_str(&raw)
    }

    /// Tighter clustering for dense city catalogs
    pub fn dense() -> Self {
        Self {
            clustering: ClusterConfig {
                distance_px: 24.0,
                ..ClusterConfig::default()
            },
            ..Self::default()
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            view: ViewConfig::default(),
            clustering: ClusterConfig::default(),
            interaction: InteractionConfig::default(),
            geolocation: GeolocationConfig::default(),
            geocoder: GeocoderConfig::default(),
            basemaps: BasemapConfig::default(),
            icons: HashMap::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub center: LatLng,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Container size used until the front end reports its own
    pub width: f64,
    pub height: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center: LatLng::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            zoom: DEFAULT_ZOOM,
            min_zoom: 2.0,
            max_zoom: 20.0,
            width: 1024.0,
            height: 768.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Pixel distance under which markers merge into one cluster
    pub distance_px: f64,
    /// Pointer slop when hit-testing markers
    pub hit_tolerance_px: f64,
    /// Zoom at and above which every marker is drawn on its own
    pub disable_at_zoom: Option<f64>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            distance_px: DEFAULT_CLUSTER_DISTANCE_PX,
            hit_tolerance_px: DEFAULT_HIT_TOLERANCE_PX,
            disable_at_zoom: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub detail_zoom: f64,
    pub search_zoom: f64,
    pub locate_zoom: f64,
    pub fit_padding_px: f64,
    pub select_duration_ms: u64,
    pub search_duration_ms: u64,
    pub locate_duration_ms: u64,
    pub fit_duration_ms: u64,
    pub easing: EasingType,
}

impl InteractionConfig {
    pub fn select_duration(&self) -> Duration {
        Duration::from_millis(self.select_duration_ms)
    }

    pub fn search_duration(&self) -> Duration {
        Duration::from_millis(self.search_duration_ms)
    }

    pub fn locate_duration(&self) -> Duration {
        Duration::from_millis(self.locate_duration_ms)
    }

    pub fn fit_duration(&self) -> Duration {
        Duration::from_millis(self.fit_duration_ms)
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            detail_zoom: DETAIL_ZOOM,
            search_zoom: SEARCH_ZOOM,
            locate_zoom: LOCATE_ZOOM,
            fit_padding_px: FIT_PADDING_PX,
            select_duration_ms: 800,
            search_duration_ms: 800,
            locate_duration_ms: 700,
            fit_duration_ms: 500,
            easing: EasingType::EaseOut,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    pub enable_high_accuracy: bool,
    pub timeout_ms: u64,
    pub maximum_age_ms: u64,
    /// Position reported by the built-in fixed provider; `None` means the
    /// host has no geolocation support
    pub fixed_position: Option<FixedPositionConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedPositionConfig {
    pub lat: f64,
    pub lng: f64,
    pub accuracy_m: f64,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: 10_000,
            maximum_age_ms: 0,
            fixed_position: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub language: String,
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://photon.komoot.io/api/".to_string(),
            language: "en".to_string(),
            user_agent: concat!("poimap/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasemapConfig {
    /// Basemap selected at startup
    pub active: String,
    /// Request `@2x` tiles where the template supports it
    pub retina: bool,
    /// Additional basemaps on top of the built-in ones
    pub extra: Vec<BasemapDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasemapDefinition {
    pub name: String,
    pub url_template: String,
    #[serde(default)]
    pub attribution: String,
    #[serde(default = "default_basemap_max_zoom")]
    pub max_zoom: u8,
}

fn default_basemap_max_zoom() -> u8 {
    19
}

impl Default for BasemapConfig {
    fn default() -> Self {
        Self {
            active: "Voyager".to_string(),
            retina: false,
            extra: Vec::new(),
        }
    }
}
