//! Free-text place lookup against a Photon geocoding endpoint.
//!
//! One request per query, no retries; only the best match is used.

use crate::core::config::GeocoderConfig;
use crate::core::geo::LatLng;
use crate::input::events::NoticeKind;
use crate::{MapError, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

/// Best match for a query
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    /// Display name, `"{name}, {country}"`
    pub name: String,
    pub position: LatLng,
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("no results for query")]
    NoResults,

    #[error("invalid geocoder endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("geocoder answered with HTTP {0}")]
    Status(u16),

    #[error("malformed geocoder response: {0}")]
    Decode(String),
}

impl GeocodeError {
    pub fn notice_kind(&self) -> NoticeKind {
        match self {
            GeocodeError::NoResults => NoticeKind::NoResults,
            _ => NoticeKind::SearchFailed,
        }
    }
}

pub type GeocodeResult = std::result::Result<GeocodeHit, GeocodeError>;

/// A text-to-coordinate lookup service
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> GeocodeResult;
}

#[derive(Debug, Deserialize)]
struct PhotonResponse {
    #[serde(default)]
    features: Vec<PhotonFeature>,
}

#[derive(Debug, Deserialize)]
struct PhotonFeature {
    geometry: PhotonGeometry,
    #[serde(default)]
    properties: PhotonProperties,
}

#[derive(Debug, Deserialize)]
struct PhotonGeometry {
    /// `[lon, lat]`
    coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct PhotonProperties {
    name: Option<String>,
    country: Option<String>,
}

/// Client for the Photon API (`GET {endpoint}?q=..&lang=..`)
#[derive(Debug, Clone)]
pub struct PhotonGeocoder {
    client: Client,
    endpoint: String,
    language: String,
}

impl PhotonGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(MapError::Network)?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            language: config.language.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_url(&self, query: &str) -> std::result::Result<Url, GeocodeError> {
        Url::parse_with_params(
            &self.endpoint,
            &[("q", query), ("lang", self.language.as_str())],
        )
        .map_err(|e| GeocodeError::InvalidEndpoint(format!("{}: {}", self.endpoint, e)))
    }
}

#[async_trait]
impl Geocoder for PhotonGeocoder {
    async fn geocode(&self, query: &str) -> GeocodeResult {
        let url = self.build_url(query)?;
        log::debug!("geocoding '{}' via {}", query, url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }
        let body = response.text().await?;
        parse_response(&body, query)
    }
}

/// Extracts the first feature of a Photon response
pub fn parse_response(body: &str, query: &str) -> GeocodeResult {
    let parsed: PhotonResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Decode(e.to_string()))?;
    let feature = parsed.features.into_iter().next().ok_or(GeocodeError::NoResults)?;

    let (lng, lat) = match feature.geometry.coordinates.as_slice() {
        [lng, lat, ..] => (*lng, *lat),
        other => {
            return Err(GeocodeError::Decode(format!(
                "expected [lon, lat], got {} values",
                other.len()
            )))
        }
    };
    let position = LatLng::new(lat, lng);
    if !position.is_valid() {
        return Err(GeocodeError::Decode(format!("coordinates out of range: {:?}", position)));
    }

    let name = compose_display_name(
        feature.properties.name.as_deref(),
        feature.properties.country.as_deref(),
        query,
    );
    Ok(GeocodeHit { name, position })
}

/// `"{name or query}, {country}"`, without the country part when unknown
pub fn compose_display_name(name: Option<&str>, country: Option<&str>, query: &str) -> String {
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| query.trim());
    match country.map(str::trim).filter(|c| !c.is_empty()) {
        Some(country) => format!("{}, {}", name, country),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAJ: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [78.0421, 27.1751] },
                "properties": { "name": "Taj Mahal", "country": "India", "osm_id": 1 }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-73.99, 40.75] },
                "properties": { "name": "Taj Mahal Restaurant", "country": "United States" }
            }
        ]
    }"#;

    #[test]
    fn test_parse_uses_first_feature() {
        let hit = parse_response(TAJ, "taj mahal").unwrap();
        assert_eq!(hit.name, "Taj Mahal, India");
        assert_eq!(hit.position, LatLng::new(27.1751, 78.0421));
    }

    #[test]
    fn test_parse_empty_is_no_results() {
        let err = parse_response(r#"{ "features": [] }"#, "xyzzy").unwrap_err();
        assert!(matches!(err, GeocodeError::NoResults));
        assert_eq!(err.notice_kind(), NoticeKind::NoResults);
    }

    #[test]
    fn test_parse_garbage_is_search_failure() {
        let err = parse_response("<html>busy</html>", "taj").unwrap_err();
        assert!(matches!(err, GeocodeError::Decode(_)));
        assert_eq!(err.notice_kind(), NoticeKind::SearchFailed);

        let short = r#"{ "features": [ { "geometry": { "coordinates": [78.0] } } ] }"#;
        assert!(matches!(parse_response(short, "taj"), Err(GeocodeError::Decode(_))));
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(compose_display_name(None, Some("India"), "Agra"), "Agra, India");
        assert_eq!(compose_display_name(Some("Agra"), None, "agra"), "Agra");
        assert_eq!(compose_display_name(Some(""), Some(""), " agra "), "agra");
    }

    #[test]
    fn test_build_url_encodes_query() {
        let geocoder = PhotonGeocoder::new(&GeocoderConfig::default()).unwrap();
        let url = geocoder.build_url("Taj Mahal & gardens").unwrap();

        assert_eq!(url.host_str(), Some("photon.komoot.io"));
        assert_eq!(url.path(), "/api/");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "Taj Mahal & gardens".to_string()),
                ("lang".to_string(), "en".to_string()),
            ]
        );
    }

    #[test]
    fn test_bad_endpoint() {
        let config = GeocoderConfig {
            endpoint: "not a url".to_string(),
            ..GeocoderConfig::default()
        };
        let geocoder = PhotonGeocoder::new(&config).unwrap();
        assert!(matches!(geocoder.build_url("x"), Err(GeocodeError::InvalidEndpoint(_))));
    }
}
