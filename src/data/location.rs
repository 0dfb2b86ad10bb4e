use crate::core::constants::SEARCH_RESULT_CATEGORY;
use crate::core::geo::LatLng;
use crate::data::category_key;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a location within a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub u64);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a location came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// Part of the configured catalog
    #[default]
    Poi,
    /// Produced by a geocoding lookup and appended at runtime
    SearchResult,
}

/// A named point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub category: String,
    #[serde(flatten)]
    pub position: LatLng,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub kind: LocationKind,
}

impl Location {
    pub fn new(id: u64, name: impl Into<String>, category: impl Into<String>, position: LatLng) -> Self {
        Self {
            id: LocationId(id),
            name: name.into(),
            category: category.into(),
            position,
            description: None,
            image: None,
            kind: LocationKind::Poi,
        }
    }

    /// A location produced by geocoding, filed under the search result category
    pub fn search_result(id: u64, name: impl Into<String>, position: LatLng) -> Self {
        Self {
            kind: LocationKind::SearchResult,
            ..Self::new(id, name, SEARCH_RESULT_CATEGORY, position)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Normalized category used for icon lookup and filtering
    pub fn category_key(&self) -> String {
        category_key(&self.category)
    }

    pub fn is_search_result(&self) -> bool {
        self.kind == LocationKind::SearchResult
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_flat_record() {
        let json = r#"{
            "id": 7,
            "name": "City Hospital",
            "category": "Hospital",
            "lat": 28.63,
            "lng": 77.21,
            "description": "24/7 healthcare"
        }"#;
        let location: Location = serde_json::from_str(json).unwrap();

        assert_eq!(location.id, LocationId(7));
        assert_eq!(location.position, LatLng::new(28.63, 77.21));
        assert_eq!(location.description.as_deref(), Some("24/7 healthcare"));
        assert_eq!(location.image, None);
        assert_eq!(location.kind, LocationKind::Poi);
        assert_eq!(location.category_key(), "hospital");
    }

    #[test]
    fn test_integer_coordinates_are_accepted() {
        let json = r#"{ "id": 1, "name": "Origin", "category": "test", "lat": 0, "lng": 10 }"#;
        let location: Location = serde_json::from_str(json).unwrap();
        assert_eq!(location.position, LatLng::new(0.0, 10.0));
    }

    #[test]
    fn test_search_result_category() {
        let location = Location::search_result(52, "Taj Mahal, India", LatLng::new(27.1751, 78.0421));

        assert!(location.is_search_result());
        assert_eq!(location.category, "Search Result");
        assert_eq!(location.category_key(), "search result");
    }
}
