use crate::core::geo::LatLng;
use crate::data::location::{Location, LocationId};
use crate::prelude::HashSet;
use crate::{MapError, Result};
use std::path::Path;

static BUILTIN_LOCATIONS: &str = include_str!("../../assets/locations.json");

/// Ordered, append-only collection of locations.
///
/// The catalog is fixed at startup and only ever grows by geocoding results;
/// records are never edited or removed. Replacing it means building a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationCatalog {
    locations: Vec<Location>,
}

impl LocationCatalog {
    /// Builds a catalog, rejecting duplicate ids and out-of-range coordinates
    pub fn new(locations: Vec<Location>) -> Result<Self> {
        let mut seen = HashSet::default();
        for location in &locations {
            if !seen.insert(location.id) {
                return Err(MapError::DuplicateLocation(location.id.0));
            }
            if !location.position.is_valid() {
                return Err(MapError::InvalidCoordinates(format!(
                    "location {} ({}) at {:?}",
                    location.id, location.name, location.position
                )));
            }
        }
        Ok(Self { locations })
    }

    /// The catalog shipped with the crate (landmarks and services around India)
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_LOCATIONS)
    }

    /// Parses a JSON array of location records
    pub fn from_json_str(json: &str) -> Result<Self> {
        let locations: Vec<Location> = serde_json::from_str(json)?;
        Self::new(locations)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json_str(&raw)?;
        log::info!(
            "loaded {} locations from {}",
            catalog.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.locations.iter().find(|location| location.id == id)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Id to hand to the next appended record
    pub fn next_id(&self) -> LocationId {
        let max = self.locations.iter().map(|l| l.id.0).max().unwrap_or(0);
        LocationId(max + 1)
    }

    /// Appends a geocoding result as a new record and returns it
    pub fn append_search_result(&mut self, name: impl Into<String>, position: LatLng) -> Location {
        let location = Location::search_result(self.next_id().0, name, position);
        self.locations.push(location.clone());
        location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = LocationCatalog::builtin().unwrap();

        assert_eq!(catalog.len(), 51);
        let taj = catalog.get(LocationId(1)).unwrap();
        assert_eq!(taj.name, "Taj Mahal");
        assert_eq!(taj.position, LatLng::new(27.1751, 78.0421));
        assert!(catalog.iter().all(|l| !l.is_search_result()));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let a = Location::new(1, "A", "park", LatLng::new(1.0, 1.0));
        let b = Location::new(1, "B", "park", LatLng::new(2.0, 2.0));

        assert!(matches!(
            LocationCatalog::new(vec![a, b]),
            Err(MapError::DuplicateLocation(1))
        ));
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let bad = Location::new(1, "Nowhere", "park", LatLng::new(120.0, 1.0));
        assert!(matches!(
            LocationCatalog::new(vec![bad]),
            Err(MapError::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn test_append_search_result_uses_fresh_id() {
        let mut catalog = LocationCatalog::new(vec![
            Location::new(3, "A", "park", LatLng::new(1.0, 1.0)),
            Location::new(9, "B", "park", LatLng::new(2.0, 2.0)),
        ])
        .unwrap();

        let appended = catalog.append_search_result("Agra, India", LatLng::new(27.18, 78.01));

        assert_eq!(appended.id, LocationId(10));
        assert!(appended.is_search_result());
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.locations().last(), Some(&appended));
    }

    #[test]
    fn test_empty_catalog_next_id() {
        let catalog = LocationCatalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.next_id(), LocationId(1));
    }
}
