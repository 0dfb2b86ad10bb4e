//! Headless side panel: category facet, filtered list and search box.
//!
//! The panel only holds UI state and turns user intent into [`PanelEvent`]s;
//! the map decides what a selection or a search actually does.

use crate::constants::ALL_CATEGORIES;
use crate::data::{
    catalog::LocationCatalog,
    category_key,
    location::{Location, LocationId},
};
use crate::prelude::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Normalized category key
    Category(String),
}

impl CategoryFilter {
    /// Builds a filter from a facet label; `"All"` disables filtering
    pub fn from_label(label: &str) -> Self {
        if label.trim() == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Category(category_key(label))
        }
    }

    pub fn matches(&self, location: &Location) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(key) => location.category_key() == *key,
        }
    }

    /// Whether this filter is the one selected by `label`
    pub fn is_label(&self, label: &str) -> bool {
        *self == CategoryFilter::from_label(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    /// A list entry was clicked
    SelectionRequested(LocationId),
    /// The search box was submitted with a non-empty query
    SearchSubmitted(String),
}

#[derive(Debug, Clone, Default)]
pub struct Panel {
    filter: CategoryFilter,
    query: String,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    /// `"All"` followed by each category in first-seen order. Labels that
    /// differ only in case or surrounding whitespace appear once, spelled as
    /// first seen.
    pub fn categories(&self, catalog: &LocationCatalog) -> Vec<String> {
        let mut seen = HashSet::default();
        let mut facet = vec![ALL_CATEGORIES.to_string()];
        for location in catalog.iter() {
            if seen.insert(location.category_key()) {
                facet.push(location.category.trim().to_string());
            }
        }
        facet
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    /// Selects a facet entry by its label
    pub fn set_category(&mut self, label: &str) {
        self.filter = CategoryFilter::from_label(label);
    }

    /// Catalog entries passing the category filter, in catalog order
    pub fn visible_locations<'a>(&self, catalog: &'a LocationCatalog) -> Vec<&'a Location> {
        catalog.iter().filter(|l| self.filter.matches(l)).collect()
    }

    /// Offline match on name or category, case-insensitive
    pub fn find_local<'a>(&self, catalog: &'a LocationCatalog, text: &str) -> Vec<&'a Location> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        catalog
            .iter()
            .filter(|l| l.name.to_lowercase().contains(&needle) || l.category_key().contains(&needle))
            .collect()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Submits the search box. Blank input produces nothing.
    pub fn submit_search(&self) -> Option<PanelEvent> {
        let query = self.query.trim();
        if query.is_empty() {
            None
        } else {
            Some(PanelEvent::SearchSubmitted(query.to_string()))
        }
    }

    pub fn select(&self, id: LocationId) -> PanelEvent {
        PanelEvent::SelectionRequested(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;

    fn catalog() -> LocationCatalog {
        LocationCatalog::new(vec![
            Location::new(1, "AIIMS", "Hospital", LatLng::new(28.5672, 77.21)),
            Location::new(2, "Lodhi Garden", "park", LatLng::new(28.5931, 77.2197)),
            Location::new(3, "Safdarjung Hospital", " hospital", LatLng::new(28.568, 77.206)),
            Location::new(4, "Red Fort", "Monument", LatLng::new(28.6562, 77.241)),
        ])
        .unwrap()
    }

    #[test]
    fn test_category_facet() {
        let panel = Panel::new();
        assert_eq!(
            panel.categories(&catalog()),
            vec!["All", "Hospital", "park", "Monument"]
        );
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let catalog = catalog();
        let mut panel = Panel::new();
        assert_eq!(panel.visible_locations(&catalog).len(), 4);

        panel.set_category("HOSPITAL");
        let ids: Vec<_> = panel.visible_locations(&catalog).iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![LocationId(1), LocationId(3)]);
        assert!(panel.filter().is_label("Hospital"));

        panel.set_category("All");
        assert_eq!(*panel.filter(), CategoryFilter::All);
    }

    #[test]
    fn test_find_local() {
        let catalog = catalog();
        let panel = Panel::new();

        let hits: Vec<_> = panel.find_local(&catalog, "hosp").iter().map(|l| l.id).collect();
        assert_eq!(hits, vec![LocationId(1), LocationId(3)]);
        assert_eq!(panel.find_local(&catalog, "red")[0].name, "Red Fort");
        assert!(panel.find_local(&catalog, "   ").is_empty());
    }

    #[test]
    fn test_submit_search_trims() {
        let mut panel = Panel::new();
        panel.set_query("   ");
        assert_eq!(panel.submit_search(), None);

        panel.set_query("  Taj Mahal ");
        assert_eq!(
            panel.submit_search(),
            Some(PanelEvent::SearchSubmitted("Taj Mahal".to_string()))
        );
        assert_eq!(panel.select(LocationId(4)), PanelEvent::SelectionRequested(LocationId(4)));
    }
}
