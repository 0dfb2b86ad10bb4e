//! Location records, the catalog that holds them, and category icons.

pub mod catalog;
pub mod icons;
pub mod location;

/// Case-folded, trimmed form of a category label used for every lookup
pub fn category_key(label: &str) -> String {
    label.trim().to_lowercase()
}
