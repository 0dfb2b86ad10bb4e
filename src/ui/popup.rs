use crate::core::geo::LatLng;
use crate::data::location::Location;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PopupContent {
    pub title: String,
    /// Category of a location, or the accuracy line for the user position
    pub subtitle: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl PopupContent {
    pub fn for_location(location: &Location) -> Self {
        Self {
            title: location.name.clone(),
            subtitle: location.category.clone(),
            description: location.description.clone(),
            image: location.image.clone(),
        }
    }

    pub fn for_user(accuracy_m: f64) -> Self {
        Self {
            title: "You are here".to_string(),
            subtitle: format!("Accuracy: ~{}m", accuracy_m.round() as i64),
            description: None,
            image: None,
        }
    }
}

/// The single map popup. Dismissing only hides it so the next selection
/// reuses the same overlay.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Popup {
    pub anchor: Option<LatLng>,
    pub content: PopupContent,
    pub visible: bool,
}

impl Popup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, anchor: LatLng, content: PopupContent) {
        self.anchor = Some(anchor);
        self.content = content;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Anchor of the popup while it is shown
    pub fn visible_anchor(&self) -> Option<LatLng> {
        self.anchor.filter(|_| self.visible)
    }
}
