use crate::core::geo::{LatLng, LatLngBounds, Point};
use crate::data::location::{Location, LocationId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pointer and keyboard input delivered by the front end, in container pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Single click/tap
    Click {
        position: Point,
        button: MouseButton,
    },
    /// Pointer move without a button held
    MouseMove { position: Point },
    /// Start of drag operation
    DragStart { position: Point },
    /// Drag in progress
    Drag { delta: Point },
    /// End of drag operation
    DragEnd,
    /// Scroll wheel or pinch zoom; positive delta zooms in
    Scroll { delta: f64, position: Point },
    /// Keyboard input
    KeyPress {
        key: KeyCode,
        modifiers: KeyModifiers,
    },
    /// Container resize
    Resize { size: Point },
}

/// Keyboard key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Plus,
    Minus,
    Escape,
    Enter,
    Other(u32),
}

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

impl InputEvent {
    /// Left click at a container position
    pub fn click(x: f64, y: f64) -> Self {
        InputEvent::Click {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    pub fn key(key: KeyCode) -> Self {
        InputEvent::KeyPress {
            key,
            modifiers: KeyModifiers::default(),
        }
    }

    /// Gets the primary position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::Click { position, .. } => Some(*position),
            InputEvent::MouseMove { position } => Some(*position),
            InputEvent::DragStart { position } => Some(*position),
            InputEvent::Scroll { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Checks if this is a mouse/pointer event
    pub fn is_pointer_event(&self) -> bool {
        matches!(
            self,
            InputEvent::Click { .. }
                | InputEvent::MouseMove { .. }
                | InputEvent::DragStart { .. }
                | InputEvent::Drag { .. }
                | InputEvent::DragEnd
                | InputEvent::Scroll { .. }
        )
    }

    /// Checks if this is a keyboard event
    pub fn is_keyboard_event(&self) -> bool {
        matches!(self, InputEvent::KeyPress { .. })
    }
}

/// Category of a user-visible failure message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeKind {
    NoResults,
    SearchFailed,
    GeolocationUnsupported,
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    GeolocationFailed,
}

impl NoticeKind {
    /// Text shown to the user for this kind of failure
    pub fn message(&self) -> &'static str {
        match self {
            NoticeKind::NoResults => "No results found",
            NoticeKind::SearchFailed => "Search failed",
            NoticeKind::GeolocationUnsupported => "Geolocation not supported",
            NoticeKind::PermissionDenied => "Location access denied. Please allow location.",
            NoticeKind::PositionUnavailable => "Location unavailable.",
            NoticeKind::Timeout => "Location request timed out.",
            NoticeKind::GeolocationFailed => "Unable to retrieve location.",
        }
    }
}

/// A message for the user; raising one never changes map state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
        }
    }
}

impl From<NoticeKind> for Notice {
    fn from(kind: NoticeKind) -> Self {
        Notice::new(kind)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Things the map reports back to its host, drained with
/// `PoiMap::drain_events`
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// A popup was opened for a location or the user position
    PopupOpened { anchor: LatLng, title: String },
    /// The popup was hidden (its content is kept)
    PopupHidden,
    /// The view started moving towards a location
    FlyTo { center: LatLng, zoom: f64 },
    /// The view started fitting a cluster's members
    FitBounds { bounds: LatLngBounds },
    /// The view settled
    ViewChanged { center: LatLng, zoom: f64 },
    /// A location became the selection
    LocationSelected { id: LocationId },
    /// The user position was placed on the map
    UserLocated { position: LatLng, accuracy_m: f64 },
    /// The user marker was removed
    UserLocationCleared,
    /// A geocoding result was appended to the catalog
    SearchResultAdded { location: Location },
    /// The catalog was replaced or extended and markers were rebuilt
    CatalogChanged { len: usize },
    /// The active basemap changed
    BasemapChanged { name: String },
    /// A failure the user should be told about
    Notice(Notice),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_event_position() {
        let click = InputEvent::click(100.0, 200.0);
        assert_eq!(click.position(), Some(Point::new(100.0, 200.0)));

        let move_event = InputEvent::MouseMove {
            position: Point::new(50.0, 75.0),
        };
        assert_eq!(move_event.position(), Some(Point::new(50.0, 75.0)));
        assert_eq!(InputEvent::DragEnd.position(), None);
    }

    #[test]
    fn test_event_type_checks() {
        let click = InputEvent::click(0.0, 0.0);
        assert!(click.is_pointer_event());
        assert!(!click.is_keyboard_event());

        let key_press = InputEvent::key(KeyCode::Escape);
        assert!(!key_press.is_pointer_event());
        assert!(key_press.is_keyboard_event());
    }

    #[test]
    fn test_notice_messages() {
        assert_eq!(Notice::new(NoticeKind::NoResults).message, "No results found");
        assert_eq!(Notice::from(NoticeKind::SearchFailed).to_string(), "Search failed");
        assert_eq!(
            NoticeKind::PermissionDenied.message(),
            "Location access denied. Please allow location."
        );
        assert_eq!(NoticeKind::Timeout.message(), "Location request timed out.");
    }
}
