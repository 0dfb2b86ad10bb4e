use crate::core::geo::LatLng;
use crate::data::location::{Location, LocationId};

/// A resolved user position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserFix {
    pub position: LatLng,
    /// Radius of uncertainty in meters
    pub accuracy_m: f64,
}

/// What the map is currently focused on
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selected(Location),
    /// A geolocation request is in flight; `previous` is restored if it fails
    LocatingUser { previous: Box<SelectionState> },
    UserLocated(UserFix),
}

impl SelectionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SelectionState::Idle)
    }

    pub fn is_locating(&self) -> bool {
        matches!(self, SelectionState::LocatingUser { .. })
    }

    pub fn selected(&self) -> Option<&Location> {
        match self {
            SelectionState::Selected(location) => Some(location),
            _ => None,
        }
    }

    pub fn selected_id(&self) -> Option<LocationId> {
        self.selected().map(|location| location.id)
    }

    /// Enters `LocatingUser`, remembering the current state. A second request
    /// while one is pending keeps the original fallback.
    pub fn begin_locate(&mut self) {
        if self.is_locating() {
            return;
        }
        let previous = std::mem::take(self);
        *self = SelectionState::LocatingUser {
            previous: Box::new(previous),
        };
    }

    /// Selects a location. While locating, the selection becomes the state
    /// to fall back to instead of cancelling the request.
    pub fn select(&mut self, location: Location) {
        match self {
            SelectionState::LocatingUser { previous } => {
                **previous = SelectionState::Selected(location);
            }
            _ => *self = SelectionState::Selected(location),
        }
    }

    /// Clears the selection. While locating, the fallback becomes `Idle`.
    pub fn clear(&mut self) {
        match self {
            SelectionState::LocatingUser { previous } => **previous = SelectionState::Idle,
            _ => *self = SelectionState::Idle,
        }
    }

    pub fn located(&mut self, fix: UserFix) {
        *self = SelectionState::UserLocated(fix);
    }

    /// Returns to the state held before the pending request
    pub fn restore(&mut self) {
        if !self.is_locating() {
            log::debug!("restore called without a pending geolocation request");
            return;
        }
        if let SelectionState::LocatingUser { previous } = std::mem::take(self) {
            *self = *previous;
        }
    }
}
