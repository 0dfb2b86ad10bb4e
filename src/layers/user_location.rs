use crate::core::geo::LatLng;
use crate::layers::style::Rgba;
use serde::{Deserialize, Serialize};

/// Dot drawn at the user's position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMarkerStyle {
    pub radius: f32,
    pub fill: Rgba,
    pub stroke: Rgba,
    pub stroke_width: f32,
    /// Accuracy circle around the dot
    pub accuracy_fill: Rgba,
    pub accuracy_stroke: Rgba,
    pub accuracy_stroke_width: f32,
}

impl Default for UserMarkerStyle {
    fn default() -> Self {
        Self {
            radius: 8.0,
            fill: Rgba::ACCENT,
            stroke: Rgba::WHITE,
            stroke_width: 3.0,
            accuracy_fill: Rgba::ACCENT.with_alpha(0.15),
            accuracy_stroke: Rgba::ACCENT,
            accuracy_stroke_width: 1.0,
        }
    }
}

/// A located user position with its accuracy radius in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserMarker {
    pub position: LatLng,
    pub accuracy_m: f64,
}

impl UserMarker {
    /// Accuracy circle radius in screen pixels at the given meters-per-pixel
    pub fn accuracy_radius_px(&self, meters_per_pixel: f64) -> f64 {
        if meters_per_pixel <= 0.0 {
            return 0.0;
        }
        self.accuracy_m / meters_per_pixel
    }
}

/// Holds at most one user marker; placing a new one replaces the old.
#[derive(Debug, Clone, Default)]
pub struct UserLocationLayer {
    marker: Option<UserMarker>,
    style: UserMarkerStyle,
}

impl UserLocationLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, position: LatLng, accuracy_m: f64) {
        if self.marker.is_some() {
            log::debug!("replacing previous user marker");
        }
        self.marker = Some(UserMarker {
            position,
            accuracy_m: accuracy_m.max(0.0),
        });
    }

    pub fn clear(&mut self) {
        self.marker = None;
    }

    pub fn marker(&self) -> Option<&UserMarker> {
        self.marker.as_ref()
    }

    pub fn style(&self) -> &UserMarkerStyle {
        &self.style
    }

    pub fn is_visible(&self) -> bool {
        self.marker.is_some()
    }
}
