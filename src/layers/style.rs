//! Visual description of marker groups.
//!
//! Styles are plain data so that front ends can draw them however they like
//! and so the whole layer can be fingerprinted. [`style`] is pure: the same
//! group always yields the same style.

use crate::constants::{
    CLUSTER_BADGE_RADIUS, MARKER_ICON_ANCHOR, MARKER_ICON_SCALE, MARKER_ICON_SOURCE_PX,
};
use crate::core::geo::Point;
use crate::layers::marker::MarkerGroup;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 8-bit sRGB color with straight alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::from_rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::from_rgb(0, 0, 0);
    /// Accent blue shared by cluster badges and the user marker
    pub const ACCENT: Rgba = Rgba::from_rgb(0x25, 0x63, 0xeb);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn from_rgba_unmultiplied(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "rgba({}, {}, {}, {:.2})",
                self.r,
                self.g,
                self.b,
                self.a as f32 / 255.0
            )
        }
    }
}

#[cfg(feature = "egui")]
impl From<Rgba> for egui::Color32 {
    fn from(c: Rgba) -> Self {
        egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Glyph {
    /// Raster icon; `anchor` is the hot-spot as a fraction of the image size
    Icon {
        url: String,
        anchor: (f32, f32),
        scale: f32,
    },
    /// Filled circle used for multi-member clusters
    Badge {
        radius: f32,
        fill: Rgba,
        stroke: Rgba,
        stroke_width: f32,
    },
}

impl Glyph {
    /// Pin that stands in for an icon image: height from the tip to the
    /// head center, and the head radius. `None` for badges.
    pub fn pin(&self) -> Option<(f32, f32)> {
        match self {
            Glyph::Icon { anchor, scale, .. } => {
                let height = MARKER_ICON_SOURCE_PX * scale * anchor.1;
                Some((height, height * 0.4))
            }
            Glyph::Badge { .. } => None,
        }
    }

    /// Farthest pixel the drawn glyph reaches from its anchor
    pub fn reach(&self) -> f64 {
        match (self, self.pin()) {
            (_, Some((height, head))) => (height + head) as f64,
            (Glyph::Badge { radius, .. }, None) => *radius as f64,
            (Glyph::Icon { .. }, None) => 0.0,
        }
    }

    /// Pixel distance from `offset` (relative to the anchor, y down) to the
    /// drawn glyph, zero on or inside it
    pub fn distance_to(&self, offset: &Point) -> f64 {
        let origin = Point::new(0.0, 0.0);
        match (self, self.pin()) {
            (_, Some((height, head))) => {
                let height = height as f64;
                let stem = Point::new(0.0, offset.y.clamp(-height, 0.0));
                let head_center = Point::new(0.0, -height);
                let to_stem = offset.distance_to(&stem);
                let to_head = offset.distance_to(&head_center) - head as f64;
                to_stem.min(to_head).max(0.0)
            }
            (Glyph::Badge { radius, .. }, None) => {
                (offset.distance_to(&origin) - *radius as f64).max(0.0)
            }
            (Glyph::Icon { .. }, None) => offset.distance_to(&origin),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    /// CSS font shorthand
    pub font: String,
    pub fill: Rgba,
    pub stroke: Option<Rgba>,
    pub stroke_width: f32,
    /// Vertical offset from the glyph anchor, negative is up
    pub offset_y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualStyle {
    pub glyph: Glyph,
    pub label: Label,
    /// Number of locations the glyph stands for
    pub size: usize,
}

impl VisualStyle {
    pub fn is_badge(&self) -> bool {
        matches!(self.glyph, Glyph::Badge { .. })
    }
}

const NAME_FONT: &str = "bold 12px Poppins, sans-serif";
const COUNT_FONT: &str = "bold 14px Poppins, sans-serif";

/// Resolves how a marker group is drawn.
///
/// A single location shows its category icon with the name underneath, a
/// cluster shows a blue badge with the member count.
pub fn style(group: &MarkerGroup) -> VisualStyle {
    match group {
        MarkerGroup::Singleton(feature) => VisualStyle {
            glyph: Glyph::Icon {
                url: feature.icon.clone(),
                anchor: MARKER_ICON_ANCHOR,
                scale: MARKER_ICON_SCALE,
            },
            label: Label {
                text: feature.location.name.clone(),
                font: NAME_FONT.to_string(),
                fill: Rgba::WHITE,
                stroke: Some(Rgba::BLACK),
                stroke_width: 3.0,
                offset_y: -25.0,
            },
            size: 1,
        },
        MarkerGroup::Cluster(cluster) => VisualStyle {
            glyph: Glyph::Badge {
                radius: CLUSTER_BADGE_RADIUS,
                fill: Rgba::ACCENT,
                stroke: Rgba::WHITE,
                stroke_width: 2.0,
            },
            label: Label {
                text: cluster.len().to_string(),
                font: COUNT_FONT.to_string(),
                fill: Rgba::WHITE,
                stroke: None,
                stroke_width: 0.0,
                offset_y: 0.0,
            },
            size: cluster.len(),
        },
    }
}
