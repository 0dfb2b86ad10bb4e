use crate::core::constants::{MAX_LATITUDE, TILE_SIZE};
use geo::BoundingRect;
use geo_types::{Coord, MultiPoint};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Exact identity key. Two coordinates share a key only if both
    /// components are bitwise equal.
    pub fn key(&self) -> (u64, u64) {
        (self.lat.to_bits(), self.lng.to_bits())
    }

    /// Clamps latitude to the projectable range
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Projects to world pixel coordinates at zoom 0 (a 256px wide world).
    /// Multiply by `2^zoom` for any other zoom level.
    pub fn to_world(&self) -> Point {
        let lat_rad = Self::clamp_lat(self.lat).to_radians();
        let size = TILE_SIZE as f64;
        let x = (self.lng + 180.0) / 360.0 * size;
        let y = (1.0 - (PI / 4.0 + lat_rad / 2.0).tan().ln() / PI) / 2.0 * size;
        Point::new(x, y)
    }

    /// Inverse of [`LatLng::to_world`]
    pub fn from_world(point: Point) -> Self {
        let size = TILE_SIZE as f64;
        let lng = point.x / size * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * point.y / size);
        let lat = n.sinh().atan().to_degrees();
        Self::new(lat, lng)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<LatLng> for geo_types::Point<f64> {
    fn from(value: LatLng) -> Self {
        geo_types::Point::new(value.lng, value.lat)
    }
}

impl From<geo_types::Point<f64>> for LatLng {
    fn from(value: geo_types::Point<f64>) -> Self {
        LatLng::new(value.y(), value.x())
    }
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a bounding box of geographical coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Smallest bounds covering every point, `None` for an empty input
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a LatLng>,
    {
        let multi: MultiPoint<f64> = points
            .into_iter()
            .map(|p| geo_types::Point::from(*p))
            .collect::<Vec<_>>()
            .into();
        multi.bounding_rect().map(|rect| {
            let Coord { x: west, y: south } = rect.min();
            let Coord { x: east, y: north } = rect.max();
            Self::from_coords(south, west, north, east)
        })
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

/// Represents a tile coordinate in the slippy map tile system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Creates a tile coordinate from a LatLng and zoom level
    pub fn from_lat_lng(lat_lng: &LatLng, zoom: u8) -> Self {
        let lat_rad = LatLng::clamp_lat(lat_lng.lat).to_radians();
        let n = 2_f64.powi(zoom as i32);
        let max = (n as u32).saturating_sub(1);

        let x = ((lat_lng.lng + 180.0) / 360.0 * n).floor().max(0.0) as u32;
        let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor().max(0.0) as u32;

        Self::new(x.min(max), y.min(max), zoom)
    }

    /// Checks if the tile is valid for the given zoom level
    pub fn is_valid(&self) -> bool {
        let max_coord = 2_u32.pow(self.z as u32);
        self.x < max_coord && self.y < max_coord
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(28.6129, 77.2295);
        assert_eq!(coord.lat, 28.6129);
        assert_eq!(coord.lng, 77.2295);
        assert!(coord.is_valid());
    }

    #[test]
    fn test_world_projection_round_trip() {
        let red_fort = LatLng::new(28.6562, 77.241);
        let world = red_fort.to_world();
        let back = LatLng::from_world(world);

        assert!((back.lat - red_fort.lat).abs() < 1e-9);
        assert!((back.lng - red_fort.lng).abs() < 1e-9);
    }

    #[test]
    fn test_world_projection_origin() {
        let world = LatLng::new(0.0, 0.0).to_world();
        assert!((world.x - 128.0).abs() < 1e-9);
        assert!((world.y - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_coordinate_key_is_exact() {
        let a = LatLng::new(28.61, 77.22);
        let b = LatLng::new(28.61, 77.22);
        let c = LatLng::new(28.610000001, 77.22);

        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_bounds_from_points() {
        let points = [
            LatLng::new(28.61, 77.22),
            LatLng::new(28.64, 77.23),
            LatLng::new(28.63, 77.21),
        ];
        let bounds = LatLngBounds::from_points(points.iter()).unwrap();

        assert_eq!(bounds.south_west, LatLng::new(28.61, 77.21));
        assert_eq!(bounds.north_east, LatLng::new(28.64, 77.23));
        assert!(points.iter().all(|p| bounds.contains(p)));
        assert!(LatLngBounds::from_points([].iter()).is_none());
    }

    #[test]
    fn test_tile_coord_conversion() {
        let lat_lng = LatLng::new(28.6139, 77.209);
        let tile = TileCoord::from_lat_lng(&lat_lng, 10);

        assert!(tile.is_valid());
        assert_eq!(tile, TileCoord::new(731, 426, 10));
        assert_eq!(TileCoord::from_lat_lng(&LatLng::new(89.0, 180.0), 2), TileCoord::new(3, 0, 2));
    }
}
