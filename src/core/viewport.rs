use crate::core::bounds::Bounds;
use crate::core::constants::{EARTH_RADIUS, MAX_LATITUDE, TILE_SIZE};
use crate::core::geo::{LatLng, LatLngBounds, Point, TileCoord};
use serde::{Deserialize, Serialize};

/// Manages the current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center: Self::clamp_center(center),
            zoom: zoom.clamp(0.0, 20.0),
            size,
            min_zoom: 0.0,
            max_zoom: 20.0,
        }
    }

    /// Sets the center of the viewport, clamped to the projectable world
    pub fn set_center(&mut self, center: LatLng) {
        self.center = Self::clamp_center(center);
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Sets the zoom limits
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
    }

    /// Gets the scale factor for the current zoom level
    pub fn scale(&self) -> f64 {
        2_f64.powf(self.zoom)
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level
    /// (Web Mercator, EPSG:3857, 256px tiles)
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let z = zoom.unwrap_or(self.zoom);
        lat_lng.to_world().multiply(2_f64.powf(z))
    }

    /// Unprojects world pixel coordinates back to LatLng at the given zoom level
    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        let z = zoom.unwrap_or(self.zoom);
        LatLng::from_world(pixel.multiply(1.0 / 2_f64.powf(z)))
    }

    /// World pixel coordinate of the top-left corner of the container
    pub fn pixel_origin(&self) -> Point {
        self.project(&self.center, None)
            .subtract(&Point::new(self.size.x / 2.0, self.size.y / 2.0))
    }

    /// Converts a geographical coordinate to container pixel coordinates
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        self.project(lat_lng, None).subtract(&self.pixel_origin())
    }

    /// Converts container pixel coordinates back to geographical coordinates
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        self.unproject(&pixel.add(&self.pixel_origin()), None)
    }

    /// Converts container pixel coordinates to world pixels at the current zoom
    pub fn pixel_to_world(&self, pixel: &Point) -> Point {
        pixel.add(&self.pixel_origin())
    }

    /// Pans the viewport by the given pixel offset (drag direction)
    pub fn pan(&mut self, delta: Point) {
        let center_px = self.project(&self.center, None).subtract(&delta);
        let center = self.unproject(&center_px, None);
        self.set_center(center);
    }

    /// Zooms the viewport to a specific level, optionally keeping the
    /// geographic point under `focus_point` stationary
    pub fn zoom_to(&mut self, zoom: f64, focus_point: Option<Point>) {
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);

        // No-op if zoom does not change significantly
        if (new_zoom - self.zoom).abs() < 0.001 {
            return;
        }

        match focus_point {
            Some(focus_screen) => {
                let focus_latlng = self.pixel_to_lat_lng(&focus_screen);
                self.zoom = new_zoom;
                let drift = self.lat_lng_to_pixel(&focus_latlng).subtract(&focus_screen);
                self.pan(Point::new(-drift.x, -drift.y));
            }
            None => self.zoom = new_zoom,
        }
    }

    /// Gets the current viewport bounds in geographical coordinates
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.pixel_to_lat_lng(&Point::new(self.size.x, self.size.y));

        LatLngBounds::new(LatLng::new(se.lat, nw.lng), LatLng::new(nw.lat, se.lng))
    }

    /// Area covered by the container, in world pixels at the current zoom
    pub fn world_bounds(&self) -> Bounds {
        let origin = self.pixel_origin();
        Bounds::new(origin, origin.add(&self.size))
    }

    /// Center and zoom that contain `bounds` with `padding` pixels on each
    /// side. Zoom snaps to whole levels, capped at `max_zoom`.
    pub fn fit(&self, bounds: &LatLngBounds, padding: f64) -> (LatLng, f64) {
        let available = Point::new(
            (self.size.x - 2.0 * padding).max(1.0),
            (self.size.y - 2.0 * padding).max(1.0),
        );

        let nw = LatLng::new(bounds.north_east.lat, bounds.south_west.lng).to_world();
        let se = LatLng::new(bounds.south_west.lat, bounds.north_east.lng).to_world();
        let width = (se.x - nw.x).abs();
        let height = (se.y - nw.y).abs();

        let mut best_zoom = self.min_zoom.ceil();
        for test_zoom in (self.min_zoom.ceil() as i32)..=(self.max_zoom.floor() as i32) {
            let scale = 2_f64.powi(test_zoom);
            if width * scale <= available.x && height * scale <= available.y {
                best_zoom = test_zoom as f64;
            } else {
                break;
            }
        }

        let center = LatLng::from_world(Point::new((nw.x + se.x) / 2.0, (nw.y + se.y) / 2.0));
        (center, best_zoom)
    }

    /// Gets the resolution in meters per pixel at the current zoom level
    pub fn resolution(&self) -> f64 {
        // At zoom 0, the world is 256 pixels wide
        let earth_circumference = 2.0 * std::f64::consts::PI * EARTH_RADIUS;
        earth_circumference / (TILE_SIZE as f64 * self.scale())
    }

    /// Tiles covering the container at the current (integer) zoom
    pub fn visible_tiles(&self) -> Vec<TileCoord> {
        let z = self.zoom.round().clamp(0.0, 30.0) as u8;
        let bounds = self.bounds();
        let nw = TileCoord::from_lat_lng(&LatLng::new(bounds.north_east.lat, bounds.south_west.lng), z);
        let se = TileCoord::from_lat_lng(&LatLng::new(bounds.south_west.lat, bounds.north_east.lng), z);

        let mut tiles = Vec::with_capacity(((se.x - nw.x + 1) * (se.y - nw.y + 1)) as usize);
        for y in nw.y..=se.y {
            for x in nw.x..=se.x {
                tiles.push(TileCoord::new(x, y, z));
            }
        }
        tiles
    }

    /// Clamps center to world bounds
    fn clamp_center(center: LatLng) -> LatLng {
        LatLng::new(
            center.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            center.lng.clamp(-180.0, 180.0),
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_creation() {
        let viewport = Viewport::new(LatLng::new(28.6139, 77.209), 5.0, Point::new(800.0, 600.0));

        assert_eq!(viewport.zoom, 5.0);
        assert_eq!(viewport.center.lat, 28.6139);
        assert_eq!(viewport.size.x, 800.0);
    }

    #[test]
    fn test_coordinate_conversion() {
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 1.0, Point::new(512.0, 512.0));

        let center_lat_lng = viewport.pixel_to_lat_lng(&Point::new(256.0, 256.0));
        assert!(center_lat_lng.lat.abs() < 0.01);
        assert!(center_lat_lng.lng.abs() < 0.01);

        let delhi = LatLng::new(28.6139, 77.209);
        let back = viewport.pixel_to_lat_lng(&viewport.lat_lng_to_pixel(&delhi));
        assert!((back.lat - delhi.lat).abs() < 1e-9);
        assert!((back.lng - delhi.lng).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = Viewport::default();
        viewport.set_zoom_limits(2.0, 15.0);

        viewport.set_zoom(1.0); // Below minimum
        assert_eq!(viewport.zoom, 2.0);

        viewport.set_zoom(20.0); // Above maximum
        assert_eq!(viewport.zoom, 15.0);
    }

    #[test]
    fn test_pan() {
        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0), 1.0, Point::new(512.0, 512.0));

        let original_center = viewport.center;
        viewport.pan(Point::new(10.0, 10.0));

        assert_ne!(viewport.center, original_center);
        // Dragging right/down moves the view west/north
        assert!(viewport.center.lng < original_center.lng);
        assert!(viewport.center.lat > original_center.lat);
    }

    #[test]
    fn test_zoom_around_focus_keeps_point_fixed() {
        let mut viewport = Viewport::new(LatLng::new(28.6, 77.2), 10.0, Point::new(800.0, 600.0));
        let focus = Point::new(600.0, 200.0);
        let under_cursor = viewport.pixel_to_lat_lng(&focus);

        viewport.zoom_to(12.0, Some(focus));

        let after = viewport.lat_lng_to_pixel(&under_cursor);
        assert_eq!(viewport.zoom, 12.0);
        assert!(after.distance_to(&focus) < 1e-6);
    }

    #[test]
    fn test_fit_contains_bounds() {
        let viewport = Viewport::new(LatLng::new(28.6, 77.2), 5.0, Point::new(800.0, 600.0));
        let bounds = LatLngBounds::from_coords(28.61, 77.21, 28.64, 77.23);

        let (center, zoom) = viewport.fit(&bounds, 40.0);
        let mut fitted = viewport.clone();
        fitted.set_zoom(zoom);
        fitted.set_center(center);

        assert!(zoom > 5.0);
        for corner in [bounds.south_west, bounds.north_east] {
            let px = fitted.lat_lng_to_pixel(&corner);
            assert!(px.x >= 40.0 - 1e-6 && px.x <= 760.0 + 1e-6);
            assert!(px.y >= 40.0 - 1e-6 && px.y <= 560.0 + 1e-6);
        }
    }

    #[test]
    fn test_world_bounds_match_container() {
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 2.0, Point::new(400.0, 300.0));
        let world = viewport.world_bounds();

        // The world is 1024px wide at zoom 2, centered on (512, 512)
        assert_eq!(world.min, Point::new(312.0, 362.0));
        assert_eq!(world.width(), 400.0);
        assert_eq!(world.height(), 300.0);
    }

    #[test]
    fn test_visible_tiles_cover_view() {
        let viewport = Viewport::new(LatLng::new(28.6139, 77.209), 5.0, Point::new(800.0, 600.0));
        let tiles = viewport.visible_tiles();
        let center_tile = TileCoord::from_lat_lng(&viewport.center, 5);

        assert!(tiles.contains(&center_tile));
        assert!(tiles.iter().all(|t| t.z == 5 && t.is_valid()));
    }
}
