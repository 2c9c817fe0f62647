use crate::core::bounds::Bounds;
use crate::core::geo::{LatLng, LatLngBounds, Point};
use serde::{Deserialize, Serialize};

/// Manages the current view of the map: center, zoom, and screen dimensions.
///
/// The viewer uses a flat CRS: at zoom `z` one lat/lng unit spans `2^z`
/// pixels, x follows lng and y follows `-lat`.
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
    /// The maximum allowed zoom level (may be infinite)
    pub max_zoom: f64,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom,
            size,
            min_zoom: 0.0,
            max_zoom: f64::INFINITY,
        }
    }

    /// Sets the zoom limits
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
    }

    /// Snaps `zoom` to multiples of `snap` (when non-zero) and clamps it to the limits
    pub fn limit_zoom(&self, zoom: f64, snap: f64) -> f64 {
        let snapped = if snap > 0.0 {
            (zoom / snap).round() / (1.0 / snap)
        } else {
            zoom
        };
        snapped.min(self.max_zoom).max(self.min_zoom)
    }

    /// Gets the scale factor for a zoom level
    pub fn scale(zoom: f64) -> f64 {
        2_f64.powf(zoom)
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let scale = Self::scale(zoom.unwrap_or(self.zoom));
        Point::new(lat_lng.lng * scale, -lat_lng.lat * scale)
    }

    /// Unprojects world pixel coordinates back to LatLng at the given zoom level
    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        let scale = Self::scale(zoom.unwrap_or(self.zoom));
        LatLng::new(-pixel.y / scale, pixel.x / scale)
    }

    /// Pixel position of the container's top-left corner in projected space
    pub fn pixel_origin(&self) -> Point {
        self.project(&self.center, None)
            .subtract(&self.size.divide(2.0))
    }

    /// Converts a geographical coordinate to container pixel coordinates
    pub fn lat_lng_to_container_point(&self, lat_lng: &LatLng) -> Point {
        self.project(lat_lng, None).subtract(&self.pixel_origin())
    }

    /// Converts container pixel coordinates back to geographical coordinates
    pub fn container_point_to_lat_lng(&self, point: &Point) -> LatLng {
        self.unproject(&point.add(&self.pixel_origin()), None)
    }

    /// Moves the center by a pixel offset at the current zoom
    pub fn pan(&mut self, offset: &Point) {
        let center_point = self.project(&self.center, None).add(offset);
        self.center = self.unproject(&center_point, None);
    }

    /// Gets the current viewport bounds in geographical coordinates
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.container_point_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.container_point_to_lat_lng(&self.size);
        LatLngBounds::from_corners(nw, se)
    }

    /// Largest zoom at which `bounds` fits inside the container, minus `padding` pixels.
    ///
    /// Mirrors Leaflet's `getBoundsZoom`: a zoom that lands within 1% of a snap
    /// level counts as that level, then the result is floored to `snap`.
    pub fn bounds_zoom(&self, bounds: &LatLngBounds, padding: Point, snap: f64) -> f64 {
        let current = if self.zoom.is_finite() { self.zoom } else { 0.0 };
        let size = self.size.subtract(&padding);
        let projected = Bounds::from_points(
            self.project(&bounds.south_east(), Some(current)),
            self.project(&bounds.north_west(), Some(current)),
        );
        let scale = (size.x / projected.width()).min(size.y / projected.height());

        let mut zoom = current + scale.log2();
        if snap > 0.0 && zoom.is_finite() {
            let fine = snap / 100.0;
            zoom = (zoom / fine).round() * fine;
            zoom = (zoom / snap).floor() * snap;
        }
        zoom.min(self.max_zoom).max(self.min_zoom)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}
