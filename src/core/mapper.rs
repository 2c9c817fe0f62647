//! Conversion between world pixel space and the map's lat/lng space.
//!
//! World coordinates come straight from the render: x grows right, y grows
//! down, one unit per pixel of a native tile. The map works in (lat, lng)
//! with lat growing up, so the mapping flips y and rescales both axes by
//! `render_size / tile_size`.

use crate::core::geo::{LatLng, LatLngBounds};
use serde::{Deserialize, Serialize};

/// A position in world pixel coordinates (y downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Linear world <-> lat/lng re-projection for one manifest
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    /// `render_size / tile_size`
    ratio: f64,
}

impl CoordinateMapper {
    pub fn new(render_size: f64, tile_size: f64) -> Self {
        Self {
            ratio: render_size / tile_size,
        }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn world_to_lat_lng(&self, x: f64, y: f64) -> LatLng {
        LatLng::new(-y * self.ratio, x * self.ratio)
    }

    pub fn lat_lng_to_world(&self, lat_lng: &LatLng) -> WorldPoint {
        WorldPoint::new(lat_lng.lng / self.ratio, -lat_lng.lat / self.ratio)
    }

    pub fn point_to_lat_lng(&self, point: &WorldPoint) -> LatLng {
        self.world_to_lat_lng(point.x, point.y)
    }

    /// Geographic bounds spanned by two opposite world corners
    pub fn bounds_to_lat_lng(&self, a: &WorldPoint, b: &WorldPoint) -> LatLngBounds {
        LatLngBounds::from_corners(self.point_to_lat_lng(a), self.point_to_lat_lng(b))
    }

    /// Center of a world-space box, in lat/lng
    pub fn midpoint(&self, left_top: &WorldPoint, right_bottom: &WorldPoint) -> LatLng {
        self.world_to_lat_lng(
            (left_top.x + right_bottom.x) / 2.0,
            (left_top.y + right_bottom.y) / 2.0,
        )
    }
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self { ratio: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip(mapper: &CoordinateMapper, x: f64, y: f64) {
        let back = mapper.lat_lng_to_world(&mapper.world_to_lat_lng(x, y));
        assert!((back.x - x).abs() <= 1e-9 * x.abs().max(1.0), "x: {} vs {}", back.x, x);
        assert!((back.y - y).abs() <= 1e-9 * y.abs().max(1.0), "y: {} vs {}", back.y, y);
    }

    #[test]
    fn test_round_trip_across_ratios() {
        let samples = [
            (0.0, 0.0),
            (5.5, -3.25),
            (-1024.0, 2048.5),
            (1.0e-7, -1.0e-7),
            (123456.789, -987654.321),
        ];
        for (render_size, tile_size) in [(256.0, 256.0), (512.0, 32.0), (256.0, 1024.0), (3.0, 7.0)] {
            let mapper = CoordinateMapper::new(render_size, tile_size);
            for (x, y) in samples {
                assert_round_trip(&mapper, x, y);
            }
        }
    }

    #[test]
    fn test_y_axis_flips() {
        let mapper = CoordinateMapper::new(512.0, 256.0);
        let lat_lng = mapper.world_to_lat_lng(10.0, 20.0);
        assert_eq!(lat_lng, LatLng::new(-40.0, 20.0));
    }

    #[test]
    fn test_world_max_corner_bounds() {
        let mapper = CoordinateMapper::new(256.0, 256.0);
        let bounds = mapper.bounds_to_lat_lng(&WorldPoint::new(0.0, 0.0), &WorldPoint::new(100.0, 200.0));
        assert_eq!(bounds.south_east(), LatLng::new(-200.0, 100.0));
        assert_eq!(bounds.north_west(), LatLng::new(0.0, 0.0));
    }

    #[test]
    fn test_midpoint() {
        let mapper = CoordinateMapper::default();
        let mid = mapper.midpoint(&WorldPoint::new(-10.0, 4.0), &WorldPoint::new(30.0, 8.0));
        assert_eq!(mid, LatLng::new(-6.0, 10.0));
    }
}
