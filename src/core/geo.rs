use serde::{Deserialize, Serialize};

/// Maximum margin under which two coordinates are considered equal
const LAT_LNG_EQUALITY_MARGIN: f64 = 1.0e-9;

/// Represents a geographical coordinate with latitude and longitude.
///
/// Under the flat CRS used by the viewer these are not degrees on a sphere,
/// just a linear re-projection of world pixels (see `core::mapper`).
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

    /// Checks that both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Returns true if `other` is the same point, within a tiny margin
    pub fn equals(&self, other: &LatLng) -> bool {
        let margin = (self.lat - other.lat)
            .abs()
            .max((self.lng - other.lng).abs());
        margin <= LAT_LNG_EQUALITY_MARGIN
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<[f64; 2]> for LatLng {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
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

    pub fn divide(&self, scalar: f64) -> Point {
        Point::new(self.x / scalar, self.y / scalar)
    }

    /// Component-wise minimum of two points
    pub fn min(&self, other: &Point) -> Point {
        Point::new(self.x.min(other.x), self.y.min(other.y))
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

    /// Creates bounds from two opposite corners given in any order
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        Self::new(
            LatLng::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            LatLng::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        )
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Checks if the bounds share some area; touching edges do not count
    pub fn overlaps(&self, other: &LatLngBounds) -> bool {
        other.north_east.lat > self.south_west.lat
            && other.south_west.lat < self.north_east.lat
            && other.north_east.lng > self.south_west.lng
            && other.south_west.lng < self.north_east.lng
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

    pub fn north_west(&self) -> LatLng {
        LatLng::new(self.north_east.lat, self.south_west.lng)
    }

    pub fn south_east(&self) -> LatLng {
        LatLng::new(self.south_west.lat, self.north_east.lng)
    }

    /// True when the bounds enclose no area at all
    pub fn is_degenerate(&self) -> bool {
        self.south_west.equals(&self.north_east)
    }
}

/// Represents a tile coordinate in the tile pyramid.
///
/// World renders are not anchored at the origin, so tile indices can be
/// negative at every zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TileCoord {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_equals_within_margin() {
        let a = LatLng::new(-200.0, 100.0);
        assert!(a.equals(&LatLng::new(-200.0 + 1e-12, 100.0)));
        assert!(!a.equals(&LatLng::new(-199.0, 100.0)));
    }

    #[test]
    fn test_bounds_from_corners_normalizes() {
        let bounds = LatLngBounds::from_corners(LatLng::new(0.0, 100.0), LatLng::new(-200.0, 0.0));
        assert_eq!(bounds.south_west, LatLng::new(-200.0, 0.0));
        assert_eq!(bounds.north_east, LatLng::new(0.0, 100.0));
        assert_eq!(bounds.north_west(), LatLng::new(0.0, 0.0));
        assert_eq!(bounds.south_east(), LatLng::new(-200.0, 100.0));
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = LatLngBounds::from_coords(40.0, -75.0, 41.0, -73.0);
        let point_inside = LatLng::new(40.5, -74.0);
        let point_outside = LatLng::new(42.0, -74.0);

        assert!(bounds.contains(&point_inside));
        assert!(!bounds.contains(&point_outside));
    }

    #[test]
    fn test_degenerate_bounds() {
        let p = LatLng::new(3.0, 4.0);
        assert!(LatLngBounds::from_corners(p, p).is_degenerate());
        assert!(!LatLngBounds::from_corners(p, LatLng::new(3.0, 5.0)).is_degenerate());
    }
}
