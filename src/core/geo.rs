use crate::core::constants::TILE_SIZE;
use crate::core::projection::forward_mercator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A geographical coordinate in degrees. Longitude is periodic mod 360.
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

    /// Wraps longitude to [-180, 180] range
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = lng % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped < -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// Same coordinate with its longitude wrapped to [-180, 180]
    pub fn wrapped(&self) -> LatLng {
        LatLng::new(self.lat, Self::wrap_lng(self.lng))
    }

    /// Unit vector on the sphere pointing at this coordinate
    pub fn to_cartesian(&self) -> Point3D {
        let (lat, lng) = (self.lat.to_radians(), self.lng.to_radians());
        Point3D::new(lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin())
    }

    /// Coordinate of the direction `p` points at (need not be normalized)
    pub fn from_cartesian(p: &Point3D) -> LatLng {
        let horizontal = (p.x * p.x + p.y * p.y).sqrt();
        LatLng::new(
            p.z.atan2(horizontal).to_degrees(),
            p.y.atan2(p.x).to_degrees(),
        )
    }

    /// Attaches a zoom level, producing a camera position
    pub fn with_zoom(self, zoom: f64) -> ViewPoint {
        ViewPoint::new(self.lat, self.lng, zoom)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A map camera position: where it looks and how far it is zoomed in.
///
/// Zoom is fractional; the world is `256 * 2^zoom` pixels wide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewPoint {
    pub lat: f64,
    pub lng: f64,
    pub zoom: f64,
}

impl ViewPoint {
    pub fn new(lat: f64, lng: f64, zoom: f64) -> Self {
        Self { lat, lng, zoom }
    }

    pub fn coord(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

impl From<ViewPoint> for LatLng {
    fn from(view: ViewPoint) -> Self {
        view.coord()
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

    /// Linear interpolation written as `a(1-t) + bt` so both ends are exact
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(
            self.x * (1.0 - t) + other.x * t,
            self.y * (1.0 - t) + other.y * t,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Point3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn scale(&self, factor: f64) -> Point3D {
        Point3D::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn add(&self, other: &Point3D) -> Point3D {
        Point3D::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

/// A slippy-map tile address (origin top-left, y grows southwards).
///
/// `x` and `y` are kept exactly as the frame resolver computed them, so they
/// can be negative or past the edge of the world and still give the right draw
/// position. Identity (`Eq`, `Hash`, `Display`) uses the canonical column
/// `x mod 2^z`, which is also what a tile cache keys on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i64,
    pub y: i64,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: i64, y: i64, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Number of tile columns (and rows) at this zoom level
    pub fn world_tiles(z: u8) -> i64 {
        1_i64 << z.min(62)
    }

    /// Column wrapped into `[0, 2^z)`
    pub fn canonical_x(&self) -> i64 {
        self.x.rem_euclid(Self::world_tiles(self.z))
    }

    /// The same tile with its column wrapped into the world
    pub fn canonical(&self) -> TileCoord {
        TileCoord::new(self.canonical_x(), self.y, self.z)
    }

    /// Tiles north of the first row or south of the last one do not exist.
    pub fn has_row(&self) -> bool {
        self.y >= 0 && self.y < Self::world_tiles(self.z)
    }

    /// The tile containing `coord` at integer zoom `z`, without wrapping or clamping
    pub fn containing(coord: &LatLng, z: u8) -> TileCoord {
        let world = forward_mercator(coord, z as f64);
        TileCoord::new(
            (world.x / TILE_SIZE).floor() as i64,
            (world.y / TILE_SIZE).floor() as i64,
            z,
        )
    }

    /// Cache key shared with the tile store
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for TileCoord {
    fn eq(&self, other: &Self) -> bool {
        self.z == other.z && self.y == other.y && self.canonical_x() == other.canonical_x()
    }
}

impl Eq for TileCoord {}

impl Hash for TileCoord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_x().hash(state);
        self.y.hash(state);
        self.z.hash(state);
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.canonical_x(), self.y)
    }
}
