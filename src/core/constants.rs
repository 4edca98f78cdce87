//! Engine-wide constants for WebMercator tiling and transition defaults.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Square tile size in pixels. The whole world is `TILE_SIZE * 2^zoom` pixels wide.
pub const TILE_SIZE: f64 = 256.0;

/// Deepest tile zoom a frame will request.
pub const MAX_TILE_ZOOM: u8 = 30;

/// Shallowest zoom a frame is resolved at. The world is 16 pixels wide there,
/// and lower zooms would only tile more copies of it.
pub const MIN_FRAME_ZOOM: f64 = -4.0;

/// Latitude at which the WebMercator square ends (`atan(sinh(pi))`).
/// Nothing clamps to it; inputs beyond it produce very large or non-finite values.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Default distance in pixels a fitted point keeps from every canvas edge.
pub const DEFAULT_MARGIN: f64 = 20.0;

/// Default curvature of the Van Wijk & Nuij path (the paper's recommended value).
pub const DEFAULT_RHO: f64 = 1.4;
