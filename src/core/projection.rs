//! WebMercator arithmetic shared by the transition recipes and the frame resolver.
//!
//! Two coordinate systems are used throughout:
//! - *world pixels* at a zoom level: the standard tile pyramid, `(0, 0)` at the
//!   north-west corner of the world and `256 * 2^zoom` pixels across;
//! - *projected* coordinates of a [`MercatorProjection`], i.e. the raw Mercator
//!   plane (`x = lng` in radians, `y = -ln(tan(pi/4 + lat/2))`, y pointing south)
//!   scaled by `scale` and shifted by `translate`.
//!
//! Latitude is never clamped. Near the poles `y` grows without bound and at
//! exactly +/-90 degrees it is infinite; those values propagate as IEEE-754
//! infinities/NaN unless a `try_` variant is used.

use crate::core::constants::{DEFAULT_MARGIN, TILE_SIZE};
use crate::core::geo::{LatLng, Point};
use crate::{MapError, Result};
use geo::BoundingRect;
use geo_types::MultiPoint;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

/// Width of the world in pixels at `zoom`
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2_f64.powf(zoom)
}

/// Projects a coordinate to world pixels at `zoom`.
///
/// `x = (lng + 180) / 360 * 256 * 2^zoom`. Longitudes outside [-180, 180] are
/// not wrapped and land outside `[0, world)`.
pub fn forward_mercator(coord: &LatLng, zoom: f64) -> Point {
    MercatorProjection::for_zoom(zoom).forward(coord)
}

/// Inverse of [`forward_mercator`].
pub fn inverse_mercator(point: &Point, zoom: f64) -> LatLng {
    MercatorProjection::for_zoom(zoom).inverse(point)
}

/// A scaled and translated spherical Mercator projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorProjection {
    /// Pixels per radian of longitude
    pub scale: f64,
    /// Where `(0, 0)` lands
    pub translate: Point,
}

impl MercatorProjection {
    pub fn new(scale: f64, translate: Point) -> Self {
        Self { scale, translate }
    }

    /// The unscaled Mercator plane, one world wide = `2 * pi`
    pub fn raw() -> Self {
        Self::new(1.0, Point::new(0.0, 0.0))
    }

    /// Projection producing world pixels at `zoom`
    pub fn for_zoom(zoom: f64) -> Self {
        let world = world_size(zoom);
        Self::new(world / TAU, Point::new(world / 2.0, world / 2.0))
    }

    /// Projection at `zoom` that puts `center` at `origin`
    pub fn centered(center: &LatLng, zoom: f64, origin: Point) -> Self {
        let scale = world_size(zoom) / TAU;
        let raw = Self::raw().forward(center);
        Self::new(scale, origin.subtract(&raw.multiply(scale)))
    }

    /// Fractional zoom level whose world has the same width as this projection
    pub fn zoom(&self) -> f64 {
        (self.scale / TILE_SIZE * TAU).log2()
    }

    /// Width of one copy of the world in projected units
    pub fn world_width(&self) -> f64 {
        TAU * self.scale
    }

    pub fn forward(&self, coord: &LatLng) -> Point {
        let lambda = coord.lng.to_radians();
        let phi = coord.lat.to_radians();
        let y = -(FRAC_PI_4 + phi / 2.0).tan().ln();
        Point::new(
            lambda * self.scale + self.translate.x,
            y * self.scale + self.translate.y,
        )
    }

    pub fn inverse(&self, point: &Point) -> LatLng {
        let x = (point.x - self.translate.x) / self.scale;
        let y = (point.y - self.translate.y) / self.scale;
        LatLng::new(
            (2.0 * (-y).exp().atan() - FRAC_PI_2).to_degrees(),
            x.to_degrees(),
        )
    }

    /// [`forward`](Self::forward), failing on the poles and on non-finite output.
    ///
    /// Rounding makes `forward` return a large finite `y` at exactly 90 degrees
    /// north, so the poles are rejected by latitude as well.
    pub fn try_forward(&self, coord: &LatLng) -> Result<Point> {
        let projected = self.forward(coord);
        if coord.lat.abs() < 90.0 && projected.is_finite() {
            Ok(projected)
        } else {
            Err(MapError::ProjectionDomain(format!(
                "cannot project ({}, {})",
                coord.lat, coord.lng
            )))
        }
    }

    /// [`inverse`](Self::inverse), failing instead of producing non-finite output
    pub fn try_inverse(&self, point: &Point) -> Result<LatLng> {
        let coord = self.inverse(point);
        if coord.lat.is_finite() && coord.lng.is_finite() {
            Ok(coord)
        } else {
            Err(MapError::ProjectionDomain(format!(
                "cannot invert ({}, {})",
                point.x, point.y
            )))
        }
    }

    /// Largest projection that shows every coordinate inside `[min, max]`,
    /// centered in that extent.
    ///
    /// Fails with `ProjectionDomain` if a coordinate cannot be projected or if
    /// all coordinates coincide (any scale would fit).
    pub fn fit_extent(coords: &[LatLng], min: Point, max: Point) -> Result<Self> {
        let (width, height) = (max.x - min.x, max.y - min.y);
        if !(width > 0.0 && height > 0.0) {
            return Err(MapError::InvalidArgument(format!(
                "empty fit extent {}x{}",
                width, height
            )));
        }
        let bounds = raw_bounds(coords)?.ok_or_else(|| {
            MapError::InvalidArgument("cannot fit an empty set of coordinates".to_string())
        })?;
        if bounds.width() == 0.0 && bounds.height() == 0.0 {
            return Err(MapError::ProjectionDomain(
                "coordinates coincide, every scale fits".to_string(),
            ));
        }

        let k = (width / bounds.width()).min(height / bounds.height());
        let (lo, hi) = (bounds.min(), bounds.max());
        Ok(Self::new(
            k,
            Point::new(
                min.x + (width - k * (hi.x + lo.x)) / 2.0,
                min.y + (height - k * (hi.y + lo.y)) / 2.0,
            ),
        ))
    }
}

impl Default for MercatorProjection {
    fn default() -> Self {
        Self::raw()
    }
}

/// Bounding box of the coordinates on the raw Mercator plane
fn raw_bounds(coords: &[LatLng]) -> Result<Option<geo_types::Rect<f64>>> {
    let raw = MercatorProjection::raw();
    let points = coords
        .iter()
        .map(|coord| raw.try_forward(coord).map(|p| geo_types::Point::new(p.x, p.y)))
        .collect::<Result<Vec<_>>>()?;
    Ok(MultiPoint::new(points).bounding_rect())
}

/// Largest zoom at which every coordinate stays at least `margin` pixels
/// (default 20) away from each edge of a `canvas_size` canvas.
///
/// Needs at least two coordinates. Coincident coordinates fit at any zoom and
/// return `f64::INFINITY`; callers cap the result with their own zoom levels.
/// Coordinates are not wrapped, so a set straddling the antimeridian is fitted
/// the long way round.
pub fn calc_zoom_fit_points(coords: &[LatLng], canvas_size: Point, margin: Option<f64>) -> Result<f64> {
    if coords.len() < 2 {
        return Err(MapError::InvalidArgument(format!(
            "fitting needs at least 2 points, got {}",
            coords.len()
        )));
    }
    let margin = margin.unwrap_or(DEFAULT_MARGIN);
    let min = Point::new(margin, margin);
    let max = Point::new(canvas_size.x - margin, canvas_size.y - margin);
    if !(max.x > min.x && max.y > min.y) {
        return Err(MapError::InvalidArgument(format!(
            "margin {} leaves no room on a {}x{} canvas",
            margin, canvas_size.x, canvas_size.y
        )));
    }

    if coords.iter().all(|c| c == &coords[0]) {
        MercatorProjection::raw().try_forward(&coords[0])?;
        return Ok(f64::INFINITY);
    }
    Ok(MercatorProjection::fit_extent(coords, min, max)?.zoom())
}

/// Largest zoom at which a view centered exactly on `center` still shows
/// `outer` at least `margin` pixels (default 20) inside the canvas.
///
/// `outer` is mirrored through `center` on the Mercator plane and the pair is
/// fitted, which keeps `center` in the middle of the fitted box. `outer` is
/// taken on the copy of the world nearest to `center`, the one a frame
/// centered there draws.
pub fn calc_min_zoom_centered_on(
    center: &LatLng,
    outer: &LatLng,
    canvas_size: Point,
    margin: Option<f64>,
) -> Result<f64> {
    let raw = MercatorProjection::raw();
    let (c, o) = shortest_projected_path(&raw, center, outer)?;
    let near = raw.try_inverse(&o)?;
    let mirrored = raw.try_inverse(&c.multiply(2.0).subtract(&o))?;
    calc_zoom_fit_points(&[near, mirrored], canvas_size, margin)
}

/// Longitude offset in whole worlds (`-1`, `0` or `1`) that makes travelling
/// from `lng0` to `lng1` take the short way round.
///
/// Exactly 180 degrees apart counts as the long way: it resolves westward when
/// `lng1 > lng0` and eastward otherwise.
pub fn antimeridian_offset(lng0: f64, lng1: f64) -> f64 {
    let delta = lng1 - lng0;
    if delta.abs() < 180.0 {
        0.0
    } else if lng1 > lng0 {
        -1.0
    } else {
        1.0
    }
}

/// Endpoints of the shortest straight path between two coordinates on the
/// projection's plane; the destination may be shifted by one world width.
pub fn shortest_projected_path(
    projection: &MercatorProjection,
    from: &LatLng,
    to: &LatLng,
) -> Result<(Point, Point)> {
    let start = projection.try_forward(from)?;
    let mut end = projection.try_forward(to)?;
    end.x += antimeridian_offset(from.lng, to.lng) * projection.world_width();
    Ok((start, end))
}
