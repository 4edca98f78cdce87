//! Smooth zoom-and-pan after J. J. van Wijk and W. A. A. Nuij, "Smooth and
//! efficient zooming and panning" (2003).
//!
//! The camera is described by `u`, the distance travelled along the straight
//! Mercator line between the endpoints, and `w`, the width of the visible
//! window measured along that line. The path zooms out while it pans and back
//! in on arrival, following the closed-form solution of the paper.

use std::f64::consts::TAU;
use std::sync::Arc;

use crate::animation::functions::TransitionFunction;
use crate::core::constants::{DEFAULT_RHO, TILE_SIZE};
use crate::core::geo::{Point, ViewPoint};
use crate::core::projection::{shortest_projected_path, MercatorProjection};
use crate::rendering::frame::border_intersection;
use crate::{MapError, Result};

/// Builds the optimal path from `p0` to `p1` on a `canvas_size` canvas.
///
/// `rho` (default 1.4) trades zooming against panning: larger values zoom out
/// further. The window width follows the canvas chord in the direction of
/// travel, so a diagonal or vertical journey on a wide canvas zooms out just
/// as far as it needs to.
///
/// Fails with `InvalidArgument` for a non-positive `rho` and with
/// `ProjectionDomain` when an endpoint cannot be projected or both endpoints
/// share a center.
pub fn create_van_wijk_and_nuij_transition(
    p0: ViewPoint,
    p1: ViewPoint,
    canvas_size: Point,
    rho: Option<f64>,
) -> Result<TransitionFunction> {
    let rho = rho.unwrap_or(DEFAULT_RHO);
    if !(rho.is_finite() && rho > 0.0) {
        return Err(MapError::InvalidArgument(format!(
            "rho must be positive, got {}",
            rho
        )));
    }

    let projection = MercatorProjection::raw();
    let (c0, c1) = shortest_projected_path(&projection, &p0.coord(), &p1.coord())?;
    let delta = c1.subtract(&c0);
    let u1 = delta.distance_to(&Point::default());
    if !(u1 > 0.0) {
        return Err(MapError::ProjectionDomain(format!(
            "({}, {}) is both start and end of the path",
            p0.lat, p0.lng
        )));
    }
    projection.try_inverse(&c0)?;
    projection.try_inverse(&c1)?;

    // Length of the canvas chord through the center along the travel direction
    let direction = delta.y.atan2(delta.x);
    let exit = border_intersection(canvas_size, 0.0, direction);
    let chord = 2.0 * canvas_size.multiply(0.5).distance_to(&Point::new(exit.x, exit.y));
    let window = |zoom: f64| chord * TAU / (TILE_SIZE * 2_f64.powf(zoom));

    let w0 = window(p0.zoom);
    let w1 = window(p1.zoom);
    let rho2 = rho * rho;
    let rho4 = rho2 * rho2;
    let b0 = (w1 * w1 - w0 * w0 + rho4 * u1 * u1) / (2.0 * w0 * rho2 * u1);
    let b1 = (w1 * w1 - w0 * w0 - rho4 * u1 * u1) / (2.0 * w1 * rho2 * u1);
    // ln(-b + sqrt(b^2 + 1)) without the cancellation for large b
    let r0 = -b0.asinh();
    let r1 = -b1.asinh();
    let length = (r1 - r0) / rho;
    if !(length.is_finite() && w0.is_finite() && w1.is_finite()) {
        return Err(MapError::ProjectionDomain(format!(
            "no smooth path from zoom {} to zoom {}",
            p0.zoom, p1.zoom
        )));
    }
    log::debug!(
        "van Wijk-Nuij path: u1 = {:.6}, S = {:.4}, rho = {}",
        u1,
        length,
        rho
    );

    let (cosh_r0, sinh_r0) = (r0.cosh(), r0.sinh());
    Ok(Arc::new(move |t| {
        if t == 0.0 {
            return p0;
        } else if t == 1.0 {
            return p1;
        }
        let s = t * length;
        let u = w0 / rho2 * (cosh_r0 * (rho * s + r0).tanh() - sinh_r0);
        let w = w0 * cosh_r0 / (rho * s + r0).cosh();
        let center = c0.lerp(&c1, u / u1);
        let zoom = (chord * TAU / (TILE_SIZE * w)).log2();
        projection.inverse(&center).wrapped().with_zoom(zoom)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;
    use crate::core::projection::forward_mercator;

    fn close(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_endpoints_are_exact() {
        let p0 = ViewPoint::new(52.52, 13.405, 10.0);
        let p1 = ViewPoint::new(48.8566, 2.3522, 11.0);
        let transition =
            create_van_wijk_and_nuij_transition(p0, p1, Point::new(800.0, 600.0), None).unwrap();
        assert_eq!(transition(0.0), p0);
        assert_eq!(transition(1.0), p1);
    }

    #[test]
    fn test_path_is_continuous_near_endpoints() {
        let p0 = ViewPoint::new(52.52, 13.405, 10.0);
        let p1 = ViewPoint::new(48.8566, 2.3522, 11.0);
        let transition =
            create_van_wijk_and_nuij_transition(p0, p1, Point::new(800.0, 600.0), None).unwrap();

        let start = transition(1e-9);
        assert!(close(start.lat, p0.lat, 1e-5) && close(start.lng, p0.lng, 1e-5));
        assert!(close(start.zoom, p0.zoom, 1e-5));
        let end = transition(1.0 - 1e-9);
        assert!(close(end.lat, p1.lat, 1e-5) && close(end.lng, p1.lng, 1e-5));
        assert!(close(end.zoom, p1.zoom, 1e-5));
    }

    #[test]
    fn test_zooms_out_mid_flight() {
        let p0 = ViewPoint::new(0.0, 0.0, 10.0);
        let p1 = ViewPoint::new(0.0, 10.0, 10.0);
        let transition =
            create_van_wijk_and_nuij_transition(p0, p1, Point::new(512.0, 512.0), None).unwrap();

        let mid = transition(0.5);
        assert!(mid.zoom < 8.0);
        // Symmetric endpoints meet halfway at t = 0.5
        assert!(close(mid.lng, 5.0, 1e-6));
        assert!(close(mid.lat, 0.0, 1e-9));
    }

    #[test]
    fn test_stays_on_mercator_line() {
        let p0 = ViewPoint::new(60.0, -20.0, 6.0);
        let p1 = ViewPoint::new(20.0, 30.0, 8.0);
        let transition =
            create_van_wijk_and_nuij_transition(p0, p1, Point::new(640.0, 480.0), None).unwrap();

        let a = forward_mercator(&p0.coord(), 0.0);
        let b = forward_mercator(&p1.coord(), 0.0);
        for t in [0.2, 0.5, 0.8] {
            let p = forward_mercator(&transition(t).coord(), 0.0);
            let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
            assert!(cross.abs() < 1e-6, "t = {}", t);
        }
    }

    #[test]
    fn test_larger_rho_zooms_out_further() {
        let p0 = ViewPoint::new(0.0, 0.0, 10.0);
        let p1 = ViewPoint::new(0.0, 10.0, 10.0);
        let canvas = Point::new(512.0, 512.0);
        let gentle = create_van_wijk_and_nuij_transition(p0, p1, canvas, Some(1.0)).unwrap();
        let steep = create_van_wijk_and_nuij_transition(p0, p1, canvas, Some(2.0)).unwrap();
        assert!(steep(0.5).zoom < gentle(0.5).zoom);
    }

    #[test]
    fn test_crosses_antimeridian() {
        let p0 = ViewPoint::new(0.0, 170.0, 5.0);
        let p1 = ViewPoint::new(0.0, -170.0, 5.0);
        let transition =
            create_van_wijk_and_nuij_transition(p0, p1, Point::new(512.0, 512.0), None).unwrap();
        assert!(close(transition(0.5).lng.abs(), 180.0, 1e-6));
    }

    #[test]
    fn test_rejects_bad_input() {
        let canvas = Point::new(512.0, 512.0);
        let p = ViewPoint::new(10.0, 10.0, 4.0);
        assert!(matches!(
            create_van_wijk_and_nuij_transition(p, ViewPoint::new(10.0, 10.0, 8.0), canvas, None),
            Err(MapError::ProjectionDomain(_))
        ));
        assert!(matches!(
            create_van_wijk_and_nuij_transition(p, ViewPoint::new(0.0, 0.0, 4.0), canvas, Some(0.0)),
            Err(MapError::InvalidArgument(_))
        ));
        let pole = LatLng::new(90.0, 0.0).with_zoom(3.0);
        assert!(matches!(
            create_van_wijk_and_nuij_transition(p, pole, canvas, None),
            Err(MapError::ProjectionDomain(_))
        ));
    }
}
