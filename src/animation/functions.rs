//! Pure functions of normalized time and the combinators that build them.
//!
//! Every function here is a shared closure: cheap to clone, safe to call from
//! any thread, and valid for any `t` in any order. Construction may project
//! endpoints or fit zooms; evaluation only does arithmetic.

use std::sync::Arc;

use crate::core::geo::{LatLng, Point3D, ViewPoint};
use crate::core::projection::{antimeridian_offset, shortest_projected_path, MercatorProjection};
use crate::{MapError, Result};

/// Where the camera looks at time `t`
pub type PanningFunction = Arc<dyn Fn(f64) -> LatLng + Send + Sync>;
/// Zoom level at time `t`
pub type ZoomFunction = Arc<dyn Fn(f64) -> f64 + Send + Sync>;
/// Full camera path
pub type TransitionFunction = Arc<dyn Fn(f64) -> ViewPoint + Send + Sync>;

/// Pans along a straight line on the Mercator plane, so the path looks straight
/// on the map.
///
/// Crossing more than 180 degrees of longitude is redirected the short way
/// round the antimeridian; see
/// [`antimeridian_offset`](crate::core::projection::antimeridian_offset) for the
/// tie at exactly 180. Output longitudes are wrapped to [-180, 180] and both
/// endpoints are returned verbatim at `t = 0` and `t = 1`.
pub fn create_panning(p0: LatLng, p1: LatLng) -> PanningFunction {
    let projection = MercatorProjection::raw();
    let start = projection.forward(&p0);
    let mut end = projection.forward(&p1);
    end.x += antimeridian_offset(p0.lng, p1.lng) * projection.world_width();

    Arc::new(move |t| {
        if t == 0.0 {
            p0
        } else if t == 1.0 {
            p1
        } else {
            projection.inverse(&start.lerp(&end, t)).wrapped()
        }
    })
}

/// Like [`create_panning`] but fails on coordinates the projection cannot handle.
pub fn try_create_panning(p0: LatLng, p1: LatLng) -> Result<PanningFunction> {
    shortest_projected_path(&MercatorProjection::raw(), &p0, &p1)?;
    Ok(create_panning(p0, p1))
}

/// Pans along the great circle through both coordinates, for journeys long
/// enough that a straight Mercator line would look wrong.
///
/// Antipodal endpoints have no unique great circle and are rejected.
pub fn create_panning_great_circle(p0: LatLng, p1: LatLng) -> Result<PanningFunction> {
    let a = p0.to_cartesian();
    let b = p1.to_cartesian();
    let theta = a.dot(&b).clamp(-1.0, 1.0).acos();

    if theta.abs() < 1e-9 {
        return Ok(create_panning(p0, p1));
    }
    let sin_theta = theta.sin();
    if sin_theta.abs() < 1e-9 {
        return Err(MapError::ProjectionDomain(format!(
            "({}, {}) and ({}, {}) are antipodal",
            p0.lat, p0.lng, p1.lat, p1.lng
        )));
    }

    Ok(Arc::new(move |t| {
        if t == 0.0 {
            return p0;
        } else if t == 1.0 {
            return p1;
        }
        let wa = ((1.0 - t) * theta).sin() / sin_theta;
        let wb = (t * theta).sin() / sin_theta;
        let p: Point3D = a.scale(wa).add(&b.scale(wb));
        LatLng::from_cartesian(&p)
    }))
}

pub fn create_zoom(z0: f64, z1: f64) -> ZoomFunction {
    Arc::new(move |t| z0 * (1.0 - t) + z1 * t)
}

/// `pan(ease(t))`. The easing should map [0, 1] onto [0, 1]; anything else
/// moves the camera past the endpoints.
pub fn add_panning_ease<E>(pan: PanningFunction, ease: E) -> PanningFunction
where
    E: Fn(f64) -> f64 + Send + Sync + 'static,
{
    Arc::new(move |t| pan(ease(t)))
}

/// `zoom(ease(t))`
pub fn add_zoom_ease<E>(zoom: ZoomFunction, ease: E) -> ZoomFunction
where
    E: Fn(f64) -> f64 + Send + Sync + 'static,
{
    Arc::new(move |t| zoom(ease(t)))
}

/// `transition(ease(t))`
pub fn add_transition_ease<E>(transition: TransitionFunction, ease: E) -> TransitionFunction
where
    E: Fn(f64) -> f64 + Send + Sync + 'static,
{
    Arc::new(move |t| transition(ease(t)))
}

pub fn create_transition_function(pan: PanningFunction, zoom: ZoomFunction) -> TransitionFunction {
    Arc::new(move |t| pan(t).with_zoom(zoom(t)))
}

/// Plays `transitions` one after another within a single [0, 1] timeline.
///
/// Each transition gets a share of the timeline proportional to its weight
/// (all 1 by default). A global `t` exactly on a shared boundary belongs to the
/// transition that starts there, so the last one also owns `t = 1`.
pub fn join_transitions(
    transitions: Vec<TransitionFunction>,
    weights: Option<Vec<f64>>,
) -> Result<TransitionFunction> {
    if transitions.is_empty() {
        return Err(MapError::InvalidArgument(
            "cannot join an empty list of transitions".to_string(),
        ));
    }
    let weights = weights.unwrap_or_else(|| vec![1.0; transitions.len()]);
    if weights.len() != transitions.len() {
        return Err(MapError::InvalidArgument(format!(
            "{} weights for {} transitions",
            weights.len(),
            transitions.len()
        )));
    }
    if let Some(bad) = weights.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
        return Err(MapError::InvalidArgument(format!(
            "transition weights must be positive, got {}",
            bad
        )));
    }

    // starts[i] is where transition i begins on the extended timeline
    let mut starts = Vec::with_capacity(weights.len() + 1);
    let mut total = 0.0;
    starts.push(total);
    for weight in &weights {
        total += weight;
        starts.push(total);
    }
    let last = transitions.len() - 1;

    Ok(Arc::new(move |t| {
        let extended_t = t * total;
        let index = starts[..=last]
            .partition_point(|start| *start <= extended_t)
            .saturating_sub(1);
        let (t0, t1) = (starts[index], starts[index + 1]);
        transitions[index]((extended_t - t0) / (t1 - t0))
    }))
}
