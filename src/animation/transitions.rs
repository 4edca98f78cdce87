//! Ready-made camera paths between two viewpoints, built from the
//! combinators in [`functions`](super::functions).

use std::sync::Arc;

use crate::animation::functions::{
    create_panning, create_transition_function, create_zoom, join_transitions, TransitionFunction,
};
use crate::core::geo::{Point, ViewPoint};
use crate::core::projection::calc_min_zoom_centered_on;
use crate::{MapError, Result};

/// Pans in a straight Mercator line while keeping `p0`'s zoom.
pub fn create_linear_pan_transition(p0: ViewPoint, p1: ViewPoint) -> TransitionFunction {
    create_transition_function(
        create_panning(p0.coord(), p1.coord()),
        create_zoom(p0.zoom, p0.zoom),
    )
}

/// Pans and zooms independently and linearly.
///
/// On-screen panning speed follows the zoom: slow while zoomed out, fast while
/// zoomed in. Use [`create_perceived_linear_zoom_and_pan_transition`] for a
/// constant apparent speed.
pub fn create_linear_zoom_and_pan_transition(p0: ViewPoint, p1: ViewPoint) -> TransitionFunction {
    create_transition_function(
        create_panning(p0.coord(), p1.coord()),
        create_zoom(p0.zoom, p1.zoom),
    )
}

/// Zooms linearly and advances the pan in proportion to the change of map
/// scale `2^-zoom`, so the map appears to slide at a constant speed.
///
/// Fails with `ProjectionDomain` when both zooms are equal: the scale does not
/// change and panning progress would divide by zero. Use
/// [`create_linear_pan_transition`] in that case.
pub fn create_perceived_linear_zoom_and_pan_transition(
    p0: ViewPoint,
    p1: ViewPoint,
) -> Result<TransitionFunction> {
    let zoom = create_zoom(p0.zoom, p1.zoom);
    let s0 = 2_f64.powf(-p0.zoom);
    let s1 = 2_f64.powf(-p1.zoom);
    let span = s1 - s0;
    if span == 0.0 || !span.is_finite() {
        return Err(MapError::ProjectionDomain(format!(
            "perceived-linear panning needs distinct zoom levels, got {} and {}",
            p0.zoom, p1.zoom
        )));
    }
    let pan = create_panning(p0.coord(), p1.coord());

    Ok(Arc::new(move |t| {
        let z = zoom(t);
        let progress = (2_f64.powf(-z) - s0) / span;
        pan(progress).with_zoom(z)
    }))
}

/// Zooms out of `p0`, pans across, then zooms into `p1`, each phase taking a
/// third of the time.
///
/// The crossing happens at `min_zoom`, or by default at the largest zoom at
/// which `p1` is visible from a view centered on `p0`. Either way it is capped
/// so it never exceeds the zoom of either endpoint.
pub fn create_box_transition(
    p0: ViewPoint,
    p1: ViewPoint,
    canvas_size: Point,
    min_zoom: Option<f64>,
) -> Result<TransitionFunction> {
    join_transitions(box_transition_phases(p0, p1, canvas_size, min_zoom, None)?, None)
}

/// The three phases of [`create_box_transition`], for joining with custom
/// weights. `margin` (default 20 pixels) applies to the fitted crossing zoom.
pub fn box_transition_phases(
    p0: ViewPoint,
    p1: ViewPoint,
    canvas_size: Point,
    min_zoom: Option<f64>,
    margin: Option<f64>,
) -> Result<Vec<TransitionFunction>> {
    let fitted = match min_zoom {
        Some(zoom) => zoom,
        None => calc_min_zoom_centered_on(&p0.coord(), &p1.coord(), canvas_size, margin)?,
    };
    let min_zoom = fitted.min(p0.zoom).min(p1.zoom);
    log::debug!("box transition crosses at zoom {:.3}", min_zoom);

    let top0 = p0.coord().with_zoom(min_zoom);
    let top1 = p1.coord().with_zoom(min_zoom);
    Ok(vec![
        create_linear_zoom_and_pan_transition(p0, top0),
        create_linear_pan_transition(top0, top1),
        create_linear_zoom_and_pan_transition(top1, p1),
    ])
}

/// Two perceived-linear legs meeting above the Mercator midpoint of `p0` and
/// `p1`, at a zoom where both endpoints are visible.
///
/// The apex zoom is `apex_zoom` or fitted from `canvas_size`, and is capped by
/// both endpoint zooms. A leg whose ends share a zoom level falls back to a
/// linear pan.
pub fn create_triangular_transition(
    p0: ViewPoint,
    p1: ViewPoint,
    canvas_size: Point,
    apex_zoom: Option<f64>,
) -> Result<TransitionFunction> {
    join_transitions(
        triangular_transition_phases(p0, p1, canvas_size, apex_zoom, None)?,
        None,
    )
}

/// The two legs of [`create_triangular_transition`], for joining with custom
/// weights. `margin` (default 20 pixels) applies to the fitted apex zoom.
pub fn triangular_transition_phases(
    p0: ViewPoint,
    p1: ViewPoint,
    canvas_size: Point,
    apex_zoom: Option<f64>,
    margin: Option<f64>,
) -> Result<Vec<TransitionFunction>> {
    let middle = create_panning(p0.coord(), p1.coord())(0.5);
    let fitted = match apex_zoom {
        Some(zoom) => zoom,
        None => calc_min_zoom_centered_on(&middle, &p0.coord(), canvas_size, margin)?,
    };
    let apex = middle.with_zoom(fitted.min(p0.zoom).min(p1.zoom));
    log::debug!(
        "triangular transition apex ({:.5}, {:.5}) at zoom {:.3}",
        apex.lat,
        apex.lng,
        apex.zoom
    );

    Ok(vec![leg(p0, apex)?, leg(apex, p1)?])
}

fn leg(from: ViewPoint, to: ViewPoint) -> Result<TransitionFunction> {
    if from.zoom == to.zoom {
        Ok(create_linear_pan_transition(from, to))
    } else {
        create_perceived_linear_zoom_and_pan_transition(from, to)
    }
}
