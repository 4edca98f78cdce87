use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Named easing curves mapping [0, 1] onto [0, 1], exact at both ends and
/// never leaving the range.
///
/// Each family is defined by its ease-in curve; the out form mirrors it and
/// the in-out form runs it forwards then mirrored over each half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInExpo,
    EaseOutExpo,
    EaseInOutExpo,
}

#[derive(Clone, Copy)]
enum Family {
    Quad,
    Cubic,
    Sine,
    Expo,
}

#[derive(Clone, Copy)]
enum Shape {
    In,
    Out,
    InOut,
}

impl Family {
    fn ease_in(self, t: f64) -> f64 {
        match self {
            Family::Quad => t * t,
            Family::Cubic => t * t * t,
            Family::Sine => 1.0 - (t * FRAC_PI_2).cos(),
            // Rescaled so that 0 maps to 0 exactly
            Family::Expo => (2_f64.powf(10.0 * t) - 1.0) / 1023.0,
        }
    }
}

impl EasingFunction {
    fn parts(self) -> Option<(Family, Shape)> {
        use EasingFunction::*;
        Some(match self {
            Linear => return None,
            EaseInQuad => (Family::Quad, Shape::In),
            EaseOutQuad => (Family::Quad, Shape::Out),
            EaseInOutQuad => (Family::Quad, Shape::InOut),
            EaseInCubic => (Family::Cubic, Shape::In),
            EaseOutCubic => (Family::Cubic, Shape::Out),
            EaseInOutCubic => (Family::Cubic, Shape::InOut),
            EaseInSine => (Family::Sine, Shape::In),
            EaseOutSine => (Family::Sine, Shape::Out),
            EaseInOutSine => (Family::Sine, Shape::InOut),
            EaseInExpo => (Family::Expo, Shape::In),
            EaseOutExpo => (Family::Expo, Shape::Out),
            EaseInOutExpo => (Family::Expo, Shape::InOut),
        })
    }

    /// Eased progress for `t`, clamped to [0, 1] first
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let Some((family, shape)) = self.parts() else {
            return t;
        };
        match shape {
            Shape::In => family.ease_in(t),
            Shape::Out => 1.0 - family.ease_in(1.0 - t),
            Shape::InOut if t < 0.5 => family.ease_in(2.0 * t) / 2.0,
            Shape::InOut => 1.0 - family.ease_in(2.0 - 2.0 * t) / 2.0,
        }
    }

    /// Closure form, ready for the `add_*_ease` combinators
    pub fn into_fn(self) -> impl Fn(f64) -> f64 + Send + Sync + 'static {
        move |t| self.apply(t)
    }
}
