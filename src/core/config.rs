//! Configuration for building transitions and turning them into frames.
//!
//! Presets resolve to plain option structs, and every type here can be read
//! from JSON so a whole flight can be described in a config file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::animation::easing::EasingFunction;
use crate::animation::functions::{
    add_transition_ease, create_panning_great_circle, create_transition_function, create_zoom,
    join_transitions, TransitionFunction,
};
use crate::animation::transitions::{
    box_transition_phases, create_linear_pan_transition, create_linear_zoom_and_pan_transition,
    create_perceived_linear_zoom_and_pan_transition, triangular_transition_phases,
};
use crate::animation::van_wijk::create_van_wijk_and_nuij_transition;
use crate::core::geo::{Point, ViewPoint};
use crate::{MapError, Result};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameTimingProfile {
    /// Quick, choppy render for checking a path
    Preview,
    #[default]
    Standard,
    Smooth,
    Custom(FrameTimingConfig),
}

impl FrameTimingProfile {
    pub fn resolve(&self) -> FrameTimingConfig {
        match self {
            Self::Preview => FrameTimingConfig {
                fps: 15,
                duration_ms: 2_000,
            },
            Self::Standard => FrameTimingConfig {
                fps: 30,
                duration_ms: 3_000,
            },
            Self::Smooth => FrameTimingConfig {
                fps: 60,
                duration_ms: 3_000,
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

/// How many frames a transition is sampled into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTimingConfig {
    pub fps: u32,
    pub duration_ms: u64,
}

impl FrameTimingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 || self.duration_ms == 0 {
            return Err(MapError::InvalidArgument(format!(
                "frame timing needs a positive fps and duration, got {} fps over {} ms",
                self.fps, self.duration_ms
            )));
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Time between two consecutive frames
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }

    /// One frame per interval plus the final one, never fewer than two so both
    /// endpoints are always shown.
    pub fn frame_count(&self) -> Result<usize> {
        self.validate()?;
        let steps = (self.duration().as_secs_f64() * self.fps as f64).round() as usize;
        Ok((steps + 1).max(2))
    }
}

impl Default for FrameTimingConfig {
    fn default() -> Self {
        FrameTimingProfile::default().resolve()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLoadingConfig {
    /// Tiles kept in memory
    pub cache_size: usize,
    /// Tile requests in flight at once
    pub fetch_batch_size: usize,
    /// Further attempts after a failed fetch
    pub max_retries: u32,
}

impl Default for TileLoadingConfig {
    fn default() -> Self {
        Self {
            cache_size: 1024,
            fetch_batch_size: 8,
            max_retries: 3,
        }
    }
}

/// The ready-made camera paths a [`TransitionRequest`] can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    LinearPan,
    LinearZoomAndPan,
    PerceivedLinear,
    /// Linear zoom along a great-circle pan
    GreatCircle,
    Box,
    Triangular,
    VanWijkNuij,
}

impl TransitionKind {
    /// Number of joined phases, for kinds that accept `weights`
    pub fn phase_count(&self) -> Option<usize> {
        match self {
            Self::Box => Some(3),
            Self::Triangular => Some(2),
            _ => None,
        }
    }
}

/// Optional tuning shared by the transition recipes. Each recipe reads only
/// the fields it understands.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionOptions {
    /// Pixels kept clear at the canvas edges when fitting a zoom (default 20)
    pub margin: Option<f64>,
    /// Van Wijk & Nuij curvature (default 1.4)
    pub rho: Option<f64>,
    /// Crossing zoom of a box transition
    pub min_zoom: Option<f64>,
    /// Apex zoom of a triangular transition
    pub mid_zoom: Option<f64>,
    /// Relative duration of each phase of a box or triangular transition
    pub weights: Option<Vec<f64>>,
    /// Applied to the whole transition
    pub easing: EasingFunction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub kind: TransitionKind,
    pub from: ViewPoint,
    pub to: ViewPoint,
    pub canvas_size: Point,
    #[serde(default)]
    pub options: TransitionOptions,
}

impl TransitionRequest {
    pub fn new(kind: TransitionKind, from: ViewPoint, to: ViewPoint, canvas_size: Point) -> Self {
        Self {
            kind,
            from,
            to,
            canvas_size,
            options: TransitionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TransitionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the requested transition, eased as configured.
    pub fn build(&self) -> Result<TransitionFunction> {
        let (p0, p1, canvas) = (self.from, self.to, self.canvas_size);
        let options = &self.options;
        if options.weights.is_some() && self.kind.phase_count().is_none() {
            return Err(MapError::InvalidArgument(format!(
                "{:?} transitions have a single phase and take no weights",
                self.kind
            )));
        }

        let transition = match self.kind {
            TransitionKind::LinearPan => create_linear_pan_transition(p0, p1),
            TransitionKind::LinearZoomAndPan => create_linear_zoom_and_pan_transition(p0, p1),
            TransitionKind::PerceivedLinear => create_perceived_linear_zoom_and_pan_transition(p0, p1)?,
            TransitionKind::GreatCircle => create_transition_function(
                create_panning_great_circle(p0.coord(), p1.coord())?,
                create_zoom(p0.zoom, p1.zoom),
            ),
            TransitionKind::Box => join_transitions(
                box_transition_phases(p0, p1, canvas, options.min_zoom, options.margin)?,
                options.weights.clone(),
            )?,
            TransitionKind::Triangular => join_transitions(
                triangular_transition_phases(p0, p1, canvas, options.mid_zoom, options.margin)?,
                options.weights.clone(),
            )?,
            TransitionKind::VanWijkNuij => {
                create_van_wijk_and_nuij_transition(p0, p1, canvas, options.rho)?
            }
        };
        log::debug!(
            "built {:?} transition with {:?} easing",
            self.kind,
            options.easing
        );

        Ok(match options.easing {
            EasingFunction::Linear => transition,
            easing => add_transition_ease(transition, easing.into_fn()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kind: TransitionKind) -> TransitionRequest {
        TransitionRequest::new(
            kind,
            ViewPoint::new(52.52, 13.405, 9.0),
            ViewPoint::new(48.8566, 2.3522, 10.0),
            Point::new(800.0, 600.0),
        )
    }

    #[test]
    fn test_frame_timing_presets() {
        let preview = FrameTimingProfile::Preview.resolve();
        let standard = FrameTimingProfile::Standard.resolve();
        let smooth = FrameTimingProfile::Smooth.resolve();

        assert!(preview.fps < standard.fps);
        assert!(smooth.fps > standard.fps);
        assert_eq!(FrameTimingConfig::default(), standard);

        let custom = FrameTimingConfig {
            fps: 24,
            duration_ms: 500,
        };
        assert_eq!(FrameTimingProfile::Custom(custom.clone()).resolve(), custom);
    }

    #[test]
    fn test_frame_count() {
        let config = FrameTimingConfig {
            fps: 30,
            duration_ms: 2_000,
        };
        assert_eq!(config.frame_count().unwrap(), 61);
        assert_eq!(config.frame_interval(), Duration::from_secs_f64(1.0 / 30.0));

        // Too short for a whole interval still shows both endpoints
        let blink = FrameTimingConfig {
            fps: 10,
            duration_ms: 20,
        };
        assert_eq!(blink.frame_count().unwrap(), 2);
    }

    #[test]
    fn test_frame_timing_rejects_zero() {
        let config = FrameTimingConfig {
            fps: 0,
            duration_ms: 1_000,
        };
        assert!(matches!(config.frame_count(), Err(MapError::InvalidArgument(_))));
    }

    #[test]
    fn test_tile_loading_defaults() {
        let config = TileLoadingConfig::default();
        assert!(config.fetch_batch_size > 0);
        assert!(config.cache_size >= config.fetch_batch_size);
    }

    #[test]
    fn test_every_kind_builds() {
        for kind in [
            TransitionKind::LinearPan,
            TransitionKind::LinearZoomAndPan,
            TransitionKind::PerceivedLinear,
            TransitionKind::GreatCircle,
            TransitionKind::Box,
            TransitionKind::Triangular,
            TransitionKind::VanWijkNuij,
        ] {
            let req = request(kind);
            let transition = req.build().unwrap();
            assert_eq!(transition(0.0), req.from, "{:?}", kind);
            let end = transition(1.0);
            assert!((end.lat - req.to.lat).abs() < 1e-9, "{:?}", kind);
            assert!((end.lng - req.to.lng).abs() < 1e-9, "{:?}", kind);
        }
    }

    #[test]
    fn test_weights_only_for_phased_kinds() {
        let options = TransitionOptions {
            weights: Some(vec![1.0, 2.0]),
            ..Default::default()
        };
        let linear = request(TransitionKind::LinearPan).with_options(options.clone());
        assert!(matches!(linear.build(), Err(MapError::InvalidArgument(_))));

        let triangular = request(TransitionKind::Triangular).with_options(options);
        assert!(triangular.build().is_ok());

        // Wrong number of weights for the box's three phases
        let wrong = request(TransitionKind::Box).with_options(TransitionOptions {
            weights: Some(vec![1.0, 2.0]),
            ..Default::default()
        });
        assert!(matches!(wrong.build(), Err(MapError::InvalidArgument(_))));
    }

    #[test]
    fn test_easing_is_applied() {
        let plain = request(TransitionKind::LinearZoomAndPan).build().unwrap();
        let eased = request(TransitionKind::LinearZoomAndPan)
            .with_options(TransitionOptions {
                easing: EasingFunction::EaseInQuad,
                ..Default::default()
            })
            .build()
            .unwrap();
        assert_eq!(eased(0.5), plain(0.25));
    }

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "kind": "box",
            "from": { "lat": 48.7734, "lng": 9.1829, "zoom": 12.0 },
            "to": { "lat": 48.7392, "lng": 9.3049, "zoom": 12.0 },
            "canvas_size": { "x": 800.0, "y": 600.0 },
            "options": { "min_zoom": 10.0, "easing": "ease_in_out_sine" }
        }"#;
        let request = TransitionRequest::from_json(json).unwrap();
        assert_eq!(request.kind, TransitionKind::Box);
        assert_eq!(request.options.min_zoom, Some(10.0));
        assert_eq!(request.options.easing, EasingFunction::EaseInOutSine);
        assert_eq!(request.options.rho, None);

        let transition = request.build().unwrap();
        assert!((transition(0.5).zoom - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_options_default_when_missing() {
        let json = r#"{
            "kind": "van_wijk_nuij",
            "from": { "lat": 0.0, "lng": 0.0, "zoom": 3.0 },
            "to": { "lat": 10.0, "lng": 10.0, "zoom": 4.0 },
            "canvas_size": { "x": 512.0, "y": 512.0 }
        }"#;
        let request = TransitionRequest::from_json(json).unwrap();
        assert_eq!(request.options, TransitionOptions::default());
        assert!(matches!(
            TransitionRequest::from_json("{\"kind\": \"warp\"}"),
            Err(MapError::Serialization(_))
        ));
    }
}
