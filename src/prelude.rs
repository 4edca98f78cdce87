//! Prelude module for common mapflight types and functions
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapflight::prelude::*;`

pub use crate::core::{
    config::{
        FrameTimingConfig, FrameTimingProfile, TileLoadingConfig, TransitionKind, TransitionOptions,
        TransitionRequest,
    },
    geo::{LatLng, Point, TileCoord, ViewPoint},
    projection::{
        calc_min_zoom_centered_on, calc_zoom_fit_points, forward_mercator, inverse_mercator,
        MercatorProjection,
    },
};

pub use crate::animation::{
    add_panning_ease, add_transition_ease, add_zoom_ease, create_box_transition,
    create_linear_pan_transition, create_linear_zoom_and_pan_transition, create_panning,
    create_panning_great_circle, create_perceived_linear_zoom_and_pan_transition,
    create_transition_function, create_triangular_transition, create_van_wijk_and_nuij_transition,
    create_zoom, join_transitions, EasingFunction, PanningFunction, TransitionFunction,
    ZoomFunction,
};

pub use crate::rendering::{Border, BorderPosition, Frame, FrameSequence};

pub use crate::tiles::{
    PreloadReport, TemplateSource, TileCache, TileFetcher, TilePreloader, TileSource,
};

pub use crate::{MapError, Result};

pub use std::{sync::Arc, time::Duration};
