//! # mapflight
//!
//! Animated camera transitions over WebMercator tile maps.
//!
//! A caller builds a transition function (a pure map from normalized time to a
//! [`ViewPoint`]), resolves it into one [`Frame`] per time step, and hands those
//! frames to a tile cache and a playback driver. The transition algebra, the
//! Mercator arithmetic and the frame resolver are all pure and synchronous.

pub mod animation;
pub mod core;
pub mod prelude;
pub mod rendering;
pub mod tiles;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{
        FrameTimingConfig, FrameTimingProfile, TileLoadingConfig, TransitionKind, TransitionOptions,
        TransitionRequest,
    },
    geo::{LatLng, Point, Point3D, TileCoord, ViewPoint},
    projection::MercatorProjection,
};

pub use animation::{
    easing::EasingFunction,
    functions::{PanningFunction, TransitionFunction, ZoomFunction},
};

pub use rendering::{
    frame::{Border, BorderPosition, Frame},
    sequence::FrameSequence,
};

pub use tiles::{
    cache::TileCache,
    loader::{TileFetcher, TilePreloader},
    source::{TemplateSource, TileSource},
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// A caller-level contract violation detected before any computation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Geographic input the Mercator math cannot handle (poles, coincident
    /// endpoints, equal zooms where a zoom ratio is required).
    #[error("Projection domain error: {0}")]
    ProjectionDomain(String),

    #[error("Tile error: {0}")]
    Tile(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;
