use std::time::Duration;

use fxhash::FxHashSet;

use crate::animation::functions::TransitionFunction;
use crate::core::config::FrameTimingConfig;
use crate::core::geo::{Point, TileCoord, ViewPoint};
use crate::rendering::frame::Frame;
use crate::Result;

/// A transition sampled at evenly spaced times, one [`Frame`] per step.
///
/// Resolving is done once up front so the tiles of the whole animation are
/// known before the first frame is drawn.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    views: Vec<ViewPoint>,
    frames: Vec<Frame>,
    timing: FrameTimingConfig,
}

impl FrameSequence {
    /// Evaluates `transition` at `t_i = i / (n - 1)` for the `n` frames of
    /// `timing` and resolves each view on `canvas_size`.
    pub fn resolve(
        transition: &TransitionFunction,
        canvas_size: Point,
        timing: &FrameTimingConfig,
    ) -> Result<Self> {
        let count = timing.frame_count()?;
        let last = (count - 1) as f64;
        let views: Vec<ViewPoint> = (0..count).map(|i| transition(i as f64 / last)).collect();
        let frames: Vec<Frame> = views
            .iter()
            .map(|view| Frame::calculate(canvas_size, view))
            .collect();

        let sequence = Self {
            views,
            frames,
            timing: timing.clone(),
        };
        log::debug!(
            "resolved {} frames needing {} unique tiles",
            sequence.len(),
            sequence.required_tiles().len()
        );
        Ok(sequence)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Camera positions the frames were resolved from
    pub fn views(&self) -> &[ViewPoint] {
        &self.views
    }

    pub fn timing(&self) -> &FrameTimingConfig {
        &self.timing
    }

    pub fn frame_at(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Frame on screen `elapsed` into playback; the last frame once playback
    /// is over.
    pub fn frame_at_time(&self, elapsed: Duration) -> Option<&Frame> {
        let step = elapsed.as_secs_f64() * self.timing.fps as f64;
        let index = (step.floor() as usize).min(self.frames.len().saturating_sub(1));
        self.frames.get(index)
    }

    /// Every tile any frame draws, once per canonical identity, in the order
    /// they are first needed.
    pub fn required_tiles(&self) -> Vec<TileCoord> {
        let mut seen = FxHashSet::default();
        self.frames
            .iter()
            .flat_map(|frame| frame.tiles())
            .filter(|tile| seen.insert(**tile))
            .copied()
            .collect()
    }
}
