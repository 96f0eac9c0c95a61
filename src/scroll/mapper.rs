use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::ScrollSeqResult;
use crate::sequence::config::SequenceConfig;

/// Host measurements needed to derive scroll progress.
///
/// `container_top` is the container's top edge relative to the viewport top (negative once the
/// container has scrolled past it), as a bounding-client-rect reports it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportGeometry {
    /// Container top edge relative to the viewport top.
    pub container_top: f64,
    /// Total rendered height of the scroll-through container.
    pub container_height: f64,
    /// Viewport height.
    pub viewport_height: f64,
}

impl ViewportGeometry {
    /// Geometry for a container scrolled `scrolled` pixels past the viewport top.
    pub fn scrolled(scrolled: f64, container_height: f64, viewport_height: f64) -> Self {
        Self {
            container_top: -scrolled,
            container_height,
            viewport_height,
        }
    }

    /// Scroll-through progress in `[0, 1]`.
    ///
    /// Degenerate geometry (no scrollable extent, non-finite values) reads as `0`.
    pub fn progress(self) -> f64 {
        let scrollable = self.container_height - self.viewport_height;
        if !scrollable.is_finite() || scrollable <= 0.0 || !self.container_top.is_finite() {
            return 0.0;
        }
        (-self.container_top / scrollable).clamp(0.0, 1.0)
    }
}

/// Un-smoothed frame implied by `progress`.
///
/// Progress is scaled by `speed` and re-clamped, then mapped with a ceiling so any movement past
/// a frame boundary selects the next frame.
pub fn target_frame(range: FrameRange, progress: f64, speed: f64) -> FrameIndex {
    let p = if progress.is_finite() { progress } else { 0.0 };
    let adjusted = (p * speed).clamp(0.0, 1.0);
    let offset = (adjusted * f64::from(range.span())).ceil();
    range.clamp(FrameIndex(range.first.0 + offset as u32))
}

/// One easing step from `displayed` toward `target`.
///
/// Moves by `(target - displayed) / (smoothness * 2)` rounded to the nearest frame, at least one
/// frame while not at the target, and never past the target.
pub fn smooth_step(displayed: FrameIndex, target: FrameIndex, smoothness: f64) -> FrameIndex {
    if displayed == target {
        return displayed;
    }
    let cur = f64::from(displayed.0);
    let diff = f64::from(target.0) - cur;
    let stepped = (cur + diff / (smoothness * 2.0)).round();

    let (lo, hi) = if diff > 0.0 {
        (cur + 1.0, f64::from(target.0))
    } else {
        (f64::from(target.0), cur - 1.0)
    };
    FrameIndex(stepped.clamp(lo, hi) as u32)
}

/// Current playback position of a sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackState {
    /// Frame on screen (or waiting to be drawn).
    pub current: FrameIndex,
    /// Frame implied by the last measured progress.
    pub target: FrameIndex,
    /// Last measured scroll progress, after speed scaling.
    pub progress: f64,
}

/// Converts scroll geometry into a smoothed frame index.
#[derive(Clone, Debug)]
pub struct ScrollMapper {
    range: FrameRange,
    smoothness: f64,
    speed: f64,
    state: PlaybackState,
}

impl ScrollMapper {
    /// Create a mapper resting on `startFrame`.
    pub fn new(cfg: &SequenceConfig) -> ScrollSeqResult<Self> {
        cfg.validate()?;
        let range = cfg.frame_range()?;
        Ok(Self {
            range,
            smoothness: cfg.smoothness,
            speed: cfg.speed,
            state: PlaybackState {
                current: range.first,
                target: range.first,
                progress: 0.0,
            },
        })
    }

    /// Snapshot of the playback state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Frame currently displayed.
    pub fn current(&self) -> FrameIndex {
        self.state.current
    }

    /// Return `true` when the displayed frame has reached the target.
    pub fn is_settled(&self) -> bool {
        self.state.current == self.state.target
    }

    /// Re-measure progress from `geom` and take one easing step.
    ///
    /// Returns the new frame when the displayed frame changed.
    pub fn update(&mut self, geom: ViewportGeometry) -> Option<FrameIndex> {
        let raw = geom.progress();
        self.state.progress = (raw * self.speed).clamp(0.0, 1.0);
        self.state.target = target_frame(self.range, raw, self.speed);
        self.tick()
    }

    /// Take one easing step toward the last target without re-measuring.
    pub fn tick(&mut self) -> Option<FrameIndex> {
        let next = self
            .range
            .clamp(smooth_step(self.state.current, self.state.target, self.smoothness));
        if next == self.state.current {
            return None;
        }
        self.state.current = next;
        Some(next)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/mapper.rs"]
mod tests;
