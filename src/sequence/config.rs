use std::path::Path;

use anyhow::Context;

use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{ScrollSeqError, ScrollSeqResult};

/// Largest accepted `totalFrames`. Every frame is decoded and kept for the whole mount.
pub const MAX_TOTAL_FRAMES: u32 = 100_000;

/// Largest accepted `frameNumberPadding` (digit count of `u32::MAX`).
pub const MAX_FRAME_NUMBER_PADDING: usize = 10;

/// Immutable description of one image sequence.
///
/// Field names serialize in camelCase so a JSON config reads like the option table a page author
/// works from (`totalFrames`, `baseUrl`, ...). Every field is optional and falls back to
/// [`SequenceConfig::default`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SequenceConfig {
    /// Highest frame index (inclusive).
    pub total_frames: u32,
    /// Lowest frame index and the frame shown before any scroll.
    pub start_frame: u32,
    /// Height of the scroll-through region in viewport-height percent (`500` = five screens).
    pub scroll_height: f64,
    /// Root path of the frame assets, without trailing separator.
    pub base_url: String,
    /// File name prefix before the frame number.
    pub frame_prefix: String,
    /// File name suffix, including the dot.
    pub frame_extension: String,
    /// Minimum digit count of the frame number; shorter numbers are zero-padded.
    pub frame_number_padding: usize,
    /// Easing divisor. Larger values converge more slowly.
    pub smoothness: f64,
    /// Scroll progress multiplier.
    pub speed: f64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            total_frames: 99,
            start_frame: 1,
            scroll_height: 500.0,
            base_url: "/sequence".to_string(),
            frame_prefix: "frame-".to_string(),
            frame_extension: ".jpg".to_string(),
            frame_number_padding: 1,
            smoothness: 1.0,
            speed: 1.0,
        }
    }
}

impl SequenceConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(s: &str) -> ScrollSeqResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| ScrollSeqError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ScrollSeqResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read sequence config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Check the invariants the player relies on.
    pub fn validate(&self) -> ScrollSeqResult<()> {
        if self.total_frames == 0 {
            return Err(ScrollSeqError::validation("totalFrames must be >= 1"));
        }
        if self.total_frames > MAX_TOTAL_FRAMES {
            return Err(ScrollSeqError::validation(format!(
                "totalFrames must be <= {MAX_TOTAL_FRAMES}"
            )));
        }
        if self.frame_number_padding > MAX_FRAME_NUMBER_PADDING {
            return Err(ScrollSeqError::validation(format!(
                "frameNumberPadding must be <= {MAX_FRAME_NUMBER_PADDING}"
            )));
        }
        if self.total_frames < self.start_frame {
            return Err(ScrollSeqError::validation(format!(
                "totalFrames ({}) must be >= startFrame ({})",
                self.total_frames, self.start_frame
            )));
        }
        if !self.smoothness.is_finite() || self.smoothness <= 0.0 {
            return Err(ScrollSeqError::validation(
                "smoothness must be finite and > 0",
            ));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(ScrollSeqError::validation("speed must be finite and > 0"));
        }
        if !self.scroll_height.is_finite() || self.scroll_height <= 0.0 {
            return Err(ScrollSeqError::validation(
                "scrollHeight must be finite and > 0",
            ));
        }
        if self.frame_extension.is_empty() {
            return Err(ScrollSeqError::validation(
                "frameExtension must be non-empty",
            ));
        }
        Ok(())
    }

    /// Valid frame range `[startFrame, totalFrames]`.
    pub fn frame_range(&self) -> ScrollSeqResult<FrameRange> {
        FrameRange::new(FrameIndex(self.start_frame), FrameIndex(self.total_frames))
    }

    /// Asset path for `index`: `{baseUrl}/{framePrefix}{index padded}{frameExtension}`.
    ///
    /// Deployed assets must be named to match this exactly.
    pub fn frame_path(&self, index: FrameIndex) -> String {
        format!(
            "{}/{}{:0width$}{}",
            self.base_url,
            self.frame_prefix,
            index.0,
            self.frame_extension,
            width = self.frame_number_padding
        )
    }

    /// Pixel height of the scroll-through container for a given viewport height.
    pub fn container_height_for(&self, viewport_height: f64) -> f64 {
        viewport_height * self.scroll_height / 100.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/config.rs"]
mod tests;
