use crate::foundation::error::{ScrollSeqError, ScrollSeqResult};

pub use kurbo::{Affine, Rect, Vec2};

/// Frame number as it appears in asset file names (1-based by convention).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u32);

/// Inclusive frame range `[first, last]`.
///
/// Unlike a timeline range this is never empty: a sequence always has at least one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Lowest valid frame.
    pub first: FrameIndex,
    /// Highest valid frame (inclusive).
    pub last: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `first <= last`.
    pub fn new(first: FrameIndex, last: FrameIndex) -> ScrollSeqResult<Self> {
        if first.0 > last.0 {
            return Err(ScrollSeqError::validation(
                "frame range first must be <= last",
            ));
        }
        Ok(Self { first, last })
    }

    /// Number of frames in the range.
    pub fn frame_count(self) -> usize {
        (self.last.0 - self.first.0) as usize + 1
    }

    /// Distance from `first` to `last` in frames.
    pub fn span(self) -> u32 {
        self.last.0 - self.first.0
    }

    /// Return `true` when `f` is inside `[first, last]`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.first.0 <= f.0 && f.0 <= self.last.0
    }

    /// Clamp a frame index into this range.
    pub fn clamp(self, f: FrameIndex) -> FrameIndex {
        FrameIndex(f.0.clamp(self.first.0, self.last.0))
    }

    /// Zero-based slot of `f` inside the range, if it is contained.
    pub fn slot_of(self, f: FrameIndex) -> Option<usize> {
        self.contains(f).then(|| (f.0 - self.first.0) as usize)
    }

    /// Iterate every frame in ascending order.
    pub fn iter(self) -> impl Iterator<Item = FrameIndex> {
        (self.first.0..=self.last.0).map(FrameIndex)
    }
}

/// Pixel size of a drawing surface.
///
/// Kept in sync with the host container's rendered box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceSize {
    /// Construct a size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Return `true` when either side is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channels as `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
