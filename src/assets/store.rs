use crate::assets::decode::DecodedFrame;
use crate::assets::loader::{FrameLoader, LoadEvent, LoadRequest};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::ScrollSeqResult;
use crate::sequence::config::SequenceConfig;

/// Load state of a single frame.
#[derive(Clone, Debug)]
pub enum FrameSlot {
    /// Not requested yet.
    Idle,
    /// Requested, no completion received.
    Pending,
    /// Decoded and drawable.
    Ready(DecodedFrame),
    /// Load or decode failed; the frame stays not-ready for the rest of the mount.
    Failed(String),
}

impl FrameSlot {
    /// Return `true` for [`FrameSlot::Ready`].
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Owns one slot per frame of a sequence and tracks load completion.
///
/// Loaded frames are never evicted: the set is bounded by the sequence length.
#[derive(Debug)]
pub struct FrameStore {
    range: FrameRange,
    generation: u64,
    paths: Vec<String>,
    slots: Vec<FrameSlot>,
    requested: bool,
    ready: usize,
    failed: usize,
}

impl FrameStore {
    /// Build an idle store for `cfg`; `generation` tags every request issued from it.
    pub fn new(cfg: &SequenceConfig, generation: u64) -> ScrollSeqResult<Self> {
        cfg.validate()?;
        let range = cfg.frame_range()?;
        let paths: Vec<String> = range.iter().map(|f| cfg.frame_path(f)).collect();
        let slots = vec![FrameSlot::Idle; range.frame_count()];
        Ok(Self {
            range,
            generation,
            paths,
            slots,
            requested: false,
            ready: 0,
            failed: 0,
        })
    }

    /// Frame range covered by the store.
    pub fn range(&self) -> FrameRange {
        self.range
    }

    /// Generation this store accepts completions for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Issue one request per frame. Subsequent calls are no-ops.
    #[tracing::instrument(skip_all)]
    pub fn request_all(&mut self, loader: &mut dyn FrameLoader) {
        if self.requested {
            return;
        }
        self.requested = true;
        tracing::debug!(
            frames = self.slots.len(),
            generation = self.generation,
            "requesting frames"
        );
        for (i, frame) in self.range.iter().enumerate() {
            self.slots[i] = FrameSlot::Pending;
            loader.request(LoadRequest {
                generation: self.generation,
                index: frame,
                path: self.paths[i].clone(),
            });
        }
    }

    /// Apply a completion. Returns the frame index when the slot changed state.
    ///
    /// Events from another generation, for unknown indices, or for already settled slots are
    /// ignored. A decoded frame that cannot be painted settles the slot as failed.
    pub fn apply(&mut self, ev: LoadEvent) -> Option<FrameIndex> {
        if ev.generation != self.generation {
            tracing::trace!(
                index = ev.index.0,
                generation = ev.generation,
                "dropping stale frame completion"
            );
            return None;
        }
        let slot = self.range.slot_of(ev.index)?;
        if !matches!(self.slots[slot], FrameSlot::Pending) {
            return None;
        }

        let result = ev.result.and_then(|frame| match frame.check_drawable() {
            Ok(()) => Ok(frame),
            Err(e) => Err(format!("{}: {e}", self.paths[slot])),
        });
        self.slots[slot] = match result {
            Ok(frame) => {
                self.ready += 1;
                tracing::trace!(
                    index = ev.index.0,
                    w = frame.width,
                    h = frame.height,
                    "frame ready"
                );
                FrameSlot::Ready(frame)
            }
            Err(reason) => {
                self.failed += 1;
                tracing::warn!(index = ev.index.0, %reason, "frame failed to load");
                FrameSlot::Failed(reason)
            }
        };
        Some(ev.index)
    }

    /// Slot state for `index`, `None` when out of range.
    pub fn slot(&self, index: FrameIndex) -> Option<&FrameSlot> {
        self.range.slot_of(index).map(|i| &self.slots[i])
    }

    /// Return `true` when `index` is decoded and drawable.
    pub fn is_ready(&self, index: FrameIndex) -> bool {
        self.slot(index).is_some_and(FrameSlot::is_ready)
    }

    /// Drawable frame for `index`, if ready.
    pub fn frame(&self, index: FrameIndex) -> Option<&DecodedFrame> {
        match self.slot(index)? {
            FrameSlot::Ready(f) => Some(f),
            _ => None,
        }
    }

    /// Return `true` when `index` failed to load.
    pub fn is_failed(&self, index: FrameIndex) -> bool {
        matches!(self.slot(index), Some(FrameSlot::Failed(_)))
    }

    /// Asset path requested for `index`.
    pub fn path(&self, index: FrameIndex) -> Option<&str> {
        self.range.slot_of(index).map(|i| self.paths[i].as_str())
    }

    /// Number of frames decoded successfully.
    pub fn ready_count(&self) -> usize {
        self.ready
    }

    /// Number of frames that failed.
    pub fn failed_count(&self) -> usize {
        self.failed
    }

    /// Whole-number share of frames decoded, rounded down (`0..=100`).
    pub fn loaded_percent(&self) -> u8 {
        ((self.ready * 100) / self.slots.len()) as u8
    }

    /// Return `true` once every frame is decoded.
    pub fn is_fully_loaded(&self) -> bool {
        self.ready == self.slots.len()
    }

    /// Return `true` once every frame has either loaded or failed.
    pub fn is_settled(&self) -> bool {
        self.ready + self.failed == self.slots.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
