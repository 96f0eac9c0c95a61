//! Scroll-driven image-sequence player.
//!
//! A page pins a drawing surface while the reader scrolls through a tall container; the player
//! turns the scroll-through progress into a frame number and paints that frame cover-fit.
//!
//! - Describe the sequence with a [`SequenceConfig`]
//! - [`mount`](ScrollSequencePlayer::mount) a [`ScrollSequencePlayer`] against an [`EventHost`]
//!   and a [`FrameLoader`]
//! - Feed it [`HostEvent`]s and load completions ([`ScrollSequencePlayer::pump`])
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;
mod player;
mod render;
mod scroll;
mod sequence;

pub use crate::assets::decode::{DecodedFrame, MAX_FRAME_DIMENSION, decode_frame};
pub use crate::assets::loader::{
    DECODE_THREADS_ENV, FrameLoader, LoadEvent, LoadRequest, ManualLoader, ThreadedLoader,
    resolve_asset_path,
};
pub use crate::assets::store::{FrameSlot, FrameStore};
pub use crate::foundation::core::{
    Affine, FrameIndex, FrameRange, Rect, Rgba8Premul, SurfaceSize, Vec2,
};
pub use crate::foundation::error::{ScrollSeqError, ScrollSeqResult};
pub use crate::player::lifecycle::{
    EventHost, EventOutcome, HeadlessHost, HostEvent, HostMetrics, ListenerId, ListenerKind,
    PlayerOpts, PlayerStats, ScrollSequencePlayer,
};
pub use crate::render::surface::{CoverFit, FrameRGBA, Surface};
pub use crate::scroll::mapper::{
    PlaybackState, ScrollMapper, ViewportGeometry, smooth_step, target_frame,
};
pub use crate::sequence::config::{MAX_FRAME_NUMBER_PADDING, MAX_TOTAL_FRAMES, SequenceConfig};
