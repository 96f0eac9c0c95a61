use std::collections::BTreeMap;

use crate::assets::loader::{FrameLoader, LoadEvent};
use crate::assets::store::FrameStore;
use crate::foundation::core::{FrameIndex, SurfaceSize};
use crate::foundation::error::ScrollSeqResult;
use crate::render::surface::Surface;
use crate::scroll::mapper::{PlaybackState, ScrollMapper, ViewportGeometry};
use crate::sequence::config::SequenceConfig;

/// Host notifications the player subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerKind {
    /// Viewport scrolled.
    Scroll,
    /// Viewport or container resized.
    Resize,
    /// The host is about to paint (one callback per display frame).
    AnimationFrame,
}

/// Handle returned by [`EventHost::listen`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Host-environment seam for attaching and detaching event listeners.
pub trait EventHost {
    /// Subscribe to `kind`; events are later delivered through
    /// [`ScrollSequencePlayer::handle_event`].
    fn listen(&mut self, kind: ListenerKind) -> ListenerId;

    /// Remove a subscription. Unknown ids are ignored.
    fn unlisten(&mut self, id: ListenerId);
}

/// [`EventHost`] that only keeps track of live subscriptions.
///
/// Suitable for headless drivers that feed events by hand.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    next_id: u64,
    active: BTreeMap<ListenerId, ListenerKind>,
}

impl HeadlessHost {
    /// Create a host with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions of `kind`.
    pub fn active(&self, kind: ListenerKind) -> usize {
        self.active.values().filter(|k| **k == kind).count()
    }

    /// Number of live subscriptions of any kind.
    pub fn active_total(&self) -> usize {
        self.active.len()
    }
}

impl EventHost for HeadlessHost {
    fn listen(&mut self, kind: ListenerKind) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.active.insert(id, kind);
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.active.remove(&id);
    }
}

/// Host measurements taken at mount and on resize.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HostMetrics {
    /// Container and viewport geometry.
    pub geometry: ViewportGeometry,
    /// Rendered box of the element hosting the surface.
    pub surface_box: SurfaceSize,
}

/// Event delivered by the host to a mounted player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    /// Viewport scrolled; carries fresh geometry.
    Scroll(ViewportGeometry),
    /// Viewport or container resized.
    Resize(HostMetrics),
    /// Display tick; advances easing toward the last measured target.
    AnimationFrame,
}

/// Options that are not part of the sequence identity.
#[derive(Clone, Debug)]
pub struct PlayerOpts {
    /// Straight-alpha colour the surface is cleared to before each paint.
    pub clear_rgba: [u8; 4],
    /// Record scroll geometry and map it on the next animation frame instead of immediately.
    pub coalesce_scroll: bool,
}

impl Default for PlayerOpts {
    fn default() -> Self {
        Self {
            clear_rgba: [0, 0, 0, 255],
            coalesce_scroll: false,
        }
    }
}

/// Counters accumulated over the player's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerStats {
    /// Scroll-to-frame mapping passes (measurements and easing ticks).
    pub mapper_passes: u64,
    /// Passes that changed the displayed frame.
    pub frame_changes: u64,
    /// Paints that reached the surface.
    pub redraws: u64,
    /// Paints skipped because the frame was not ready.
    pub deferred_draws: u64,
    /// Frames that failed to load.
    pub decode_failures: u64,
}

/// What handling one event did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// New displayed frame, when it changed.
    pub frame_changed: Option<FrameIndex>,
    /// Whether the surface was repainted.
    pub redrawn: bool,
}

struct Mounted {
    config: SequenceConfig,
    store: FrameStore,
    mapper: ScrollMapper,
    surface: Surface,
    geometry: ViewportGeometry,
    listeners: Vec<ListenerId>,
    scroll_pending: bool,
}

/// Scroll-driven image-sequence player.
///
/// The player owns all per-mount state (frames, playback position, surface). Everything is
/// created by [`mount`](Self::mount) and released by [`unmount`](Self::unmount); events and load
/// completions arriving while unmounted, or belonging to an earlier mount, have no effect.
pub struct ScrollSequencePlayer {
    opts: PlayerOpts,
    generation: u64,
    mounted: Option<Mounted>,
    stats: PlayerStats,
}

impl ScrollSequencePlayer {
    /// Create an unmounted player.
    pub fn new(opts: PlayerOpts) -> Self {
        Self {
            opts,
            generation: 0,
            mounted: None,
            stats: PlayerStats::default(),
        }
    }

    /// Mount `config`: size the surface, request every frame, subscribe to the host and map the
    /// current scroll position once.
    ///
    /// An existing mount is torn down first, so its listeners are gone before new ones attach.
    pub fn mount(
        &mut self,
        config: SequenceConfig,
        metrics: HostMetrics,
        host: &mut dyn EventHost,
        loader: &mut dyn FrameLoader,
    ) -> ScrollSeqResult<()> {
        let generation = self.generation + 1;
        let mut store = FrameStore::new(&config, generation)?;
        let mapper = ScrollMapper::new(&config)?;
        let mut surface = Surface::new(self.opts.clear_rgba);
        surface.resize(metrics.surface_box)?;

        self.unmount(host);
        self.generation = generation;

        tracing::debug!(
            generation,
            first = config.start_frame,
            last = config.total_frames,
            "mounting sequence"
        );
        store.request_all(loader);

        let listeners = vec![
            host.listen(ListenerKind::Scroll),
            host.listen(ListenerKind::Resize),
            host.listen(ListenerKind::AnimationFrame),
        ];

        let mut m = Mounted {
            config,
            store,
            mapper,
            surface,
            geometry: metrics.geometry,
            listeners,
            scroll_pending: false,
        };
        let geometry = m.geometry;
        Self::map_pass(&mut m, &mut self.stats, Some(geometry))?;
        self.mounted = Some(m);
        Ok(())
    }

    /// Mount `config` unless it equals the mounted one. Returns `true` when a (re)mount happened.
    pub fn reconfigure(
        &mut self,
        config: SequenceConfig,
        metrics: HostMetrics,
        host: &mut dyn EventHost,
        loader: &mut dyn FrameLoader,
    ) -> ScrollSeqResult<bool> {
        if self.mounted.as_ref().is_some_and(|m| m.config == config) {
            return Ok(false);
        }
        self.mount(config, metrics, host, loader)?;
        Ok(true)
    }

    /// Detach every listener and release all per-mount state. No-op when unmounted.
    pub fn unmount(&mut self, host: &mut dyn EventHost) {
        let Some(mut m) = self.mounted.take() else {
            return;
        };
        for id in m.listeners.drain(..) {
            host.unlisten(id);
        }
        m.surface.release();
        tracing::debug!(generation = self.generation, "unmounted sequence");
    }

    /// Handle a host event. Ignored when unmounted.
    pub fn handle_event(&mut self, ev: HostEvent) -> ScrollSeqResult<EventOutcome> {
        let coalesce = self.opts.coalesce_scroll;
        let Some(m) = self.mounted.as_mut() else {
            return Ok(EventOutcome::default());
        };

        match ev {
            HostEvent::Scroll(geometry) => {
                m.geometry = geometry;
                if coalesce {
                    m.scroll_pending = true;
                    return Ok(EventOutcome::default());
                }
                Self::map_pass(m, &mut self.stats, Some(geometry))
            }
            HostEvent::Resize(metrics) => {
                m.geometry = metrics.geometry;
                m.scroll_pending = false;
                let mut outcome = EventOutcome::default();
                if m.surface.resize(metrics.surface_box)? {
                    outcome.redrawn = Self::repaint_visible(m, &mut self.stats)?;
                }
                let mapped = Self::map_pass(m, &mut self.stats, Some(metrics.geometry))?;
                outcome.frame_changed = mapped.frame_changed;
                outcome.redrawn |= mapped.redrawn;
                Ok(outcome)
            }
            HostEvent::AnimationFrame => {
                let geometry = std::mem::take(&mut m.scroll_pending).then_some(m.geometry);
                Self::map_pass(m, &mut self.stats, geometry)
            }
        }
    }

    /// Apply one load completion. Paints when it makes the displayed frame drawable.
    pub fn on_load_event(&mut self, ev: LoadEvent) -> ScrollSeqResult<bool> {
        let Some(m) = self.mounted.as_mut() else {
            return Ok(false);
        };
        let Some(index) = m.store.apply(ev) else {
            return Ok(false);
        };
        if m.store.is_failed(index) {
            self.stats.decode_failures += 1;
            return Ok(false);
        }
        if index != m.mapper.current() || m.surface.last_drawn() == Some(index) {
            return Ok(false);
        }
        Self::redraw(m, &mut self.stats)
    }

    /// Drain `loader` and apply every completion. Returns how many were received.
    ///
    /// Every drained completion is applied even when painting one of them fails; the first such
    /// error is returned afterwards.
    pub fn pump(&mut self, loader: &mut dyn FrameLoader) -> ScrollSeqResult<usize> {
        let events = loader.poll_completed();
        let n = events.len();
        let mut first_err = None;
        for ev in events {
            if let Err(e) = self.on_load_event(ev) {
                tracing::warn!(error = %e, "painting a loaded frame failed");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(n),
        }
    }

    /// Return `true` while mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Generation of the current (or last) mount.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Mounted configuration.
    pub fn config(&self) -> Option<&SequenceConfig> {
        self.mounted.as_ref().map(|m| &m.config)
    }

    /// Displayed frame.
    pub fn current_frame(&self) -> Option<FrameIndex> {
        self.mounted.as_ref().map(|m| m.mapper.current())
    }

    /// Playback state snapshot.
    pub fn playback(&self) -> Option<PlaybackState> {
        self.mounted.as_ref().map(|m| m.mapper.state())
    }

    /// Return `true` while the displayed frame still has to ease toward its target, or a
    /// coalesced scroll is waiting to be mapped.
    pub fn needs_tick(&self) -> bool {
        self.mounted
            .as_ref()
            .is_some_and(|m| m.scroll_pending || !m.mapper.is_settled())
    }

    /// Whole-number share of frames decoded (`0..=100`); `0` when unmounted.
    pub fn loading_percent(&self) -> u8 {
        self.mounted
            .as_ref()
            .map_or(0, |m| m.store.loaded_percent())
    }

    /// Frame store of the current mount.
    pub fn store(&self) -> Option<&FrameStore> {
        self.mounted.as_ref().map(|m| &m.store)
    }

    /// Drawing surface of the current mount.
    pub fn surface(&self) -> Option<&Surface> {
        self.mounted.as_ref().map(|m| &m.surface)
    }

    /// Lifetime counters.
    pub fn stats(&self) -> PlayerStats {
        self.stats
    }

    fn map_pass(
        m: &mut Mounted,
        stats: &mut PlayerStats,
        geometry: Option<ViewportGeometry>,
    ) -> ScrollSeqResult<EventOutcome> {
        stats.mapper_passes += 1;
        let changed = match geometry {
            Some(g) => m.mapper.update(g),
            None => m.mapper.tick(),
        };
        let Some(frame) = changed else {
            return Ok(EventOutcome::default());
        };
        stats.frame_changes += 1;
        tracing::trace!(frame = frame.0, "frame changed");
        let redrawn = Self::redraw(m, stats)?;
        Ok(EventOutcome {
            frame_changed: Some(frame),
            redrawn,
        })
    }

    fn redraw(m: &mut Mounted, stats: &mut PlayerStats) -> ScrollSeqResult<bool> {
        let current = m.mapper.current();
        let Some(frame) = m.store.frame(current) else {
            stats.deferred_draws += 1;
            return Ok(false);
        };
        let drawn = m.surface.draw(current, frame)?;
        if drawn {
            stats.redraws += 1;
        }
        Ok(drawn)
    }

    /// Repaint after the surface lost its pixels: the displayed frame when ready, otherwise the
    /// frame that was on screen before.
    fn repaint_visible(m: &mut Mounted, stats: &mut PlayerStats) -> ScrollSeqResult<bool> {
        let current = m.mapper.current();
        let index = if m.store.is_ready(current) {
            current
        } else {
            match m.surface.last_drawn() {
                Some(prev) => prev,
                None => {
                    stats.deferred_draws += 1;
                    return Ok(false);
                }
            }
        };
        let Some(frame) = m.store.frame(index) else {
            return Ok(false);
        };
        let drawn = m.surface.draw(index, frame)?;
        if drawn {
            stats.redraws += 1;
        }
        Ok(drawn)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/lifecycle.rs"]
mod tests;
