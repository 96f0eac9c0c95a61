use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Context;

use crate::assets::decode::{DecodedFrame, decode_frame};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ScrollSeqError, ScrollSeqResult};

/// Environment variable overriding the decode worker count of [`ThreadedLoader`].
pub const DECODE_THREADS_ENV: &str = "SCROLLSEQ_DECODE_THREADS";

/// One fire-and-forget request to fetch and decode a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    /// Mount generation that issued the request.
    pub generation: u64,
    /// Frame being requested.
    pub index: FrameIndex,
    /// Derived asset path of the frame.
    pub path: String,
}

/// Completion notification for a [`LoadRequest`].
#[derive(Clone, Debug)]
pub struct LoadEvent {
    /// Generation copied from the request.
    pub generation: u64,
    /// Frame the result belongs to.
    pub index: FrameIndex,
    /// Decoded frame, or a human-readable failure reason.
    pub result: Result<DecodedFrame, String>,
}

impl LoadEvent {
    /// Build an event from a request and its outcome.
    pub fn from_outcome(req: &LoadRequest, outcome: ScrollSeqResult<DecodedFrame>) -> Self {
        Self {
            generation: req.generation,
            index: req.index,
            result: outcome.map_err(|e| format!("{}: {e:#}", req.path)),
        }
    }
}

/// Host-side image loading seam.
///
/// `request` must return immediately; completions surface later through `poll_completed`, in any
/// order across indices.
pub trait FrameLoader {
    /// Start loading a frame. Never blocks on IO or decoding.
    fn request(&mut self, req: LoadRequest);

    /// Drain every completion that has arrived since the last call, without blocking.
    fn poll_completed(&mut self) -> Vec<LoadEvent>;
}

/// Map a derived asset path (which may start with `/`) to a file under `root`.
///
/// The normalized path uses the platform separator, drops `.` segments and rejects `..`.
pub fn resolve_asset_path(root: &Path, asset_path: &str) -> ScrollSeqResult<PathBuf> {
    let s = asset_path.replace('\\', "/");
    let mut out = root.to_path_buf();
    let mut parts = 0usize;
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ScrollSeqError::validation(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
        parts += 1;
    }
    if parts == 0 {
        return Err(ScrollSeqError::validation(
            "asset path must contain a file name",
        ));
    }
    Ok(out)
}

fn read_and_decode(root: &Path, asset_path: &str) -> ScrollSeqResult<DecodedFrame> {
    let path = resolve_asset_path(root, asset_path)?;
    let bytes = std::fs::read(&path)
        .with_context(|| format!("read frame bytes from '{}'", path.display()))?;
    decode_frame(&bytes)
}

/// Loader that reads frames from a directory and decodes them on a rayon pool.
///
/// Completions are funneled through a channel and only become visible when the owning event loop
/// calls [`FrameLoader::poll_completed`], so all store mutation stays on the caller's thread.
pub struct ThreadedLoader {
    root: PathBuf,
    pool: rayon::ThreadPool,
    tx: mpsc::Sender<LoadEvent>,
    rx: mpsc::Receiver<LoadEvent>,
    in_flight: usize,
}

impl ThreadedLoader {
    /// Create a loader rooted at `root`.
    ///
    /// `threads` overrides the worker count; `None` consults [`DECODE_THREADS_ENV`] and falls back
    /// to rayon's default.
    pub fn new(root: impl Into<PathBuf>, threads: Option<usize>) -> ScrollSeqResult<Self> {
        let threads = threads.or_else(|| {
            std::env::var(DECODE_THREADS_ENV)
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|&n| n > 0)
        });

        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("scrollseq-decode-{i}"));
        if let Some(n) = threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .context("build frame decode thread pool")?;

        let (tx, rx) = mpsc::channel();
        Ok(Self {
            root: root.into(),
            pool,
            tx,
            rx,
            in_flight: 0,
        })
    }

    /// Number of requests whose completion has not been drained yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Block for at most `timeout` waiting for the next completion.
    ///
    /// Intended for headless drivers (CLI, tests); an interactive host uses `poll_completed`.
    pub fn wait_next(&mut self, timeout: Duration) -> Option<LoadEvent> {
        let ev = self.rx.recv_timeout(timeout).ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(ev)
    }
}

impl FrameLoader for ThreadedLoader {
    fn request(&mut self, req: LoadRequest) {
        let root = self.root.clone();
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.pool.spawn(move || {
            let outcome = read_and_decode(&root, &req.path);
            // The receiver is gone once the loader is dropped; late results are discarded.
            let _ = tx.send(LoadEvent::from_outcome(&req, outcome));
        });
    }

    fn poll_completed(&mut self) -> Vec<LoadEvent> {
        let out: Vec<LoadEvent> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(out.len());
        out
    }
}

/// Loader driven by the host: requests are recorded and completions are pushed explicitly.
///
/// Useful when bytes arrive through some other transport, and for deterministic tests.
#[derive(Debug, Default)]
pub struct ManualLoader {
    requests: Vec<LoadRequest>,
    completed: Vec<LoadEvent>,
}

impl ManualLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request received so far, in issue order.
    pub fn requests(&self) -> &[LoadRequest] {
        &self.requests
    }

    /// Find the most recent request for `index`.
    pub fn request_for(&self, index: FrameIndex) -> Option<&LoadRequest> {
        self.requests.iter().rev().find(|r| r.index == index)
    }

    /// Queue an already decoded frame as the completion of the latest request for `index`.
    pub fn complete(&mut self, index: FrameIndex, frame: DecodedFrame) -> ScrollSeqResult<()> {
        let req = self.pending_request(index)?;
        self.completed.push(LoadEvent::from_outcome(&req, Ok(frame)));
        Ok(())
    }

    /// Decode `bytes` and queue the outcome (success or failure) for `index`.
    pub fn deliver_bytes(&mut self, index: FrameIndex, bytes: &[u8]) -> ScrollSeqResult<()> {
        let req = self.pending_request(index)?;
        self.completed
            .push(LoadEvent::from_outcome(&req, decode_frame(bytes)));
        Ok(())
    }

    /// Queue a failure for `index`.
    pub fn fail(&mut self, index: FrameIndex, reason: impl Into<String>) -> ScrollSeqResult<()> {
        let req = self.pending_request(index)?;
        self.completed.push(LoadEvent {
            generation: req.generation,
            index,
            result: Err(reason.into()),
        });
        Ok(())
    }

    fn pending_request(&self, index: FrameIndex) -> ScrollSeqResult<LoadRequest> {
        self.request_for(index).cloned().ok_or_else(|| {
            ScrollSeqError::validation(format!("frame {} was never requested", index.0))
        })
    }
}

impl FrameLoader for ManualLoader {
    fn request(&mut self, req: LoadRequest) {
        self.requests.push(req);
    }

    fn poll_completed(&mut self) -> Vec<LoadEvent> {
        std::mem::take(&mut self.completed)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
