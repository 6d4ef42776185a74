//! Per-download progress counters and the sink that renders them.

use serde::Serialize;

/// Counters for one download. Owned by the download in flight; never shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressState {
    /// Bytes received so far.
    pub received: u64,
    /// Declared body size (`Content-Length`), if the server sent one.
    pub total: Option<u64>,
    /// Chunks received so far (the only measure when `total` is unknown).
    pub chunks: u64,
}

impl ProgressState {
    pub fn new(total: Option<u64>) -> Self {
        Self {
            received: 0,
            total,
            chunks: 0,
        }
    }

    /// Bytes still allowed before the declared total is exceeded.
    pub fn remaining(&self) -> Option<u64> {
        self.total.map(|t| t.saturating_sub(self.received))
    }

    /// Record one received chunk. Callers check [`remaining`](Self::remaining) first,
    /// so `received` never passes a known total.
    pub fn record(&mut self, len: usize) {
        self.received += len as u64;
        self.chunks += 1;
    }

    /// Whole percent complete in `0..=100`, or `None` when the total is unknown.
    pub fn percent(&self) -> Option<u8> {
        let total = self.total?;
        if total == 0 {
            return Some(100);
        }
        let pct = (self.received.min(total) as u128 * 100) / total as u128;
        Some(pct as u8)
    }

    /// Fraction complete in [0.0, 1.0], or `None` when the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        let total = self.total?;
        if total == 0 {
            return Some(1.0);
        }
        Some((self.received as f64 / total as f64).min(1.0))
    }
}

/// Receives progress events for one download at a time.
pub trait ProgressSink {
    /// A 2xx response arrived and `name` is about to be written.
    fn on_start(&mut self, _name: &str, _state: &ProgressState) {}

    /// A chunk was written.
    fn on_progress(&mut self, state: &ProgressState);

    /// The download ended; `ok` is false when it failed after starting.
    fn on_finish(&mut self, _name: &str, _state: &ProgressState, _ok: bool) {}
}

/// Discards all progress events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _state: &ProgressState) {}
}
