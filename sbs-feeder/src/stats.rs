//! Per-station counters, shared between a connector and the display layer.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct StationStats {
    /// Non-blank records read.
    pub lines: AtomicU64,
    pub parsed: AtomicU64,
    pub parse_errors: AtomicU64,
    pub connect_attempts: AtomicU64,
    /// Successful connections after the first.
    pub reconnects: AtomicU64,
    pub connected: AtomicBool,
}

/// Point-in-time copy of `StationStats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub lines: u64,
    pub parsed: u64,
    pub parse_errors: u64,
    pub connect_attempts: u64,
    pub reconnects: u64,
    pub connected: bool,
}

impl StationStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            lines: self.lines.load(Ordering::Relaxed),
            parsed: self.parsed.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            connect_attempts: self.connect_attempts.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
            connected: self.connected.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
