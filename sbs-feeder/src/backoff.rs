//! Reconnect timing for station connectors.
//!
//! Exponential backoff (multiplier 2) from an initial delay up to a cap, with
//! random jitter so that stations dropped together don't reconnect in
//! lockstep. Optionally bounded by a number of consecutive failed attempts.

use std::time::Duration;

use rand::Rng;

use sbs_core::config::ReconnectConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial: Duration,
    pub max: Duration,
    /// Consecutive failed connects before giving up. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::from_config(&ReconnectConfig::default())
    }
}

impl ReconnectPolicy {
    pub fn from_config(config: &ReconnectConfig) -> Self {
        ReconnectPolicy {
            initial: Duration::from_millis(config.initial_ms),
            max: Duration::from_millis(config.max_ms.max(config.initial_ms)),
            max_attempts: config.max_attempts,
        }
    }

    /// Delay before the next attempt, without jitter.
    ///
    /// `failures` is the number of consecutive failed attempts so far; zero
    /// after a connection that was established and then lost.
    pub fn base_delay(&self, failures: u32) -> Duration {
        let initial = self.initial.as_millis() as u64;
        let ms = initial.saturating_mul(1u64 << failures.min(32));
        Duration::from_millis(ms).min(self.max)
    }

    /// Delay before the next attempt: somewhere in the upper half of
    /// `base_delay`.
    pub fn delay(&self, failures: u32) -> Duration {
        let base = self.base_delay(failures).as_millis() as u64;
        let half = base / 2;
        let jitter = if half > 0 {
            rand::rng().random_range(0..=half)
        } else {
            0
        };
        Duration::from_millis(base - half + jitter)
    }

    pub fn exhausted(&self, failures: u32) -> bool {
        self.max_attempts.is_some_and(|max| failures >= max)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
