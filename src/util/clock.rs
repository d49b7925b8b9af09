//! Clock sources.
//!
//! The scheduling core never reads a clock on its own; every operation takes the current
//! time in milliseconds since the Unix epoch. Callers obtain that value from a [`Clock`],
//! which lets tests drive priority decay deterministically with a [`ManualClock`].

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Milliseconds in one minute.
pub const MS_PER_MINUTE: u128 = 60_000;
/// Milliseconds in one hour.
pub const MS_PER_HOUR: u128 = 3_600_000;

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Source of "now" for the layers that sit around the scheduler.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u128;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u128 {
        now_ms()
    }
}

/// Manually advanced clock for tests and simulations.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    current: Arc<Mutex<u128>>,
}

impl ManualClock {
    /// Create a clock frozen at `start_ms`.
    #[must_use]
    pub fn new(start_ms: u128) -> Self {
        Self {
            current: Arc::new(Mutex::new(start_ms)),
        }
    }

    /// Move the clock forward by `delta_ms`.
    pub fn advance(&self, delta_ms: u128) {
        *self.current.lock() += delta_ms;
    }

    /// Jump to an absolute time.
    pub fn set(&self, at_ms: u128) {
        *self.current.lock() = at_ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u128 {
        *self.current.lock()
    }
}
