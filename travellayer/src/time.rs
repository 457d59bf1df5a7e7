//! Wall-clock abstraction for expiry decisions.
//!
//! Stored records carry epoch-millisecond timestamps; reading them through a
//! [`Clock`] seam keeps expiry logic testable without sleeping.

use std::sync::Mutex;

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually advanced clock for tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<i64>,
}

impl ManualClock {
    pub fn at(now_ms: i64) -> Self {
        Self {
            now: Mutex::new(now_ms),
        }
    }

    pub fn advance(&self, delta_ms: i64) {
        *self.now.lock().unwrap() += delta_ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        *self.now.lock().unwrap()
    }
}
