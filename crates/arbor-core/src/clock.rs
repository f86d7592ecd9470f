//! Ledger clock - explicit transactional time
//!
//! The engine never reads wall-clock time mid-operation. Time is a piece of
//! ledger state that the embedder advances; deadlines and expiries are
//! compared against it. This keeps every operation deterministic and
//! replayable.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Ledger time source, in whole seconds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerClock {
    now_secs: u64,
}

impl LedgerClock {
    /// Create a clock starting at the given Unix timestamp
    pub fn starting_at(now_secs: u64) -> Self {
        Self { now_secs }
    }

    /// Create a clock seeded from the host's wall clock.
    ///
    /// Only used at bootstrap; from then on the clock advances explicitly.
    pub fn from_system_time() -> Self {
        let now_secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self { now_secs }
    }

    /// Current ledger time
    pub fn now(&self) -> u64 {
        self.now_secs
    }

    /// Advance time by `secs`
    pub fn advance(&mut self, secs: u64) -> u64 {
        self.now_secs = self.now_secs.saturating_add(secs);
        self.now_secs
    }

    /// Jump to an absolute timestamp; never moves backwards
    pub fn set(&mut self, now_secs: u64) -> u64 {
        self.now_secs = self.now_secs.max(now_secs);
        self.now_secs
    }
}

impl Default for LedgerClock {
    fn default() -> Self {
        Self { now_secs: 0 }
    }
}

/// Thread-shared clock handle for embedders that poll time from several
/// places while the engine mutates it
#[derive(Clone)]
pub struct SharedClock {
    inner: Arc<parking_lot::Mutex<LedgerClock>>,
}

impl SharedClock {
    /// Wrap a clock for sharing
    pub fn new(clock: LedgerClock) -> Self {
        Self {
            inner: Arc::new(parking_lot::Mutex::new(clock)),
        }
    }

    /// Current ledger time
    pub fn now(&self) -> u64 {
        self.inner.lock().now()
    }

    /// Advance and return the new time
    pub fn advance(&self, secs: u64) -> u64 {
        self.inner.lock().advance(secs)
    }

    /// Snapshot of the underlying clock
    pub fn snapshot(&self) -> LedgerClock {
        *self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advance() {
        let mut clock = LedgerClock::starting_at(1_000);
        assert_eq!(clock.now(), 1_000);
        clock.advance(500);
        assert_eq!(clock.now(), 1_500);
    }

    #[test]
    fn test_clock_never_rewinds() {
        let mut clock = LedgerClock::starting_at(1_000);
        clock.set(400);
        assert_eq!(clock.now(), 1_000);
        clock.set(2_000);
        assert_eq!(clock.now(), 2_000);
    }

    #[test]
    fn test_shared_clock() {
        let shared = SharedClock::new(LedgerClock::starting_at(10));
        let other = shared.clone();
        shared.advance(5);
        assert_eq!(other.now(), 15);
    }
}
