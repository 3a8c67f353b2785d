//! Wall-clock abstraction.
//!
//! RULE: Nothing in the engine reads platform time directly.
//! All time flows through a WallClock handed in at construction,
//! so tests and replay tooling can drive the engine on a manual clock.

use crate::types::EpochMillis;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

/// A monotonic-enough source of wall time in epoch milliseconds.
pub trait WallClock: Send {
    fn now_millis(&self) -> EpochMillis;
}

/// Production clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_millis(&self) -> EpochMillis {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Hand-cranked clock for tests and deterministic replay.
/// Clones share the same underlying instant, so a test can keep
/// one handle while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(millis: EpochMillis) -> Self {
        let clock = Self::new();
        clock.set(millis);
        clock
    }

    pub fn set(&self, millis: EpochMillis) {
        self.now.store(millis, Ordering::SeqCst);
    }

    pub fn advance_millis(&self, millis: EpochMillis) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance_millis(secs * 1000);
    }
}

impl WallClock for ManualClock {
    fn now_millis(&self) -> EpochMillis {
        self.now.load(Ordering::SeqCst)
    }
}
