//! Pause-aware elapsed-time tracking for the in-progress turn.
//!
//! The stopwatch owns the two fields that together encode "how long has
//! the current turn been going": a wall-clock anchor set when the clock
//! (re)starts, and the whole seconds banked across earlier pauses.
//! Keeping both behind one type means they can never be updated
//! inconsistently, and elapsed time is always recomputed from the anchor
//! rather than from a count of delivered ticks, so missed or delayed
//! ticks self-correct.

use crate::types::{EpochMillis, Seconds};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stopwatch {
    /// Wall-clock instant the clock last (re)started. None while paused
    /// or before the first turn.
    anchor: Option<EpochMillis>,
    /// Whole seconds accumulated before the most recent pause.
    banked: Seconds,
}

impl Stopwatch {
    /// True while time is accruing against the anchor.
    pub fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    /// Elapsed whole seconds for the current turn. Zero if no turn has
    /// started; the banked total while paused.
    pub fn elapsed_seconds(&self, now: EpochMillis) -> Seconds {
        let live = match self.anchor {
            Some(anchor) => ((now - anchor) / 1000).max(0),
            None => 0,
        };
        self.banked + live
    }

    /// Begin a fresh turn: drop any banked time and anchor at `now`.
    pub fn restart(&mut self, now: EpochMillis) {
        self.anchor = Some(now);
        self.banked = 0;
    }

    /// Bank the elapsed seconds so far and stop accruing.
    /// No-op if already paused.
    pub fn pause(&mut self, now: EpochMillis) {
        if self.anchor.is_some() {
            self.banked = self.elapsed_seconds(now);
            self.anchor = None;
        }
    }

    /// Re-anchor at `now`, keeping the banked total. No-op if running.
    pub fn resume(&mut self, now: EpochMillis) {
        if self.anchor.is_none() {
            self.anchor = Some(now);
        }
    }

    /// Back to the pre-game state: nothing banked, nothing running.
    pub fn clear(&mut self) {
        self.anchor = None;
        self.banked = 0;
    }
}
