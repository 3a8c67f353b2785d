//! Player records and the cosmetic color palette.

use crate::types::{PlayerId, Seconds};
use serde::{Deserialize, Serialize};

/// Starting time bank per player, applied at roster creation and reset.
pub const DEFAULT_INITIAL_TIME: Seconds = 600; // 10 minutes

/// Cosmetic card color. No gameplay meaning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Blue,
    Green,
    Purple,
    Orange,
    Red,
    Indigo,
    Pink,
    Teal,
}

impl Color {
    pub const PALETTE: [Color; 8] = [
        Color::Blue,
        Color::Green,
        Color::Purple,
        Color::Orange,
        Color::Red,
        Color::Indigo,
        Color::Pink,
        Color::Teal,
    ];
}

/// One seat at the table. Mutated only by the engine's command methods.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Remaining time bank in seconds. Clamped at zero on every
    /// mutation; reaching zero does not eliminate the player.
    pub time_remaining: Seconds,
    /// Sum of (60 - turn seconds) over all completed turns.
    pub total_efficiency: Seconds,
    /// Same formula, scoped to the in-progress turn. Recomputed every
    /// tick while this player is active.
    pub current_turn_efficiency: Seconds,
    pub turns_completed: u32,
    pub is_active: bool,
    pub color: Color,
    /// Set while the active player has declared their last turn of the
    /// round. Never true on an inactive player.
    pub is_revealing: bool,
    /// Set once the player has exited the current round via a reveal
    /// turn. Cleared for everyone at round end.
    pub is_out_of_round: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, color: Color, time: Seconds) -> Self {
        Self {
            id,
            name: name.into(),
            time_remaining: time,
            total_efficiency: 0,
            current_turn_efficiency: 0,
            turns_completed: 0,
            is_active: false,
            color,
            is_revealing: false,
            is_out_of_round: false,
        }
    }

    /// Take this player off the clock. Always clears the reveal marker:
    /// a revealing flag must never survive on an inactive player.
    pub(crate) fn deactivate(&mut self) {
        self.is_active = false;
        self.is_revealing = false;
    }

    /// Put this player on the clock with a fresh turn score.
    pub(crate) fn activate(&mut self) {
        self.is_active = true;
        self.current_turn_efficiency = 0;
        self.is_revealing = false;
    }
}
