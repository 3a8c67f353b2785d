//! Finished-match handoff to the leaderboard collaborator.
//!
//! This is a contract boundary, not part of the timer state machine.
//! The shell assembles an ordered result list when a user logs a
//! completed game; the engine is never involved. The only logic that
//! lives here is the ranking validation both sides rely on.

use crate::error::{TimerError, TimerResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One player's final standing, plus an optional bag of per-variant
/// stat fields (victory points, resources, whatever the game tracks).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub player_name: String,
    /// Final rank, 1 = winner. Ranks across a match are unique and
    /// consecutive starting at 1.
    pub rank: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stats: BTreeMap<String, serde_json::Value>,
}

impl MatchResult {
    pub fn new(player_name: impl Into<String>, rank: u32) -> Self {
        Self {
            player_name: player_name.into(),
            rank,
            stats: BTreeMap::new(),
        }
    }

    pub fn with_stat(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.stats.insert(key.into(), value.into());
        self
    }
}

/// Whatever records finished matches: an HTTP client in production,
/// a capturing stub in tests.
pub trait MatchRecorder: Send {
    fn record(&self, results: &[MatchResult]) -> TimerResult<()>;
}

/// Check that ranks are exactly 1..=N with no gaps or duplicates.
pub fn validate_ranks(results: &[MatchResult]) -> TimerResult<()> {
    if results.is_empty() {
        return Err(TimerError::InvalidRanks {
            reason: "empty result list".into(),
        });
    }
    let mut ranks: Vec<u32> = results.iter().map(|r| r.rank).collect();
    ranks.sort_unstable();
    for (i, rank) in ranks.iter().enumerate() {
        let expected = (i + 1) as u32;
        if *rank != expected {
            return Err(TimerError::InvalidRanks {
                reason: format!("expected rank {expected}, got {rank}"),
            });
        }
    }
    Ok(())
}
