//! Snapshot serialization: full engine state to/from JSON.
//!
//! A snapshot is written after every command and loaded once at startup
//! before any command is accepted. It captures every field of the
//! engine state, so restoring it mid-game loses nothing.

use crate::{
    engine::TimerState,
    error::{TimerError, TimerResult},
};
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub version: u32,
    pub state: TimerState,
}

pub fn encode(state: &TimerState) -> TimerResult<String> {
    let snapshot = TimerSnapshot {
        version: SNAPSHOT_VERSION,
        state: state.clone(),
    };
    Ok(serde_json::to_string(&snapshot)?)
}

pub fn decode(json: &str) -> TimerResult<TimerState> {
    let snapshot: TimerSnapshot = serde_json::from_str(json)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(TimerError::SnapshotVersion {
            found: snapshot.version,
        });
    }
    Ok(snapshot.state)
}
