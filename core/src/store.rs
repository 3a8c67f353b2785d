//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database. The engine calls store
//! methods with an opaque JSON payload; it never executes SQL and never
//! aborts a command because a save failed.

use crate::{
    error::TimerResult,
    types::EpochMillis,
};
use rusqlite::{params, Connection, OptionalExtension};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS session_snapshot (
    session_key TEXT PRIMARY KEY,
    state_json  TEXT NOT NULL,
    saved_at    INTEGER NOT NULL
);
";

pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    /// Open (or create) the timer database at `path`.
    pub fn open(path: &str) -> TimerResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> TimerResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply the schema. Idempotent.
    pub fn migrate(&self) -> TimerResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Upsert the latest snapshot for a session.
    pub fn save(&self, session_key: &str, state_json: &str, saved_at: EpochMillis) -> TimerResult<()> {
        self.conn.execute(
            "INSERT INTO session_snapshot (session_key, state_json, saved_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(session_key) DO UPDATE
             SET state_json = excluded.state_json, saved_at = excluded.saved_at",
            params![session_key, state_json, saved_at],
        )?;
        Ok(())
    }

    /// Fetch the latest snapshot for a session, if one was ever saved.
    pub fn load(&self, session_key: &str) -> TimerResult<Option<String>> {
        let row = self
            .conn
            .query_row(
                "SELECT state_json FROM session_snapshot WHERE session_key = ?1",
                params![session_key],
                |r| r.get::<_, String>(0),
            )
            .optional()?;
        Ok(row)
    }

    /// Drop a session's snapshot entirely.
    pub fn clear(&self, session_key: &str) -> TimerResult<()> {
        self.conn.execute(
            "DELETE FROM session_snapshot WHERE session_key = ?1",
            params![session_key],
        )?;
        Ok(())
    }
}
