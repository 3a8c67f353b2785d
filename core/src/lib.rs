//! turnclock-core: the per-player turn timer behind the companion app.
//!
//! Everything with a state machine in it lives in this crate: the
//! timer engine (active player, time banks, reveal and round-exit,
//! rotation, efficiency scoring), its pause-proof stopwatch, snapshot
//! persistence, and the notification seam the shell hangs sounds on.
//!
//! RULES:
//!   - One engine instance owns all mutable state. External layers read
//!     snapshots through the query API and never touch fields directly.
//!   - Tick delivery and user commands are serialized by construction;
//!     the engine is single-threaded and every command runs to
//!     completion before the next is looked at.
//!   - Side effects (snapshot writes, notifications) are best-effort
//!     and can never fail a command.

pub mod clock;
pub mod engine;
pub mod error;
pub mod notify;
pub mod player;
pub mod results;
pub mod snapshot;
pub mod stopwatch;
pub mod store;
pub mod types;

pub use clock::{ManualClock, SystemClock, WallClock};
pub use engine::{TimerEngine, TimerState};
pub use error::{TimerError, TimerResult};
pub use notify::{Notification, Notifier, RecordingNotifier, SilentNotifier};
pub use player::{Color, Player, DEFAULT_INITIAL_TIME};
pub use results::{validate_ranks, MatchRecorder, MatchResult};
pub use store::SnapshotStore;
