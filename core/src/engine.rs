//! The turn-timer engine: all player and round state lives here.
//!
//! RULES:
//!   - State changes flow through the command methods below. Nothing
//!     outside this module mutates TimerState.
//!   - Commands and the tick handler run on one thread, in arrival
//!     order. There is no locking because there is no concurrency.
//!   - Elapsed time is always recomputed from the stopwatch anchor,
//!     never from a count of delivered ticks.
//!   - An invalid command is inert, not an error: a click that makes no
//!     sense in the current state is a silent no-op.
//!   - A snapshot is saved after every command. Save failures are
//!     logged and swallowed; the state mutation commits regardless.

use crate::{
    clock::WallClock,
    notify::Notifier,
    player::{Color, Player, DEFAULT_INITIAL_TIME},
    snapshot,
    stopwatch::Stopwatch,
    store::SnapshotStore,
    types::{EpochMillis, PlayerId, Round, Seconds},
};
use serde::{Deserialize, Serialize};

/// Par value a turn is scored against: efficiency = 60 - turn seconds.
pub const PAR_SECONDS: Seconds = 60;

/// Time-bank bonus granted whenever a player goes on the clock via a
/// game start, a turn advance, or an explicit switch. Resume grants
/// nothing.
pub const TURN_BONUS_SECONDS: Seconds = 60;

/// Once a turn runs past par, an overtime warning fires each time the
/// elapsed time crosses another multiple of this interval.
pub const OVERTIME_INTERVAL_SECONDS: Seconds = 30;

/// How long a manual card swipe suppresses auto-tracking of the viewed
/// card, so a fast swipe is not immediately snapped back.
pub const MANUAL_NAV_WINDOW_MILLIS: EpochMillis = 2_000;

/// The complete, serializable engine state. This is exactly what a
/// snapshot round-trips.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimerState {
    pub players: Vec<Player>,
    /// True from the first start command until reset.
    pub game_started: bool,
    pub current_round: Round,
    /// Per-player starting balance. Read only by reset.
    pub initial_time: Seconds,
    /// Elapsed-time tracking for the in-progress turn. Its running flag
    /// doubles as the session's running flag.
    pub stopwatch: Stopwatch,
    /// Roster order captured at game start. End-of-round rotation walks
    /// this list so round openers cycle through the original seating
    /// even if mid-round switches changed who was active last.
    pub player_order: Vec<PlayerId>,
    pub current_order_index: usize,
    /// Last 30-second overtime boundary already warned about for the
    /// current turn. Reset on every turn change.
    pub overtime_warned: Seconds,
    /// Which card the shell is looking at. Distinct from the active
    /// player; auto-tracking snaps it while the clock runs.
    pub viewed_index: usize,
    /// While set (and in the future), a manual swipe is in charge and
    /// auto-tracking stands down.
    pub manual_nav_until: Option<EpochMillis>,
}

impl TimerState {
    /// Roster from a list of names, colors dealt from the palette in
    /// order, first seat on the clock.
    pub fn from_names<S: AsRef<str>>(names: &[S], initial_time: Seconds) -> Self {
        let players = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let color = Color::PALETTE[i % Color::PALETTE.len()];
                let mut p = Player::new(i as PlayerId + 1, name.as_ref(), color, initial_time);
                p.is_active = i == 0;
                p
            })
            .collect();
        Self {
            players,
            game_started: false,
            current_round: 1,
            initial_time,
            stopwatch: Stopwatch::default(),
            player_order: Vec::new(),
            current_order_index: 0,
            overtime_warned: 0,
            viewed_index: 0,
            manual_nav_until: None,
        }
    }

    /// The stock four-seat table.
    pub fn default_roster() -> Self {
        Self::from_names(
            &["Player 1", "Player 2", "Player 3", "Player 4"],
            DEFAULT_INITIAL_TIME,
        )
    }
}

pub struct TimerEngine {
    state: TimerState,
    clock: Box<dyn WallClock>,
    notifier: Box<dyn Notifier>,
    store: Option<SnapshotStore>,
    session_key: String,
}

impl TimerEngine {
    pub fn new(
        state: TimerState,
        clock: Box<dyn WallClock>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            state,
            clock,
            notifier,
            store: None,
            session_key: "default".to_string(),
        }
    }

    /// Attach a snapshot store and restore the session saved under
    /// `session_key`, if any. Must be called before the first command;
    /// a missing or unreadable snapshot falls back to the state the
    /// engine was built with.
    pub fn with_store(mut self, store: SnapshotStore, session_key: &str) -> Self {
        self.session_key = session_key.to_string();
        match store.load(session_key) {
            Ok(Some(json)) => match snapshot::decode(&json) {
                Ok(state) => {
                    log::debug!("restored session '{session_key}' from snapshot");
                    self.state = state;
                }
                Err(e) => log::warn!("snapshot for '{session_key}' unreadable, starting fresh: {e}"),
            },
            Ok(None) => {}
            Err(e) => log::warn!("snapshot load for '{session_key}' failed, starting fresh: {e}"),
        }
        self.store = Some(store);
        self
    }

    // ── Queries ────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn players(&self) -> &[Player] {
        &self.state.players
    }

    pub fn is_running(&self) -> bool {
        self.state.stopwatch.is_running()
    }

    pub fn current_round(&self) -> Round {
        self.state.current_round
    }

    pub fn active_player(&self) -> Option<&Player> {
        self.state.players.iter().find(|p| p.is_active)
    }

    /// Elapsed whole seconds of the in-progress turn. Zero before the
    /// first turn; frozen at the banked total while paused.
    pub fn current_turn_elapsed_seconds(&self) -> Seconds {
        self.state.stopwatch.elapsed_seconds(self.clock.now_millis())
    }

    /// Players still eligible this round.
    pub fn active_players_count(&self) -> usize {
        self.state
            .players
            .iter()
            .filter(|p| !p.is_out_of_round)
            .count()
    }

    pub fn viewed_index(&self) -> usize {
        self.state.viewed_index
    }

    // ── Clock control ──────────────────────────────────────────────

    /// Start, pause or resume, depending on where the session is.
    ///
    /// Fresh start captures the seating order for round rotation and
    /// grants the opening player the turn bonus. Resume re-anchors the
    /// stopwatch without granting anything. Pause banks the elapsed
    /// seconds and stops the clock.
    pub fn start(&mut self) {
        let now = self.clock.now_millis();
        if !self.state.game_started {
            self.state.player_order = self.state.players.iter().map(|p| p.id).collect();
            self.state.current_order_index = 0;
            self.state.game_started = true;
            self.state.stopwatch.restart(now);
            if let Some(i) = self.active_index() {
                let opener = &mut self.state.players[i];
                opener.time_remaining += TURN_BONUS_SECONDS;
                opener.current_turn_efficiency = 0;
            }
            self.notifier.game_start();
        } else if self.is_running() {
            self.state.stopwatch.pause(now);
        } else {
            self.state.stopwatch.resume(now);
        }
        self.persist();
    }

    /// One beat of the external 1 Hz scheduler. Meaningful only while
    /// the clock runs.
    ///
    /// The time bank drains a flat one second per delivered tick; the
    /// turn score is recomputed from wall time, so a starved scheduler
    /// skews the bank but never the score.
    pub fn tick(&mut self) {
        let now = self.clock.now_millis();
        if !self.state.game_started || !self.is_running() {
            return;
        }
        let elapsed = self.state.stopwatch.elapsed_seconds(now);
        if let Some(i) = self.active_index() {
            let player = &mut self.state.players[i];
            player.time_remaining = (player.time_remaining - 1).max(0);
            player.current_turn_efficiency = PAR_SECONDS - elapsed;

            let boundary = elapsed / OVERTIME_INTERVAL_SECONDS;
            if elapsed > PAR_SECONDS && boundary > self.state.overtime_warned {
                self.state.overtime_warned = boundary;
                self.notifier.overtime();
            }
        }
        self.sync_view(now);
        self.persist();
    }

    // ── Turn control ───────────────────────────────────────────────

    /// Put a specific player on the clock.
    ///
    /// The target is validated before anything is touched, so a bad
    /// target can never leave the table without an active player.
    /// While paused this is a pure seat swap: no credit, no bonus, no
    /// clock change. While running the outgoing player is credited for
    /// the turn and the incoming one gets the bonus.
    pub fn switch_to_player(&mut self, target_id: PlayerId) {
        if !self.state.game_started {
            return;
        }
        let Some(target) = self.index_of(target_id) else {
            return;
        };
        if self.state.players[target].is_out_of_round || self.state.players[target].is_active {
            return;
        }
        let now = self.clock.now_millis();

        if !self.is_running() {
            if let Some(cur) = self.active_index() {
                self.state.players[cur].deactivate();
            }
            self.state.players[target].activate();
            self.persist();
            return;
        }

        let elapsed = self.state.stopwatch.elapsed_seconds(now);
        if let Some(cur) = self.active_index() {
            self.credit_turn(cur, elapsed);
            self.state.players[cur].deactivate();
        }
        let incoming = &mut self.state.players[target];
        incoming.activate();
        incoming.time_remaining += TURN_BONUS_SECONDS;

        self.state.stopwatch.restart(now);
        self.state.overtime_warned = 0;
        self.notifier.turn_change();
        self.persist();
    }

    /// Advance to the next eligible player in roster order, wrapping
    /// and skipping anyone out of the round.
    ///
    /// Credits the outgoing player; a revealing player exits the round
    /// here. When nobody is left eligible on entry, the round ends
    /// instead. Always restarts the clock, paused or not.
    pub fn next_turn(&mut self) {
        if !self.state.game_started {
            return;
        }
        if self.active_players_count() == 0 {
            self.end_round();
            return;
        }
        let now = self.clock.now_millis();
        let elapsed = self.state.stopwatch.elapsed_seconds(now);

        self.notifier.turn_change();
        self.state.overtime_warned = 0;

        if let Some(cur) = self.active_index() {
            // Eligibility as it stood before this command; the outgoing
            // player's own reveal-exit does not affect the scan.
            let out_before: Vec<bool> = self
                .state
                .players
                .iter()
                .map(|p| p.is_out_of_round)
                .collect();

            self.credit_turn(cur, elapsed);
            let outgoing = &mut self.state.players[cur];
            let was_revealing = outgoing.is_revealing;
            outgoing.deactivate();
            if was_revealing {
                outgoing.is_out_of_round = true;
            }

            let n = self.state.players.len();
            let mut idx = (cur + 1) % n;
            while out_before[idx] && idx != cur {
                idx = (idx + 1) % n;
            }

            let anyone_left = self.state.players.iter().any(|p| !p.is_out_of_round);
            if anyone_left && !out_before[idx] {
                let incoming = &mut self.state.players[idx];
                incoming.activate();
                incoming.time_remaining += TURN_BONUS_SECONDS;
            }
            // A reveal-exit by the last eligible player leaves no one on
            // the clock; the next advance will close the round.
        }

        self.state.stopwatch.restart(now);
        self.persist();
    }

    /// Step back to the previous eligible player in roster order.
    ///
    /// Going backward never credits a turn and never eliminates
    /// anyone. A scan that comes back to the origin is a no-op.
    pub fn previous_turn(&mut self) {
        if !self.state.game_started || self.active_players_count() == 0 {
            return;
        }
        let Some(cur) = self.active_index() else {
            return;
        };

        let n = self.state.players.len();
        let mut idx = if cur == 0 { n - 1 } else { cur - 1 };
        while self.state.players[idx].is_out_of_round && idx != cur {
            idx = if idx == 0 { n - 1 } else { idx - 1 };
        }
        if idx == cur || self.state.players[idx].is_out_of_round {
            return;
        }

        let now = self.clock.now_millis();
        self.notifier.turn_change();
        self.state.overtime_warned = 0;

        self.state.players[cur].deactivate();
        let incoming = &mut self.state.players[idx];
        incoming.activate();
        incoming.time_remaining += TURN_BONUS_SECONDS;

        self.state.stopwatch.restart(now);
        self.persist();
    }

    /// Mark the active player's turn as their last of the round. The
    /// actual exit happens when their turn is next advanced.
    pub fn start_reveal(&mut self) {
        if !self.state.game_started {
            return;
        }
        let Some(cur) = self.active_index() else {
            return;
        };
        self.state.players[cur].is_revealing = true;
        self.notifier.reveal();
        self.persist();
    }

    /// Close the round: everyone back in, scores and turn counts wiped
    /// for the new round, and the opener picked by walking the original
    /// seating order one seat forward.
    pub fn end_round(&mut self) {
        if !self.state.game_started || self.state.player_order.is_empty() {
            return;
        }
        let now = self.clock.now_millis();
        self.notifier.round_end();

        let next_index = (self.state.current_order_index + 1) % self.state.player_order.len();
        self.state.current_order_index = next_index;
        let opener = self.state.player_order[next_index];

        for player in &mut self.state.players {
            player.is_out_of_round = false;
            player.is_revealing = false;
            player.turns_completed = 0;
            player.current_turn_efficiency = 0;
            player.is_active = player.id == opener;
            if player.is_active {
                player.time_remaining += TURN_BONUS_SECONDS;
            }
        }

        self.state.current_round += 1;
        self.state.stopwatch.restart(now);
        self.state.overtime_warned = 0;
        self.state.manual_nav_until = None;
        self.persist();
    }

    /// Full teardown back to the pre-game lobby. Names, colors and
    /// seating survive; balances re-seed from `initial_time` and the
    /// first seat goes back on deck.
    pub fn reset(&mut self) {
        let initial = self.state.initial_time;
        for (i, player) in self.state.players.iter_mut().enumerate() {
            player.time_remaining = initial;
            player.total_efficiency = 0;
            player.current_turn_efficiency = 0;
            player.turns_completed = 0;
            player.is_active = i == 0;
            player.is_revealing = false;
            player.is_out_of_round = false;
        }
        self.state.game_started = false;
        self.state.stopwatch.clear();
        self.state.current_round = 1;
        self.state.player_order.clear();
        self.state.current_order_index = 0;
        self.state.overtime_warned = 0;
        self.state.viewed_index = 0;
        self.state.manual_nav_until = None;
        self.persist();
    }

    // ── Roster and time adjustments ────────────────────────────────

    /// Add (or subtract) seconds from a player's bank, clamped at zero.
    /// Usable in any state, running or not.
    pub fn adjust_player_time(&mut self, player_id: PlayerId, delta: Seconds) {
        if let Some(i) = self.index_of(player_id) {
            let player = &mut self.state.players[i];
            player.time_remaining = (player.time_remaining + delta).max(0);
            self.persist();
        }
    }

    /// Rename a player. Whitespace is trimmed; an empty result is
    /// rejected.
    pub fn update_player_name(&mut self, player_id: PlayerId, name: &str) {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            log::warn!("rejected empty name for player {player_id}");
            return;
        }
        if let Some(i) = self.index_of(player_id) {
            self.state.players[i].name = trimmed.to_string();
            self.persist();
        }
    }

    pub fn update_player_color(&mut self, player_id: PlayerId, color: Color) {
        if let Some(i) = self.index_of(player_id) {
            self.state.players[i].color = color;
            self.persist();
        }
    }

    /// Reorder the roster: pull `dragged_id` out and reinsert it at the
    /// seat `target_id` currently occupies. Seating captured by an
    /// earlier start is unaffected until the next reset.
    pub fn move_player(&mut self, dragged_id: PlayerId, target_id: PlayerId) {
        if dragged_id == target_id {
            return;
        }
        let (Some(from), Some(to)) = (self.index_of(dragged_id), self.index_of(target_id)) else {
            return;
        };
        let player = self.state.players.remove(from);
        self.state.players.insert(to, player);
        self.persist();
    }

    /// New per-player starting balance. Takes effect at the next reset,
    /// never mid-game.
    pub fn set_initial_time(&mut self, seconds: Seconds) {
        if seconds > 0 {
            self.state.initial_time = seconds;
            self.persist();
        }
    }

    // ── Card navigation ────────────────────────────────────────────

    /// Swipe the viewed card forward. Opens the manual-navigation
    /// window during which auto-tracking stands down.
    pub fn view_next_card(&mut self) {
        let n = self.state.players.len();
        if n == 0 {
            return;
        }
        let now = self.clock.now_millis();
        self.state.manual_nav_until = Some(now + MANUAL_NAV_WINDOW_MILLIS);
        self.state.viewed_index = (self.state.viewed_index + 1) % n;
        self.persist();
    }

    /// Swipe the viewed card backward. Same suppression window.
    pub fn view_previous_card(&mut self) {
        let n = self.state.players.len();
        if n == 0 {
            return;
        }
        let now = self.clock.now_millis();
        self.state.manual_nav_until = Some(now + MANUAL_NAV_WINDOW_MILLIS);
        self.state.viewed_index = if self.state.viewed_index == 0 {
            n - 1
        } else {
            self.state.viewed_index - 1
        };
        self.persist();
    }

    // ── Internals ──────────────────────────────────────────────────

    fn active_index(&self) -> Option<usize> {
        self.state.players.iter().position(|p| p.is_active)
    }

    fn index_of(&self, player_id: PlayerId) -> Option<usize> {
        self.state.players.iter().position(|p| p.id == player_id)
    }

    /// Book a finished turn against the player at `idx`.
    fn credit_turn(&mut self, idx: usize, elapsed: Seconds) {
        let player = &mut self.state.players[idx];
        player.total_efficiency += PAR_SECONDS - elapsed;
        player.turns_completed += 1;
    }

    /// Snap the viewed card to the active player, unless paused or a
    /// manual swipe still has the floor. Pause means free browsing.
    fn sync_view(&mut self, now: EpochMillis) {
        if !self.is_running() {
            return;
        }
        if let Some(until) = self.state.manual_nav_until {
            if now < until {
                return;
            }
            self.state.manual_nav_until = None;
        }
        if let Some(active) = self.active_index() {
            self.state.viewed_index = active;
        }
    }

    /// Best-effort snapshot write. Never fails the command.
    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let saved_at = self.clock.now_millis();
        let result = snapshot::encode(&self.state)
            .and_then(|json| store.save(&self.session_key, &json, saved_at));
        match result {
            Ok(()) => log::debug!("snapshot saved for '{}'", self.session_key),
            Err(e) => log::warn!("snapshot save failed for '{}': {e}", self.session_key),
        }
    }
}
