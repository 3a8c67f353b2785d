//! Turn lifecycle tests: start bonus, tick drain, efficiency credit,
//! manual switches, and the single-active-player invariant.

use std::sync::Arc;
use turnclock_core::{
    Color, ManualClock, Player, RecordingNotifier, SilentNotifier, TimerEngine, TimerState,
};

fn build(names: &[&str], initial: i64) -> (TimerEngine, ManualClock) {
    let clock = ManualClock::starting_at(1_000_000);
    let engine = TimerEngine::new(
        TimerState::from_names(names, initial),
        Box::new(clock.clone()),
        Box::new(SilentNotifier),
    );
    (engine, clock)
}

fn build_recording(names: &[&str], initial: i64) -> (TimerEngine, ManualClock, Arc<RecordingNotifier>) {
    let clock = ManualClock::starting_at(1_000_000);
    let recorder = RecordingNotifier::new();
    let engine = TimerEngine::new(
        TimerState::from_names(names, initial),
        Box::new(clock.clone()),
        Box::new(recorder.clone()),
    );
    (engine, clock, recorder)
}

/// Advance one simulated second per scheduler beat.
fn run_secs(engine: &mut TimerEngine, clock: &ManualClock, secs: i64) {
    for _ in 0..secs {
        clock.advance_secs(1);
        engine.tick();
    }
}

fn assert_invariants(players: &[Player]) {
    let active = players.iter().filter(|p| p.is_active).count();
    assert!(active <= 1, "more than one active player");
    for p in players {
        if p.is_revealing {
            assert!(p.is_active, "{} revealing while inactive", p.name);
        }
        if p.is_out_of_round {
            assert!(!p.is_active, "{} out of round but active", p.name);
            assert!(!p.is_revealing, "{} out of round but revealing", p.name);
        }
        assert!(p.time_remaining >= 0, "{} went negative", p.name);
    }
}

#[test]
fn start_grants_opening_bonus_once() {
    let (mut engine, clock) = build(&["A", "B", "C", "D"], 600);
    engine.start();
    assert_eq!(engine.players()[0].time_remaining, 660);
    assert!(engine.is_running());

    // Pause then resume: no second bonus.
    run_secs(&mut engine, &clock, 3);
    engine.start();
    assert!(!engine.is_running());
    engine.start();
    assert!(engine.is_running());
    assert_eq!(engine.players()[0].time_remaining, 657);
}

#[test]
fn ten_tick_scenario() {
    let (mut engine, clock) = build(&["A", "B", "C", "D"], 600);
    engine.start();
    run_secs(&mut engine, &clock, 10);

    let p1 = &engine.players()[0];
    assert_eq!(p1.time_remaining, 650);
    assert_eq!(p1.current_turn_efficiency, 50);

    engine.next_turn();
    let p1 = &engine.players()[0];
    assert_eq!(p1.total_efficiency, 50);
    assert_eq!(p1.turns_completed, 1);
    assert!(!p1.is_active);

    let p2 = &engine.players()[1];
    assert!(p2.is_active);
    assert_eq!(p2.time_remaining, 660);
    assert_eq!(p2.current_turn_efficiency, 0);
    assert_invariants(engine.players());
}

#[test]
fn efficiency_sign_matches_par() {
    let (mut engine, clock) = build(&["A", "B"], 600);
    engine.start();

    // 45 seconds: 15 under par.
    run_secs(&mut engine, &clock, 45);
    engine.next_turn();
    assert_eq!(engine.players()[0].total_efficiency, 15);

    // 75 seconds: 15 over par.
    run_secs(&mut engine, &clock, 75);
    engine.next_turn();
    assert_eq!(engine.players()[1].total_efficiency, -15);
}

#[test]
fn switch_while_paused_is_a_pure_seat_swap() {
    let (mut engine, clock) = build(&["A", "B", "C"], 600);
    engine.start();
    run_secs(&mut engine, &clock, 20);
    engine.start(); // pause

    let before: Vec<(i64, i64, u32)> = engine
        .players()
        .iter()
        .map(|p| (p.time_remaining, p.total_efficiency, p.turns_completed))
        .collect();

    engine.switch_to_player(3);

    let after: Vec<(i64, i64, u32)> = engine
        .players()
        .iter()
        .map(|p| (p.time_remaining, p.total_efficiency, p.turns_completed))
        .collect();
    assert_eq!(before, after, "paused switch must not touch time or scores");
    assert!(engine.players()[2].is_active);
    assert!(!engine.players()[0].is_active);
    assert!(!engine.is_running());
    assert_invariants(engine.players());
}

#[test]
fn paused_switch_clears_a_stale_reveal_marker() {
    let (mut engine, clock) = build(&["A", "B"], 600);
    engine.start();
    engine.start_reveal();
    run_secs(&mut engine, &clock, 5);
    engine.start(); // pause
    engine.switch_to_player(2);

    // The outgoing player must not keep a reveal marker while inactive.
    assert!(!engine.players()[0].is_revealing);
    assert_invariants(engine.players());
}

#[test]
fn switch_while_running_credits_and_grants_bonus() {
    let (mut engine, clock, recorder) = build_recording(&["A", "B", "C"], 600);
    engine.start();
    run_secs(&mut engine, &clock, 30);
    engine.switch_to_player(3);

    let p1 = &engine.players()[0];
    assert_eq!(p1.total_efficiency, 30);
    assert_eq!(p1.turns_completed, 1);

    let p3 = &engine.players()[2];
    assert!(p3.is_active);
    assert_eq!(p3.time_remaining, 660);
    assert_eq!(engine.current_turn_elapsed_seconds(), 0);
    assert_eq!(
        recorder.count(turnclock_core::Notification::TurnChange),
        1
    );
}

#[test]
fn switch_validates_target_before_touching_anything() {
    let (mut engine, clock) = build(&["A", "B"], 600);
    engine.start();
    engine.start_reveal();
    engine.next_turn(); // A exits the round, B active

    run_secs(&mut engine, &clock, 5);
    let snapshot: Vec<Player> = engine.players().to_vec();
    engine.switch_to_player(1); // out of round: rejected
    assert_eq!(engine.players(), snapshot.as_slice());
    assert!(engine.players()[1].is_active, "B must stay on the clock");

    engine.switch_to_player(99); // nonexistent: rejected
    assert_eq!(engine.players(), snapshot.as_slice());
    assert_invariants(engine.players());
}

#[test]
fn commands_before_start_are_noops() {
    let (mut engine, _clock) = build(&["A", "B"], 600);
    let snapshot: Vec<Player> = engine.players().to_vec();

    engine.next_turn();
    engine.previous_turn();
    engine.start_reveal();
    engine.end_round();
    engine.switch_to_player(2);
    engine.tick();

    assert_eq!(engine.players(), snapshot.as_slice());
    assert_eq!(engine.current_round(), 1);
    assert!(!engine.is_running());

    // Time adjustment is explicitly allowed pre-game.
    engine.adjust_player_time(2, -100);
    assert_eq!(engine.players()[1].time_remaining, 500);
}

#[test]
fn adjust_clamps_at_zero() {
    let (mut engine, _clock) = build(&["A"], 30);
    engine.adjust_player_time(1, -500);
    assert_eq!(engine.players()[0].time_remaining, 0);
    engine.adjust_player_time(1, 45);
    assert_eq!(engine.players()[0].time_remaining, 45);
}

#[test]
fn previous_turn_never_credits() {
    let (mut engine, clock) = build(&["A", "B", "C"], 600);
    engine.start();
    run_secs(&mut engine, &clock, 25);
    engine.previous_turn();

    let p1 = &engine.players()[0];
    assert_eq!(p1.total_efficiency, 0);
    assert_eq!(p1.turns_completed, 0);
    assert!(!p1.is_active);

    // Backward in roster order wraps to the last seat, with the bonus.
    let p3 = &engine.players()[2];
    assert!(p3.is_active);
    assert_eq!(p3.time_remaining, 660);
    assert!(engine.is_running());
}

#[test]
fn next_turn_restarts_the_clock_even_when_paused() {
    let (mut engine, clock) = build(&["A", "B"], 600);
    engine.start();
    run_secs(&mut engine, &clock, 8);
    engine.start(); // pause
    assert!(!engine.is_running());

    engine.next_turn();
    assert!(engine.is_running());
    assert_eq!(engine.current_turn_elapsed_seconds(), 0);
    // The banked 8 seconds are what the outgoing turn is scored on.
    assert_eq!(engine.players()[0].total_efficiency, 52);
}

#[test]
fn rename_trims_and_rejects_empty() {
    let (mut engine, _clock) = build(&["A", "B"], 600);
    engine.update_player_name(1, "  Ada  ");
    assert_eq!(engine.players()[0].name, "Ada");
    engine.update_player_name(1, "   ");
    assert_eq!(engine.players()[0].name, "Ada");
}

#[test]
fn recolor_swaps_within_the_palette() {
    let (mut engine, _clock) = build(&["A", "B"], 600);
    assert_eq!(engine.players()[1].color, Color::Green);
    engine.update_player_color(2, Color::Teal);
    assert_eq!(engine.players()[1].color, Color::Teal);
    // Unknown ids are inert, and nobody else's color moves.
    engine.update_player_color(99, Color::Red);
    assert_eq!(engine.players()[0].color, Color::Blue);

    // Cosmetic only: a recolor survives a reset untouched.
    engine.reset();
    assert_eq!(engine.players()[1].color, Color::Teal);
}

#[test]
fn move_player_reorders_the_roster() {
    let (mut engine, _clock) = build(&["A", "B", "C", "D"], 600);
    engine.move_player(4, 2);
    let names: Vec<&str> = engine.players().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["A", "D", "B", "C"]);
    // Identity is the id, not the seat.
    assert_eq!(engine.players()[1].id, 4);
}

#[test]
fn reset_reseeds_from_initial_time() {
    let (mut engine, clock) = build(&["A", "B"], 600);
    engine.start();
    run_secs(&mut engine, &clock, 30);
    engine.next_turn();
    engine.set_initial_time(900);
    engine.reset();

    for (i, p) in engine.players().iter().enumerate() {
        assert_eq!(p.time_remaining, 900);
        assert_eq!(p.total_efficiency, 0);
        assert_eq!(p.turns_completed, 0);
        assert_eq!(p.is_active, i == 0);
        assert!(!p.is_revealing && !p.is_out_of_round);
    }
    assert!(!engine.is_running());
    assert!(!engine.state().game_started);
    assert_eq!(engine.current_round(), 1);
    assert_eq!(engine.current_turn_elapsed_seconds(), 0);
    assert!(engine.state().player_order.is_empty());
}

#[test]
fn invariants_hold_across_a_messy_session() {
    let (mut engine, clock) = build(&["A", "B", "C", "D"], 120);
    engine.start();
    assert_invariants(engine.players());

    run_secs(&mut engine, &clock, 130); // drain past zero
    assert_invariants(engine.players());

    engine.start_reveal();
    engine.next_turn();
    assert_invariants(engine.players());

    engine.switch_to_player(4);
    engine.start(); // pause
    engine.switch_to_player(3);
    engine.start(); // resume
    assert_invariants(engine.players());

    engine.start_reveal();
    engine.next_turn();
    engine.previous_turn();
    engine.end_round();
    assert_invariants(engine.players());

    engine.reset();
    assert_invariants(engine.players());
}
