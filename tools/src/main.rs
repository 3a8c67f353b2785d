//! turnclock-runner: headless driver for the turn-timer engine.
//!
//! Usage:
//!   turnclock-runner --players "Ada,Grace,Edsger" --initial-time 600 --db timer.db
//!   turnclock-runner --manual-clock < script.jsonl
//!
//! Reads one JSON command per stdin line and answers each with the full
//! table state, so a UI process (or a human with a terminal) can drive
//! the engine over pipes. With --manual-clock the engine runs on a
//! hand-cranked clock that advances one second per tick command, which
//! makes scripted sessions reproducible.

use anyhow::Result;
use std::env;
use std::io::{self, BufRead, Write};
use turnclock_core::{
    Color, ManualClock, Player, SilentNotifier, SnapshotStore, SystemClock, TimerEngine,
    TimerState, DEFAULT_INITIAL_TIME,
};

#[derive(serde::Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum IpcCommand {
    Start,
    Tick {
        #[serde(default = "default_tick_count")]
        count: u64,
    },
    NextTurn,
    PreviousTurn,
    Switch {
        player_id: u32,
    },
    Reveal,
    EndRound,
    Reset,
    Adjust {
        player_id: u32,
        delta: i64,
    },
    Rename {
        player_id: u32,
        name: String,
    },
    Recolor {
        player_id: u32,
        color: Color,
    },
    ViewNext,
    ViewPrevious,
    GetState,
    Quit,
}

fn default_tick_count() -> u64 {
    1
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    running: bool,
    game_started: bool,
    round: u32,
    turn_elapsed_seconds: i64,
    eligible_players: usize,
    viewed_index: usize,
    players: &'a [Player],
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let initial_time = parse_arg(&args, "--initial-time", DEFAULT_INITIAL_TIME);
    let manual_clock = args.iter().any(|a| a == "--manual-clock");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str());
    let session = args
        .windows(2)
        .find(|w| w[0] == "--session")
        .map(|w| w[1].as_str())
        .unwrap_or("default");
    let players = args
        .windows(2)
        .find(|w| w[0] == "--players")
        .map(|w| w[1].as_str());

    let state = match players {
        Some(list) => {
            let names: Vec<&str> = list
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .collect();
            anyhow::ensure!(!names.is_empty(), "--players needs at least one name");
            TimerState::from_names(&names, initial_time)
        }
        None => TimerState::default_roster(),
    };

    // Keep a handle on the manual clock so tick commands can crank it.
    let crank = manual_clock.then(ManualClock::new);
    let mut engine = match &crank {
        Some(clock) => TimerEngine::new(state, Box::new(clock.clone()), Box::new(SilentNotifier)),
        None => TimerEngine::new(state, Box::new(SystemClock), Box::new(SilentNotifier)),
    };

    if let Some(path) = db {
        let store = SnapshotStore::open(path)?;
        store.migrate()?;
        engine = engine.with_store(store, session);
    }

    run_ipc_loop(&mut engine, crank.as_ref())
}

fn run_ipc_loop(engine: &mut TimerEngine, crank: Option<&ManualClock>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut buffer = String::new();
    let mut handle = stdin.lock();

    loop {
        buffer.clear();
        if handle.read_line(&mut buffer)? == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("unparseable command line: {e}");
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{err_json}")?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Start => engine.start(),
            IpcCommand::Tick { count } => {
                for _ in 0..count {
                    if let Some(clock) = crank {
                        clock.advance_secs(1);
                    }
                    engine.tick();
                }
            }
            IpcCommand::NextTurn => engine.next_turn(),
            IpcCommand::PreviousTurn => engine.previous_turn(),
            IpcCommand::Switch { player_id } => engine.switch_to_player(player_id),
            IpcCommand::Reveal => engine.start_reveal(),
            IpcCommand::EndRound => engine.end_round(),
            IpcCommand::Reset => engine.reset(),
            IpcCommand::Adjust { player_id, delta } => engine.adjust_player_time(player_id, delta),
            IpcCommand::Rename { player_id, ref name } => {
                engine.update_player_name(player_id, name)
            }
            IpcCommand::Recolor { player_id, color } => {
                engine.update_player_color(player_id, color)
            }
            IpcCommand::ViewNext => engine.view_next_card(),
            IpcCommand::ViewPrevious => engine.view_previous_card(),
            IpcCommand::GetState => {}
        }

        let state = UiState {
            running: engine.is_running(),
            game_started: engine.state().game_started,
            round: engine.current_round(),
            turn_elapsed_seconds: engine.current_turn_elapsed_seconds(),
            eligible_players: engine.active_players_count(),
            viewed_index: engine.viewed_index(),
            players: engine.players(),
        };
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
