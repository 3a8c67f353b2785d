//! Transition notifications: sound effects, haptics, whatever the shell
//! wires up.
//!
//! RULE: Notifications are fire-and-forget. The engine calls them
//! synchronously at well-defined transition points and never depends on
//! their completion or success. An implementation must not block.

use serde::Serialize;
use std::sync::{Arc, Mutex};

/// The transitions a shell can react to.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    GameStart,
    TurnChange,
    Reveal,
    RoundEnd,
    Overtime,
}

/// One no-op hook per transition. Implement the ones you care about.
pub trait Notifier: Send {
    fn game_start(&self) {}
    fn turn_change(&self) {}
    fn reveal(&self) {}
    fn round_end(&self) {}
    fn overtime(&self) {}
}

/// The do-nothing default for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {}

/// Records every notification in order. Test double.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, n: Notification) {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(n);
    }

    pub fn seen(&self) -> Vec<Notification> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count(&self, wanted: Notification) -> usize {
        self.seen().iter().filter(|n| **n == wanted).count()
    }
}

impl Notifier for RecordingNotifier {
    fn game_start(&self) {
        self.push(Notification::GameStart);
    }
    fn turn_change(&self) {
        self.push(Notification::TurnChange);
    }
    fn reveal(&self) {
        self.push(Notification::Reveal);
    }
    fn round_end(&self) {
        self.push(Notification::RoundEnd);
    }
    fn overtime(&self) {
        self.push(Notification::Overtime);
    }
}

// Sharing a recorder between a test and the engine means the engine can
// hold an Arc while the test keeps its own handle.
impl<N: Notifier + Sync> Notifier for Arc<N> {
    fn game_start(&self) {
        (**self).game_start();
    }
    fn turn_change(&self) {
        (**self).turn_change();
    }
    fn reveal(&self) {
        (**self).reveal();
    }
    fn round_end(&self) {
        (**self).round_end();
    }
    fn overtime(&self) {
        (**self).overtime();
    }
}
