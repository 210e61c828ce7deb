/// Keyboard state tracker.
///
/// Two kinds of query, matching the two kinds of button:
///   - `any_held`    — level-triggered. Movement keys report intent for
///                     as long as they are physically down.
///   - `any_pressed` — edge-triggered. The action key fires once per
///                     physical press, never while held.
///
/// Terminals do not reliably deliver key-release events, so "held" is
/// inferred: a key counts as down until no Press/Repeat event has been
/// seen for a short window. Terminals with key repeat refresh the window
/// continuously while a key stays down.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEventKind, KeyModifiers};

/// A key with no Press/Repeat event for this long counts as released.
const HOLD_WINDOW: Duration = Duration::from_millis(160);

pub struct Keyboard {
    /// Timestamp of the most recent Press/Repeat event per key.
    last_seen: HashMap<KeyCode, Instant>,
    /// Keys that went from up to down during the latest `drain()`.
    fresh: Vec<KeyCode>,
    ctrl_c: bool,
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard {
            last_seen: HashMap::with_capacity(16),
            fresh: Vec::with_capacity(8),
            ctrl_c: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call once per tick, before stepping the simulation.
    pub fn drain(&mut self) {
        self.fresh.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            let Ok(Event::Key(key)) = event::read() else {
                continue;
            };
            if key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
            {
                self.ctrl_c = true;
            }
            if key.kind == KeyEventKind::Release {
                self.last_seen.remove(&key.code);
                continue;
            }
            let was_down = self.key_down(key.code);
            self.last_seen.insert(key.code, Instant::now());
            if !was_down {
                self.fresh.push(key.code);
            }
        }

        // Expire keys the terminal never told us were released
        let now = Instant::now();
        self.last_seen.retain(|_, t| now.duration_since(*t) < HOLD_WINDOW);
    }

    /// Is any of these keys currently down? (level trigger)
    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.key_down(*c))
    }

    /// Did any of these keys go down this tick? (edge trigger)
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh.contains(c))
    }

    pub fn ctrl_c(&self) -> bool {
        self.ctrl_c
    }

    fn key_down(&self, code: KeyCode) -> bool {
        self.last_seen
            .get(&code)
            .is_some_and(|t| t.elapsed() < HOLD_WINDOW)
    }
}
