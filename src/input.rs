//! Key mapping and held-key tracking for terminal environments.
//!
//! The session wants key-down and key-up pairs, but many terminals only emit
//! press events. [`HeldKeys`] bridges the gap: real release events are used
//! when the terminal reports them, and a short timeout synthesizes a release
//! when it does not (a repeated press refreshes the timeout).

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::GameKey;

/// Map keyboard input to game keys.
pub fn map_key(key: KeyEvent) -> Option<GameKey> {
    match key.code {
        // Movement
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a')
        | KeyCode::Char('A') => Some(GameKey::MoveLeft),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d')
        | KeyCode::Char('D') => Some(GameKey::MoveRight),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s')
        | KeyCode::Char('S') => Some(GameKey::SoftDrop),

        // Rotation
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') | KeyCode::Char('w')
        | KeyCode::Char('W') | KeyCode::Char('x') | KeyCode::Char('X') => Some(GameKey::RotateCw),
        KeyCode::Char('z') | KeyCode::Char('Z') | KeyCode::Char('y') | KeyCode::Char('Y') => {
            Some(GameKey::RotateCcw)
        }

        // Actions
        KeyCode::Char(' ') => Some(GameKey::HardDrop),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

// In terminals without key-release events, a short timeout prevents a single
// tap from turning into a sustained "held" state.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u64 = 150;

/// Tracks which hold-style keys are currently down.
///
/// Only movement and soft drop are holdable; taps (rotate, hard drop) pass
/// straight through and are never tracked.
#[derive(Debug, Clone)]
pub struct HeldKeys {
    held: ArrayVec<(GameKey, Instant), 3>,
    release_timeout: Duration,
}

fn is_holdable(key: GameKey) -> bool {
    matches!(
        key,
        GameKey::MoveLeft | GameKey::MoveRight | GameKey::SoftDrop
    )
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::with_release_timeout(Duration::from_millis(DEFAULT_KEY_RELEASE_TIMEOUT_MS))
    }

    pub fn with_release_timeout(release_timeout: Duration) -> Self {
        Self {
            held: ArrayVec::new(),
            release_timeout,
        }
    }

    /// Record a press. Returns true when this is a fresh key-down the session
    /// should see; a repeat of an already-held key only refreshes its timeout.
    pub fn press(&mut self, key: GameKey, now: Instant) -> bool {
        if !is_holdable(key) {
            return true;
        }
        if let Some(entry) = self.held.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = now;
            return false;
        }
        self.held.push((key, now));
        true
    }

    /// Record a real release event. Returns true when the key was held.
    pub fn release(&mut self, key: GameKey) -> bool {
        let before = self.held.len();
        self.held.retain(|(k, _)| *k != key);
        self.held.len() != before
    }

    /// Keys whose timeout has lapsed, removed and returned as synthetic
    /// releases.
    pub fn expired(&mut self, now: Instant) -> ArrayVec<GameKey, 3> {
        let timeout = self.release_timeout;
        let mut out = ArrayVec::new();
        self.held.retain(|(key, pressed)| {
            if now.duration_since(*pressed) >= timeout {
                out.push(*key);
                false
            } else {
                true
            }
        });
        out
    }

    /// Time until the next synthetic release is due.
    pub fn until_next_expiry(&self, now: Instant) -> Option<Duration> {
        self.held
            .iter()
            .map(|(_, pressed)| {
                (*pressed + self.release_timeout).saturating_duration_since(now)
            })
            .min()
    }
}

impl Default for HeldKeys {
    fn default() -> Self {
        Self::new()
    }
}
