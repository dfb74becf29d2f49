//! Terminal runner (default binary).
//!
//! Event loop shape: sleep inside `event::poll` until either a key arrives or
//! the next timer deadline passes, then advance the timer queue and feed due
//! events into the session. The session never blocks and never sleeps.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use std::cell::Cell;
use std::rc::Rc;

use minofall::core::Session;
use minofall::input::{map_key, should_quit, HeldKeys};
use minofall::io::TimerQueue;
use minofall::term::TerminalCanvas;
use minofall::types::GameConfig;

/// Poll granularity when nothing is scheduled sooner.
const IDLE_POLL_MS: u64 = 50;

fn main() -> Result<()> {
    let config = GameConfig::default();
    let mut canvas = TerminalCanvas::new(config.columns, config.rows);
    canvas.enter()?;

    let result = run(config, &mut canvas);

    // Always try to restore terminal state.
    let _ = canvas.exit();
    result
}

fn run(config: GameConfig, canvas: &mut TerminalCanvas) -> Result<()> {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(1);

    let mut session = Session::new(config, seed)?;
    let mut timers = TimerQueue::new();
    let mut held = HeldKeys::new();

    let game_over = Rc::new(Cell::new(false));
    let flag = Rc::clone(&game_over);
    session.on_game_over(move || flag.set(true));

    timers.advance_to(Instant::now());
    session.start(canvas, &mut timers);
    canvas.flush()?;

    loop {
        if game_over.get() {
            canvas.draw_game_over()?;
            wait_for_any_key()?;
            return Ok(());
        }

        let now = Instant::now();
        let timeout = [
            timers.until_next(),
            held.until_next_expiry(now),
            Some(Duration::from_millis(IDLE_POLL_MS)),
        ]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                let now = Instant::now();
                match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        if should_quit(key) {
                            return Ok(());
                        }
                        if let Some(game_key) = map_key(key) {
                            if held.press(game_key, now) {
                                session.handle_key_down(game_key, canvas, &mut timers);
                            }
                        }
                    }
                    KeyEventKind::Release => {
                        if let Some(game_key) = map_key(key) {
                            if held.release(game_key) {
                                session.handle_key_up(game_key, &mut timers);
                            }
                        }
                    }
                }
            }
        }

        let now = Instant::now();
        for game_key in held.expired(now) {
            session.handle_key_up(game_key, &mut timers);
        }

        timers.advance_to(now);
        for timer_event in timers.drain_due() {
            session.handle_timer(timer_event, canvas, &mut timers);
        }

        canvas.flush()?;
    }
}

fn wait_for_any_key() -> Result<()> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(());
            }
        }
    }
}
