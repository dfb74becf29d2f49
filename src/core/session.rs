//! Game session - the spawn / fall / lock / clear state machine.
//!
//! The session owns the grid and the active piece and is their only mutator.
//! It is single-threaded and cooperative: the host delivers key events and
//! fired timers into the handlers below, and every handler runs to completion
//! synchronously. Render commands and timer arming go out through the
//! collaborator traits passed into each call.
//!
//! Timer discipline: exactly one fall timer and at most one move-repeat timer
//! are pending at a time. A pending fall timer is always cancelled before a
//! new one is armed, and each fall event additionally carries the piece
//! generation it was armed for, so a stale timer that slipped past
//! cancellation is ignored on delivery.

use crate::core::catalog::{self, ShapeCells};
use crate::core::grid::Grid;
use crate::core::piece::{rotated, ActivePiece};
use crate::core::rng::SimpleRng;
use crate::io::{RenderSink, TimerScheduler};
use crate::types::{CellHandle, ConfigError, GameConfig, GameKey, TimerEvent, TimerHandle};

/// Observable session states. Spawning and locking are instantaneous and
/// happen inside a single handler call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Falling,
    GameOver,
}

/// One game, from first spawn to game over.
pub struct Session {
    config: GameConfig,
    grid: Grid,
    piece: Option<ActivePiece>,
    rng: SimpleRng,
    phase: Phase,
    started: bool,
    /// Monotonic id of the current piece; fall timers are stamped with it.
    generation: u32,
    left_held: bool,
    right_held: bool,
    down_held: bool,
    fall_timer: Option<TimerHandle>,
    repeat_timer: Option<TimerHandle>,
    on_game_over: Option<Box<dyn FnMut()>>,
}

impl Session {
    /// Validate the configuration and build an idle session.
    pub fn new(config: GameConfig, seed: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            grid: Grid::new(config.columns, config.rows),
            piece: None,
            rng: SimpleRng::new(seed),
            phase: Phase::Falling,
            started: false,
            generation: 0,
            left_held: false,
            right_held: false,
            down_held: false,
            fall_timer: None,
            repeat_timer: None,
            on_game_over: None,
        })
    }

    /// Register the game-over notification. Invoked exactly once.
    pub fn on_game_over(&mut self, hook: impl FnMut() + 'static) {
        self.on_game_over = Some(Box::new(hook));
    }

    /// Spawn the first piece and arm gravity. Idempotent.
    pub fn start<R: RenderSink, T: TimerScheduler>(&mut self, render: &mut R, timers: &mut T) {
        if self.started {
            return;
        }
        self.started = true;
        self.spawn(render, timers);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.piece.as_ref()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Deliver a key-down event.
    pub fn handle_key_down<R: RenderSink, T: TimerScheduler>(
        &mut self,
        key: GameKey,
        render: &mut R,
        timers: &mut T,
    ) {
        if self.phase == Phase::GameOver {
            return;
        }
        match key {
            GameKey::MoveLeft => {
                self.left_held = true;
                self.ensure_repeat_timer(timers);
            }
            GameKey::MoveRight => {
                self.right_held = true;
                self.ensure_repeat_timer(timers);
            }
            // Takes effect on the next fall re-arm; a pending timer is not
            // retroactively shortened.
            GameKey::SoftDrop => self.down_held = true,
            GameKey::HardDrop => self.hard_drop(render, timers),
            GameKey::RotateCw => self.rotate(true, render),
            GameKey::RotateCcw => self.rotate(false, render),
        }
    }

    /// Deliver a key-up event.
    pub fn handle_key_up<T: TimerScheduler>(&mut self, key: GameKey, timers: &mut T) {
        if self.phase == Phase::GameOver {
            return;
        }
        match key {
            GameKey::MoveLeft => self.left_held = false,
            GameKey::MoveRight => self.right_held = false,
            GameKey::SoftDrop => self.down_held = false,
            GameKey::HardDrop | GameKey::RotateCw | GameKey::RotateCcw => {}
        }
        if !self.left_held && !self.right_held {
            if let Some(handle) = self.repeat_timer.take() {
                timers.cancel(handle);
            }
        }
    }

    /// Deliver a fired timer. Stale or malformed deliveries are ignored.
    pub fn handle_timer<R: RenderSink, T: TimerScheduler>(
        &mut self,
        event: TimerEvent,
        render: &mut R,
        timers: &mut T,
    ) {
        if self.phase == Phase::GameOver {
            return;
        }
        match event {
            TimerEvent::Fall { generation } => {
                if generation != self.generation {
                    return;
                }
                self.fall_timer = None;
                self.fall_step(render, timers);
            }
            TimerEvent::MoveRepeat => {
                self.repeat_timer = None;
                if !self.left_held && !self.right_held {
                    return;
                }
                // Both directions may be held; each is tried independently.
                if self.left_held {
                    self.try_shift(-1, render);
                }
                if self.right_held {
                    self.try_shift(1, render);
                }
                self.ensure_repeat_timer(timers);
            }
        }
    }

    /// One gravity step: descend a row, or lock / clear / respawn if blocked.
    fn fall_step<R: RenderSink, T: TimerScheduler>(&mut self, render: &mut R, timers: &mut T) {
        let Some(piece) = self.piece else {
            return;
        };

        let below = (piece.origin.0 + 1, piece.origin.1);
        if self.grid.is_valid(&piece.offsets, below) {
            self.commit_piece(piece.offsets, below, render);
            self.arm_fall_timer(timers);
        } else {
            self.lock_and_respawn(render, timers);
        }
    }

    fn try_shift<R: RenderSink>(&mut self, delta_cols: i8, render: &mut R) {
        let Some(piece) = self.piece else {
            return;
        };
        let candidate = (piece.origin.0, piece.origin.1 + delta_cols);
        if self.grid.is_valid(&piece.offsets, candidate) {
            self.commit_piece(piece.offsets, candidate, render);
        }
    }

    fn rotate<R: RenderSink>(&mut self, clockwise: bool, render: &mut R) {
        let Some(piece) = self.piece else {
            return;
        };
        let candidate = rotated(&piece.offsets, piece.kind, clockwise);
        // No kicks: an invalid rotation is silently rejected.
        if self.grid.is_valid(&candidate, piece.origin) {
            self.commit_piece(candidate, piece.origin, render);
        }
    }

    fn hard_drop<R: RenderSink, T: TimerScheduler>(&mut self, render: &mut R, timers: &mut T) {
        let Some(piece) = self.piece.as_mut() else {
            return;
        };
        let distance = self.grid.drop_distance(&piece.offsets, piece.origin);
        piece.origin.0 += distance;
        self.lock_and_respawn(render, timers);
    }

    /// Replace the displayed piece cells and store the new state.
    fn commit_piece<R: RenderSink>(
        &mut self,
        offsets: ShapeCells,
        origin: (i8, i8),
        render: &mut R,
    ) {
        let Some(piece) = self.piece.as_mut() else {
            return;
        };
        for handle in piece.handles {
            render.erase_cell(handle);
        }
        piece.offsets = offsets;
        piece.origin = origin;
        let color = catalog::color(piece.kind);
        let cells = piece.cells();
        for (i, &(row, col)) in cells.iter().enumerate() {
            piece.handles[i] = render.draw_cell(row, col, color);
        }
    }

    /// Convert the piece into grid occupancy, run compaction, spawn the next.
    fn lock_and_respawn<R: RenderSink, T: TimerScheduler>(
        &mut self,
        render: &mut R,
        timers: &mut T,
    ) {
        let Some(piece) = self.piece.take() else {
            return;
        };
        // Rendering transfers to the grid: the piece's sprites go away and the
        // grid draws blocks it owns from here on.
        for handle in piece.handles {
            render.erase_cell(handle);
        }
        self.grid.lock(
            &piece.offsets,
            piece.origin,
            catalog::color(piece.kind),
            render,
        );
        self.grid.clear_completed_rows(render);
        self.spawn(render, timers);
    }

    /// Spawn a random piece at the start column, or end the game if blocked.
    fn spawn<R: RenderSink, T: TimerScheduler>(&mut self, render: &mut R, timers: &mut T) {
        let kind = self.rng.draw_shape();
        let offsets = catalog::base_offsets(kind);
        let origin = (0, self.config.start_column());

        if !self.grid.is_valid(&offsets, origin) {
            self.enter_game_over(timers);
            return;
        }

        let color = catalog::color(kind);
        let mut piece = ActivePiece {
            kind,
            offsets,
            origin,
            handles: [CellHandle::new(0); 4],
        };
        for (i, &(row, col)) in piece.cells().iter().enumerate() {
            piece.handles[i] = render.draw_cell(row, col, color);
        }
        self.piece = Some(piece);
        self.generation = self.generation.wrapping_add(1);
        self.arm_fall_timer(timers);
    }

    /// Cancel-then-reschedule: never leave two fall timers in flight.
    fn arm_fall_timer<T: TimerScheduler>(&mut self, timers: &mut T) {
        if let Some(handle) = self.fall_timer.take() {
            timers.cancel(handle);
        }
        let delay = if self.down_held {
            self.config.fast_fall_interval_ms
        } else {
            self.config.fall_interval_ms
        };
        self.fall_timer = Some(timers.schedule(
            delay,
            TimerEvent::Fall {
                generation: self.generation,
            },
        ));
    }

    fn ensure_repeat_timer<T: TimerScheduler>(&mut self, timers: &mut T) {
        if self.repeat_timer.is_none() {
            self.repeat_timer = Some(
                timers.schedule(self.config.move_repeat_interval_ms, TimerEvent::MoveRepeat),
            );
        }
    }

    fn enter_game_over<T: TimerScheduler>(&mut self, timers: &mut T) {
        self.phase = Phase::GameOver;
        if let Some(handle) = self.fall_timer.take() {
            timers.cancel(handle);
        }
        if let Some(handle) = self.repeat_timer.take() {
            timers.cancel(handle);
        }
        if let Some(mut hook) = self.on_game_over.take() {
            hook();
        }
    }
}
