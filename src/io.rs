//! Collaborator contracts between the core and its host.
//!
//! The core never draws or sleeps on its own. It emits render commands through
//! [`RenderSink`] and arms one-shot timers through [`TimerScheduler`]; the host
//! owns the real terminal and the real clock. Two reusable implementations live
//! here as well: [`MemoryRender`], a headless sink used by tests and benches,
//! and [`TimerQueue`], the deadline-ordered scheduler the terminal host drains.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;

use crate::types::{CellHandle, Rgb, TimerEvent, TimerHandle};

/// Render collaborator: draw, erase, and shift displayed cells.
///
/// Handles are opaque to the caller; only the sink that minted a handle can
/// interpret it.
pub trait RenderSink {
    fn draw_cell(&mut self, row: i8, col: i8, color: Rgb) -> CellHandle;
    fn erase_cell(&mut self, handle: CellHandle);
    /// Shift a displayed cell downward. Used during compaction so retained
    /// cells keep their render identity instead of being redrawn.
    fn move_cell_down(&mut self, handle: CellHandle, delta_rows: i8);
}

/// Timer collaborator: one-shot callbacks delivered as [`TimerEvent`]s.
pub trait TimerScheduler {
    fn schedule(&mut self, delay_ms: u32, event: TimerEvent) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Sprite {
    row: i8,
    col: i8,
    color: Rgb,
}

/// In-memory render sink.
///
/// Tracks live sprite positions and counts command traffic so tests can assert
/// on both the final picture and how it was produced.
#[derive(Debug, Default)]
pub struct MemoryRender {
    sprites: Vec<Option<Sprite>>,
    draw_calls: usize,
    erase_calls: usize,
    move_calls: usize,
}

impl MemoryRender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of a live sprite, if the handle is still displayed.
    pub fn sprite_pos(&self, handle: CellHandle) -> Option<(i8, i8)> {
        self.sprites
            .get(handle.raw() as usize)
            .copied()
            .flatten()
            .map(|s| (s.row, s.col))
    }

    /// All live sprite positions, unordered.
    pub fn live_cells(&self) -> Vec<(i8, i8)> {
        self.sprites
            .iter()
            .filter_map(|s| s.map(|s| (s.row, s.col)))
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.sprites.iter().filter(|s| s.is_some()).count()
    }

    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    pub fn erase_calls(&self) -> usize {
        self.erase_calls
    }

    pub fn move_calls(&self) -> usize {
        self.move_calls
    }
}

impl RenderSink for MemoryRender {
    fn draw_cell(&mut self, row: i8, col: i8, color: Rgb) -> CellHandle {
        self.draw_calls += 1;
        let handle = CellHandle::new(self.sprites.len() as u32);
        self.sprites.push(Some(Sprite { row, col, color }));
        handle
    }

    fn erase_cell(&mut self, handle: CellHandle) {
        self.erase_calls += 1;
        if let Some(slot) = self.sprites.get_mut(handle.raw() as usize) {
            *slot = None;
        }
    }

    fn move_cell_down(&mut self, handle: CellHandle, delta_rows: i8) {
        self.move_calls += 1;
        if let Some(Some(sprite)) = self.sprites.get_mut(handle.raw() as usize) {
            sprite.row += delta_rows;
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    deadline: Instant,
    handle: TimerHandle,
    event: TimerEvent,
}

/// Deadline-ordered one-shot timer queue.
///
/// `schedule` resolves delays against the queue's own notion of "now", which
/// the host advances from the wall clock and tests advance manually. At most a
/// handful of timers are ever pending, so storage is a flat Vec.
#[derive(Debug)]
pub struct TimerQueue {
    now: Instant,
    next_handle: u64,
    entries: Vec<TimerEntry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            now: Instant::now(),
            next_handle: 1,
            entries: Vec::new(),
        }
    }

    /// Move the clock forward to `now`. Never moves backwards.
    pub fn advance_to(&mut self, now: Instant) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Move the clock forward by a fixed amount (test driver).
    pub fn advance_ms(&mut self, ms: u64) {
        self.now += Duration::from_millis(ms);
    }

    /// Time until the earliest pending deadline, zero if already due.
    pub fn until_next(&self) -> Option<Duration> {
        self.entries
            .iter()
            .map(|e| e.deadline.saturating_duration_since(self.now))
            .min()
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Remove and return due events in deadline order.
    ///
    /// Returns at most a small batch; anything left over stays queued for the
    /// next drain.
    pub fn drain_due(&mut self) -> ArrayVec<TimerEvent, 8> {
        let mut due = ArrayVec::new();
        while !due.is_full() {
            let earliest = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.deadline <= self.now)
                .min_by_key(|(_, e)| e.deadline)
                .map(|(i, _)| i);
            match earliest {
                Some(i) => due.push(self.entries.swap_remove(i).event),
                None => break,
            }
        }
        due
    }
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerScheduler for TimerQueue {
    fn schedule(&mut self, delay_ms: u32, event: TimerEvent) -> TimerHandle {
        let handle = TimerHandle::new(self.next_handle);
        self.next_handle += 1;
        self.entries.push(TimerEntry {
            deadline: self.now + Duration::from_millis(delay_ms as u64),
            handle,
            event,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.entries.retain(|e| e.handle != handle);
    }
}
