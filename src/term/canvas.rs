//! TerminalCanvas: a [`RenderSink`] drawing directly to the terminal.
//!
//! Each grid cell is two characters wide so the well looks roughly square.
//! The canvas keeps a slot table mapping handles to screen positions, which
//! lets `move_cell_down` repaint a block at its new position without the
//! caller knowing anything about terminal coordinates.
//!
//! Commands queue into an internal buffer; nothing reaches the terminal until
//! [`TerminalCanvas::flush`] runs. The sink trait cannot surface I/O errors,
//! so a failed queue is held back and reported by the next `flush`.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    style::{Color, Print, ResetColor, SetBackgroundColor},
    terminal, QueueableCommand,
};

use crate::io::RenderSink;
use crate::types::{CellHandle, Rgb};

/// Screen columns per grid cell.
const CELL_WIDTH: u16 = 2;

#[derive(Debug, Clone, Copy)]
struct Slot {
    row: i8,
    col: i8,
    color: Rgb,
}

pub struct TerminalCanvas {
    stdout: io::Stdout,
    buf: Vec<u8>,
    pending_err: Option<io::Error>,
    slots: Vec<Option<Slot>>,
    free: Vec<u32>,
    /// Terminal position of grid cell (0, 0), inside the border.
    origin: (u16, u16),
    columns: u8,
    rows: u8,
}

impl TerminalCanvas {
    pub fn new(columns: u8, rows: u8) -> Self {
        Self {
            stdout: io::stdout(),
            buf: Vec::with_capacity(4096),
            pending_err: None,
            slots: Vec::new(),
            free: Vec::new(),
            origin: (1, 1),
            columns,
            rows,
        }
    }

    /// Switch the terminal into gameplay mode and draw the empty well.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.stdout.queue(terminal::EnterAlternateScreen)?;
        self.stdout.queue(cursor::Hide)?;
        self.stdout.queue(terminal::DisableLineWrap)?;
        // Ask for release events where the terminal supports them; the
        // held-key timeout covers terminals that do not.
        self.stdout.queue(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
        self.stdout.flush()?;
        self.draw_well_border()?;
        self.flush()
    }

    /// Restore the terminal. Safe to call after a failed `enter`.
    pub fn exit(&mut self) -> Result<()> {
        self.stdout.queue(PopKeyboardEnhancementFlags)?;
        self.stdout.queue(ResetColor)?;
        self.stdout.queue(terminal::EnableLineWrap)?;
        self.stdout.queue(cursor::Show)?;
        self.stdout.queue(terminal::LeaveAlternateScreen)?;
        self.stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Push all queued drawing to the terminal.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(err) = self.pending_err.take() {
            self.buf.clear();
            return Err(err.into());
        }
        self.stdout.write_all(&self.buf)?;
        self.buf.clear();
        self.stdout.flush()?;
        Ok(())
    }

    /// Overlay a centered banner on the well once the game ends.
    pub fn draw_game_over(&mut self) -> Result<()> {
        let text = " GAME OVER ";
        let well_width = self.columns as u16 * CELL_WIDTH;
        let x = self.origin.0 + well_width.saturating_sub(text.len() as u16) / 2;
        let y = self.origin.1 + self.rows as u16 / 2;

        self.buf.queue(cursor::MoveTo(x, y))?;
        self.buf.queue(SetBackgroundColor(Color::DarkRed))?;
        self.buf.queue(Print(text))?;
        self.buf.queue(ResetColor)?;
        self.flush()
    }

    fn draw_well_border(&mut self) -> io::Result<()> {
        let inner = self.columns as usize * CELL_WIDTH as usize;
        self.buf.queue(terminal::Clear(terminal::ClearType::All))?;

        self.buf.queue(cursor::MoveTo(0, 0))?;
        self.buf
            .queue(Print(format!("┌{}┐", "─".repeat(inner))))?;
        for row in 0..self.rows as u16 {
            self.buf.queue(cursor::MoveTo(0, row + 1))?;
            self.buf.queue(Print("│"))?;
            self.buf
                .queue(cursor::MoveTo(inner as u16 + 1, row + 1))?;
            self.buf.queue(Print("│"))?;
        }
        self.buf.queue(cursor::MoveTo(0, self.rows as u16 + 1))?;
        self.buf
            .queue(Print(format!("└{}┘", "─".repeat(inner))))?;
        Ok(())
    }

    fn cell_position(&self, row: i8, col: i8) -> (u16, u16) {
        (
            self.origin.0 + col as u16 * CELL_WIDTH,
            self.origin.1 + row as u16,
        )
    }

    fn paint(&mut self, row: i8, col: i8, color: Option<Rgb>) -> io::Result<()> {
        // The well's top is open; cells poking above it have no screen home.
        if row < 0 {
            return Ok(());
        }
        let (x, y) = self.cell_position(row, col);
        self.buf.queue(cursor::MoveTo(x, y))?;
        match color {
            Some(c) => {
                self.buf.queue(SetBackgroundColor(Color::Rgb {
                    r: c.r,
                    g: c.g,
                    b: c.b,
                }))?;
                self.buf.queue(Print("  "))?;
                self.buf.queue(ResetColor)?;
            }
            None => {
                self.buf.queue(Print("  "))?;
            }
        }
        Ok(())
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            if self.pending_err.is_none() {
                self.pending_err = Some(err);
            }
        }
    }
}

impl RenderSink for TerminalCanvas {
    fn draw_cell(&mut self, row: i8, col: i8, color: Rgb) -> CellHandle {
        let result = self.paint(row, col, Some(color));
        self.record(result);

        let slot = Slot { row, col, color };
        match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = Some(slot);
                CellHandle::new(index)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Some(slot));
                CellHandle::new(index)
            }
        }
    }

    fn erase_cell(&mut self, handle: CellHandle) {
        let index = handle.raw() as usize;
        let Some(slot) = self.slots.get_mut(index).and_then(Option::take) else {
            return;
        };
        self.free.push(handle.raw());
        let result = self.paint(slot.row, slot.col, None);
        self.record(result);
    }

    fn move_cell_down(&mut self, handle: CellHandle, delta_rows: i8) {
        let index = handle.raw() as usize;
        let Some(slot) = self.slots.get_mut(index).and_then(|s| s.as_mut()) else {
            return;
        };
        let (old_row, col, color) = (slot.row, slot.col, slot.color);
        slot.row += delta_rows;
        let new_row = slot.row;

        let erase = self.paint(old_row, col, None);
        self.record(erase);
        let draw = self.paint(new_row, col, Some(color));
        self.record(draw);
    }
}
