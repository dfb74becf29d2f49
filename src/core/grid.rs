//! Grid - settled-block occupancy and line-clear compaction.
//!
//! Each occupied cell stores the render handle of its displayed block, so
//! compaction can erase cleared rows and shift retained cells down without a
//! full redraw. Coordinates are (row, col): row 0 is the top, rows grow
//! downward.

use crate::core::catalog::ShapeCells;
use crate::io::RenderSink;
use crate::types::{CellHandle, Rgb};

/// The well. Sized at construction, row-major storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    columns: u8,
    rows: u8,
    /// `Some(handle)` iff the cell holds a locked block.
    cells: Vec<Option<CellHandle>>,
}

impl Grid {
    pub fn new(columns: u8, rows: u8) -> Self {
        Self {
            columns,
            rows,
            cells: vec![None; columns as usize * rows as usize],
        }
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    #[inline(always)]
    fn index(&self, row: i8, col: i8) -> Option<usize> {
        if row < 0 || row >= self.rows as i8 || col < 0 || col >= self.columns as i8 {
            return None;
        }
        Some(row as usize * self.columns as usize + col as usize)
    }

    pub fn is_occupied(&self, row: i8, col: i8) -> bool {
        matches!(self.index(row, col), Some(i) if self.cells[i].is_some())
    }

    /// Render handle stored at a cell, if occupied.
    pub fn handle_at(&self, row: i8, col: i8) -> Option<CellHandle> {
        self.index(row, col).and_then(|i| self.cells[i])
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// True iff every absolute cell of `offsets + origin` is between the side
    /// walls, above the floor, and unoccupied. The top edge is open: cells at
    /// negative rows are fine, matching gravity's one-directional motion (a
    /// tall rotation at the spawn row may poke above the well). A failed check
    /// is routine control flow, not an error.
    pub fn is_valid(&self, offsets: &ShapeCells, origin: (i8, i8)) -> bool {
        offsets.iter().all(|&(dr, dc)| {
            let row = origin.0 + dr;
            let col = origin.1 + dc;
            col >= 0 && col < self.columns as i8 && row < self.rows as i8
                && !self.is_occupied(row, col)
        })
    }

    /// Maximum rows the piece can still descend before hitting the floor or a
    /// settled block: the minimum of each cell's own column-wise limit.
    pub fn drop_distance(&self, offsets: &ShapeCells, origin: (i8, i8)) -> i8 {
        let mut limit = i8::MAX;
        for &(dr, dc) in offsets {
            let row = origin.0 + dr;
            let col = origin.1 + dc;
            let mut d: i8 = 0;
            while row + d + 1 < self.rows as i8 && !self.is_occupied(row + d + 1, col) {
                d += 1;
            }
            limit = limit.min(d);
        }
        if limit == i8::MAX {
            0
        } else {
            limit
        }
    }

    /// Occupy a single cell, drawing its permanent block.
    ///
    /// Returns false (cell untouched) if out of bounds or already occupied.
    /// A cell above the open top is legal but has no storage: it reports
    /// success without drawing anything. Locking goes through here; tests also
    /// use it to set up board states.
    pub fn place<R: RenderSink>(&mut self, row: i8, col: i8, color: Rgb, render: &mut R) -> bool {
        if row < 0 {
            return col >= 0 && col < self.columns as i8;
        }
        match self.index(row, col) {
            Some(i) if self.cells[i].is_none() => {
                self.cells[i] = Some(render.draw_cell(row, col, color));
                true
            }
            _ => false,
        }
    }

    /// Mark every absolute cell occupied and draw its permanent block.
    ///
    /// Callers check `is_valid` first. Cells above the top edge vanish: a
    /// piece locking while poking out of the well keeps only its in-well
    /// cells.
    pub fn lock<R: RenderSink>(
        &mut self,
        offsets: &ShapeCells,
        origin: (i8, i8),
        color: Rgb,
        render: &mut R,
    ) {
        for &(dr, dc) in offsets {
            self.place(origin.0 + dr, origin.1 + dc, color, render);
        }
    }

    /// Remove every completed row and shift the rows above down, in place.
    ///
    /// Scans from the bottom up. A completed row is processed without moving
    /// the scan index, so the row shifted into its place is re-examined; this
    /// is what makes consecutive full rows (up to a 4-row clear) come out in a
    /// single pass. Returns the number of rows cleared.
    pub fn clear_completed_rows<R: RenderSink>(&mut self, render: &mut R) -> usize {
        let mut cleared = 0;
        let mut row = self.rows as i8 - 1;
        while row >= 0 {
            if self.row_full(row) {
                self.remove_row(row, render);
                cleared += 1;
            } else {
                row -= 1;
            }
        }
        cleared
    }

    fn row_full(&self, row: i8) -> bool {
        (0..self.columns as i8).all(|col| self.is_occupied(row, col))
    }

    /// Erase one row's blocks, then shift every row above it down by one (both
    /// occupancy and render position) and clear the vacated top row.
    fn remove_row<R: RenderSink>(&mut self, row: i8, render: &mut R) {
        for col in 0..self.columns as i8 {
            if let Some(i) = self.index(row, col) {
                if let Some(handle) = self.cells[i].take() {
                    render.erase_cell(handle);
                }
            }
        }

        for r in (1..=row).rev() {
            for col in 0..self.columns as i8 {
                let src = self.index(r - 1, col).expect("row in range");
                let dst = self.index(r, col).expect("row in range");
                let cell = self.cells[src];
                if let Some(handle) = cell {
                    render.move_cell_down(handle, 1);
                }
                self.cells[dst] = cell;
            }
        }

        for col in 0..self.columns as i8 {
            let top = self.index(0, col).expect("row 0 in range");
            self.cells[top] = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryRender;
    use crate::types::Rgb;

    fn fill_row(grid: &mut Grid, render: &mut MemoryRender, row: i8, cols: std::ops::Range<i8>) {
        for col in cols {
            assert!(grid.place(row, col, Rgb::default(), render));
        }
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(10, 20);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.columns(), 10);
        assert_eq!(grid.rows(), 20);
    }

    #[test]
    fn test_is_valid_bounds() {
        let grid = Grid::new(10, 20);
        let square: ShapeCells = [(0, 0), (0, 1), (1, 0), (1, 1)];

        assert!(grid.is_valid(&square, (0, 0)));
        assert!(grid.is_valid(&square, (18, 8)));
        // Past the right wall, below the floor, past the left wall.
        assert!(!grid.is_valid(&square, (0, 9)));
        assert!(!grid.is_valid(&square, (19, 0)));
        assert!(!grid.is_valid(&square, (0, -1)));
        // The top edge is open.
        assert!(grid.is_valid(&square, (-1, 0)));
        assert!(grid.is_valid(&square, (-2, 4)));
    }

    #[test]
    fn test_is_valid_rejects_exactly_walls_floor_and_collisions() {
        let mut grid = Grid::new(10, 20);
        let mut render = MemoryRender::new();
        assert!(grid.place(10, 5, Rgb::default(), &mut render));

        let single: ShapeCells = [(0, 0), (0, 0), (0, 0), (0, 0)];
        for row in -2i8..22 {
            for col in -2i8..12 {
                let expect = col >= 0 && col < 10 && row < 20 && !(row == 10 && col == 5);
                assert_eq!(
                    grid.is_valid(&single, (row, col)),
                    expect,
                    "({row}, {col})"
                );
            }
        }
    }

    #[test]
    fn test_place_rejects_occupied_and_out_of_bounds() {
        let mut grid = Grid::new(10, 20);
        let mut render = MemoryRender::new();

        assert!(grid.place(5, 5, Rgb::default(), &mut render));
        assert!(!grid.place(5, 5, Rgb::default(), &mut render));
        assert!(!grid.place(0, -1, Rgb::default(), &mut render));
        assert!(!grid.place(0, 10, Rgb::default(), &mut render));
        assert!(!grid.place(20, 0, Rgb::default(), &mut render));
        // Above the open top: reported success, nothing stored or drawn.
        assert!(grid.place(-1, 0, Rgb::default(), &mut render));
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(render.draw_calls(), 1);
    }

    #[test]
    fn test_lock_above_top_keeps_only_in_well_cells() {
        let mut grid = Grid::new(10, 20);
        let mut render = MemoryRender::new();
        // Vertical bar whose top cell pokes above the well.
        let bar: ShapeCells = [(-1, 0), (0, 0), (1, 0), (2, 0)];

        grid.lock(&bar, (0, 5), Rgb::default(), &mut render);
        assert_eq!(grid.occupied_count(), 3);
        assert!(grid.is_occupied(0, 5));
        assert!(grid.is_occupied(2, 5));
        assert_eq!(render.draw_calls(), 3);
    }

    #[test]
    fn test_lock_then_collide() {
        let mut grid = Grid::new(10, 20);
        let mut render = MemoryRender::new();
        let square: ShapeCells = [(0, 0), (0, 1), (1, 0), (1, 1)];

        grid.lock(&square, (18, 4), Rgb::new(9, 9, 9), &mut render);
        assert_eq!(grid.occupied_count(), 4);
        assert!(grid.is_occupied(18, 4));
        assert!(grid.is_occupied(19, 5));
        assert!(grid.handle_at(18, 4).is_some());

        assert!(!grid.is_valid(&square, (18, 4)));
        assert!(!grid.is_valid(&square, (17, 5)));
        assert!(grid.is_valid(&square, (18, 6)));
    }

    #[test]
    fn test_drop_distance_empty_well() {
        let grid = Grid::new(10, 20);
        let flat_i: ShapeCells = [(0, 0), (0, 1), (0, 2), (0, 3)];
        assert_eq!(grid.drop_distance(&flat_i, (0, 3)), 19);

        let square: ShapeCells = [(0, 0), (0, 1), (1, 0), (1, 1)];
        assert_eq!(grid.drop_distance(&square, (0, 4)), 18);
    }

    #[test]
    fn test_drop_distance_binding_column() {
        let mut grid = Grid::new(10, 20);
        let mut render = MemoryRender::new();
        // A single block high in one column binds the whole piece.
        assert!(grid.place(10, 4, Rgb::default(), &mut render));

        let flat_i: ShapeCells = [(0, 0), (0, 1), (0, 2), (0, 3)];
        assert_eq!(grid.drop_distance(&flat_i, (0, 3)), 9);
    }

    #[test]
    fn test_single_row_clear_and_shift() {
        let mut grid = Grid::new(10, 20);
        let mut render = MemoryRender::new();
        fill_row(&mut grid, &mut render, 19, 0..10);
        // One marker block above the full row.
        assert!(grid.place(17, 2, Rgb::default(), &mut render));
        let marker = grid.handle_at(17, 2).unwrap();

        let cleared = grid.clear_completed_rows(&mut render);
        assert_eq!(cleared, 1);
        assert_eq!(grid.occupied_count(), 1);
        assert!(grid.is_occupied(18, 2));
        assert!(!grid.is_occupied(17, 2));
        // Same handle, shifted down once, still displayed at the new position.
        assert_eq!(grid.handle_at(18, 2), Some(marker));
        assert_eq!(render.sprite_pos(marker), Some((18, 2)));
        assert_eq!(render.live_cells(), vec![(18, 2)]);
    }

    #[test]
    fn test_clear_returns_to_empty_when_row_was_only_occupancy() {
        let mut grid = Grid::new(10, 20);
        let mut render = MemoryRender::new();
        fill_row(&mut grid, &mut render, 19, 0..10);

        assert_eq!(grid.clear_completed_rows(&mut render), 1);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(render.live_count(), 0);
    }

    #[test]
    fn test_four_row_tetris_clears_in_one_pass() {
        let mut grid = Grid::new(10, 20);
        let mut render = MemoryRender::new();
        for row in 16..20 {
            fill_row(&mut grid, &mut render, row, 0..10);
        }
        assert!(grid.place(15, 0, Rgb::default(), &mut render));
        let marker = grid.handle_at(15, 0).unwrap();

        let cleared = grid.clear_completed_rows(&mut render);
        assert_eq!(cleared, 4);
        assert_eq!(grid.occupied_count(), 1);
        // Marker dropped by all four cleared rows, one shift per pass.
        assert!(grid.is_occupied(19, 0));
        assert_eq!(render.sprite_pos(marker), Some((19, 0)));
    }

    #[test]
    fn test_incomplete_row_not_cleared() {
        let mut grid = Grid::new(10, 20);
        let mut render = MemoryRender::new();
        fill_row(&mut grid, &mut render, 19, 0..9);
        assert_eq!(grid.clear_completed_rows(&mut render), 0);
        assert_eq!(grid.occupied_count(), 9);
    }

    #[test]
    fn test_separated_full_rows_both_clear() {
        let mut grid = Grid::new(10, 20);
        let mut render = MemoryRender::new();
        fill_row(&mut grid, &mut render, 19, 0..10);
        fill_row(&mut grid, &mut render, 17, 0..10);
        // Partial row between them.
        fill_row(&mut grid, &mut render, 18, 0..3);

        assert_eq!(grid.clear_completed_rows(&mut render), 2);
        assert_eq!(grid.occupied_count(), 3);
        // The partial row ends up at the bottom.
        assert!(grid.is_occupied(19, 0));
        assert!(grid.is_occupied(19, 1));
        assert!(grid.is_occupied(19, 2));
    }

    #[test]
    fn test_compaction_moves_handles_instead_of_redrawing() {
        let mut grid = Grid::new(10, 20);
        let mut render = MemoryRender::new();
        fill_row(&mut grid, &mut render, 19, 0..10);
        assert!(grid.place(18, 5, Rgb::default(), &mut render));

        let draws_before = render.draw_calls();
        grid.clear_completed_rows(&mut render);
        // Retained cell was shifted, not redrawn.
        assert_eq!(render.draw_calls(), draws_before);
        assert_eq!(render.move_calls(), 1);
        assert_eq!(render.erase_calls(), 10);
    }
}
