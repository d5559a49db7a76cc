//! Grid data model and orientation adapter.
//!
//! The board is a 4x4 array of cells in row-major order. Grids are `Copy`
//! values: every transformation returns a fresh grid, so callers never
//! share mutable board state. Directional moves are expressed elsewhere as
//! "rotate so the target direction faces left, collapse, rotate back",
//! which keeps all merge logic in a single left-collapse routine.

use serde::{Deserialize, Serialize};

/// Board side length. The algorithms generalize to NxN but the game is 4x4.
pub const SIZE: usize = 4;

/// An occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Tile value, a positive power of two (2, 4, 8, ...).
    pub value: u32,
    /// True only during the turn this tile was produced by a merge.
    /// A presentation hint; no game logic reads it.
    pub merged: bool,
}

impl Tile {
    /// A freshly placed or slid tile.
    pub fn new(value: u32) -> Tile {
        Tile {
            value,
            merged: false,
        }
    }

    /// A tile produced by merging two equal tiles this turn.
    pub fn merged(value: u32) -> Tile {
        Tile {
            value,
            merged: true,
        }
    }
}

/// One board cell: empty or a tile.
pub type Cell = Option<Tile>;

/// The 4x4 board, row-major (`grid.get(row, col)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: [[Cell; SIZE]; SIZE],
}

impl Grid {
    /// An all-empty grid.
    pub fn empty() -> Grid {
        Grid {
            cells: [[None; SIZE]; SIZE],
        }
    }

    /// Build a grid from raw values; 0 means empty. Merge flags start false.
    pub fn from_values(values: [[u32; SIZE]; SIZE]) -> Grid {
        let mut grid = Grid::empty();
        for row in 0..SIZE {
            for col in 0..SIZE {
                if values[row][col] != 0 {
                    grid.cells[row][col] = Some(Tile::new(values[row][col]));
                }
            }
        }
        grid
    }

    /// Merge-flag-free projection of the board; 0 means empty.
    ///
    /// `changed` detection compares these, so a move that only touches
    /// merge flags does not count as a board change.
    pub fn values(&self) -> [[u32; SIZE]; SIZE] {
        let mut values = [[0; SIZE]; SIZE];
        for row in 0..SIZE {
            for col in 0..SIZE {
                if let Some(tile) = self.cells[row][col] {
                    values[row][col] = tile.value;
                }
            }
        }
        values
    }

    /// Get the cell at (row, col). Panics on out-of-range indices.
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Set the cell at (row, col). Panics on out-of-range indices.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row][col] = cell;
    }

    /// Copy of one row, left to right.
    pub fn row(&self, row: usize) -> [Cell; SIZE] {
        self.cells[row]
    }

    /// Replace one row.
    pub fn set_row(&mut self, row: usize, cells: [Cell; SIZE]) {
        self.cells[row] = cells;
    }

    /// Rotate the grid 90 degrees clockwise, `n` times (taken mod 4).
    ///
    /// Rotating by `n` and then by `(4 - n) % 4` reproduces the original
    /// grid exactly, merge flags included.
    pub fn rotate_cw(&self, n: usize) -> Grid {
        let mut rotated = *self;
        for _ in 0..(n % 4) {
            let mut next = Grid::empty();
            for row in 0..SIZE {
                for col in 0..SIZE {
                    next.cells[col][SIZE - 1 - row] = rotated.cells[row][col];
                }
            }
            rotated = next;
        }
        rotated
    }

    /// Clear every `merged` flag. Run once per turn before the grid is
    /// considered settled for the next input.
    pub fn reset_merge_flags(&self) -> Grid {
        let mut cleared = *self;
        for row in 0..SIZE {
            for col in 0..SIZE {
                if let Some(tile) = cleared.cells[row][col].as_mut() {
                    tile.merged = false;
                }
            }
        }
        cleared
    }

    /// Coordinates of all empty cells, row-major order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut empties = Vec::new();
        for row in 0..SIZE {
            for col in 0..SIZE {
                if self.cells[row][col].is_none() {
                    empties.push((row, col));
                }
            }
        }
        empties
    }

    /// The largest tile value on the board, or 0 if empty.
    pub fn max_value(&self) -> u32 {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .map(|tile| tile.value)
            .max()
            .unwrap_or(0)
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "+------+------+------+------+")?;
        for row in 0..SIZE {
            write!(f, "|")?;
            for col in 0..SIZE {
                match self.cells[row][col] {
                    Some(tile) => write!(f, "{:^6}|", tile.value)?,
                    None => write!(f, "      |")?,
                }
            }
            writeln!(f)?;
            writeln!(f, "+------+------+------+------+")?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
