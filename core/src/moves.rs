//! Move engine: line collapse, directional orchestration, terminal check.
//!
//! All merge arithmetic lives in `collapse_row`, which only knows how to
//! slide a row toward index 0. `apply_move` handles the other three
//! directions by rotating the grid so the requested direction faces left,
//! collapsing every row, and rotating back.

use crate::grid::{Cell, Grid, Tile, SIZE};

/// The four possible move directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    /// Convert a u8 to a Direction (0=Up, 1=Down, 2=Left, 3=Right).
    /// Returns None for invalid values.
    pub fn from_u8(value: u8) -> Option<Direction> {
        match value {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            2 => Some(Direction::Left),
            3 => Some(Direction::Right),
            _ => None,
        }
    }

    /// Get all four directions.
    pub fn all() -> [Direction; 4] {
        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
    }

    /// Clockwise quarter-turns that bring this direction to face left.
    fn rotations(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Down => 1,
            Direction::Right => 2,
            Direction::Up => 3,
        }
    }
}

/// Result of attempting one directional move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The resulting grid, produced even when nothing moved.
    pub grid: Grid,
    /// Whether any cell's value changed (merge flags don't count).
    pub changed: bool,
    /// Sum of merge products created by this move.
    pub score_delta: u32,
}

/// Slide one row toward index 0 and merge equal adjacent pairs.
///
/// Scans left to right; each cell merges at most once per move, so
/// `[v, v, v]` collapses to `[2v, v]` and `[v, v, v, v]` to `[2v, 2v]`.
/// Merged output tiles carry the `merged` flag; every other output tile
/// has it cleared. Returns the new row and the points earned.
fn collapse_row(row: [Cell; SIZE]) -> ([Cell; SIZE], u32) {
    let values: Vec<u32> = row.iter().flatten().map(|tile| tile.value).collect();

    let mut out = [None; SIZE];
    let mut score = 0;
    let mut write = 0;
    let mut read = 0;
    while read < values.len() {
        if read + 1 < values.len() && values[read] == values[read + 1] {
            let merged = values[read] * 2;
            out[write] = Some(Tile::merged(merged));
            score += merged;
            read += 2;
        } else {
            out[write] = Some(Tile::new(values[read]));
            read += 1;
        }
        write += 1;
    }

    (out, score)
}

fn row_values(row: &[Cell; SIZE]) -> [u32; SIZE] {
    let mut values = [0; SIZE];
    for (slot, cell) in values.iter_mut().zip(row.iter()) {
        if let Some(tile) = cell {
            *slot = tile.value;
        }
    }
    values
}

/// Apply a move in the given direction, returning a fresh grid.
///
/// The input grid is never mutated. When `changed` is false the returned
/// grid holds the same values as the input and callers should treat the
/// move as a no-op: no spawn, no history push, no persistence write.
pub fn apply_move(grid: &Grid, direction: Direction) -> MoveOutcome {
    let n = direction.rotations();
    let aligned = grid.rotate_cw(n);

    let mut collapsed = Grid::empty();
    let mut changed = false;
    let mut score_delta = 0;
    for row in 0..SIZE {
        let before = aligned.row(row);
        let (after, score) = collapse_row(before);
        changed |= row_values(&before) != row_values(&after);
        score_delta += score;
        collapsed.set_row(row, after);
    }

    MoveOutcome {
        grid: collapsed.rotate_cw((4 - n) % 4),
        changed,
        score_delta,
    }
}

/// Check whether no legal move remains in any direction.
///
/// False as soon as an empty cell is found. Otherwise the board is full,
/// and a move is possible iff some adjacent pair holds equal values, so
/// scanning each cell's right and down neighbors is exact.
pub fn is_game_over(grid: &Grid) -> bool {
    for row in 0..SIZE {
        for col in 0..SIZE {
            let tile = match grid.get(row, col) {
                Some(tile) => tile,
                None => return false,
            };
            if col + 1 < SIZE {
                if let Some(right) = grid.get(row, col + 1) {
                    if right.value == tile.value {
                        return false;
                    }
                }
            }
            if row + 1 < SIZE {
                if let Some(down) = grid.get(row + 1, col) {
                    if down.value == tile.value {
                        return false;
                    }
                }
            }
        }
    }
    true
}

// =============================================================================
// Tests
// =============================================================================
