//! Spawn policy: where and what new tile appears after a successful move.

use rand::Rng;

use crate::grid::{Grid, Tile};

/// Probability that a spawned tile is a 2 (otherwise a 4).
pub const TWO_PROBABILITY: f32 = 0.9;

/// Place one new tile in a uniformly chosen empty cell of a fresh copy of
/// `grid`: 2 with probability 0.9, 4 otherwise, merge flag clear.
///
/// A full board is returned unchanged; that is the caller's signal to run
/// the terminal check rather than an error.
pub fn spawn_tile<R: Rng>(grid: &Grid, rng: &mut R) -> Grid {
    let empties = grid.empty_cells();
    if empties.is_empty() {
        return *grid;
    }

    let (row, col) = empties[rng.gen_range(0..empties.len())];
    let value = if rng.gen::<f32>() < TWO_PROBABILITY {
        2
    } else {
        4
    };

    let mut next = *grid;
    next.set(row, col, Some(Tile::new(value)));
    next
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SIZE;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_adds_exactly_one_tile() {
        let mut rng = SmallRng::seed_from_u64(7);
        let grid = Grid::from_values([
            [2, 0, 0, 0],
            [0, 4, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 8],
        ]);
        let next = spawn_tile(&grid, &mut rng);
        assert_eq!(next.empty_cells().len(), grid.empty_cells().len() - 1);
    }

    #[test]
    fn test_spawn_never_overwrites() {
        let mut rng = SmallRng::seed_from_u64(99);
        let grid = Grid::from_values([
            [2, 4, 8, 16],
            [32, 64, 0, 2],
            [4, 8, 16, 32],
            [64, 2, 4, 0],
        ]);
        for _ in 0..50 {
            let next = spawn_tile(&grid, &mut rng);
            for row in 0..SIZE {
                for col in 0..SIZE {
                    if grid.get(row, col).is_some() {
                        assert_eq!(next.get(row, col), grid.get(row, col));
                    }
                }
            }
        }
    }

    #[test]
    fn test_spawn_value_is_two_or_four() {
        let mut rng = SmallRng::seed_from_u64(3);
        let grid = Grid::empty();
        let mut saw_two = false;
        let mut saw_four = false;
        for _ in 0..200 {
            let next = spawn_tile(&grid, &mut rng);
            let tile = (0..SIZE)
                .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
                .find_map(|(r, c)| next.get(r, c))
                .unwrap();
            assert!(tile.value == 2 || tile.value == 4);
            assert!(!tile.merged);
            saw_two |= tile.value == 2;
            saw_four |= tile.value == 4;
        }
        // With 200 draws both values should appear.
        assert!(saw_two && saw_four);
    }

    #[test]
    fn test_spawn_full_board_unchanged() {
        let mut rng = SmallRng::seed_from_u64(1);
        let grid = Grid::from_values([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ]);
        assert_eq!(spawn_tile(&grid, &mut rng), grid);
    }

    #[test]
    fn test_spawn_determinism() {
        let grid = Grid::empty();
        let mut rng1 = SmallRng::seed_from_u64(12345);
        let mut rng2 = SmallRng::seed_from_u64(12345);
        assert_eq!(spawn_tile(&grid, &mut rng1), spawn_tile(&grid, &mut rng2));
    }
}
