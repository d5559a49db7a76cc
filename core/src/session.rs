//! Session controller: score, undo history, win/loss flags, persistence.
//!
//! `Session` is the only stateful piece of the crate. It drives the pure
//! move engine in response to external requests, owns the spawn RNG, and
//! writes grid/score/best to its `Store` after every accepted mutation.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde_json::json;

use crate::grid::Grid;
use crate::moves::{apply_move, is_game_over, Direction};
use crate::spawn::spawn_tile;
use crate::store::{Store, BEST_KEY, GRID_KEY, SCORE_KEY};

/// Session-level tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Tile value that wins the game. Reaching it freezes further moves.
    pub win_value: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig { win_value: 128 }
    }
}

/// Result of asking a session to execute one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// Whether the board changed (and a new tile was spawned).
    pub changed: bool,
    /// Points earned from merges in this move.
    pub score_delta: u32,
    /// Whether no legal moves remain.
    pub game_over: bool,
    /// Whether the win tile is on the board.
    pub won: bool,
}

#[derive(Debug, Clone, Copy)]
struct Snapshot {
    grid: Grid,
    score: u32,
}

/// One play session: current grid, scores, and unbounded undo history.
pub struct Session<S: Store> {
    grid: Grid,
    score: u32,
    best: u32,
    history: Vec<Snapshot>,
    game_over: bool,
    won: bool,
    config: SessionConfig,
    rng: SmallRng,
    store: S,
}

impl<S: Store> Session<S> {
    /// Create a session, restoring a saved game from `store` when one
    /// exists, otherwise starting fresh with two spawned tiles.
    pub fn new(config: SessionConfig, seed: u64, store: S) -> Session<S> {
        let mut rng = SmallRng::seed_from_u64(seed);

        let saved_grid: Option<Grid> = store
            .get(GRID_KEY)
            .and_then(|value| serde_json::from_value(value).ok());
        let (grid, score) = match saved_grid {
            Some(grid) => {
                let score = store
                    .get(SCORE_KEY)
                    .and_then(|value| serde_json::from_value(value).ok())
                    .unwrap_or(0);
                (grid, score)
            }
            None => {
                let grid = Grid::empty();
                let grid = spawn_tile(&grid, &mut rng);
                let grid = spawn_tile(&grid, &mut rng);
                (grid, 0)
            }
        };

        let best: u32 = store
            .get(BEST_KEY)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or(0);

        let mut session = Session {
            grid,
            score,
            best: best.max(score),
            history: Vec::new(),
            game_over: false,
            won: false,
            config,
            rng,
            store,
        };
        session.won = session.grid.max_value() >= session.config.win_value;
        session.game_over = is_game_over(&session.grid);
        session.persist();
        session
    }

    /// Execute a move in the given direction.
    ///
    /// A move that changes nothing, or a session that is already won or
    /// over, is a silent no-op: no spawn, no history push, no persistence
    /// write.
    pub fn step(&mut self, direction: Direction) -> StepOutcome {
        if self.game_over || self.won {
            return StepOutcome {
                changed: false,
                score_delta: 0,
                game_over: self.game_over,
                won: self.won,
            };
        }

        let settled = self.grid.reset_merge_flags();
        let outcome = apply_move(&settled, direction);
        if !outcome.changed {
            return StepOutcome {
                changed: false,
                score_delta: 0,
                game_over: false,
                won: false,
            };
        }

        self.history.push(Snapshot {
            grid: settled,
            score: self.score,
        });
        self.grid = spawn_tile(&outcome.grid, &mut self.rng);
        self.score += outcome.score_delta;
        self.best = self.best.max(self.score);
        self.won = self.grid.max_value() >= self.config.win_value;
        self.game_over = is_game_over(&self.grid);
        self.persist();

        StepOutcome {
            changed: true,
            score_delta: outcome.score_delta,
            game_over: self.game_over,
            won: self.won,
        }
    }

    /// Rewind one move, restoring grid and score. Returns false (and
    /// changes nothing) when the history is empty. Best score is kept.
    pub fn undo(&mut self) -> bool {
        let snapshot = match self.history.pop() {
            Some(snapshot) => snapshot,
            None => return false,
        };
        self.grid = snapshot.grid;
        self.score = snapshot.score;
        self.won = self.grid.max_value() >= self.config.win_value;
        self.game_over = is_game_over(&self.grid);
        self.persist();
        true
    }

    /// Start over: fresh two-tile grid, score 0, empty history. The best
    /// score survives.
    pub fn new_game(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
        let grid = Grid::empty();
        let grid = spawn_tile(&grid, &mut self.rng);
        self.grid = spawn_tile(&grid, &mut self.rng);
        self.score = 0;
        self.history.clear();
        self.won = self.grid.max_value() >= self.config.win_value;
        self.game_over = is_game_over(&self.grid);
        self.persist();
    }

    /// Which directions would change the board, as [Up, Down, Left, Right].
    pub fn legal_moves(&self) -> [bool; 4] {
        let settled = self.grid.reset_merge_flags();
        let mut legal = [false; 4];
        for (slot, direction) in legal.iter_mut().zip(Direction::all()) {
            *slot = apply_move(&settled, direction).changed;
        }
        legal
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// The largest tile value on the board.
    pub fn max_tile(&self) -> u32 {
        self.grid.max_value()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn has_won(&self) -> bool {
        self.won
    }

    /// Number of moves that can still be undone.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) {
        if let Ok(value) = serde_json::to_value(self.grid) {
            self.store.set(GRID_KEY, value);
        }
        self.store.set(SCORE_KEY, json!(self.score));
        self.store.set(BEST_KEY, json!(self.best));
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Tile, SIZE};
    use crate::store::MemoryStore;

    fn fresh(seed: u64) -> Session<MemoryStore> {
        Session::new(SessionConfig::default(), seed, MemoryStore::default())
    }

    fn with_grid(grid: Grid) -> Session<MemoryStore> {
        let mut store = MemoryStore::default();
        store.set(GRID_KEY, serde_json::to_value(grid).unwrap());
        Session::new(SessionConfig::default(), 0, store)
    }

    fn tile_count(grid: &Grid) -> usize {
        SIZE * SIZE - grid.empty_cells().len()
    }

    // -------------------------------------------------------------------------
    // Lifecycle tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_new_game_starts_with_two_tiles() {
        let session = fresh(42);
        assert_eq!(tile_count(session.grid()), 2);
        assert_eq!(session.score(), 0);
        assert!(!session.is_game_over());
        assert!(!session.has_won());
    }

    #[test]
    fn test_same_seed_same_start() {
        let a = fresh(12345);
        let b = fresh(12345);
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn test_step_determinism() {
        let mut a = fresh(54321);
        let mut b = fresh(54321);
        for direction in [
            Direction::Left,
            Direction::Up,
            Direction::Right,
            Direction::Down,
        ] {
            a.step(direction);
            b.step(direction);
            assert_eq!(a.grid(), b.grid());
            assert_eq!(a.score(), b.score());
        }
    }

    #[test]
    fn test_new_game_keeps_best() {
        let mut session = with_grid(Grid::from_values([
            [2, 2, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]));
        session.step(Direction::Left);
        assert_eq!(session.best(), 4);

        session.new_game(7);
        assert_eq!(session.score(), 0);
        assert_eq!(session.best(), 4);
        assert_eq!(session.history_len(), 0);
        assert_eq!(tile_count(session.grid()), 2);
    }

    // -------------------------------------------------------------------------
    // Step tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_accepted_move_spawns_and_scores() {
        let mut session = with_grid(Grid::from_values([
            [2, 2, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]));
        let outcome = session.step(Direction::Left);
        assert!(outcome.changed);
        assert_eq!(outcome.score_delta, 4);
        assert_eq!(session.score(), 4);
        // Merged tile plus the spawn.
        assert_eq!(tile_count(session.grid()), 2);
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn test_rejected_move_is_silent() {
        let mut session = with_grid(Grid::from_values([
            [2, 0, 0, 0],
            [4, 0, 0, 0],
            [8, 0, 0, 0],
            [16, 0, 0, 0],
        ]));
        let before = *session.grid();
        let outcome = session.step(Direction::Left);
        assert!(!outcome.changed);
        assert_eq!(outcome.score_delta, 0);
        assert_eq!(*session.grid(), before);
        assert_eq!(session.history_len(), 0);
    }

    #[test]
    fn test_merge_flags_cleared_before_next_move() {
        let mut session = with_grid(Grid::from_values([
            [2, 2, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]));
        session.step(Direction::Left);
        let flagged = (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .filter_map(|(r, c)| session.grid().get(r, c))
            .filter(|t| t.merged)
            .count();
        assert_eq!(flagged, 1);

        // The next accepted move settles the board first, so undoing it
        // restores a snapshot with every flag cleared.
        let legal = session.legal_moves();
        let direction = Direction::all()[legal.iter().position(|&l| l).unwrap()];
        session.step(direction);
        session.undo();
        let stale = (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .filter_map(|(r, c)| session.grid().get(r, c))
            .filter(|t| t.merged)
            .count();
        assert_eq!(stale, 0);
    }

    #[test]
    fn test_legal_moves_match_step() {
        let session = fresh(42);
        let legal = session.legal_moves();
        assert!(legal.iter().any(|&l| l));
    }

    // -------------------------------------------------------------------------
    // Undo tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_undo_restores_grid_and_score() {
        let mut session = fresh(42);
        let grid_before = session.grid().reset_merge_flags();
        let score_before = session.score();

        let legal = session.legal_moves();
        let direction = Direction::all()[legal.iter().position(|&l| l).unwrap()];
        session.step(direction);
        assert_ne!(session.grid().values(), grid_before.values());

        assert!(session.undo());
        assert_eq!(*session.grid(), grid_before);
        assert_eq!(session.score(), score_before);
        assert_eq!(session.history_len(), 0);
    }

    #[test]
    fn test_undo_empty_history_is_silent() {
        let mut session = fresh(42);
        let before = *session.grid();
        assert!(!session.undo());
        assert_eq!(*session.grid(), before);
    }

    #[test]
    fn test_undo_keeps_best() {
        let mut session = with_grid(Grid::from_values([
            [4, 4, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]));
        session.step(Direction::Left);
        assert_eq!(session.best(), 8);
        session.undo();
        assert_eq!(session.score(), 0);
        assert_eq!(session.best(), 8);
    }

    // -------------------------------------------------------------------------
    // Win / game over tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_win_at_threshold_freezes_moves() {
        let mut session = with_grid(Grid::from_values([
            [64, 64, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]));
        let outcome = session.step(Direction::Left);
        assert!(outcome.won);
        assert!(session.has_won());
        assert_eq!(session.max_tile(), 128);

        // Frozen: further moves are rejected without touching the board.
        let frozen = *session.grid();
        let outcome = session.step(Direction::Right);
        assert!(!outcome.changed);
        assert!(outcome.won);
        assert_eq!(*session.grid(), frozen);
    }

    #[test]
    fn test_undo_out_of_win() {
        let mut session = with_grid(Grid::from_values([
            [64, 64, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]));
        session.step(Direction::Left);
        assert!(session.has_won());
        assert!(session.undo());
        assert!(!session.has_won());
        assert_eq!(session.max_tile(), 64);
    }

    #[test]
    fn test_custom_win_value() {
        let mut store = MemoryStore::default();
        store.set(
            GRID_KEY,
            serde_json::to_value(Grid::from_values([
                [16, 16, 0, 0],
                [0, 0, 0, 0],
                [0, 0, 0, 0],
                [0, 0, 0, 0],
            ]))
            .unwrap(),
        );
        let mut session = Session::new(SessionConfig { win_value: 32 }, 0, store);
        let outcome = session.step(Direction::Left);
        assert!(outcome.won);
    }

    #[test]
    fn test_game_over_detected_after_move() {
        // The only legal move slides the bottom row; whatever value spawns
        // into the remaining hole, no adjacent pair is left anywhere.
        let mut session = with_grid(Grid::from_values([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 64],
            [0, 8, 32, 8],
        ]));
        let outcome = session.step(Direction::Left);
        assert!(outcome.changed);
        assert!(outcome.game_over);
        assert!(session.is_game_over());

        // A finished session rejects further moves.
        let outcome = session.step(Direction::Right);
        assert!(!outcome.changed);
        assert!(outcome.game_over);
    }

    // -------------------------------------------------------------------------
    // Persistence tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_state_survives_restart() {
        let mut session = fresh(42);
        let legal = session.legal_moves();
        let direction = Direction::all()[legal.iter().position(|&l| l).unwrap()];
        session.step(direction);

        let grid = *session.grid();
        let score = session.score();
        let best = session.best();

        let restored = Session::new(
            SessionConfig::default(),
            999, // different seed must not matter for restored state
            session.store().clone(),
        );
        assert_eq!(*restored.grid(), grid);
        assert_eq!(restored.score(), score);
        assert_eq!(restored.best(), best);
    }

    #[test]
    fn test_rejected_move_not_persisted() {
        let mut session = with_grid(Grid::from_values([
            [2, 0, 0, 0],
            [4, 0, 0, 0],
            [8, 0, 0, 0],
            [16, 0, 0, 0],
        ]));
        let persisted_before = session.store().get(GRID_KEY);
        session.step(Direction::Left);
        assert_eq!(session.store().get(GRID_KEY), persisted_before);
    }

    #[test]
    fn test_fresh_session_when_store_has_garbage() {
        let mut store = MemoryStore::default();
        store.set(GRID_KEY, serde_json::json!("not a grid"));
        let session = Session::new(SessionConfig::default(), 42, store);
        assert_eq!(tile_count(session.grid()), 2);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_restored_win_state() {
        let mut store = MemoryStore::default();
        let mut grid = Grid::empty();
        grid.set(0, 0, Some(Tile::new(128)));
        grid.set(3, 3, Some(Tile::new(2)));
        store.set(GRID_KEY, serde_json::to_value(grid).unwrap());
        let session = Session::new(SessionConfig::default(), 0, store);
        assert!(session.has_won());
    }
}
