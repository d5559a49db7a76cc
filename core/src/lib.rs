//! # slide128 Core Engine
//!
//! A pure Rust implementation of a 4x4 sliding-tile puzzle (2048-style,
//! win tile 128) with deterministic, seedable PRNG for reproducible
//! gameplay. The move engine is a family of pure functions over immutable
//! grids; `Session` wraps them with score, undo history, and a pluggable
//! key-value store for persistence.
//!
//! ## Example
//!
//! ```rust
//! use slide128_core::{Direction, MemoryStore, Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default(), 42, MemoryStore::default());
//! let outcome = session.step(Direction::Left);
//! println!("Score: {}, Changed: {}", session.score(), outcome.changed);
//! ```

pub mod grid;
pub mod moves;
pub mod session;
pub mod spawn;
pub mod store;

pub use grid::{Cell, Grid, Tile, SIZE};
pub use moves::{apply_move, is_game_over, Direction, MoveOutcome};
pub use session::{Session, SessionConfig, StepOutcome};
pub use spawn::spawn_tile;
pub use store::{MemoryStore, Store};
