//! Sudoku engine: puzzle generation, difficulty-based carving, and an
//! observable backtracking solver.
//!
//! The engine generates a solved grid by seeding the three diagonal boxes
//! with random permutations and completing the rest by backtracking, carves
//! cells away under per-box and global quotas to match a difficulty profile,
//! and solves arbitrary grids with MRV-ordered randomized backtracking. The
//! solver reports every placement and backtrack to an optional observer,
//! which doubles as the cancellation channel, and can suggest single-cell
//! hints.
//!
//! ```
//! use sudoku_engine::{Difficulty, Generator, Solver};
//!
//! let mut generator = Generator::with_seed(7);
//! let puzzle = generator.generate(Difficulty::Medium);
//! assert_eq!(puzzle.hidden.len(), 50);
//!
//! let mut board = puzzle.grid.clone();
//! let mut solver = Solver::with_seed(7);
//! assert!(solver.solve(&mut board));
//! assert!(board.is_consistent());
//! ```

mod generator;
mod grid;
mod rng;
mod solver;

pub use generator::{Difficulty, DifficultyProfile, Generator, Puzzle};
pub use grid::{Grid, Position, ValueSet, BOX_SIZE, GRID_SIZE};
pub use solver::{Hint, SolveOutcome, SolveStep, Solver};
