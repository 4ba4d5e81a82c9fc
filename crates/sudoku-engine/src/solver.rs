use serde::{Deserialize, Serialize};

use crate::rng::SimpleRng;
use crate::{Grid, Position, ValueSet, GRID_SIZE};

/// One event in a solve: a digit placed in a cell, or a backtracking
/// removal (value is 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStep {
    pub pos: Position,
    pub value: u8,
    pub backtrack: bool,
}

/// Result of an observed solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveOutcome {
    /// Every cell was filled without breaking the uniqueness invariant
    Solved,
    /// No completion exists from the given state
    Unsolvable,
    /// The observer requested a stop; the grid is left partially filled
    Aborted,
}

impl SolveOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveOutcome::Solved)
    }
}

/// A suggested placement for the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub pos: Position,
    pub value: u8,
    /// Whether the cell had exactly one legal candidate
    pub forced: bool,
}

/// Backtracking Sudoku solver with MRV cell selection and per-invocation
/// invalid-value memoization
pub struct Solver {
    rng: SimpleRng,
    /// Values proven to fail per cell under the current search path; reset
    /// on every invocation, cleared per cell when its candidates exhaust
    invalid: [[ValueSet; GRID_SIZE]; GRID_SIZE],
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Create a new solver seeded from system entropy
    pub fn new() -> Self {
        Self {
            rng: SimpleRng::new(),
            invalid: [[ValueSet::new(); GRID_SIZE]; GRID_SIZE],
        }
    }

    /// Create a solver with a specific seed for reproducibility
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SimpleRng::with_seed(seed),
            invalid: [[ValueSet::new(); GRID_SIZE]; GRID_SIZE],
        }
    }

    /// Fill every empty cell of `grid` in place. Returns true on success;
    /// false when no completion exists.
    pub fn solve(&mut self, grid: &mut Grid) -> bool {
        self.solve_with_observer(grid, |_| true).is_solved()
    }

    /// Solve while reporting every placement and backtrack to `observer`.
    /// The observer's return value is the continuation signal: returning
    /// false stops the search, leaving the grid in its partial state.
    pub fn solve_with_observer<F>(&mut self, grid: &mut Grid, mut observer: F) -> SolveOutcome
    where
        F: FnMut(SolveStep) -> bool,
    {
        // The memo is scoped to a single invocation
        self.invalid = [[ValueSet::new(); GRID_SIZE]; GRID_SIZE];
        self.solve_cells(grid, &mut observer)
    }

    // ==================== Backtracking ====================

    fn solve_cells<F>(&mut self, grid: &mut Grid, observer: &mut F) -> SolveOutcome
    where
        F: FnMut(SolveStep) -> bool,
    {
        let Some(pos) = self.most_constrained(grid) else {
            // No empty cell left
            return SolveOutcome::Solved;
        };

        let mut order: Vec<u8> = (1..=9).collect();
        self.rng.shuffle(&mut order);

        for value in order {
            if !self.is_open(grid, value, pos) {
                continue;
            }

            grid.set(pos, value);
            if !observer(SolveStep {
                pos,
                value,
                backtrack: false,
            }) {
                return SolveOutcome::Aborted;
            }

            match self.solve_cells(grid, observer) {
                SolveOutcome::Unsolvable => {}
                done => return done,
            }

            // Dead end: undo the placement and remember that this value has
            // no completion under the current ancestor assignment
            grid.clear(pos);
            self.invalid[pos.row][pos.col].insert(value);

            if !observer(SolveStep {
                pos,
                value: 0,
                backtrack: true,
            }) {
                return SolveOutcome::Aborted;
            }
        }

        // The whole candidate space of this cell is exhausted and the search
        // backtracks past it; its exclusions only held under the ancestor
        // assignment being abandoned, so they must not outlive it
        self.invalid[pos.row][pos.col].clear();
        SolveOutcome::Unsolvable
    }

    /// Pick the empty cell with the fewest open candidates (MRV), breaking
    /// ties by row-major scan order. A cell with a single candidate ends the
    /// scan immediately.
    fn most_constrained(&self, grid: &Grid) -> Option<Position> {
        let mut best = None;
        let mut fewest = 10;

        for pos in grid.empty_positions() {
            let count = self.open_candidates(grid, pos).count();
            if count < fewest {
                fewest = count;
                best = Some(pos);
                if fewest == 1 {
                    return best;
                }
            }
        }
        best
    }

    /// Whether `value` is still worth trying at `pos`: legal on the grid and
    /// not memoized as a dead end
    fn is_open(&self, grid: &Grid, value: u8, pos: Position) -> bool {
        !self.invalid[pos.row][pos.col].contains(value) && grid.is_legal(value, pos)
    }

    fn open_candidates(&self, grid: &Grid, pos: Position) -> ValueSet {
        let mut set = ValueSet::new();
        for value in 1..=9 {
            if self.is_open(grid, value, pos) {
                set.insert(value);
            }
        }
        set
    }

    // ==================== Hints ====================

    /// Suggest a placement for one empty cell, preferring cells with exactly
    /// one legal candidate. Cells are visited in random order so repeated
    /// calls on an unchanged grid do not keep pointing at the same cell.
    pub fn get_hint(&mut self, grid: &Grid) -> Option<Hint> {
        let mut empty = grid.empty_positions();
        self.rng.shuffle(&mut empty);

        for &pos in &empty {
            if let Some(value) = grid.candidates(pos).single_value() {
                return Some(Hint {
                    pos,
                    value,
                    forced: true,
                });
            }
        }

        for &pos in &empty {
            let options: Vec<u8> = grid.candidates(pos).iter().collect();
            if !options.is_empty() {
                let value = options[self.rng.next_usize(options.len())];
                return Some(Hint {
                    pos,
                    value,
                    forced: false,
                });
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSIC: &str =
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079";
    const CLASSIC_SOLVED: &str =
        "534678912672195348198342567859761423426853791713924856961537284287419635345286179";

    /// Three distinct permutations in the diagonal boxes, everything else
    /// empty; completion is always possible from this shape
    fn diagonal_seeded() -> Grid {
        let rows = [
            "123......",
            "456......",
            "789......",
            "...234...",
            "...567...",
            "...891...",
            "......345",
            "......678",
            "......912",
        ];
        Grid::from_string(&rows.concat()).unwrap()
    }

    #[test]
    fn test_solve_classic() {
        let mut board = Grid::from_string(CLASSIC).unwrap();
        let mut solver = Solver::with_seed(42);

        assert!(solver.solve(&mut board));
        // The classic puzzle has a unique solution, so the randomized search
        // order cannot change the result
        assert_eq!(board.to_string_compact(), CLASSIC_SOLVED);
    }

    #[test]
    fn test_solved_grid_is_a_noop() {
        let mut board = Grid::from_string(CLASSIC_SOLVED).unwrap();
        let mut solver = Solver::with_seed(0);

        let mut steps = 0;
        let outcome = solver.solve_with_observer(&mut board, |_| {
            steps += 1;
            true
        });

        assert_eq!(outcome, SolveOutcome::Solved);
        assert_eq!(steps, 0);
    }

    #[test]
    fn test_contradiction_fails() {
        // (0, 8) sees 1-8 in its row and 9 in its column: no candidate left
        let mut rows = String::from("12345678.");
        rows.push_str("........9");
        rows.push_str(&".........".repeat(7));
        let mut board = Grid::from_string(&rows).unwrap();

        let mut solver = Solver::with_seed(5);
        assert!(!solver.solve(&mut board));
    }

    #[test]
    fn test_memo_cleared_after_exhaustion() {
        let mut rows = String::from("12345678.");
        rows.push_str("........9");
        rows.push_str(&".........".repeat(7));
        let mut board = Grid::from_string(&rows).unwrap();

        let mut solver = Solver::with_seed(5);
        assert!(!solver.solve(&mut board));

        // Every visited cell exhausted its candidates, so every memo entry
        // was cleared on the way out
        assert!(solver.invalid.iter().flatten().all(ValueSet::is_empty));
    }

    #[test]
    fn test_memo_is_consulted_and_scoped_per_invocation() {
        let mut solver = Solver::with_seed(9);
        let grid = Grid::empty();
        let pos = Position::new(4, 4);

        solver.invalid[pos.row][pos.col].insert(5);
        let open = solver.open_candidates(&grid, pos);
        assert!(!open.contains(5));
        assert_eq!(open.count(), 8);

        // Poison the memo completely; a new invocation must not see it
        for pos in Position::all() {
            for value in 1..=9 {
                solver.invalid[pos.row][pos.col].insert(value);
            }
        }
        let mut board = Grid::from_string(CLASSIC).unwrap();
        assert!(solver.solve(&mut board));
    }

    #[test]
    fn test_mrv_selects_forced_cell_first() {
        // The only single-candidate cell is (8, 8), the last cell in scan
        // order; MRV must pick it before any of the wider-open cells
        let mut rows = ".........".repeat(8);
        rows.push_str("12345678.");
        let mut board = Grid::from_string(&rows).unwrap();

        let mut first_step = None;
        let mut solver = Solver::with_seed(13);
        let outcome = solver.solve_with_observer(&mut board, |step| {
            first_step = Some(step);
            false
        });

        assert_eq!(outcome, SolveOutcome::Aborted);
        assert_eq!(
            first_step,
            Some(SolveStep {
                pos: Position::new(8, 8),
                value: 9,
                backtrack: false,
            })
        );
    }

    #[test]
    fn test_observer_abort_unwinds() {
        let mut board = Grid::from_string(CLASSIC).unwrap();
        let mut solver = Solver::with_seed(21);

        let outcome = solver.solve_with_observer(&mut board, |_| false);
        assert_eq!(outcome, SolveOutcome::Aborted);
        assert!(!board.is_complete());
    }

    #[test]
    fn test_diagonal_seeded_grid_completes() {
        let mut board = diagonal_seeded();
        let empty_before = board.empty_count();

        let mut placements = 0usize;
        let mut backtracks = 0usize;
        let mut solver = Solver::with_seed(77);
        let outcome = solver.solve_with_observer(&mut board, |step| {
            if step.backtrack {
                assert_eq!(step.value, 0);
                backtracks += 1;
            } else {
                assert!((1..=9).contains(&step.value));
                placements += 1;
            }
            true
        });

        assert_eq!(outcome, SolveOutcome::Solved);
        assert!(board.is_complete());
        assert!(board.is_consistent());
        // Each net placement fills exactly one of the empty cells
        assert_eq!(placements - backtracks, empty_before);
    }

    #[test]
    fn test_get_hint_single_empty_cell() {
        let mut board = Grid::from_string(CLASSIC_SOLVED).unwrap();
        let pos = Position::new(4, 4);
        board.clear(pos);

        let mut solver = Solver::with_seed(3);
        let hint = solver.get_hint(&board);

        assert_eq!(
            hint,
            Some(Hint {
                pos,
                value: 5,
                forced: true,
            })
        );
    }

    #[test]
    fn test_get_hint_on_full_grid() {
        let board = Grid::from_string(CLASSIC_SOLVED).unwrap();
        let mut solver = Solver::with_seed(3);
        assert_eq!(solver.get_hint(&board), None);
    }

    #[test]
    fn test_get_hint_is_legal() {
        let board = Grid::from_string(CLASSIC).unwrap();
        let mut solver = Solver::with_seed(17);

        for _ in 0..10 {
            let hint = solver.get_hint(&board).unwrap();
            assert!(board.is_cell_empty(hint.pos));
            assert!(board.is_legal(hint.value, hint.pos));
        }
    }
}
