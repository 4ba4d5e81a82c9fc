use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rng::SimpleRng;
use crate::{Grid, Position, BOX_SIZE, GRID_SIZE};

/// Difficulty level of a puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Get all difficulty levels
    pub fn all_levels() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

/// Carving quotas for a difficulty level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Difficulty this profile belongs to
    pub difficulty: Difficulty,
    /// Total number of cells hidden from the solved grid
    pub hidden_cells: usize,
    /// Number of cells hidden up front in each 3x3 box
    pub min_per_box: usize,
}

impl DifficultyProfile {
    pub fn easy() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            hidden_cells: 40,
            min_per_box: 5,
        }
    }

    pub fn medium() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            hidden_cells: 50,
            min_per_box: 6,
        }
    }

    pub fn hard() -> Self {
        Self {
            difficulty: Difficulty::Hard,
            hidden_cells: 60,
            min_per_box: 7,
        }
    }

    /// Get the profile for a difficulty level
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self::easy(),
            Difficulty::Medium => Self::medium(),
            Difficulty::Hard => Self::hard(),
        }
    }
}

/// A carved puzzle: the playable grid, the solved grid it came from, and the
/// set of cells the player may edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    /// The playable grid (hidden cells are empty)
    pub grid: Grid,
    /// The fully solved grid, kept as ground truth
    pub solution: Grid,
    /// Coordinates of the hidden cells
    pub hidden: HashSet<Position>,
}

impl Puzzle {
    /// Whether the player may edit this cell
    pub fn is_editable(&self, pos: Position) -> bool {
        self.hidden.contains(&pos)
    }

    /// Ground-truth value for a cell
    pub fn solution_value(&self, pos: Position) -> u8 {
        self.solution.get(pos)
    }

    /// Whether `value` may go at `pos`: the cell must be editable and the
    /// digit must not conflict with the current grid
    pub fn is_valid_placement(&self, value: u8, pos: Position) -> bool {
        self.is_editable(pos) && self.grid.is_legal(value, pos)
    }
}

/// Sudoku puzzle generator
pub struct Generator {
    rng: SimpleRng,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// Create a new generator seeded from system entropy
    pub fn new() -> Self {
        Self {
            rng: SimpleRng::new(),
        }
    }

    /// Create a generator with a specific seed for reproducibility
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SimpleRng::with_seed(seed),
        }
    }

    /// Generate a puzzle for a difficulty level
    pub fn generate(&mut self, difficulty: Difficulty) -> Puzzle {
        let solution = self.generate_solution();
        self.carve(&solution, &DifficultyProfile::for_difficulty(difficulty))
    }

    /// Generate a completely filled valid grid
    pub fn generate_solution(&mut self) -> Grid {
        let mut grid = Grid::empty();

        // The diagonal boxes share no row or column, so each can take an
        // arbitrary permutation without validity checks
        self.fill_box(&mut grid, 0, 0);
        self.fill_box(&mut grid, 3, 3);
        self.fill_box(&mut grid, 6, 6);

        // Completion from a diagonally seeded grid always exists; a failure
        // here is an implementation bug, not a solvability outcome
        let completed = self.fill_remaining(&mut grid);
        assert!(completed, "diagonally seeded grid failed to complete");

        grid
    }

    /// Carve cells out of a solved grid according to a difficulty profile
    pub fn carve(&mut self, solution: &Grid, profile: &DifficultyProfile) -> Puzzle {
        let mut grid = solution.clone();
        let mut hidden: HashSet<Position> = HashSet::new();

        // Greedy pass: hide min_per_box cells in each box, stopping mid-box
        // the moment the global quota is reached
        for box_row in (0..GRID_SIZE).step_by(BOX_SIZE) {
            for box_col in (0..GRID_SIZE).step_by(BOX_SIZE) {
                let mut cells: Vec<Position> = (0..BOX_SIZE)
                    .flat_map(|dr| {
                        (0..BOX_SIZE).map(move |dc| Position::new(box_row + dr, box_col + dc))
                    })
                    .collect();
                self.rng.shuffle(&mut cells);

                for &pos in cells.iter().take(profile.min_per_box) {
                    if hidden.len() >= profile.hidden_cells {
                        break;
                    }
                    grid.clear(pos);
                    hidden.insert(pos);
                }
            }
        }

        // Top-up pass: hide uniformly random cells until the quota is met
        while hidden.len() < profile.hidden_cells {
            let pos = Position::new(
                self.rng.next_usize(GRID_SIZE),
                self.rng.next_usize(GRID_SIZE),
            );
            if grid.get(pos) != 0 && !hidden.contains(&pos) {
                grid.clear(pos);
                hidden.insert(pos);
            }
        }

        Puzzle {
            grid,
            solution: solution.clone(),
            hidden,
        }
    }

    /// Fill a 3x3 box with a random permutation of 1-9
    fn fill_box(&mut self, grid: &mut Grid, start_row: usize, start_col: usize) {
        let mut values: Vec<u8> = (1..=9).collect();
        self.rng.shuffle(&mut values);

        let mut idx = 0;
        for row in start_row..start_row + BOX_SIZE {
            for col in start_col..start_col + BOX_SIZE {
                grid.set(Position::new(row, col), values[idx]);
                idx += 1;
            }
        }
    }

    /// Complete the grid by backtracking over the first empty cell in
    /// row-major order, trying candidates in random order
    fn fill_remaining(&mut self, grid: &mut Grid) -> bool {
        let Some(pos) = grid.first_empty() else {
            return true;
        };

        let mut values: Vec<u8> = (1..=9).collect();
        self.rng.shuffle(&mut values);

        for value in values {
            if grid.is_legal(value, pos) {
                grid.set(pos, value);
                if self.fill_remaining(grid) {
                    return true;
                }
                grid.clear(pos);
            }
        }

        false
    }
}
