//! Basic example of using the Sudoku engine

use sudoku_engine::{Difficulty, Generator, Solver};

fn main() {
    // Generate a puzzle
    println!("Generating a Medium difficulty puzzle...\n");
    let mut generator = Generator::new();
    let puzzle = generator.generate(Difficulty::Medium);

    println!("Generated puzzle:");
    println!("{}", puzzle.grid);
    println!("Hidden cells: {}", puzzle.hidden.len());

    // Ask for a hint
    let mut solver = Solver::new();
    if let Some(hint) = solver.get_hint(&puzzle.grid) {
        println!(
            "\nHint: {} fits at ({}, {}){}",
            hint.value,
            hint.pos.row + 1,
            hint.pos.col + 1,
            if hint.forced { " (only option)" } else { "" }
        );
    }

    // Solve it, narrating the search
    println!("\nSolving...");
    let mut board = puzzle.grid.clone();
    let mut steps = 0usize;
    let outcome = solver.solve_with_observer(&mut board, |_| {
        steps += 1;
        true
    });

    println!("Outcome: {:?} after {} steps", outcome, steps);
    println!("\nSolution:");
    println!("{}", board);
}
