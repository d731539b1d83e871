//! Food placement
//!
//! Rejection sampling is cheap while the snake covers a small part of the board.
//! Once sampling keeps hitting the snake we switch to enumerating the free cells,
//! so placement always terminates, even on an almost full board.

use rand::Rng;
use rand::seq::SliceRandom;

use super::state::{Position, Snake};

/// Random draws tried before falling back to scanning the board
const SAMPLE_ATTEMPTS: usize = 64;

/// Pick a uniformly random cell not covered by `snake`
///
/// Returns `None` when the snake fills the whole board.
pub fn spawn_food<R: Rng>(
    rng: &mut R,
    snake: &Snake,
    columns: i32,
    rows: i32,
    cell_size: i32,
) -> Option<Position> {
    if columns <= 0 || rows <= 0 {
        return None;
    }

    for _ in 0..SAMPLE_ATTEMPTS {
        let column = rng.gen_range(0..columns);
        let row = rng.gen_range(0..rows);
        let pos = Position::from_cell(column, row, cell_size);

        if !snake.occupies(pos) {
            return Some(pos);
        }
    }

    let free = free_cells(snake, columns, rows, cell_size);
    free.choose(rng).copied()
}

/// All cells of the board the snake does not cover
pub fn free_cells(snake: &Snake, columns: i32, rows: i32, cell_size: i32) -> Vec<Position> {
    (0..rows)
        .flat_map(|row| (0..columns).map(move |column| Position::from_cell(column, row, cell_size)))
        .filter(|pos| !snake.occupies(*pos))
        .collect()
}
