use std::time::Duration;

use super::action::Direction;
use super::config::GameConfig;

/// A cell on the board, in board units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position of the cell at `column`, `row`
    pub fn from_cell(column: i32, row: i32, cell_size: i32) -> Self {
        Self::new(column * cell_size, row * cell_size)
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position one step of `step` units in a direction
    pub fn moved_in_direction(&self, direction: Direction, step: i32) -> Self {
        let (dx, dy) = direction.offset(step);
        self.moved_by(dx, dy)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Create a snake of `length` cells trailing behind `head`
    pub fn new(head: Position, direction: Direction, length: usize, cell_size: i32) -> Self {
        let back = direction.opposite();
        let mut body = Vec::with_capacity(length.max(1));
        body.push(head);

        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_in_direction(back, cell_size));
        }

        Self { body, direction }
    }

    /// Build a snake from explicit cells, head first
    pub fn from_cells(body: Vec<Position>, direction: Direction) -> Self {
        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Check if any cell of the snake sits on `pos`
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Prepend `new_head`, dropping the tail unless growing
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Complete simulation state of one game
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    pub board_width: i32,
    pub board_height: i32,
    pub cell_size: i32,
    pub score: u32,
    pub steps: u32,
    pub is_alive: bool,
    /// Delay between ticks; shrinks as the score climbs
    pub tick_interval: Duration,
}

impl GameState {
    /// Create a fresh game state on the board described by `config`
    pub fn new(snake: Snake, food: Position, config: &GameConfig) -> Self {
        Self {
            snake,
            food,
            board_width: config.board_width,
            board_height: config.board_height,
            cell_size: config.cell_size,
            score: 0,
            steps: 0,
            is_alive: true,
            tick_interval: config.initial_tick(),
        }
    }

    /// Check if a position is within the board bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.board_width && pos.y >= 0 && pos.y < self.board_height
    }

    pub fn columns(&self) -> i32 {
        self.board_width / self.cell_size
    }

    pub fn rows(&self) -> i32 {
        self.board_height / self.cell_size
    }
}
