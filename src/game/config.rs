use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Widest board the terminal renderer can lay out, in cells
pub const MAX_COLUMNS: i32 = 120;
/// Tallest board the terminal renderer can lay out, in cells
pub const MAX_ROWS: i32 = 60;

/// Configuration for the game
///
/// Distances are in board units; the snake moves `cell_size` units per tick,
/// so the grid has `board_width / cell_size` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the board in units
    pub board_width: i32,
    /// Height of the board in units
    pub board_height: i32,
    /// Size of one cell; also the distance moved per tick
    pub cell_size: i32,
    /// Column of the starting head cell
    pub start_column: i32,
    /// Row of the starting head cell
    pub start_row: i32,
    /// Initial length of the snake
    pub initial_snake_length: usize,

    /// Score added per food eaten
    pub points_per_food: u32,
    /// Every time the score reaches a multiple of this, the game speeds up
    pub speed_up_every: u32,
    /// Tick interval at the start of a game
    pub initial_tick_ms: u64,
    /// Amount the tick interval shrinks per speed-up
    pub speed_step_ms: u64,
    /// Fastest allowed tick interval
    pub min_tick_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 600,
            board_height: 400,
            cell_size: 20,
            start_column: 5,
            start_row: 5,
            initial_snake_length: 3,
            points_per_food: 10,
            speed_up_every: 50,
            initial_tick_ms: 100,
            speed_step_ms: 10,
            min_tick_ms: 50,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom board size
    pub fn new(board_width: i32, board_height: i32) -> Self {
        Self {
            board_width,
            board_height,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    /// Number of columns in the grid
    pub fn columns(&self) -> i32 {
        self.board_width / self.cell_size
    }

    /// Number of rows in the grid
    pub fn rows(&self) -> i32 {
        self.board_height / self.cell_size
    }

    /// Level shown for a score; starts at 1 and rises at each speed-up threshold
    pub fn level_for(&self, score: u32) -> u32 {
        score / self.speed_up_every + 1
    }

    pub fn initial_tick(&self) -> Duration {
        Duration::from_millis(self.initial_tick_ms.max(self.min_tick_ms))
    }

    pub fn min_tick(&self) -> Duration {
        Duration::from_millis(self.min_tick_ms)
    }

    pub fn speed_step(&self) -> Duration {
        Duration::from_millis(self.speed_step_ms)
    }

    /// Check the invariants the engine relies on
    pub fn validate(&self) -> Result<()> {
        ensure!(self.cell_size > 0, "cell size must be positive");
        ensure!(
            self.board_width > 0 && self.board_height > 0,
            "board dimensions must be positive"
        );
        ensure!(
            self.board_width % self.cell_size == 0 && self.board_height % self.cell_size == 0,
            "board {}x{} is not a whole number of {}-unit cells",
            self.board_width,
            self.board_height,
            self.cell_size
        );
        ensure!(
            self.columns() <= MAX_COLUMNS && self.rows() <= MAX_ROWS,
            "board of {}x{} cells exceeds the {}x{} limit",
            self.columns(),
            self.rows(),
            MAX_COLUMNS,
            MAX_ROWS
        );
        ensure!(
            self.initial_snake_length >= 1,
            "snake needs at least one cell"
        );
        ensure!(
            ((self.columns() * self.rows()) as usize) > self.initial_snake_length,
            "starting snake leaves no room for food"
        );
        let tail_column = self.start_column - (self.initial_snake_length as i32 - 1);
        ensure!(
            tail_column >= 0
                && self.start_column < self.columns()
                && self.start_row >= 0
                && self.start_row < self.rows(),
            "starting snake does not fit on the board"
        );
        ensure!(self.points_per_food > 0, "points per food must be positive");
        ensure!(self.speed_up_every > 0, "speed-up threshold must be positive");
        ensure!(self.min_tick_ms > 0, "minimum tick must be positive");
        Ok(())
    }
}
