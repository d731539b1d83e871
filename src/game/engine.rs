use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    action::{Action, Direction},
    config::GameConfig,
    food::spawn_food,
    state::{CollisionType, GameState, Position, Snake},
};

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
    /// New tick interval if this step crossed a speed-up threshold
    pub sped_up: Option<Duration>,
    /// The snake covers every cell and no food can be placed
    pub board_full: bool,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the game has terminated
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

impl StepResult {
    fn moved(ate_food: bool, sped_up: Option<Duration>) -> Self {
        Self {
            terminated: false,
            info: StepInfo {
                ate_food,
                collision_type: None,
                sped_up,
                board_full: false,
            },
        }
    }

    fn ended(collision_type: Option<CollisionType>, ate_food: bool, board_full: bool) -> Self {
        Self {
            terminated: true,
            info: StepInfo {
                ate_food,
                collision_type,
                sped_up: None,
                board_full,
            },
        }
    }
}

/// The game engine that handles all game logic
///
/// Owns the configuration and the random source; the state it advances is passed
/// in, so a step can be tested without any terminal or audio attached.
pub struct GameEngine<R: Rng = StdRng> {
    config: GameConfig,
    rng: R,
}

impl GameEngine<StdRng> {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an engine whose food placement is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameEngine<R> {
    pub fn with_rng(config: GameConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Fresh state for a new game
    pub fn reset(&mut self) -> GameState {
        let cell = self.config.cell_size;
        let head = Position::from_cell(self.config.start_column, self.config.start_row, cell);
        let snake = Snake::new(
            head,
            Direction::Right,
            self.config.initial_snake_length,
            cell,
        );

        // `GameConfig::validate` guarantees at least one free cell beside the starting snake
        let food = self.place_food(&snake).unwrap_or(head);

        GameState::new(snake, food, &self.config)
    }

    /// Execute one step of the game
    pub fn step(&mut self, state: &mut GameState, action: Action) -> StepResult {
        if !state.is_alive {
            return StepResult::ended(None, false, false);
        }

        // Update direction based on action (prevent 180° turns)
        if let Action::Move(new_direction) = action {
            if !state.snake.direction.is_opposite(new_direction) {
                state.snake.direction = new_direction;
            }
        }

        let new_head = state
            .snake
            .head()
            .moved_in_direction(state.snake.direction, state.cell_size);

        if let Some(collision_type) = self.check_collision(state, new_head) {
            state.is_alive = false;
            state.steps += 1;
            return StepResult::ended(Some(collision_type), false, false);
        }

        let ate_food = new_head == state.food;
        state.snake.advance(new_head, ate_food);
        state.steps += 1;

        if !ate_food {
            return StepResult::moved(false, None);
        }

        state.score += self.config.points_per_food;
        let sped_up = self.apply_speed_up(state);

        match self.place_food(&state.snake) {
            Some(food) => {
                state.food = food;
                StepResult::moved(true, sped_up)
            }
            None => {
                state.is_alive = false;
                StepResult::ended(None, true, true)
            }
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, state: &GameState, pos: Position) -> Option<CollisionType> {
        if !state.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        if state.snake.occupies(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Shorten the tick interval when the score lands on a threshold
    fn apply_speed_up(&self, state: &mut GameState) -> Option<Duration> {
        if state.score % self.config.speed_up_every != 0 {
            return None;
        }

        let floor = self.config.min_tick();
        let faster = state
            .tick_interval
            .saturating_sub(self.config.speed_step())
            .max(floor);

        if faster == state.tick_interval {
            return None;
        }
        state.tick_interval = faster;
        Some(faster)
    }

    fn place_food(&mut self, snake: &Snake) -> Option<Position> {
        spawn_food(
            &mut self.rng,
            snake,
            self.config.columns(),
            self.config.rows(),
            self.config.cell_size,
        )
    }
}
