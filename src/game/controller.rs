//! Game loop controller
//!
//! Owns the simulation state for the lifetime of the program and moves it through
//! the phases NotStarted → Running ⇄ Paused → GameOver → Running. Keys arrive via
//! [`GameController::handle_key`], timer ticks via [`GameController::tick`].
//! Sound and high-score persistence go through the [`SoundPort`] and
//! [`HighScoreStore`] ports, so the controller runs headless in tests.

use std::time::Duration;

use log::{error, info};
use rand::Rng;

use super::{
    action::{Action, Direction},
    engine::GameEngine,
    state::{CollisionType, GameState},
};
use crate::audio::{SoundEffect, SoundPort};
use crate::input::KeyAction;
use crate::storage::HighScoreStore;

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverCause {
    Wall,
    SelfCollision,
    /// The snake covers the whole board
    BoardFull,
}

impl From<CollisionType> for GameOverCause {
    fn from(collision: CollisionType) -> Self {
        match collision {
            CollisionType::Wall => GameOverCause::Wall,
            CollisionType::SelfCollision => GameOverCause::SelfCollision,
        }
    }
}

/// Outcome of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub score: u32,
    pub cause: GameOverCause,
    /// The score beat the stored high score
    pub new_record: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
    Paused,
    GameOver(GameSummary),
}

/// Phase change caused by a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    Started,
    Paused,
    Resumed,
}

/// What a timer tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing to do
    Idle,
    /// Paused; only the overlay needs redrawing
    Paused,
    Moved { ate_food: bool },
    GameOver(GameSummary),
}

pub struct GameController<S, H, R = rand::rngs::StdRng>
where
    S: SoundPort,
    H: HighScoreStore,
    R: Rng,
{
    engine: GameEngine<R>,
    state: GameState,
    phase: Phase,
    /// Single-slot buffer; the latest valid key between two ticks wins
    pending_direction: Option<Direction>,
    high_score: u32,
    sound: S,
    store: H,
}

impl<S, H, R> GameController<S, H, R>
where
    S: SoundPort,
    H: HighScoreStore,
    R: Rng,
{
    pub fn new(mut engine: GameEngine<R>, sound: S, store: H) -> Self {
        let state = engine.reset();
        let high_score = store.load();
        info!("Loaded high score {}", high_score);

        Self {
            engine,
            state,
            phase: Phase::NotStarted,
            pending_direction: None,
            high_score,
            sound,
            store,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending_direction
    }

    pub fn level(&self) -> u32 {
        self.engine.config().level_for(self.state.score)
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }

    pub fn store(&self) -> &H {
        &self.store
    }

    /// Period the tick timer should run at, or `None` when it should be stopped
    ///
    /// The timer keeps firing while paused so the overlay is redrawn.
    pub fn timer_period(&self) -> Option<Duration> {
        match self.phase {
            Phase::Running | Phase::Paused => Some(self.state.tick_interval),
            Phase::NotStarted | Phase::GameOver(_) => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyAction) -> Transition {
        match (self.phase, key) {
            (_, KeyAction::Quit) => Transition::None,

            (Phase::NotStarted, key) => {
                self.start_game();
                if let KeyAction::Move(direction) = key {
                    self.request_direction(direction);
                }
                Transition::Started
            }

            (Phase::Running, KeyAction::Move(direction)) => {
                self.request_direction(direction);
                Transition::None
            }
            (Phase::Running, KeyAction::Pause) => {
                self.phase = Phase::Paused;
                self.sound.pause_music();
                info!("Paused at score {}", self.state.score);
                Transition::Paused
            }
            (Phase::Running, _) => Transition::None,

            (Phase::Paused, KeyAction::Pause) => {
                self.phase = Phase::Running;
                self.sound.resume_music();
                Transition::Resumed
            }
            (Phase::Paused, KeyAction::Restart) | (Phase::GameOver(_), KeyAction::Restart) => {
                self.start_game();
                Transition::Started
            }
            (Phase::Paused, _) | (Phase::GameOver(_), _) => Transition::None,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        match self.phase {
            Phase::Running => {}
            Phase::Paused => return TickOutcome::Paused,
            Phase::NotStarted | Phase::GameOver(_) => return TickOutcome::Idle,
        }

        let action = Action::from(self.pending_direction.take());
        let result = self.engine.step(&mut self.state, action);

        if result.terminated {
            let cause = match result.info.collision_type {
                Some(collision) => GameOverCause::from(collision),
                None => GameOverCause::BoardFull,
            };
            return TickOutcome::GameOver(self.finish_game(cause));
        }

        if result.info.ate_food {
            self.sound.play(SoundEffect::Eat);
        }
        if let Some(interval) = result.info.sped_up {
            info!(
                "Level {} reached, tick interval now {:?}",
                self.level(),
                interval
            );
        }

        TickOutcome::Moved {
            ate_food: result.info.ate_food,
        }
    }

    fn request_direction(&mut self, direction: Direction) {
        if !self.state.snake.direction.is_opposite(direction) {
            self.pending_direction = Some(direction);
        }
    }

    fn start_game(&mut self) {
        self.state = self.engine.reset();
        self.pending_direction = None;
        self.phase = Phase::Running;
        self.sound.stop_music();
        self.sound.start_music();
        info!("Game started");
    }

    fn finish_game(&mut self, cause: GameOverCause) -> GameSummary {
        self.sound.stop_music();
        self.sound.play(SoundEffect::GameOver);

        let score = self.state.score;
        let new_record = score > self.high_score;
        if new_record {
            self.high_score = score;
            match self.store.save(score) {
                Ok(()) => info!("New high score {}", score),
                Err(e) => error!("Failed to save high score {}: {:#}", score, e),
            }
        }

        info!("Game over ({:?}) with score {}", cause, score);

        let summary = GameSummary {
            score,
            cause,
            new_record,
        };
        self.phase = Phase::GameOver(summary);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, Position, Snake};
    use anyhow::{Result, bail};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SoundCall {
        Play(SoundEffect),
        StartMusic,
        PauseMusic,
        ResumeMusic,
        StopMusic,
    }

    #[derive(Default)]
    struct RecordingSound {
        calls: Vec<SoundCall>,
    }

    impl SoundPort for RecordingSound {
        fn play(&mut self, effect: SoundEffect) {
            self.calls.push(SoundCall::Play(effect));
        }
        fn start_music(&mut self) {
            self.calls.push(SoundCall::StartMusic);
        }
        fn pause_music(&mut self) {
            self.calls.push(SoundCall::PauseMusic);
        }
        fn resume_music(&mut self) {
            self.calls.push(SoundCall::ResumeMusic);
        }
        fn stop_music(&mut self) {
            self.calls.push(SoundCall::StopMusic);
        }
    }

    struct MemoryStore {
        stored: u32,
        saves: Vec<u32>,
        fail: bool,
    }

    impl MemoryStore {
        fn with(stored: u32) -> Self {
            Self {
                stored,
                saves: Vec::new(),
                fail: false,
            }
        }
    }

    impl HighScoreStore for MemoryStore {
        fn load(&self) -> u32 {
            self.stored
        }

        fn save(&mut self, score: u32) -> Result<()> {
            if self.fail {
                bail!("disk full");
            }
            self.saves.push(score);
            self.stored = score;
            Ok(())
        }
    }

    type TestController = GameController<RecordingSound, MemoryStore>;

    fn controller(stored_high_score: u32) -> TestController {
        GameController::new(
            GameEngine::with_seed(GameConfig::default(), 11),
            RecordingSound::default(),
            MemoryStore::with(stored_high_score),
        )
    }

    fn running(stored_high_score: u32) -> TestController {
        let mut controller = controller(stored_high_score);
        controller.handle_key(KeyAction::Other);
        controller.state.food = Position::new(0, 380);
        controller
    }

    /// Put the head one cell left of the right wall, heading right
    fn at_right_wall(controller: &mut TestController) {
        controller.state.snake = Snake::from_cells(
            vec![
                Position::new(580, 100),
                Position::new(560, 100),
                Position::new(540, 100),
            ],
            Direction::Right,
        );
    }

    #[test]
    fn test_starts_not_started_with_loaded_high_score() {
        let controller = controller(70);
        assert_eq!(controller.phase(), Phase::NotStarted);
        assert_eq!(controller.high_score(), 70);
        assert_eq!(controller.timer_period(), None);
    }

    #[test]
    fn test_control_keys_also_start_the_game() {
        let mut paused_key = controller(0);
        assert_eq!(paused_key.handle_key(KeyAction::Pause), Transition::Started);
        assert_eq!(paused_key.phase(), Phase::Running);

        let mut restart_key = controller(0);
        assert_eq!(restart_key.handle_key(KeyAction::Restart), Transition::Started);
        assert_eq!(restart_key.phase(), Phase::Running);
    }

    #[test]
    fn test_any_key_starts_the_game() {
        let mut controller = controller(0);

        assert_eq!(controller.handle_key(KeyAction::Other), Transition::Started);
        assert_eq!(controller.phase(), Phase::Running);
        assert_eq!(controller.timer_period(), Some(Duration::from_millis(100)));
        assert!(controller.sound().calls.contains(&SoundCall::StartMusic));
    }

    #[test]
    fn test_first_direction_key_is_buffered() {
        let mut controller = controller(0);
        controller.handle_key(KeyAction::Move(Direction::Down));
        assert_eq!(controller.pending_direction(), Some(Direction::Down));
    }

    #[test]
    fn test_tick_does_nothing_before_start() {
        let mut controller = controller(0);
        let before = controller.state().clone();

        assert_eq!(controller.tick(), TickOutcome::Idle);
        assert_eq!(controller.state(), &before);
    }

    #[test]
    fn test_reverse_direction_is_ignored() {
        let mut controller = running(0);

        controller.handle_key(KeyAction::Move(Direction::Left));
        assert_eq!(controller.pending_direction(), None);

        controller.tick();
        assert_eq!(controller.state().snake.direction, Direction::Right);
        assert_eq!(controller.state().snake.head(), Position::new(120, 100));
    }

    #[test]
    fn test_latest_valid_key_wins_between_ticks() {
        let mut controller = running(0);

        controller.handle_key(KeyAction::Move(Direction::Up));
        controller.handle_key(KeyAction::Move(Direction::Down));
        controller.handle_key(KeyAction::Move(Direction::Left));
        assert_eq!(controller.pending_direction(), Some(Direction::Down));

        controller.tick();
        assert_eq!(controller.state().snake.direction, Direction::Down);
        assert_eq!(controller.pending_direction(), None);
    }

    #[test]
    fn test_pause_freezes_the_simulation() {
        let mut controller = running(0);

        assert_eq!(controller.handle_key(KeyAction::Pause), Transition::Paused);
        let frozen = controller.state().clone();

        assert_eq!(controller.tick(), TickOutcome::Paused);
        assert_eq!(controller.tick(), TickOutcome::Paused);
        assert_eq!(controller.state(), &frozen);
        assert!(controller.timer_period().is_some());

        controller.handle_key(KeyAction::Move(Direction::Up));
        assert_eq!(controller.pending_direction(), None);

        assert_eq!(controller.handle_key(KeyAction::Pause), Transition::Resumed);
        assert!(matches!(controller.tick(), TickOutcome::Moved { .. }));

        let calls = &controller.sound().calls;
        assert!(calls.contains(&SoundCall::PauseMusic));
        assert!(calls.contains(&SoundCall::ResumeMusic));
    }

    #[test]
    fn test_eating_plays_sound() {
        let mut controller = running(0);
        controller.state.food = Position::new(120, 100);

        assert_eq!(controller.tick(), TickOutcome::Moved { ate_food: true });
        assert_eq!(controller.state().score, 10);
        assert!(controller
            .sound()
            .calls
            .contains(&SoundCall::Play(SoundEffect::Eat)));
    }

    #[test]
    fn test_wall_ends_game_and_stops_timer() {
        let mut controller = running(0);
        at_right_wall(&mut controller);
        controller.state.score = 20;

        let outcome = controller.tick();

        let summary = GameSummary {
            score: 20,
            cause: GameOverCause::Wall,
            new_record: true,
        };
        assert_eq!(outcome, TickOutcome::GameOver(summary));
        assert_eq!(controller.phase(), Phase::GameOver(summary));
        assert_eq!(controller.timer_period(), None);

        let calls = &controller.sound().calls;
        let stop = calls.iter().rposition(|c| *c == SoundCall::StopMusic);
        let boom = calls
            .iter()
            .rposition(|c| *c == SoundCall::Play(SoundEffect::GameOver));
        assert!(stop.is_some() && boom.is_some());
        assert!(stop < boom);
    }

    #[test]
    fn test_high_score_saved_only_when_beaten() {
        let mut controller = running(30);
        at_right_wall(&mut controller);
        controller.state.score = 30;

        controller.tick();

        assert_eq!(controller.high_score(), 30);
        assert!(controller.store().saves.is_empty());

        controller.handle_key(KeyAction::Restart);
        at_right_wall(&mut controller);
        controller.state.score = 40;
        controller.tick();

        assert_eq!(controller.high_score(), 40);
        assert_eq!(controller.store().saves, vec![40]);
    }

    #[test]
    fn test_failed_save_keeps_playing() {
        let mut controller = running(0);
        controller.store.fail = true;
        at_right_wall(&mut controller);
        controller.state.score = 10;

        let outcome = controller.tick();

        assert!(matches!(outcome, TickOutcome::GameOver(s) if s.new_record));
        assert_eq!(controller.high_score(), 10);
        assert_eq!(controller.handle_key(KeyAction::Restart), Transition::Started);
    }

    #[test]
    fn test_restart_only_when_not_running() {
        let mut controller = running(0);
        controller.state.score = 10;

        assert_eq!(controller.handle_key(KeyAction::Restart), Transition::None);
        assert_eq!(controller.state().score, 10);

        controller.handle_key(KeyAction::Pause);
        assert_eq!(controller.handle_key(KeyAction::Restart), Transition::Started);
        assert_eq!(controller.phase(), Phase::Running);
        assert_eq!(controller.state().score, 0);
    }

    #[test]
    fn test_restart_after_game_over_resets_state() {
        let mut controller = running(0);
        at_right_wall(&mut controller);
        controller.tick();

        assert_eq!(controller.handle_key(KeyAction::Other), Transition::None);
        assert_eq!(controller.handle_key(KeyAction::Restart), Transition::Started);

        let state = controller.state();
        assert!(state.is_alive);
        assert_eq!(state.score, 0);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.tick_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_level_follows_score() {
        let mut controller = running(0);
        assert_eq!(controller.level(), 1);
        controller.state.score = 100;
        assert_eq!(controller.level(), 3);
    }
}
