//! Core game logic module for Snake
//!
//! Everything here runs without a terminal, audio device or file system:
//! sound and high-score persistence are reached through the ports in
//! [`crate::audio`] and [`crate::storage`].

pub mod action;
pub mod config;
pub mod controller;
pub mod engine;
pub mod food;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use config::GameConfig;
pub use controller::{GameController, GameOverCause, GameSummary, Phase, TickOutcome, Transition};
pub use engine::{GameEngine, StepInfo, StepResult};
pub use state::{CollisionType, GameState, Position, Snake};
