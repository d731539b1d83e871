//! TUI Snake - single-player Snake for the terminal
//!
//! This library provides:
//! - Core game logic and the phase state machine (game module)
//! - Keyboard mapping (input module)
//! - TUI rendering (render module)
//! - Sound and high-score ports (audio and storage modules)
//! - The interactive terminal loop (modes module)

pub mod audio;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod storage;
