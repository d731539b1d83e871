pub mod renderer;

pub use renderer::{GameView, Renderer};
