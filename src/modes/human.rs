use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use log::{debug, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval, interval_at};

use crate::audio::SoundPort;
use crate::game::{GameConfig, GameController, GameEngine, TickOutcome, Transition};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{GameView, Renderer};
use crate::storage::HighScoreStore;

/// Interactive play in the terminal
///
/// Drives the controller from three sources: key events, the game tick timer
/// and a 30 FPS render timer. The tick timer only exists while a game is
/// running or paused, and is rebuilt whenever the game speeds up.
pub struct HumanMode<S: SoundPort, H: HighScoreStore> {
    controller: GameController<S, H>,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl<S: SoundPort, H: HighScoreStore> HumanMode<S, H> {
    pub fn new(config: GameConfig, sound: S, store: H) -> Self {
        Self {
            controller: GameController::new(GameEngine::new(config), sound, store),
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut tick_timer: Option<Interval> = None;

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            self.sync_tick_timer(&mut tick_timer);

            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(e)) => debug!("Dropped terminal event: {}", e),
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick
                _ = next_tick(&mut tick_timer) => {
                    self.update_game();
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    let view = self.view();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &view);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                info!("Quitting");
                break;
            }
        }

        Ok(())
    }

    fn view(&self) -> GameView<'_> {
        GameView {
            state: self.controller.state(),
            phase: self.controller.phase(),
            high_score: self.controller.high_score(),
            level: self.controller.level(),
            metrics: &self.metrics,
        }
    }

    /// Start, stop or re-time the tick timer to match the controller
    fn sync_tick_timer(&self, timer: &mut Option<Interval>) {
        match self.controller.timer_period() {
            Some(period) => {
                if timer.as_ref().map(Interval::period) != Some(period) {
                    let mut fresh = interval_at(Instant::now() + period, period);
                    fresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    *timer = Some(fresh);
                }
            }
            None => *timer = None,
        }
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Quit => self.should_quit = true,
                action => {
                    let transition = self.controller.handle_key(action);
                    self.apply_transition(transition);
                }
            }
        }
    }

    fn apply_transition(&mut self, transition: Transition) {
        match transition {
            Transition::Started => self.metrics.on_game_start(),
            Transition::Paused => self.metrics.on_pause(),
            Transition::Resumed => self.metrics.on_resume(),
            Transition::None => {}
        }
    }

    fn update_game(&mut self) {
        if let TickOutcome::GameOver(summary) = self.controller.tick() {
            self.metrics.on_game_over(summary.score);
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

/// Wait for the next game tick; never resolves while the timer is stopped
async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
