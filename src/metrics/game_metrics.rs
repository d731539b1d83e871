use std::time::{Duration, Instant};

/// Play clock and session counters shown in the HUD
///
/// The clock only runs while a game is running; pausing freezes it.
pub struct GameMetrics {
    /// Start of the current running stretch, `None` while the clock is stopped
    pub running_since: Option<Instant>,
    /// Time played before the current running stretch
    pub banked_time: Duration,
    pub elapsed_time: Duration,
    pub games_played: u32,
    pub last_score: Option<u32>,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            running_since: None,
            banked_time: Duration::ZERO,
            elapsed_time: Duration::ZERO,
            games_played: 0,
            last_score: None,
        }
    }

    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    pub fn update_at(&mut self, now: Instant) {
        self.elapsed_time = self.banked_time
            + self
                .running_since
                .map(|since| now.saturating_duration_since(since))
                .unwrap_or(Duration::ZERO);
    }

    pub fn on_game_start(&mut self) {
        self.on_game_start_at(Instant::now());
    }

    pub fn on_game_start_at(&mut self, now: Instant) {
        self.banked_time = Duration::ZERO;
        self.elapsed_time = Duration::ZERO;
        self.running_since = Some(now);
    }

    pub fn on_pause(&mut self) {
        self.on_pause_at(Instant::now());
    }

    pub fn on_pause_at(&mut self, now: Instant) {
        self.stop_clock(now);
    }

    pub fn on_resume(&mut self) {
        self.on_resume_at(Instant::now());
    }

    pub fn on_resume_at(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.stop_clock(Instant::now());
        self.games_played += 1;
        self.last_score = Some(final_score);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }

    fn stop_clock(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.banked_time += now.saturating_duration_since(since);
        }
        self.elapsed_time = self.banked_time;
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
