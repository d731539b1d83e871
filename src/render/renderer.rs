use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::game::{Direction, GameOverCause, GameState, GameSummary, Phase, Position};
use crate::metrics::GameMetrics;

/// Terminal columns used to draw one board cell
const CELL_WIDTH: u16 = 2;

/// Background tiers, cycled through as the level rises
const BACKGROUND_TIERS: [Color; 4] = [
    Color::Black,
    Color::Indexed(17),
    Color::Indexed(22),
    Color::Indexed(52),
];

/// Read-only snapshot of everything drawn in one frame
pub struct GameView<'a> {
    pub state: &'a GameState,
    pub phase: Phase,
    pub high_score: u32,
    pub level: u32,
    pub metrics: &'a GameMetrics,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, view: &GameView) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(view), chunks[0]);

        let state = view.state;
        let board_area = centered_rect(
            cells_to_span(state.columns(), CELL_WIDTH),
            cells_to_span(state.rows(), 1),
            chunks[1],
        );
        frame.render_widget(self.render_board(view), board_area);

        let overlay = match view.phase {
            Phase::NotStarted => Some(self.render_start_screen(view)),
            Phase::Paused => Some(self.render_paused()),
            Phase::GameOver(summary) => Some(self.render_game_over(&summary, view.high_score)),
            Phase::Running => None,
        };
        if let Some((popup, width, height)) = overlay {
            let popup_area = centered_rect(width, height, board_area);
            frame.render_widget(Clear, popup_area);
            frame.render_widget(popup, popup_area);
        }

        frame.render_widget(self.render_controls(view.phase), chunks[2]);
    }

    fn render_board(&self, view: &GameView) -> Paragraph<'static> {
        let state = view.state;
        let background = tier_background(view.level);
        let head = state.snake.head();
        let mut lines = Vec::with_capacity(state.rows() as usize);

        for row in 0..state.rows() {
            let mut spans = Vec::with_capacity(state.columns() as usize);

            for column in 0..state.columns() {
                let pos = Position::from_cell(column, row, state.cell_size);

                let cell = if pos == head {
                    Span::styled(
                        head_glyph(state.snake.direction),
                        Style::default()
                            .fg(Color::Black)
                            .bg(if state.is_alive {
                                Color::LightGreen
                            } else {
                                Color::Gray
                            })
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.snake.occupies(pos) {
                    Span::styled("  ", Style::default().bg(Color::Green))
                } else if pos == state.food {
                    Span::styled(
                        "● ",
                        Style::default()
                            .fg(Color::Red)
                            .bg(background)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled("· ", Style::default().fg(Color::DarkGray).bg(background))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(" Snake "),
        )
    }

    fn render_stats(&self, view: &GameView) -> Paragraph<'static> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(
                view.state.score.to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("High: ", label),
            Span::styled(view.high_score.to_string(), value),
            Span::raw("    "),
            Span::styled("Level: ", label),
            Span::styled(view.level.to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(view.metrics.format_time(), value),
            Span::raw("    "),
            Span::styled("Games: ", label),
            Span::styled(view.metrics.games_played.to_string(), value),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_start_screen(&self, view: &GameView) -> (Paragraph<'static>, u16, u16) {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "S N A K E",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("High score: ", Style::default().fg(Color::Yellow)),
                Span::styled(view.high_score.to_string(), Style::default().fg(Color::White)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Press any key to start",
                Style::default().fg(Color::Cyan),
            )),
        ];

        let popup = Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Green)),
        );
        (popup, 34, 8)
    }

    fn render_paused(&self) -> (Paragraph<'static>, u16, u16) {
        let text = vec![
            Line::from(Span::styled(
                "PAUSED",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled("P", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::styled(" to resume", Style::default().fg(Color::Gray)),
            ]),
        ];

        let popup = Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
        (popup, 26, 4)
    }

    fn render_game_over(
        &self,
        summary: &GameSummary,
        high_score: u32,
    ) -> (Paragraph<'static>, u16, u16) {
        let cause = match summary.cause {
            GameOverCause::Wall => "You hit the wall",
            GameOverCause::SelfCollision => "You bit yourself",
            GameOverCause::BoardFull => "The board is full!",
        };

        let record = if summary.new_record {
            Line::from(Span::styled(
                "New high score!",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(vec![
                Span::styled("High score: ", Style::default().fg(Color::Yellow)),
                Span::styled(high_score.to_string(), Style::default().fg(Color::White)),
            ])
        };

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(cause, Style::default().fg(Color::Gray))),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    summary.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            record,
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        let popup = Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
        (popup, 38, 10)
    }

    fn render_controls(&self, phase: Phase) -> Paragraph<'static> {
        let mut spans = vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("P", Style::default().fg(Color::Cyan)),
            Span::raw(" pause | "),
        ];
        if !matches!(phase, Phase::Running) {
            spans.push(Span::styled("R", Style::default().fg(Color::Green)));
            spans.push(Span::raw(" restart | "));
        }
        spans.push(Span::styled("Q", Style::default().fg(Color::Red)));
        spans.push(Span::raw(" to quit"));

        Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Head cell text; the eyes sit on the side the snake is heading
pub fn head_glyph(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "''",
        Direction::Down => "..",
        Direction::Left => ": ",
        Direction::Right => " :",
    }
}

/// Board background for a level
pub fn tier_background(level: u32) -> Color {
    let tier = level.saturating_sub(1) as usize % BACKGROUND_TIERS.len();
    BACKGROUND_TIERS[tier]
}

/// Terminal extent of `cells` cells of `cell_width` columns plus the two border lines
fn cells_to_span(cells: i32, cell_width: u16) -> u16 {
    u16::try_from(cells)
        .unwrap_or(u16::MAX)
        .saturating_mul(cell_width)
        .saturating_add(2)
}

/// Rect of at most `width` x `height` centered in `area`
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, Snake};
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    fn state() -> GameState {
        GameState::new(
            Snake::new(Position::new(100, 100), Direction::Right, 3, 20),
            Position::new(200, 100),
            &GameConfig::default(),
        )
    }

    fn screen_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn draw(state: &GameState, phase: Phase, high_score: u32) -> String {
        let metrics = GameMetrics::new();
        let view = GameView {
            state,
            phase,
            high_score,
            level: 1,
            metrics: &metrics,
        };
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal
            .draw(|frame| Renderer::new().render(frame, &view))
            .unwrap();
        screen_text(terminal.backend().buffer())
    }

    #[test]
    fn test_start_screen() {
        let screen = draw(&state(), Phase::NotStarted, 70);
        assert!(screen.contains("S N A K E"));
        assert!(screen.contains("Press any key to start"));
        assert!(screen.contains("High: 70"));
    }

    #[test]
    fn test_running_board() {
        let screen = draw(&state(), Phase::Running, 0);
        assert!(screen.contains("Score: 0"));
        assert!(screen.contains("Level: 1"));
        assert!(screen.contains("●"));
        assert!(!screen.contains("PAUSED"));
        assert!(!screen.contains("GAME OVER"));
    }

    #[test]
    fn test_pause_overlay() {
        let screen = draw(&state(), Phase::Paused, 0);
        assert!(screen.contains("PAUSED"));
        assert!(screen.contains("to resume"));
    }

    #[test]
    fn test_game_over_overlay() {
        let summary = GameSummary {
            score: 40,
            cause: GameOverCause::Wall,
            new_record: true,
        };
        let screen = draw(&state(), Phase::GameOver(summary), 40);
        assert!(screen.contains("GAME OVER"));
        assert!(screen.contains("Final Score: 40"));
        assert!(screen.contains("New high score!"));
        assert!(screen.contains("You hit the wall"));
    }

    #[test]
    fn test_render_does_not_touch_state() {
        let before = state();
        let after = before.clone();
        draw(&after, Phase::Running, 0);
        assert_eq!(before, after);
    }

    #[test]
    fn test_head_eyes_follow_direction() {
        assert_eq!(head_glyph(Direction::Right), " :");
        assert_eq!(head_glyph(Direction::Left), ": ");
        assert_ne!(head_glyph(Direction::Up), head_glyph(Direction::Down));
    }

    #[test]
    fn test_background_tiers_cycle() {
        assert_eq!(tier_background(1), Color::Black);
        assert_ne!(tier_background(2), tier_background(1));
        assert_eq!(tier_background(5), tier_background(1));
    }

    #[test]
    fn test_cell_extent_saturates() {
        assert_eq!(cells_to_span(30, CELL_WIDTH), 62);
        assert_eq!(cells_to_span(20, 1), 22);
        assert_eq!(cells_to_span(40_000, CELL_WIDTH), u16::MAX);
        assert_eq!(cells_to_span(i32::MAX, 1), u16::MAX);
        assert_eq!(cells_to_span(-3, 1), u16::MAX);
    }

    #[test]
    fn test_oversized_board_draws_without_panicking() {
        let config = GameConfig::new(20 * 4_000, 400);
        let state = GameState::new(
            Snake::new(Position::new(100, 100), Direction::Right, 3, 20),
            Position::new(200, 100),
            &config,
        );
        let screen = draw(&state, Phase::Running, 0);
        assert!(screen.contains("Score: 0"));
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 10, 5);
        assert_eq!(centered_rect(20, 20, area), area);
        assert_eq!(centered_rect(4, 1, area), Rect::new(3, 2, 4, 1));
    }
}
