use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;
use tui_snake::audio;
use tui_snake::game::GameConfig;
use tui_snake::modes::HumanMode;
use tui_snake::storage::FileHighScoreStore;

#[derive(Parser)]
#[command(name = "tui_snake")]
#[command(version, about = "Snake in the terminal, with levels, sound and a high score")]
struct Cli {
    /// JSON file with game settings; unset fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Board width in units (a multiple of the cell size)
    #[arg(long)]
    board_width: Option<i32>,

    /// Board height in units (a multiple of the cell size)
    #[arg(long)]
    board_height: Option<i32>,

    /// Size of one cell in units
    #[arg(long)]
    cell_size: Option<i32>,

    /// File holding the high score
    #[arg(long, default_value = "highscore.txt")]
    high_score_file: PathBuf,

    /// Directory with eat.wav, game_over.wav and music.wav
    #[arg(long, default_value = "assets")]
    assets_dir: PathBuf,

    /// Play without sound
    #[arg(long)]
    mute: bool,

    /// Where log output goes; the terminal itself is taken by the game
    #[arg(long, default_value = "tui_snake.log")]
    log_file: PathBuf,

    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
        }
    }
}

impl Cli {
    /// Settings file (or defaults) with the command-line overrides applied
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };

        if let Some(width) = self.board_width {
            config.board_width = width;
        }
        if let Some(height) = self.board_height {
            config.board_height = height;
        }
        if let Some(cell_size) = self.cell_size {
            config.cell_size = cell_size;
        }

        config.validate().context("Invalid game configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging before anything else
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {:?}", cli.log_file))?;
    WriteLogger::init(cli.log_level.into(), Config::default(), log_file)
        .context("Failed to initialize logger")?;

    let config = cli.game_config()?;
    info!(
        "Starting tui_snake on a {}x{} grid",
        config.columns(),
        config.rows()
    );

    let sound = audio::open(&cli.assets_dir, cli.mute);
    let store = FileHighScoreStore::new(cli.high_score_file);

    let mut human_mode = HumanMode::new(config, sound, store);
    human_mode.run().await?;

    Ok(())
}
