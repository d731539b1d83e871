//! High score persistence
//!
//! The score lives in a plain text file holding a single decimal integer.

use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Where the best score survives between runs
pub trait HighScoreStore {
    /// Stored high score; 0 when nothing readable is stored
    fn load(&self) -> u32;

    /// Overwrite the stored high score
    fn save(&mut self, score: u32) -> Result<()>;
}

/// High score kept in a text file
#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&self) -> u32 {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No high score file at {:?}, starting from 0", self.path);
                return 0;
            }
            Err(e) => {
                warn!("Failed to read high score from {:?}: {}", self.path, e);
                return 0;
            }
        };

        match text.trim().parse::<u32>() {
            Ok(score) => score,
            Err(e) => {
                warn!(
                    "Ignoring unreadable high score {:?} in {:?}: {}",
                    text.trim(),
                    self.path,
                    e
                );
                0
            }
        }
    }

    fn save(&mut self, score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        fs::write(&self.path, score.to_string())
            .with_context(|| format!("Failed to write high score to {:?}", self.path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_zero() {
        let dir = TempDir::new().unwrap();
        let store = FileHighScoreStore::new(dir.path().join("highscore.txt"));
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut store = FileHighScoreStore::new(dir.path().join("highscore.txt"));

        store.save(120).unwrap();
        assert_eq!(store.load(), 120);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "120");

        store.save(30).unwrap();
        assert_eq!(store.load(), 30);
    }

    #[test]
    fn test_surrounding_whitespace_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("highscore.txt");
        fs::write(&path, " 250\n").unwrap();

        assert_eq!(FileHighScoreStore::new(path).load(), 250);
    }

    #[test]
    fn test_corrupt_file_is_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("highscore.txt");

        fs::write(&path, "lots").unwrap();
        assert_eq!(FileHighScoreStore::new(&path).load(), 0);

        fs::write(&path, "-40").unwrap();
        assert_eq!(FileHighScoreStore::new(&path).load(), 0);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("scores").join("highscore.txt");
        let mut store = FileHighScoreStore::new(&path);

        store.save(60).unwrap();
        assert_eq!(store.load(), 60);
    }

    #[test]
    fn test_save_into_a_file_path_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let mut store = FileHighScoreStore::new(blocker.join("highscore.txt"));
        assert!(store.save(10).is_err());
    }
}
