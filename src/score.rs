use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

/// Best results persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoreBoard {
    pub high_score: u32,
    pub best_combo: u32,
    pub last_played: Option<DateTime<Local>>,
}

pub trait ScoreStore {
    /// Missing or unreadable data reads as an empty board.
    fn load(&self) -> ScoreBoard;
    fn save(&self, board: &ScoreBoard) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::score_path().unwrap_or_else(|| PathBuf::from("codeknight_scores.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreStore for FileScoreStore {
    fn load(&self) -> ScoreBoard {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(board) = serde_json::from_slice::<ScoreBoard>(&bytes) {
                return board;
            }
        }
        ScoreBoard::default()
    }

    fn save(&self, board: &ScoreBoard) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(board).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// Folds one finished session into the board, best-effort. The high score
/// only ever moves up; returns true when it did.
pub fn record_session(store: &dyn ScoreStore, score: u32, max_combo: u32) -> bool {
    let mut board = store.load();
    let improved = score > board.high_score;
    if improved {
        board.high_score = score;
    }
    board.best_combo = board.best_combo.max(max_combo);
    board.last_played = Some(Local::now());
    let _ = store.save(&board);
    improved
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_empty_board() {
        let dir = tempdir().unwrap();
        let store = FileScoreStore::with_path(dir.path().join("scores.json"));

        let board = store.load();
        assert_eq!(board.high_score, 0);
        assert_eq!(board.best_combo, 0);
        assert!(board.last_played.is_none());
    }

    #[test]
    fn board_roundtrips_through_disk() {
        let dir = tempdir().unwrap();
        let store = FileScoreStore::with_path(dir.path().join("scores.json"));
        let board = ScoreBoard {
            high_score: 120,
            best_combo: 34,
            last_played: Some(Local::now()),
        };

        store.save(&board).unwrap();
        assert_eq!(store.load(), board);
    }

    #[test]
    fn corrupt_file_reads_as_empty_board() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(&path, b"not json at all").unwrap();
        let store = FileScoreStore::with_path(&path);

        assert_eq!(store.load(), ScoreBoard::default());
    }

    #[test]
    fn record_session_only_raises_the_high_score() {
        let dir = tempdir().unwrap();
        let store = FileScoreStore::with_path(dir.path().join("scores.json"));

        assert!(record_session(&store, 50, 12));
        assert!(!record_session(&store, 30, 20));

        let board = store.load();
        assert_eq!(board.high_score, 50);
        // best combo still tracks independently
        assert_eq!(board.best_combo, 20);
        assert!(board.last_played.is_some());
    }
}
