use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("codeknight"),
            )
        } else {
            ProjectDirs::from("", "", "codeknight")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    /// High-score board (JSON).
    pub fn score_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("scores.json"))
    }

    /// Append-only per-session run log (CSV).
    pub fn history_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("runs.csv"))
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "codeknight").map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
    }
}
