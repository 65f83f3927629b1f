use chrono::Local;
use csv::WriterBuilder;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::battle::Mode;

/// Append-only CSV log of finished sessions. Writes are best-effort; the
/// caller discards errors.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::history_path().unwrap_or_else(|| PathBuf::from("codeknight_runs.csv"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, mode: Mode, level: u32, score: u32, max_combo: u32) -> csv::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // If the log doesn't exist yet, we need to emit a header
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if needs_header {
            writer.write_record(["date", "mode", "level", "score", "max_combo"])?;
        }

        writer.write_record([
            Local::now().format("%c").to_string(),
            mode.to_string(),
            level.to_string(),
            score.to_string(),
            max_combo.to_string(),
        ])?;
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn first_append_writes_a_header() {
        let dir = tempdir().unwrap();
        let log = RunLog::with_path(dir.path().join("runs.csv"));

        log.append(Mode::Battle, 3, 42, 17).unwrap();

        let contents = std::fs::read_to_string(dir.path().join("runs.csv")).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("date,mode,level,score,max_combo"));
        let row = lines.next().unwrap();
        assert!(row.ends_with(",Battle,3,42,17"));
    }

    #[test]
    fn appends_accumulate_without_duplicate_headers() {
        let dir = tempdir().unwrap();
        let log = RunLog::with_path(dir.path().join("runs.csv"));

        log.append(Mode::Battle, 1, 5, 5).unwrap();
        log.append(Mode::Practice, 2, 9, 9).unwrap();

        let contents = std::fs::read_to_string(dir.path().join("runs.csv")).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert_eq!(
            contents.matches("date,mode,level,score,max_combo").count(),
            1
        );
        assert!(contents.contains(",Practice,2,9,9"));
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let log = RunLog::with_path(dir.path().join("deep/nested/runs.csv"));

        log.append(Mode::Battle, 1, 1, 1).unwrap();
        assert!(dir.path().join("deep/nested/runs.csv").exists());
    }
}
