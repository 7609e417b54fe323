use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, info, warn};

use crate::utils::time::date_to_split_dir;

use super::{entities::SessionLogEntry, error::LogError};

pub const LOG_FILE_NAME: &str = "pomo.log";

/// Append-only log of finished sessions. With `split` enabled every day gets its own
/// `YYYY/MM/DD/pomo.log` below the log directory.
pub struct SessionLog {
    log_dir: PathBuf,
    split: bool,
}

impl SessionLog {
    pub fn new(log_dir: PathBuf, split: bool) -> Self {
        Self { log_dir, split }
    }

    /// Location of the log that receives sessions finishing on `date`.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        let dir = if self.split {
            self.log_dir.join(date_to_split_dir(date))
        } else {
            self.log_dir.clone()
        };
        dir.join(LOG_FILE_NAME)
    }

    /// Appends one line for `entry`, creating missing directories. Returns the file written to.
    pub async fn append(&self, entry: &SessionLogEntry) -> Result<PathBuf> {
        let path = self.path_for(entry.end.date_naive());
        if entry.label.contains(',') {
            warn!(
                "Task label {:?} contains a comma, the log line will have extra fields",
                entry.label
            );
        }

        Self::append_line(&path, &entry.to_log_line())
            .await
            .with_context(|| format!("Could not write to log file {}.", path.display()))?;

        info!("Logged session {:?} to {path:?}", entry.label);
        Ok(path)
    }

    async fn append_line(path: &Path, line: &str) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = File::options()
            .create(true)
            .append(true)
            .open(path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = async {
            file.write_all(line.as_bytes()).await?;
            file.flush().await
        }
        .await;
        file.unlock_async().await?;
        result
    }
}

/// Reads a log for analysis under a shared lock, so a session being appended concurrently is
/// either fully visible or not at all.
pub async fn read_log(path: &Path) -> Result<String, LogError> {
    async fn read(path: &Path) -> Result<String, std::io::Error> {
        debug!("Reading {path:?}");
        let mut file = File::open(path).await?;
        file.lock_shared()?;
        let mut content = String::new();
        let result = file.read_to_string(&mut content).await;
        file.unlock_async().await?;
        result.map(|_| content)
    }

    read(path).await.map_err(|source| LogError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use anyhow::Result;
    use chrono::{Duration, Local, NaiveDate, TimeZone};
    use tempfile::tempdir;

    use crate::storage::{entities::SessionLogEntry, error::LogError};

    use super::{read_log, SessionLog, LOG_FILE_NAME};

    fn entry(label: &str, start_epoch: i64, seconds: i64) -> SessionLogEntry {
        let start = Local.timestamp_opt(start_epoch, 0).unwrap();
        SessionLogEntry {
            label: label.into(),
            start,
            end: start + Duration::seconds(seconds),
        }
    }

    #[test]
    fn test_path_for_flat_and_split() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        let flat = SessionLog::new(PathBuf::from("logs"), false);
        assert_eq!(flat.path_for(date), PathBuf::from("logs").join(LOG_FILE_NAME));

        let split = SessionLog::new(PathBuf::from("logs"), true);
        assert_eq!(
            split.path_for(date),
            PathBuf::from("logs")
                .join("2024")
                .join("01")
                .join("02")
                .join(LOG_FILE_NAME)
        );
    }

    #[tokio::test]
    async fn test_append_adds_lines() -> Result<()> {
        let dir = tempdir()?;
        let log = SessionLog::new(dir.path().to_path_buf(), false);

        let first = entry("first", 1_700_000_000, 1500);
        let second = entry("second", 1_700_002_000, 1510);
        let path = log.append(&first).await?;
        assert_eq!(log.append(&second).await?, path);

        let content = read_log(&path).await?;
        assert_eq!(content, first.to_log_line() + &second.to_log_line());
        Ok(())
    }

    #[tokio::test]
    async fn test_append_split_creates_directories() -> Result<()> {
        let dir = tempdir()?;
        let log = SessionLog::new(dir.path().join("nested"), true);

        let session = entry("split", 1_700_000_000, 1500);
        let path = log.append(&session).await?;

        assert_eq!(path, log.path_for(session.end.date_naive()));
        assert!(path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_read_missing_log() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.log");

        let error = read_log(&missing).await.unwrap_err();

        assert!(matches!(&error, LogError::FileUnreadable { path, .. } if *path == missing));
        assert_eq!(
            error.to_string(),
            format!("Cannot load \"{}\" for analysis", missing.display())
        );
    }
}
