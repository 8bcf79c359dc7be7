//! Scheduled maintenance jobs.
//!
//! Each job runs once per invocation against a [`MutationEngine`] and appends
//! its outcome to a plain-text log file. Scheduling is left to the host
//! (cron, systemd timers, Fly machines).
//!
//! | Job | Log line |
//! |-----|----------|
//! | [`heartbeat`] | `dd/mm/YYYY-HH:MM:SS CRM is alive` |
//! | [`low_stock`] | `[dd/mm/YYYY-HH:MM:SS] Updated 2 low-stock products` |
//! | [`reminders`] | `YYYY-mm-dd HH:MM:SS - Reminder: Order 7 for ann@example.com` |
//! | [`report`] | `YYYY-mm-dd HH:MM:SS - Report: 3 customers, 5 orders, 120.50 revenue` |
//!
//! Timestamps come from the engine clock and are written in UTC.
//!
//! [`MutationEngine`]: crate::mutations::MutationEngine

pub mod heartbeat;
pub mod low_stock;
pub mod reminders;
pub mod report;

use std::path::Path;

use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::db::RepositoryError;
use crate::error::MutationError;

/// Errors that can occur while running a job.
#[derive(Debug, Error)]
pub enum JobError {
    /// The log file could not be written.
    #[error("failed to write job log {path}: {source}")]
    Log {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A mutation run by the job was rejected.
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// The store failed while the job was reading.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Append `lines` to the file at `path`, creating it if needed.
///
/// Each line is terminated with a newline.
pub(crate) async fn append_lines(path: &Path, lines: &[String]) -> Result<(), JobError> {
    let to_log_error = |source| JobError::Log {
        path: path.display().to_string(),
        source,
    };

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(to_log_error)?;

    let mut buf = String::new();
    for line in lines {
        buf.push_str(line);
        buf.push('\n');
    }

    file.write_all(buf.as_bytes()).await.map_err(to_log_error)?;
    file.flush().await.map_err(to_log_error)
}

/// A fresh log path under the system temp dir, unique per test process.
#[cfg(test)]
pub(crate) async fn test_log_path(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("crm-jobs-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.ok();
    let path = dir.join(name);
    tokio::fs::remove_file(&path).await.ok();
    path
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_lines_appends() {
        let path = test_log_path("append.txt").await;

        append_lines(&path, &["one".to_owned()]).await.unwrap();
        append_lines(&path, &["two".to_owned(), "three".to_owned()])
            .await
            .unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn test_unwritable_path_is_log_error() {
        let path = Path::new("/nonexistent-crm-dir/log.txt");
        let err = append_lines(path, &["x".to_owned()]).await.unwrap_err();
        assert!(matches!(err, JobError::Log { .. }));
    }
}
