use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::PathBuf;

/// Centralized path management for userctl.
/// Every log, backup and report location is derived from a single base directory.
#[derive(Debug, Clone)]
pub struct Paths {
    base: PathBuf,
}

impl Paths {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base.join("logs")
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.base.join("backups")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.base.join("reports")
    }

    pub fn actions_log(&self) -> PathBuf {
        self.logs_dir().join("actions.log")
    }

    pub fn errors_log(&self) -> PathBuf {
        self.logs_dir().join("errors.log")
    }

    /// Accumulated `username,email,tier,secret` lines
    pub fn created_users(&self) -> PathBuf {
        self.reports_dir().join("created_users.txt")
    }

    /// Accumulated `username,secret` lines
    pub fn password_changes(&self) -> PathBuf {
        self.reports_dir().join("password_changes.txt")
    }

    pub fn summary_file(&self, stamp: &str) -> PathBuf {
        self.reports_dir().join(format!("summary_{stamp}.txt"))
    }

    pub fn home_backup(&self, username: &str, stamp: &str) -> PathBuf {
        self.backups_dir()
            .join(format!("{username}_home_{stamp}.tar.gz"))
    }

    /// Create the logs, backups and reports directories.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.logs_dir(), self.backups_dir(), self.reports_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating directory at {}", dir.display()))?;
        }
        Ok(())
    }
}

/// Timestamp suitable for file names, e.g. `20261017_142501`
pub fn file_stamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}
