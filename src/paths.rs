//! Per-run artifact paths under the state directory.
//!
//! Every artifact of a run shares one timestamp stamp (`YYYYmmdd-HHMMSS`,
//! local time of the run start):
//!
//! - `<state_dir>/logs/provision-<stamp>.log`
//! - `<state_dir>/logs/summary-<stamp>.txt` (see [`crate::report`])
//! - `<state_dir>/logs/report-<stamp>.json`
//! - `<backup_dir>/<stamp>/`

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::config::settings::Settings;
use crate::config::{self, Config, LOGS_DIR};

/// Format `at` as the artifact stamp.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use provision_cli::paths::stamp;
///
/// let at = Local.with_ymd_and_hms(2026, 3, 9, 7, 5, 1).unwrap();
/// assert_eq!(stamp(&at), "20260309-070501");
/// ```
#[must_use]
pub fn stamp(at: &DateTime<Local>) -> String {
    at.format("%Y%m%d-%H%M%S").to_string()
}

/// Paths of every artifact one run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    /// Shared timestamp stamp.
    pub stamp: String,
    /// Directory for logs, summaries, and reports.
    pub logs_dir: PathBuf,
    /// Live run log.
    pub log_file: PathBuf,
    /// Directory receiving the per-run backup directory.
    pub backup_root: PathBuf,
}

impl RunPaths {
    /// Derive the run's artifact paths from `config` and the run start time.
    #[must_use]
    pub fn new(config: &Config, started_at: &DateTime<Local>) -> Self {
        Self::from_dirs(&config.logs_dir(), &config.backup_dir, started_at)
    }

    /// Derive the run's artifact paths from settings alone, before any
    /// manifest is loaded.
    #[must_use]
    pub fn from_settings(
        settings: &Settings,
        root: &Path,
        home: &Path,
        started_at: &DateTime<Local>,
    ) -> Self {
        let (state_dir, backup_dir) = config::state_dirs(settings, root, home);
        Self::from_dirs(&state_dir.join(LOGS_DIR), &backup_dir, started_at)
    }

    /// Derive artifact paths from explicit directories.
    #[must_use]
    pub fn from_dirs(logs_dir: &Path, backup_root: &Path, started_at: &DateTime<Local>) -> Self {
        let stamp = stamp(started_at);
        Self {
            log_file: logs_dir.join(format!("provision-{stamp}.log")),
            logs_dir: logs_dir.to_path_buf(),
            backup_root: backup_root.to_path_buf(),
            stamp,
        }
    }
}
