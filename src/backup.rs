//! One-shot backup of existing configuration files before a run mutates
//! anything.
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::BackupError;
use crate::logging::Log;
use crate::resources::fs::copy_path;

/// One copied candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupEntry {
    /// Original file or directory.
    pub source: PathBuf,
    /// Location of the copy.
    pub copy: PathBuf,
}

/// The result of a backup: a fresh directory and what was copied into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupSet {
    /// Timestamped directory holding the copies.
    pub directory: PathBuf,
    /// Candidates that existed and were copied, in candidate order.
    pub entries: Vec<BackupEntry>,
}

/// Where the copy of `source` goes inside `directory`.
///
/// Paths under `home` keep their relative layout; anything else is
/// flattened to its file name.
fn destination(source: &Path, directory: &Path, home: &Path) -> PathBuf {
    source.strip_prefix(home).map_or_else(
        |_| {
            source
                .file_name()
                .map_or_else(|| directory.join("unnamed"), |name| directory.join(name))
        },
        |rel| directory.join(rel),
    )
}

/// Attempts at a suffixed name before giving up on a fresh directory.
const MAX_SUFFIX: u32 = 100;

/// Create a directory under `root` that did not exist before this call.
///
/// Tries `<stamp>`, then `<stamp>-1`, `<stamp>-2`, ... so two runs started in
/// the same second never share a backup set.
fn create_fresh_dir(root: &Path, stamp: &str) -> Result<PathBuf, BackupError> {
    let first = root.join(stamp);
    std::fs::create_dir_all(root).map_err(|source| BackupError::DirectoryUncreatable {
        path: first.clone(),
        source,
    })?;

    let mut last_err = None;
    for n in 0..=MAX_SUFFIX {
        let directory = if n == 0 {
            first.clone()
        } else {
            root.join(format!("{stamp}-{n}"))
        };
        match std::fs::create_dir(&directory) {
            Ok(()) => return Ok(directory),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => last_err = Some(e),
            Err(source) => {
                return Err(BackupError::DirectoryUncreatable {
                    path: directory,
                    source,
                });
            }
        }
    }
    Err(BackupError::DirectoryUncreatable {
        path: first,
        source: last_err.unwrap_or_else(|| std::io::ErrorKind::AlreadyExists.into()),
    })
}

/// Copy every existing candidate into a fresh `<root>/<stamp>/`.
///
/// If `<stamp>` already exists a numeric suffix is appended.
///
/// Missing candidates are skipped with a debug line. A candidate that fails
/// to copy is logged as a warning and left out of the set.
///
/// # Errors
///
/// Returns [`BackupError::DirectoryUncreatable`] if the timestamped
/// directory cannot be created.
pub fn backup(
    candidates: &[PathBuf],
    root: &Path,
    stamp: &str,
    home: &Path,
    log: &dyn Log,
) -> Result<BackupSet, BackupError> {
    let directory = create_fresh_dir(root, stamp)?;
    log.debug(&format!("backup directory: {}", directory.display()));

    let mut entries = Vec::new();
    for source in candidates {
        if !source.exists() {
            log.debug(&format!("not present, skipping: {}", source.display()));
            continue;
        }
        let copy = destination(source, &directory, home);
        match copy_path(source, &copy) {
            Ok(()) => {
                log.debug(&format!("backed up {}", source.display()));
                entries.push(BackupEntry {
                    source: source.clone(),
                    copy,
                });
            }
            Err(e) => log.warn(&format!("could not back up {}: {e:#}", source.display())),
        }
    }

    log.info(&format!(
        "backed up {} of {} candidate files to {}",
        entries.len(),
        candidates.len(),
        directory.display()
    ));
    Ok(BackupSet { directory, entries })
}
