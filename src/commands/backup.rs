//! Command: back up configuration files.
use anyhow::Result;

use super::CommandSetup;
use super::install::warn_dropped_flags;
use crate::backup;
use crate::cli::GlobalOpts;
use crate::error::ProvisionError;

/// Run the backup command: copy existing configuration files and stop.
///
/// # Errors
///
/// Returns an error if configuration loading fails or the backup directory
/// cannot be created.
pub fn run(global: &GlobalOpts, verbose: bool, dropped_flags: &[String]) -> Result<()> {
    let setup = CommandSetup::init(global, verbose)?;
    warn_dropped_flags(&*setup.log, dropped_flags);
    backup_or_preview(&setup, global.dry_run)
}

/// Back up every existing candidate, or only list them in a dry run.
///
/// # Errors
///
/// Returns an error if the timestamped backup directory cannot be created.
pub fn backup_or_preview(setup: &CommandSetup, dry_run: bool) -> Result<()> {
    let log = &setup.log;
    let config = &setup.config;
    log.stage("Backup");

    if dry_run {
        for candidate in config.backup_candidates.iter().filter(|c| c.exists()) {
            log.dry_run(&format!("would back up {}", candidate.display()));
        }
        return Ok(());
    }

    let set = backup::backup(
        &config.backup_candidates,
        &setup.paths.backup_root,
        &setup.paths.stamp,
        &config.home,
        &**log,
    )
    .map_err(ProvisionError::from)?;
    log.info(&format!("backups in {}", set.directory.display()));
    Ok(())
}
