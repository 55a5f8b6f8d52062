//! Command: back up, install every manifest, and report.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use chrono::Local;

use super::{CommandSetup, available_installers};
use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::config::manifest::ItemKind;
use crate::error::{PreflightError, ProvisionError};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Log;
use crate::platform::EnvironmentSnapshot;
use crate::report::{Inventory, RunReport};
use crate::resources::Installer;
use crate::resources::package::BREW;
use crate::tasks::{self, Context};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if configuration loading, the pre-flight check, or the
/// backup fails. With `--strict`, also returns an error when any item or
/// task failed.
pub fn run(global: &GlobalOpts, verbose: bool, dropped_flags: &[String]) -> Result<()> {
    let setup = CommandSetup::init(global, verbose)?;
    let log = &setup.log;
    let config = &setup.config;
    warn_dropped_flags(&**log, dropped_flags);

    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);

    log.stage("Pre-flight");
    preflight(config, &*executor).map_err(ProvisionError::from)?;

    super::backup::backup_or_preview(&setup, global.dry_run)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&interrupted);
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst)) {
        log.warn(&format!("cannot install Ctrl-C handler: {e}"));
    }

    let ctx = Context::new(
        Arc::clone(config),
        Arc::clone(log) as Arc<dyn Log>,
        Arc::clone(&executor),
        global.dry_run,
    )
    .with_interrupt(interrupted);

    for task in tasks::all_install_tasks() {
        tasks::execute(task.as_ref(), &ctx);
    }
    if ctx.is_interrupted() {
        log.warn("interrupted: remaining items were not attempted");
    }

    let finished_at = Local::now();
    let environment = EnvironmentSnapshot::detect(&*executor, &config.runtimes);
    let report = RunReport::render(setup.started_at, finished_at, ctx.take_results(), environment);
    report.log_summary(&**log);

    let installers = available_installers(config, &executor);
    let refs: Vec<&dyn Installer> = installers.iter().map(AsRef::as_ref).collect();
    let inventory = Inventory::collect(&refs);
    match report.write_summary(&setup.paths.logs_dir, &inventory) {
        Ok(path) => log.info(&format!("summary: {}", path.display())),
        Err(e) => log.warn(&format!("cannot write summary: {e:#}")),
    }
    match report.persist_json(&setup.paths.logs_dir) {
        Ok(path) => log.debug(&format!("report: {}", path.display())),
        Err(e) => log.warn(&format!("cannot write report: {e:#}")),
    }

    log.print_summary();

    if global.strict {
        let failed_items = report.failures().count();
        let failed_tasks = log.failure_count();
        if failed_items + failed_tasks > 0 {
            anyhow::bail!(
                "{failed_items} item(s) and {failed_tasks} task(s) failed (--strict)"
            );
        }
    }
    Ok(())
}

/// Fail early when `brew` is required but missing.
///
/// `brew` is required when any package or application manifest lists at
/// least one item.
///
/// # Errors
///
/// Returns [`PreflightError::RequiredCommandMissing`] if `brew` is needed
/// and not on `PATH`.
pub fn preflight(config: &Config, executor: &dyn Executor) -> Result<(), PreflightError> {
    let needed =
        config.item_count(ItemKind::Package) + config.item_count(ItemKind::Application);
    if needed > 0 && !executor.which(BREW) {
        return Err(PreflightError::RequiredCommandMissing {
            command: BREW.to_string(),
            reason: format!("{needed} packages and applications listed"),
        });
    }
    Ok(())
}

/// Report flags that were dropped before parsing.
pub fn warn_dropped_flags(log: &dyn Log, dropped: &[String]) {
    if !dropped.is_empty() {
        log.warn(&format!("ignoring unknown flags: {}", dropped.join(" ")));
    }
}
