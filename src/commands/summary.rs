//! Command: print the environment and current inventory.
use std::io::{self, Write as _};
use std::sync::Arc;

use anyhow::Result;

use super::install::warn_dropped_flags;
use super::{CommandSetup, available_installers};
use crate::cli::GlobalOpts;
use crate::exec::{Executor, SystemExecutor};
use crate::platform::EnvironmentSnapshot;
use crate::report::{Inventory, snapshot_text};
use crate::resources::Installer;

/// Print runtime versions and every installed package, application, and
/// extension. Nothing is installed or written besides the run log.
///
/// # Errors
///
/// Returns an error if configuration loading fails or stdout is closed.
pub fn run(global: &GlobalOpts, verbose: bool, dropped_flags: &[String]) -> Result<()> {
    let setup = CommandSetup::init(global, verbose)?;
    warn_dropped_flags(&*setup.log, dropped_flags);
    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);

    let environment = EnvironmentSnapshot::detect(&*executor, &setup.config.runtimes);
    let installers = available_installers(&setup.config, &executor);
    if installers.is_empty() {
        setup.log.warn("neither brew nor an editor CLI found");
    }
    let refs: Vec<&dyn Installer> = installers.iter().map(AsRef::as_ref).collect();
    let inventory = Inventory::collect(&refs);

    write!(io::stdout(), "{}", snapshot_text(&environment, &inventory))?;
    Ok(())
}
