//! Command: print version information.
use std::io::{self, Write as _};

use anyhow::Result;

use crate::logging;

/// Print the provision version to stdout.
///
/// # Errors
///
/// Returns an error if stdout is closed.
pub fn run() -> Result<()> {
    writeln!(io::stdout(), "provision {}", logging::version())?;
    Ok(())
}
