//! Typed error variants for installer and resource operations.
//!
//! Adapters return these through [`anyhow::Error`]; the reconciler turns
//! them into item outcomes rather than aborting the run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from installer queries and resource checks.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// A listing command exited non-zero.
    #[error("'{program} {args}' failed (exit {exit_code}): {detail}")]
    ListingFailed {
        /// Program that was invoked.
        program: String,
        /// Arguments passed, space-joined.
        args: String,
        /// Exit code, or `-1` when killed by a signal.
        exit_code: i32,
        /// Combined output of the command.
        detail: String,
    },

    /// A file resource's target cannot hold the desired content.
    #[error("invalid target {}: {reason}", path.display())]
    InvalidTarget {
        /// Target path.
        path: PathBuf,
        /// Why it cannot be written.
        reason: String,
    },
}
