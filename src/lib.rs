//! Manifest-driven machine provisioning.
//!
//! Reads plain-text manifests of desired Homebrew formulae, Homebrew casks,
//! and VS Code extensions, installs whatever is missing one item at a time,
//! verifies each install, and writes a run log, a summary, and a JSON
//! report under the state directory.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: `provision.toml` settings and the manifests they name
//! - **[`resources`]**: installers per item kind and idempotent shell blocks
//! - **[`reconcile`]**: per-item install and verify with failure isolation
//! - **[`tasks`]**: named, ordered units of work wired to resources
//! - **[`report`]** and **[`backup`]**: end-of-run report and pre-run backups
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod backup;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod paths;
pub mod platform;
pub mod reconcile;
pub mod report;
pub mod resources;
pub mod tasks;
