//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules return typed errors (e.g. [`ManifestError`],
//! [`BackupError`]). Command handlers wrap each in the [`ProvisionError`]
//! variant naming its step and convert to [`anyhow::Error`] with `?`. The
//! variant message is the step only; the wrapped error follows in the
//! source chain.
//!
//! # Error hierarchy
//!
//! ```text
//! ProvisionError
//! ├── Config(ConfigError)      : settings file, root resolution
//! ├── Manifest(ManifestError)  : manifest missing or unreadable
//! ├── Preflight(PreflightError): required external command missing
//! └── Backup(BackupError)      : backup directory cannot be created
//! ```
//!
//! Every variant here is fatal for the run. Per-item install and verify
//! failures are not errors: they are recorded as outcomes by the reconciler.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for fatal, run-aborting conditions.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Configuration-related error (settings file, root directory).
    #[error("configuration error")]
    Config(#[from] ConfigError),

    /// A manifest could not be loaded.
    #[error("manifest error")]
    Manifest(#[from] ManifestError),

    /// A pre-flight requirement is not met.
    #[error("pre-flight check failed")]
    Preflight(#[from] PreflightError),

    /// The backup step could not run.
    #[error("backup failed")]
    Backup(#[from] BackupError),
}

/// Errors that arise from loading `provision.toml` and resolving the root.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file exists but could not be read.
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or has unexpected fields.
    #[error("invalid settings in {}: {source}", path.display())]
    Parse {
        /// Path to the settings file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// No provisioning root could be found.
    #[error("cannot determine provisioning root. Use --root or set PROVISION_ROOT")]
    RootNotFound,

    /// Neither `HOME` nor `USERPROFILE` is set.
    #[error("HOME environment variable is not set")]
    HomeNotSet,
}

/// Errors that arise from loading a manifest file.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest path does not exist.
    #[error("manifest not found: {}", path.display())]
    NotFound {
        /// Path that was expected to hold the manifest.
        path: PathBuf,
    },

    /// The manifest exists but could not be read (I/O error or invalid UTF-8).
    #[error("manifest unreadable: {}: {source}", path.display())]
    Unreadable {
        /// Path to the manifest.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors raised by pre-flight checks before any installation begins.
#[derive(Error, Debug)]
pub enum PreflightError {
    /// A command the run cannot proceed without is not on `PATH`.
    #[error("required command '{command}' not found ({reason})")]
    RequiredCommandMissing {
        /// Program name that was looked up.
        command: String,
        /// Why the command is required for this run.
        reason: String,
    },
}

/// Errors raised by the backup guard.
#[derive(Error, Debug)]
pub enum BackupError {
    /// The timestamped backup directory could not be created.
    #[error("cannot create backup directory {}: {source}", path.display())]
    DirectoryUncreatable {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
